use std::f32::consts::{LN_2, TAU};

use biquad::{Coefficients, DirectForm2Transposed, ToHertz};
use serde::{Deserialize, Serialize};

use crate::synth_engine::Sample;
use crate::utils::finite_or;

pub const NUM_EQ_BANDS: usize = 3;
pub const NUM_FREQUENCY_FILTERS: usize = 4;

pub const MIN_FILTER_FREQUENCY: Sample = 20.0;
pub const MIN_RESONANCE: Sample = 0.707;
pub const MAX_RESONANCE: Sample = 20.0;
pub const MIN_BANDWIDTH: Sample = 0.05; // octaves
pub const MAX_BANDWIDTH: Sample = 8.0;
pub const MAX_BOOST: Sample = 40.0; // dB

const IDENTITY_BOOST_THRESHOLD: Sample = 1e-3; // dB

#[inline]
pub fn max_filter_frequency(sample_rate: Sample) -> Sample {
    sample_rate / 2.1
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyFilterKind {
    #[default]
    LowPass,
    HighPass,
    BandPass,
}

impl FrequencyFilterKind {
    pub fn from_value(value: Sample) -> Self {
        match value.round() as i64 {
            1 => FrequencyFilterKind::HighPass,
            2 => FrequencyFilterKind::BandPass,
            _ => FrequencyFilterKind::LowPass,
        }
    }
}

// Normalized peaking coefficients: a* feed the input taps, b* the output
// taps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqCoefficients {
    pub a0: Sample,
    pub a1: Sample,
    pub a2: Sample,
    pub b1: Sample,
    pub b2: Sample,
}

impl EqCoefficients {
    pub const IDENTITY: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
    };

    // RBJ peaking EQ with bandwidth in octaves. A zero boost short-circuits
    // to the exact identity set so float round-off cannot leave residual
    // phase or attenuation in a nominally flat band.
    pub fn peaking(sample_rate: Sample, frequency: Sample, bandwidth: Sample, boost: Sample) -> Self {
        let boost = finite_or(boost, 0.0).clamp(-MAX_BOOST, MAX_BOOST);

        if boost.abs() < IDENTITY_BOOST_THRESHOLD {
            return Self::IDENTITY;
        }

        let max_frequency = max_filter_frequency(sample_rate);
        let frequency = finite_or(frequency, 1_000.0)
            .clamp(MIN_FILTER_FREQUENCY.min(max_frequency), max_frequency);
        let bandwidth = finite_or(bandwidth, 1.0).clamp(MIN_BANDWIDTH, MAX_BANDWIDTH);

        let a = 10.0f32.powf(boost / 40.0);
        let w0 = TAU * frequency / sample_rate;
        let sin_w0 = w0.sin();
        let cos_w0 = w0.cos();
        let alpha = sin_w0 * (LN_2 / 2.0 * bandwidth * w0 / sin_w0).sinh();

        let norm = (1.0 + alpha / a).recip();

        Self {
            a0: (1.0 + alpha * a) * norm,
            a1: -2.0 * cos_w0 * norm,
            a2: (1.0 - alpha * a) * norm,
            b1: -2.0 * cos_w0 * norm,
            b2: (1.0 - alpha / a) * norm,
        }
    }
}

// Two persistent delay taps, transposed direct form II.
#[derive(Debug, Default, Clone, Copy)]
pub struct EqState {
    z1: Sample,
    z2: Sample,
}

impl EqState {
    #[inline(always)]
    pub fn run(&mut self, coeffs: &EqCoefficients, input: Sample) -> Sample {
        let output = input * coeffs.a0 + self.z1;

        self.z1 = input * coeffs.a1 + self.z2 - coeffs.b1 * output;
        self.z2 = input * coeffs.a2 - coeffs.b2 * output;

        output
    }
}

pub fn frequency_filter_coefficients(
    kind: FrequencyFilterKind,
    sample_rate: Sample,
    cutoff: Sample,
    resonance: Sample,
) -> Coefficients<Sample> {
    let max_frequency = max_filter_frequency(sample_rate);
    let cutoff = finite_or(cutoff, 1_000.0)
        .clamp(MIN_FILTER_FREQUENCY.min(max_frequency), max_frequency);
    let resonance = finite_or(resonance, MIN_RESONANCE).clamp(MIN_RESONANCE, MAX_RESONANCE);

    let kind = match kind {
        FrequencyFilterKind::LowPass => biquad::Type::LowPass,
        FrequencyFilterKind::HighPass => biquad::Type::HighPass,
        FrequencyFilterKind::BandPass => biquad::Type::BandPass,
    };

    Coefficients::<Sample>::from_params(kind, sample_rate.hz(), cutoff.hz(), resonance).unwrap()
}

pub fn make_frequency_filter(sample_rate: Sample) -> DirectForm2Transposed<Sample> {
    DirectForm2Transposed::new(frequency_filter_coefficients(
        FrequencyFilterKind::LowPass,
        sample_rate,
        1_000.0,
        MIN_RESONANCE,
    ))
}
