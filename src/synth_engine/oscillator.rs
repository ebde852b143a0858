use serde::{Deserialize, Serialize};

use crate::synth_engine::Sample;
use crate::synth_engine::waveform::{NUM_WAVEFORMS, blend_sample};
use crate::synth_engine::wavetable::Wavetable;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineOp {
    #[default]
    Add,
    Multiply,
    PhaseMod,
}

impl CombineOp {
    pub fn from_value(value: Sample) -> Self {
        match value.round() as i64 {
            1 => CombineOp::Multiply,
            2 => CombineOp::PhaseMod,
            _ => CombineOp::Add,
        }
    }
}

// Per-callback resolved generator parameters, post modulation and clamping.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorParams {
    pub mix: [Sample; NUM_WAVEFORMS],
    pub frequency: Sample,
    pub amplitude: Sample,
    pub dc_offset: Sample,
}

pub struct GeneratorState {
    pub phase: f64,
    pub table: Wavetable,
}

impl GeneratorState {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            table: Wavetable::new(),
        }
    }

    #[inline(always)]
    pub fn advance(&mut self, frequency: Sample, sample_rate: Sample) {
        self.phase = wrap_phase(self.phase + f64::from(frequency) / f64::from(sample_rate));
    }
}

#[inline(always)]
pub fn wrap_phase(phase: f64) -> f64 {
    phase.rem_euclid(1.0)
}

#[inline(always)]
fn generate(params: &GeneratorParams, phase: f64, table: &[Sample]) -> Sample {
    blend_sample(&params.mix, phase, table) * params.amplitude + params.dc_offset
}

pub struct PairOutput {
    pub first: Sample,
    pub second: Sample,
    pub combined: Sample,
}

// The second generator always runs first: under phase modulation the first
// one reads the second's current sample as a phase offset of o2·π radians
// (0.5·o2 in normalized turns).
#[inline]
pub fn generate_pair(
    op: CombineOp,
    params: (&GeneratorParams, &GeneratorParams),
    phases: (f64, f64),
    tables: (&[Sample], &[Sample]),
) -> PairOutput {
    let second = generate(params.1, phases.1, tables.1);

    let first = match op {
        CombineOp::PhaseMod => generate(
            params.0,
            wrap_phase(phases.0 + f64::from(second) * 0.5),
            tables.0,
        ),
        _ => generate(params.0, phases.0, tables.0),
    };

    let combined = match op {
        CombineOp::Add => first + second,
        CombineOp::Multiply => first * second,
        CombineOp::PhaseMod => first,
    };

    PairOutput {
        first,
        second,
        combined,
    }
}
