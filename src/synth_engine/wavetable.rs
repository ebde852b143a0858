use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner};

use crate::synth_engine::Sample;
use crate::synth_engine::config::NUM_HARMONICS;
use crate::utils::finite_or;

pub const TABLE_BITS: usize = 12;
pub const TABLE_SIZE: usize = 1 << TABLE_BITS;

const MIN_PEAK: Sample = 1e-6;

type ComplexSample = Complex<Sample>;

pub struct Wavetable {
    inverse_fft: Arc<dyn ComplexToReal<Sample>>,
    spectrum: Vec<ComplexSample>,
    scratch: Vec<ComplexSample>,
    table: Vec<Sample>,
}

impl Wavetable {
    pub fn new() -> Self {
        let inverse_fft = RealFftPlanner::<Sample>::new().plan_fft_inverse(TABLE_SIZE);
        let spectrum = inverse_fft.make_input_vec();
        let scratch = inverse_fft.make_scratch_vec();

        Self {
            inverse_fft,
            spectrum,
            scratch,
            table: vec![0.0; TABLE_SIZE],
        }
    }

    #[inline(always)]
    pub fn samples(&self) -> &[Sample] {
        &self.table
    }

    // Sine-phase harmonics go into the imaginary bins; the inverse transform
    // yields sample[i] = 2·Σ_h amp[h]·sin(2π(h+1)i/N), normalized afterwards
    // by the observed peak.
    pub fn rebuild(&mut self, harmonics: &[Sample; NUM_HARMONICS]) {
        self.spectrum.fill(ComplexSample::ZERO);

        for (idx, amp) in harmonics.iter().enumerate() {
            self.spectrum[idx + 1].im = -finite_or(*amp, 0.0);
        }

        self.inverse_fft
            .process_with_scratch(&mut self.spectrum, &mut self.table, &mut self.scratch)
            .unwrap();

        let peak = self
            .table
            .iter()
            .fold(0.0 as Sample, |peak, sample| peak.max(sample.abs()));

        if peak > MIN_PEAK {
            let norm = peak.recip();

            for sample in self.table.iter_mut() {
                *sample *= norm;
            }
        }
    }
}
