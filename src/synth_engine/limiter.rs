use crate::synth_engine::Sample;
use crate::utils::gain_to_db;

pub const MIN_LIMITER_THRESHOLD: Sample = 0.01;

// Asymmetric envelope follower: a zero time constant collapses the
// coefficient to 1, which makes the corresponding edge instantaneous.
#[inline]
pub fn envelope_coefficient(sample_rate: Sample, time: Sample) -> Sample {
    if time > 0.0 {
        1.0 - (-2.2 / (sample_rate * time)).exp()
    } else {
        1.0
    }
}

pub struct LimiterState {
    envelope: Sample,
    peak: Sample,
}

impl LimiterState {
    pub fn new() -> Self {
        Self {
            envelope: 0.0,
            peak: 0.0,
        }
    }

    pub fn process_buffer(
        &mut self,
        buffer: &mut [Sample],
        threshold: Sample,
        attack_coeff: Sample,
        release_coeff: Sample,
    ) {
        for sample in buffer.iter_mut() {
            let level = sample.abs();
            let coeff = if level > self.envelope {
                attack_coeff
            } else {
                release_coeff
            };

            self.envelope += (level - self.envelope) * coeff;

            let gain = if self.envelope > threshold {
                threshold / self.envelope
            } else {
                1.0
            };

            *sample *= gain;
            self.peak = self.peak.max(sample.abs());
        }
    }

    pub fn peak_db(&self) -> Sample {
        gain_to_db(self.peak)
    }
}
