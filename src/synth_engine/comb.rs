use crate::synth_engine::Sample;
use crate::utils::{finite_or, from_ms};

pub const MAX_COMB_DELAY_MS: Sample = 1_000.0;
pub const MAX_COMB_FEEDBACK: Sample = 0.99;

const MIN_DELAY_SAMPLES: Sample = 1.0;

// Feedback comb over a circular buffer sized for the maximum configurable
// delay. The read tap sits a fractional distance behind the write pointer
// and is linearly interpolated.
pub struct CombDelayLine {
    buffer: Vec<Sample>,
    write_pos: usize,
}

impl CombDelayLine {
    pub fn new(sample_rate: Sample) -> Self {
        let capacity = (from_ms(MAX_COMB_DELAY_MS) * sample_rate).ceil() as usize + 2;

        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    pub fn delay_samples(&self, delay_ms: Sample, sample_rate: Sample) -> Sample {
        let max = (self.buffer.len() - 2) as Sample;

        (from_ms(finite_or(delay_ms, 0.0)) * sample_rate).clamp(MIN_DELAY_SAMPLES, max)
    }

    #[inline(always)]
    pub fn process(
        &mut self,
        input: Sample,
        delay_samples: Sample,
        feedback: Sample,
        mix: Sample,
    ) -> Sample {
        let len = self.buffer.len();

        let mut read_pos = self.write_pos as Sample - delay_samples;
        if read_pos < 0.0 {
            read_pos += len as Sample;
        }

        let idx = read_pos as usize;
        let t = read_pos - idx as Sample;
        let next = if idx + 1 == len { 0 } else { idx + 1 };
        let delayed = self.buffer[idx] + (self.buffer[next] - self.buffer[idx]) * t;

        self.buffer[self.write_pos] = input + feedback * delayed;

        self.write_pos += 1;
        if self.write_pos == len {
            self.write_pos = 0;
        }

        input + (delayed - input) * mix
    }
}
