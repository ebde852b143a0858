use serde::{Deserialize, Serialize};

use crate::synth_engine::Sample;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveshaperKind {
    #[default]
    Identity,
    Atan,
    Tanh,
    Exponential,
}

impl WaveshaperKind {
    pub fn from_value(value: Sample) -> Self {
        match value.round() as i64 {
            1 => WaveshaperKind::Atan,
            2 => WaveshaperKind::Tanh,
            3 => WaveshaperKind::Exponential,
            _ => WaveshaperKind::Identity,
        }
    }
}

#[inline(always)]
fn shape(kind: WaveshaperKind, x: Sample) -> Sample {
    match kind {
        WaveshaperKind::Identity => x,
        WaveshaperKind::Atan => x.atan(),
        WaveshaperKind::Tanh => x.tanh(),
        WaveshaperKind::Exponential => x.signum() * (1.0 - (-x.abs()).exp()),
    }
}

#[inline(always)]
pub fn process(kind: WaveshaperKind, drive: Sample, mix: Sample, input: Sample) -> Sample {
    let wet = shape(kind, input * drive);

    input + (wet - input) * mix
}
