use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::synth_engine::Sample;
use crate::utils::finite_or;

pub const NUM_WAVEFORMS: usize = 6;

const MIN_MIX_TOTAL: Sample = 1e-4;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveformKind {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
    Ramp,
    Wavetable,
}

impl WaveformKind {
    pub const ALL: [WaveformKind; NUM_WAVEFORMS] = [
        WaveformKind::Sine,
        WaveformKind::Square,
        WaveformKind::Sawtooth,
        WaveformKind::Triangle,
        WaveformKind::Ramp,
        WaveformKind::Wavetable,
    ];
}

#[inline(always)]
fn table_sample(table: &[Sample], phase: f64) -> Sample {
    if table.is_empty() {
        return 0.0;
    }

    let position = phase * (table.len() - 1) as f64;
    let idx = position as usize;
    let t = (position - idx as f64) as Sample;
    let a = table[idx];
    let b = table[(idx + 1).min(table.len() - 1)];

    a + (b - a) * t
}

#[inline(always)]
pub fn waveform_sample(kind: WaveformKind, phase: f64, table: &[Sample]) -> Sample {
    match kind {
        WaveformKind::Sine => (TAU * phase).sin() as Sample,
        WaveformKind::Square => {
            let sine = (TAU * phase).sin();

            if sine > 0.0 {
                1.0
            } else if sine < 0.0 {
                -1.0
            } else {
                0.0
            }
        }
        WaveformKind::Sawtooth => (1.0 - 2.0 * phase) as Sample,
        WaveformKind::Triangle => (((phase * 2.0 - 1.0).abs() * 2.0) - 1.0) as Sample,
        WaveformKind::Ramp => (2.0 * phase - 1.0) as Sample,
        WaveformKind::Wavetable => table_sample(table, phase),
    }
}

// Weighted blend of all six shapes, normalized by the weight total so mixing
// behaves as a crossfade rather than stacking gain.
#[inline]
pub fn blend_sample(mix: &[Sample; NUM_WAVEFORMS], phase: f64, table: &[Sample]) -> Sample {
    let mut total = 0.0;
    let mut weight_total = 0.0;

    for (kind, weight) in WaveformKind::ALL.iter().zip(mix) {
        let weight = finite_or(*weight, 0.0).clamp(0.0, 1.0);

        if weight > 0.0 {
            total += weight * waveform_sample(*kind, phase, table);
            weight_total += weight;
        }
    }

    if weight_total > MIN_MIX_TOTAL {
        total / weight_total
    } else {
        0.0
    }
}
