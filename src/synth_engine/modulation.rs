use serde::{Deserialize, Serialize};

use crate::synth_engine::Sample;
use crate::synth_engine::config::ModMatrixSlot;
use crate::utils::finite_or;

pub const NUM_MOD_SLOTS: usize = 8;
pub const NUM_DESTINATIONS: usize = 30;

// Empirical modulation ranges carried over from the tuned control surface.
// Tunable, not physically derived.
pub const OSC_FREQUENCY_RANGE: Sample = 2_000.0; // Hz
pub const LFO_FREQUENCY_RANGE: Sample = 20.0; // Hz
pub const AMPLITUDE_RANGE: Sample = 1.0;
pub const SHAPER_DRIVE_RANGE: Sample = 10.0;
pub const MIX_RANGE: Sample = 1.0;
pub const EQ_FREQUENCY_RANGE: Sample = 10_000.0; // Hz
pub const EQ_BANDWIDTH_RANGE: Sample = 4.0; // octaves
pub const EQ_BOOST_RANGE: Sample = 24.0; // dB
pub const FILTER_CUTOFF_RANGE: Sample = 10_000.0; // Hz
pub const FILTER_RESONANCE_RANGE: Sample = 10.0;
pub const COMB_DELAY_RANGE: Sample = 50.0; // ms
pub const COMB_FEEDBACK_RANGE: Sample = 1.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModSource {
    #[default]
    Lfo1,
    Lfo2,
}

impl ModSource {
    pub fn from_value(value: Sample) -> Self {
        if value.round() as i64 == 1 {
            ModSource::Lfo2
        } else {
            ModSource::Lfo1
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModDestination {
    #[default]
    Osc1Frequency,
    Osc1Amplitude,
    Osc2Frequency,
    Osc2Amplitude,
    Lfo1Frequency,
    Lfo1Amplitude,
    Lfo2Frequency,
    Lfo2Amplitude,
    ShaperDrive,
    ShaperMix,
    Eq1Frequency,
    Eq1Bandwidth,
    Eq1Boost,
    Eq2Frequency,
    Eq2Bandwidth,
    Eq2Boost,
    Eq3Frequency,
    Eq3Bandwidth,
    Eq3Boost,
    Filter1Cutoff,
    Filter1Resonance,
    Filter2Cutoff,
    Filter2Resonance,
    Filter3Cutoff,
    Filter3Resonance,
    Filter4Cutoff,
    Filter4Resonance,
    CombDelay,
    CombFeedback,
    CombMix,
}

impl ModDestination {
    pub const ALL: [ModDestination; NUM_DESTINATIONS] = [
        ModDestination::Osc1Frequency,
        ModDestination::Osc1Amplitude,
        ModDestination::Osc2Frequency,
        ModDestination::Osc2Amplitude,
        ModDestination::Lfo1Frequency,
        ModDestination::Lfo1Amplitude,
        ModDestination::Lfo2Frequency,
        ModDestination::Lfo2Amplitude,
        ModDestination::ShaperDrive,
        ModDestination::ShaperMix,
        ModDestination::Eq1Frequency,
        ModDestination::Eq1Bandwidth,
        ModDestination::Eq1Boost,
        ModDestination::Eq2Frequency,
        ModDestination::Eq2Bandwidth,
        ModDestination::Eq2Boost,
        ModDestination::Eq3Frequency,
        ModDestination::Eq3Bandwidth,
        ModDestination::Eq3Boost,
        ModDestination::Filter1Cutoff,
        ModDestination::Filter1Resonance,
        ModDestination::Filter2Cutoff,
        ModDestination::Filter2Resonance,
        ModDestination::Filter3Cutoff,
        ModDestination::Filter3Resonance,
        ModDestination::Filter4Cutoff,
        ModDestination::Filter4Resonance,
        ModDestination::CombDelay,
        ModDestination::CombFeedback,
        ModDestination::CombMix,
    ];

    pub fn from_value(value: Sample) -> Self {
        let idx = finite_or(value, 0.0).round().max(0.0) as usize;

        Self::ALL[idx.min(NUM_DESTINATIONS - 1)]
    }

    pub fn eq_frequency(band: usize) -> Self {
        Self::ALL[ModDestination::Eq1Frequency as usize + band * 3]
    }

    pub fn eq_bandwidth(band: usize) -> Self {
        Self::ALL[ModDestination::Eq1Bandwidth as usize + band * 3]
    }

    pub fn eq_boost(band: usize) -> Self {
        Self::ALL[ModDestination::Eq1Boost as usize + band * 3]
    }

    pub fn filter_cutoff(filter: usize) -> Self {
        Self::ALL[ModDestination::Filter1Cutoff as usize + filter * 2]
    }

    pub fn filter_resonance(filter: usize) -> Self {
        Self::ALL[ModDestination::Filter1Resonance as usize + filter * 2]
    }

    pub fn osc_frequency(osc: usize) -> Self {
        Self::ALL[ModDestination::Osc1Frequency as usize + osc * 2]
    }

    pub fn osc_amplitude(osc: usize) -> Self {
        Self::ALL[ModDestination::Osc1Amplitude as usize + osc * 2]
    }

    pub fn lfo_frequency(lfo: usize) -> Self {
        Self::ALL[ModDestination::Lfo1Frequency as usize + lfo * 2]
    }

    pub fn lfo_amplitude(lfo: usize) -> Self {
        Self::ALL[ModDestination::Lfo1Amplitude as usize + lfo * 2]
    }
}

// Per-destination totals, cleared at the start of every callback and
// accumulated in slot order so results are reproducible.
#[derive(Debug, Default)]
pub struct ModulationTotals {
    totals: [Sample; NUM_DESTINATIONS],
}

impl ModulationTotals {
    pub fn clear(&mut self) {
        self.totals = [0.0; NUM_DESTINATIONS];
    }

    pub fn accumulate(&mut self, slots: &[ModMatrixSlot; NUM_MOD_SLOTS], lfo_samples: [Sample; 2]) {
        for slot in slots {
            if !slot.enabled {
                continue;
            }

            let source = match slot.source {
                ModSource::Lfo1 => lfo_samples[0],
                ModSource::Lfo2 => lfo_samples[1],
            };
            let amount = finite_or(slot.amount, 0.0).clamp(-1.0, 1.0);

            self.totals[slot.destination as usize] += finite_or(source, 0.0) * amount;
        }
    }

    #[inline(always)]
    pub fn get(&self, destination: ModDestination) -> Sample {
        self.totals[destination as usize]
    }
}
