use serde::{Deserialize, Serialize};

use crate::synth_engine::Sample;
use crate::synth_engine::filters::{FrequencyFilterKind, NUM_EQ_BANDS, NUM_FREQUENCY_FILTERS};
use crate::synth_engine::modulation::{ModDestination, ModSource, NUM_MOD_SLOTS};
use crate::synth_engine::oscillator::CombineOp;
use crate::synth_engine::waveform::{NUM_WAVEFORMS, WaveformKind};
use crate::synth_engine::waveshaper::WaveshaperKind;
use crate::utils::finite_or;

pub const NUM_OSCILLATORS: usize = 2;
pub const NUM_LFOS: usize = 2;
pub const NUM_HARMONICS: usize = 16;

// One generator: the audio oscillators and the LFOs share this model, an
// LFO is simply the same generator running at sub-audio frequency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OscillatorConfig {
    pub mix: [Sample; NUM_WAVEFORMS],
    pub harmonics: [Sample; NUM_HARMONICS],
    pub frequency: Sample, // Hz
    pub amplitude: Sample,
    pub dc_offset: Sample,
}

impl OscillatorConfig {
    fn audio_default() -> Self {
        let mut mix = [0.0; NUM_WAVEFORMS];
        mix[WaveformKind::Sine as usize] = 1.0;

        let mut harmonics = [0.0; NUM_HARMONICS];
        harmonics[0] = 1.0;

        Self {
            mix,
            harmonics,
            frequency: 220.0,
            amplitude: 1.0,
            dc_offset: 0.0,
        }
    }

    fn lfo_default() -> Self {
        Self {
            frequency: 1.0,
            ..Self::audio_default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaveshaperConfig {
    pub enabled: bool,
    pub kind: WaveshaperKind,
    pub drive: Sample,
    pub mix: Sample,
}

impl Default for WaveshaperConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: WaveshaperKind::Tanh,
            drive: 1.0,
            mix: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EqBandConfig {
    pub enabled: bool,
    pub frequency: Sample, // Hz
    pub bandwidth: Sample, // octaves
    pub boost: Sample,     // dB
}

impl Default for EqBandConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: 1_000.0,
            bandwidth: 1.0,
            boost: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrequencyFilterConfig {
    pub enabled: bool,
    pub kind: FrequencyFilterKind,
    pub cutoff: Sample, // Hz
    pub resonance: Sample,
}

impl Default for FrequencyFilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: FrequencyFilterKind::LowPass,
            cutoff: 8_000.0,
            resonance: 0.707,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CombConfig {
    pub enabled: bool,
    pub delay_ms: Sample,
    pub feedback: Sample,
    pub mix: Sample,
}

impl Default for CombConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 20.0,
            feedback: 0.5,
            mix: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimiterConfig {
    pub enabled: bool,
    pub threshold: Sample,
    pub attack: Sample,  // seconds
    pub release: Sample, // seconds
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1.0,
            attack: 0.0,
            release: 0.05,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct ModMatrixSlot {
    pub enabled: bool,
    pub source: ModSource,
    pub destination: ModDestination,
    pub amount: Sample,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    pub oscillators: [OscillatorConfig; NUM_OSCILLATORS],
    pub lfos: [OscillatorConfig; NUM_LFOS],
    pub oscillator_combine: CombineOp,
    pub lfo_combine: CombineOp,
    pub waveshaper: WaveshaperConfig,
    pub eq_bands: [EqBandConfig; NUM_EQ_BANDS],
    pub filters: [FrequencyFilterConfig; NUM_FREQUENCY_FILTERS],
    pub comb: CombConfig,
    pub limiter: LimiterConfig,
    pub mod_slots: [ModMatrixSlot; NUM_MOD_SLOTS],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oscillators: [OscillatorConfig::audio_default(); NUM_OSCILLATORS],
            lfos: [OscillatorConfig::lfo_default(); NUM_LFOS],
            oscillator_combine: CombineOp::Add,
            lfo_combine: CombineOp::Add,
            waveshaper: WaveshaperConfig::default(),
            eq_bands: [EqBandConfig::default(); NUM_EQ_BANDS],
            filters: [FrequencyFilterConfig::default(); NUM_FREQUENCY_FILTERS],
            comb: CombConfig::default(),
            limiter: LimiterConfig::default(),
            mod_slots: [ModMatrixSlot::default(); NUM_MOD_SLOTS],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorParam {
    MixWeight(usize), // waveform index
    Harmonic(usize),  // zero-based
    Frequency,
    Amplitude,
    DcOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    Oscillator(usize, GeneratorParam),
    Lfo(usize, GeneratorParam),
    OscillatorCombine,
    LfoCombine,
    ShaperEnabled,
    ShaperKind,
    ShaperDrive,
    ShaperMix,
    EqEnabled(usize),
    EqFrequency(usize),
    EqBandwidth(usize),
    EqBoost(usize),
    FilterEnabled(usize),
    FilterKind(usize),
    FilterCutoff(usize),
    FilterResonance(usize),
    CombEnabled,
    CombDelay,
    CombFeedback,
    CombMix,
    LimiterEnabled,
    LimiterThreshold,
    LimiterAttack,
    LimiterRelease,
    SlotEnabled(usize),
    SlotSource(usize),
    SlotDestination(usize),
    SlotAmount(usize),
}

#[inline]
fn as_flag(value: Sample) -> bool {
    finite_or(value, 0.0) >= 0.5
}

impl OscillatorConfig {
    fn apply(&mut self, param: GeneratorParam, value: Sample) {
        match param {
            GeneratorParam::MixWeight(idx) => {
                self.mix[idx.min(NUM_WAVEFORMS - 1)] = value;
            }
            GeneratorParam::Harmonic(idx) => {
                self.harmonics[idx.min(NUM_HARMONICS - 1)] = value;
            }
            GeneratorParam::Frequency => self.frequency = value,
            GeneratorParam::Amplitude => self.amplitude = value,
            GeneratorParam::DcOffset => self.dc_offset = value,
        }
    }
}

impl EngineConfig {
    // Raw values land here as sent; range and finiteness clamps happen at
    // point of use when the snapshot is resolved. Discrete parameters are
    // value-coded and decoded immediately.
    pub fn apply(&mut self, id: ParamId, value: Sample) {
        match id {
            ParamId::Oscillator(idx, param) => {
                self.oscillators[idx.min(NUM_OSCILLATORS - 1)].apply(param, value);
            }
            ParamId::Lfo(idx, param) => {
                self.lfos[idx.min(NUM_LFOS - 1)].apply(param, value);
            }
            ParamId::OscillatorCombine => {
                self.oscillator_combine = CombineOp::from_value(finite_or(value, 0.0));
            }
            ParamId::LfoCombine => {
                self.lfo_combine = CombineOp::from_value(finite_or(value, 0.0));
            }
            ParamId::ShaperEnabled => self.waveshaper.enabled = as_flag(value),
            ParamId::ShaperKind => {
                self.waveshaper.kind = WaveshaperKind::from_value(finite_or(value, 0.0));
            }
            ParamId::ShaperDrive => self.waveshaper.drive = value,
            ParamId::ShaperMix => self.waveshaper.mix = value,
            ParamId::EqEnabled(band) => {
                self.eq_bands[band.min(NUM_EQ_BANDS - 1)].enabled = as_flag(value);
            }
            ParamId::EqFrequency(band) => {
                self.eq_bands[band.min(NUM_EQ_BANDS - 1)].frequency = value;
            }
            ParamId::EqBandwidth(band) => {
                self.eq_bands[band.min(NUM_EQ_BANDS - 1)].bandwidth = value;
            }
            ParamId::EqBoost(band) => {
                self.eq_bands[band.min(NUM_EQ_BANDS - 1)].boost = value;
            }
            ParamId::FilterEnabled(idx) => {
                self.filters[idx.min(NUM_FREQUENCY_FILTERS - 1)].enabled = as_flag(value);
            }
            ParamId::FilterKind(idx) => {
                self.filters[idx.min(NUM_FREQUENCY_FILTERS - 1)].kind =
                    FrequencyFilterKind::from_value(finite_or(value, 0.0));
            }
            ParamId::FilterCutoff(idx) => {
                self.filters[idx.min(NUM_FREQUENCY_FILTERS - 1)].cutoff = value;
            }
            ParamId::FilterResonance(idx) => {
                self.filters[idx.min(NUM_FREQUENCY_FILTERS - 1)].resonance = value;
            }
            ParamId::CombEnabled => self.comb.enabled = as_flag(value),
            ParamId::CombDelay => self.comb.delay_ms = value,
            ParamId::CombFeedback => self.comb.feedback = value,
            ParamId::CombMix => self.comb.mix = value,
            ParamId::LimiterEnabled => self.limiter.enabled = as_flag(value),
            ParamId::LimiterThreshold => self.limiter.threshold = value,
            ParamId::LimiterAttack => self.limiter.attack = value,
            ParamId::LimiterRelease => self.limiter.release = value,
            ParamId::SlotEnabled(slot) => {
                self.mod_slots[slot.min(NUM_MOD_SLOTS - 1)].enabled = as_flag(value);
            }
            ParamId::SlotSource(slot) => {
                self.mod_slots[slot.min(NUM_MOD_SLOTS - 1)].source =
                    ModSource::from_value(finite_or(value, 0.0));
            }
            ParamId::SlotDestination(slot) => {
                self.mod_slots[slot.min(NUM_MOD_SLOTS - 1)].destination =
                    ModDestination::from_value(value);
            }
            ParamId::SlotAmount(slot) => {
                self.mod_slots[slot.min(NUM_MOD_SLOTS - 1)].amount = value;
            }
        }
    }
}
