#![allow(clippy::new_without_default)]

mod synth_engine;
mod utils;

pub use synth_engine::{
    CombConfig, CombineOp, ControlHandle, EngineConfig, EqBandConfig, FrequencyFilterConfig,
    FrequencyFilterKind, GeneratorParam, LimiterConfig, MAX_COMB_DELAY_MS, ModDestination,
    ModMatrixSlot, ModSource, NUM_CHANNELS, NUM_DESTINATIONS, NUM_EQ_BANDS,
    NUM_FREQUENCY_FILTERS, NUM_HARMONICS, NUM_LFOS, NUM_MOD_SLOTS, NUM_OSCILLATORS,
    NUM_WAVEFORMS, OscillatorConfig, ParamId, Sample, SynthEngine, WaveformKind,
    WaveshaperConfig, WaveshaperKind,
};
