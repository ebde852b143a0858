use crate::synth_engine::Sample;

const MIN_METER_GAIN: Sample = 1e-10;

#[inline]
pub fn from_ms(ms: Sample) -> Sample {
    ms * 0.001
}

#[inline(always)]
pub fn finite_or(value: Sample, default: Sample) -> Sample {
    if value.is_finite() { value } else { default }
}

#[inline(always)]
pub fn gain_to_db(gain: Sample) -> Sample {
    20.0 * gain.max(MIN_METER_GAIN).log10()
}
