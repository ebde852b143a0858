use std::array;

use biquad::{Biquad, DirectForm2Transposed};
use itertools::izip;

use crate::synth_engine::comb::{CombDelayLine, MAX_COMB_FEEDBACK};
use crate::synth_engine::config::{EngineConfig, NUM_LFOS, NUM_OSCILLATORS, OscillatorConfig};
use crate::synth_engine::filters::{
    EqCoefficients, EqState, MIN_RESONANCE, NUM_EQ_BANDS, NUM_FREQUENCY_FILTERS,
    frequency_filter_coefficients, make_frequency_filter,
};
use crate::synth_engine::limiter::{LimiterState, MIN_LIMITER_THRESHOLD, envelope_coefficient};
use crate::synth_engine::modulation::{
    AMPLITUDE_RANGE, COMB_DELAY_RANGE, COMB_FEEDBACK_RANGE, EQ_BANDWIDTH_RANGE, EQ_BOOST_RANGE,
    EQ_FREQUENCY_RANGE, FILTER_CUTOFF_RANGE, FILTER_RESONANCE_RANGE, LFO_FREQUENCY_RANGE,
    MIX_RANGE, ModDestination, ModulationTotals, OSC_FREQUENCY_RANGE, SHAPER_DRIVE_RANGE,
};
use crate::synth_engine::oscillator::{GeneratorParams, GeneratorState, generate_pair, wrap_phase};
use crate::synth_engine::types::{NUM_CHANNELS, Sample};
use crate::synth_engine::waveshaper;
use crate::utils::finite_or;

pub const MAX_LFO_FREQUENCY: Sample = 50.0;

const MAX_SHAPER_DRIVE: Sample = 100.0;

pub(crate) struct RenderState {
    oscillators: [GeneratorState; NUM_OSCILLATORS],
    lfos: [GeneratorState; NUM_LFOS],
    eq_states: [[EqState; NUM_CHANNELS]; NUM_EQ_BANDS],
    filters: [[DirectForm2Transposed<Sample>; NUM_CHANNELS]; NUM_FREQUENCY_FILTERS],
    combs: [CombDelayLine; NUM_CHANNELS],
    limiter: LimiterState,
    totals: ModulationTotals,
    lfo_frequency_mod: [Sample; NUM_LFOS],
    lfo_amplitude_mod: [Sample; NUM_LFOS],
}

impl RenderState {
    pub fn new(sample_rate: Sample) -> Self {
        Self {
            oscillators: array::from_fn(|_| GeneratorState::new()),
            lfos: array::from_fn(|_| GeneratorState::new()),
            eq_states: Default::default(),
            filters: array::from_fn(|_| array::from_fn(|_| make_frequency_filter(sample_rate))),
            combs: array::from_fn(|_| CombDelayLine::new(sample_rate)),
            limiter: LimiterState::new(),
            totals: ModulationTotals::default(),
            lfo_frequency_mod: [0.0; NUM_LFOS],
            lfo_amplitude_mod: [0.0; NUM_LFOS],
        }
    }

    pub fn peak_db(&self) -> Sample {
        self.limiter.peak_db()
    }
}

fn resolve_generator(
    config: &OscillatorConfig,
    frequency_mod: Sample,
    amplitude_mod: Sample,
    max_frequency: Sample,
) -> GeneratorParams {
    GeneratorParams {
        mix: config.mix,
        frequency: (finite_or(config.frequency, 0.0) + frequency_mod).clamp(0.0, max_frequency),
        amplitude: (finite_or(config.amplitude, 0.0) + amplitude_mod).clamp(0.0, 1.0),
        dc_offset: finite_or(config.dc_offset, 0.0),
    }
}

pub(crate) fn render(
    config: &EngineConfig,
    sample_rate: Sample,
    channels: usize,
    rebuild_tables: bool,
    state: &mut RenderState,
    output: &mut [Sample],
) {
    let channels = channels.clamp(1, NUM_CHANNELS);
    let frames = output.len() / channels;

    if frames == 0 {
        return;
    }

    if rebuild_tables {
        for (generator, cfg) in izip!(&mut state.oscillators, &config.oscillators) {
            generator.table.rebuild(&cfg.harmonics);
        }
        for (generator, cfg) in izip!(&mut state.lfos, &config.lfos) {
            generator.table.rebuild(&cfg.harmonics);
        }
    }

    // LFO pass, advanced once per callback. LFO-targeted modulation uses the
    // previous callback's totals: this callback's totals need the LFO samples
    // first.
    let lfo_params: [GeneratorParams; NUM_LFOS] = array::from_fn(|i| {
        resolve_generator(
            &config.lfos[i],
            state.lfo_frequency_mod[i] * LFO_FREQUENCY_RANGE,
            state.lfo_amplitude_mod[i] * AMPLITUDE_RANGE,
            MAX_LFO_FREQUENCY,
        )
    });

    for (lfo, params) in izip!(&mut state.lfos, &lfo_params) {
        lfo.phase = wrap_phase(
            lfo.phase + f64::from(params.frequency) * frames as f64 / f64::from(sample_rate),
        );
    }

    let lfo_pair = generate_pair(
        config.lfo_combine,
        (&lfo_params[0], &lfo_params[1]),
        (state.lfos[0].phase, state.lfos[1].phase),
        (state.lfos[0].table.samples(), state.lfos[1].table.samples()),
    );

    state.totals.clear();
    state
        .totals
        .accumulate(&config.mod_slots, [lfo_pair.first, lfo_pair.second]);

    for i in 0..NUM_LFOS {
        state.lfo_frequency_mod[i] = state.totals.get(ModDestination::lfo_frequency(i));
        state.lfo_amplitude_mod[i] = state.totals.get(ModDestination::lfo_amplitude(i));
    }

    let osc_params: [GeneratorParams; NUM_OSCILLATORS] = array::from_fn(|i| {
        resolve_generator(
            &config.oscillators[i],
            state.totals.get(ModDestination::osc_frequency(i)) * OSC_FREQUENCY_RANGE,
            state.totals.get(ModDestination::osc_amplitude(i)) * AMPLITUDE_RANGE,
            sample_rate * 0.5,
        )
    });

    let shaper = config.waveshaper;
    let shaper_drive = (finite_or(shaper.drive, 1.0)
        + state.totals.get(ModDestination::ShaperDrive) * SHAPER_DRIVE_RANGE)
        .clamp(0.0, MAX_SHAPER_DRIVE);
    let shaper_mix = (finite_or(shaper.mix, 1.0)
        + state.totals.get(ModDestination::ShaperMix) * MIX_RANGE)
        .clamp(0.0, 1.0);

    let eq_coeffs: [EqCoefficients; NUM_EQ_BANDS] = array::from_fn(|band| {
        let cfg = &config.eq_bands[band];

        if !cfg.enabled {
            return EqCoefficients::IDENTITY;
        }

        EqCoefficients::peaking(
            sample_rate,
            finite_or(cfg.frequency, 1_000.0)
                + state.totals.get(ModDestination::eq_frequency(band)) * EQ_FREQUENCY_RANGE,
            finite_or(cfg.bandwidth, 1.0)
                + state.totals.get(ModDestination::eq_bandwidth(band)) * EQ_BANDWIDTH_RANGE,
            finite_or(cfg.boost, 0.0)
                + state.totals.get(ModDestination::eq_boost(band)) * EQ_BOOST_RANGE,
        )
    });

    for (idx, (cfg, filter_channels)) in izip!(&config.filters, &mut state.filters).enumerate() {
        if !cfg.enabled {
            continue;
        }

        let coeffs = frequency_filter_coefficients(
            cfg.kind,
            sample_rate,
            finite_or(cfg.cutoff, 1_000.0)
                + state.totals.get(ModDestination::filter_cutoff(idx)) * FILTER_CUTOFF_RANGE,
            finite_or(cfg.resonance, MIN_RESONANCE)
                + state.totals.get(ModDestination::filter_resonance(idx)) * FILTER_RESONANCE_RANGE,
        );

        for filter in filter_channels.iter_mut() {
            filter.replace_coefficients(coeffs);
        }
    }

    let comb_delay_ms = finite_or(config.comb.delay_ms, 0.0)
        + state.totals.get(ModDestination::CombDelay) * COMB_DELAY_RANGE;
    let comb_delay_samples = state.combs[0].delay_samples(comb_delay_ms, sample_rate);
    let comb_feedback = (finite_or(config.comb.feedback, 0.0)
        + state.totals.get(ModDestination::CombFeedback) * COMB_FEEDBACK_RANGE)
        .clamp(-MAX_COMB_FEEDBACK, MAX_COMB_FEEDBACK);
    let comb_mix = (finite_or(config.comb.mix, 0.0)
        + state.totals.get(ModDestination::CombMix) * MIX_RANGE)
        .clamp(0.0, 1.0);

    let limiter_threshold = finite_or(config.limiter.threshold, 1.0).clamp(MIN_LIMITER_THRESHOLD, 1.0);
    let attack_coeff = envelope_coefficient(sample_rate, finite_or(config.limiter.attack, 0.0));
    let release_coeff = envelope_coefficient(sample_rate, finite_or(config.limiter.release, 0.05));

    for frame in 0..frames {
        let pair = generate_pair(
            config.oscillator_combine,
            (&osc_params[0], &osc_params[1]),
            (state.oscillators[0].phase, state.oscillators[1].phase),
            (
                state.oscillators[0].table.samples(),
                state.oscillators[1].table.samples(),
            ),
        );

        for (osc, params) in izip!(&mut state.oscillators, &osc_params) {
            osc.advance(params.frequency, sample_rate);
        }

        let mut sample = pair.combined;

        if shaper.enabled {
            sample = waveshaper::process(shaper.kind, shaper_drive, shaper_mix, sample);
        }

        let base = frame * channels;

        for channel in 0..channels {
            let mut wet = sample;

            for (cfg, coeffs, band_states) in
                izip!(&config.eq_bands, &eq_coeffs, &mut state.eq_states)
            {
                if cfg.enabled {
                    wet = band_states[channel].run(coeffs, wet);
                }
            }

            for (cfg, filter_channels) in izip!(&config.filters, &mut state.filters) {
                if cfg.enabled {
                    wet = filter_channels[channel].run(wet);
                }
            }

            if config.comb.enabled {
                wet = state.combs[channel].process(
                    wet,
                    comb_delay_samples,
                    comb_feedback,
                    comb_mix,
                );
            }

            output[base + channel] = wet;
        }
    }

    if config.limiter.enabled {
        state
            .limiter
            .process_buffer(output, limiter_threshold, attack_coeff, release_coeff);
    }
}
