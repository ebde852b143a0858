use std::f64::consts::TAU;

use biosynth::{
    GeneratorParam, ParamId, Sample, SynthEngine, WaveformKind,
};

const SAMPLE_RATE: Sample = 48_000.0;
const FRAMES: usize = 480;

fn mono_engine() -> SynthEngine {
    SynthEngine::new(SAMPLE_RATE, 1).expect("engine init")
}

// Oscillator 1 as a pure sine at the given frequency, oscillator 2 silenced.
fn set_sine_scenario(engine: &SynthEngine, frequency: Sample) {
    let controls = engine.control_handle();

    controls.set_parameter(ParamId::Oscillator(0, GeneratorParam::Frequency), frequency);
    controls.set_parameter(ParamId::Oscillator(0, GeneratorParam::Amplitude), 1.0);
    controls.set_parameter(ParamId::Oscillator(1, GeneratorParam::Amplitude), 0.0);
}

fn rms(samples: &[Sample]) -> Sample {
    let sum: f64 = samples.iter().map(|s| f64::from(*s) * f64::from(*s)).sum();

    ((sum / samples.len() as f64) as Sample).sqrt()
}

#[test]
fn unmodulated_sine_matches_the_closed_form() {
    let mut engine = mono_engine();
    set_sine_scenario(&engine, 440.0);

    let mut buffer = vec![0.0; FRAMES];
    engine.process(&mut buffer, 1);

    for (i, sample) in buffer.iter().enumerate() {
        let expected = (TAU * 440.0 * i as f64 / f64::from(SAMPLE_RATE)).sin() as Sample;

        assert!(
            (sample - expected).abs() < 1e-4,
            "sample {i}: got {sample}, expected {expected}"
        );
    }
}

#[test]
fn phase_is_continuous_across_callbacks() {
    let mut engine = mono_engine();
    set_sine_scenario(&engine, 440.0);

    let mut long_run = vec![0.0; FRAMES * 4];
    for chunk in long_run.chunks_mut(FRAMES) {
        engine.process(chunk, 1);
    }

    for (i, sample) in long_run.iter().enumerate() {
        let expected = (TAU * 440.0 * i as f64 / f64::from(SAMPLE_RATE)).sin() as Sample;

        assert!(
            (sample - expected).abs() < 1e-4,
            "discontinuity at sample {i}"
        );
    }
}

#[test]
fn identical_configuration_renders_bit_identical_output() {
    let run = || {
        let mut engine = mono_engine();
        let controls = engine.control_handle();
        set_sine_scenario(&engine, 330.0);
        controls.set_parameter(ParamId::ShaperEnabled, 1.0);
        controls.set_parameter(ParamId::ShaperKind, 2.0);
        controls.set_parameter(ParamId::ShaperDrive, 3.0);
        controls.set_parameter(ParamId::EqEnabled(0), 1.0);
        controls.set_parameter(ParamId::EqBoost(0), 6.0);
        controls.set_parameter(ParamId::FilterEnabled(0), 1.0);
        controls.set_parameter(ParamId::FilterCutoff(0), 3_000.0);
        controls.set_parameter(ParamId::CombEnabled, 1.0);
        controls.set_parameter(ParamId::SlotEnabled(0), 1.0);
        controls.set_parameter(ParamId::SlotDestination(0), 0.0);
        controls.set_parameter(ParamId::SlotAmount(0), 0.3);

        let mut collected = Vec::new();
        let mut buffer = vec![0.0; FRAMES];
        for _ in 0..8 {
            engine.process(&mut buffer, 1);
            collected.extend(buffer.iter().map(|s| s.to_bits()));
        }

        collected
    };

    assert_eq!(run(), run());
}

#[test]
fn stereo_output_interleaves_identical_channels() {
    let mut engine = SynthEngine::new(SAMPLE_RATE, 2).expect("engine init");
    set_sine_scenario(&engine, 220.0);

    let mut buffer = vec![0.0; FRAMES * 2];
    engine.process(&mut buffer, 2);

    for frame in buffer.chunks_exact(2) {
        assert_eq!(frame[0].to_bits(), frame[1].to_bits());
    }
}

#[test]
fn eq_boost_lifts_a_centered_tone_by_its_nominal_gain() {
    let render_rms = |boosted: bool| {
        let mut engine = mono_engine();
        let controls = engine.control_handle();
        set_sine_scenario(&engine, 1_000.0);
        controls.set_parameter(ParamId::LimiterEnabled, 0.0);

        if boosted {
            controls.set_parameter(ParamId::EqEnabled(0), 1.0);
            controls.set_parameter(ParamId::EqFrequency(0), 1_000.0);
            controls.set_parameter(ParamId::EqBandwidth(0), 1.0);
            controls.set_parameter(ParamId::EqBoost(0), 12.0);
        }

        // Let the filter settle, then measure.
        let mut buffer = vec![0.0; 4_800];
        for _ in 0..10 {
            engine.process(&mut buffer, 1);
        }

        rms(&buffer)
    };

    let gain_db = 20.0 * (render_rms(true) / render_rms(false)).log10();

    assert!(
        (gain_db - 12.0).abs() < 0.5,
        "end-to-end EQ gain: {gain_db} dB"
    );
}

#[test]
fn limiter_bounds_a_hot_signal_and_reports_the_peak() {
    let mut engine = mono_engine();
    let controls = engine.control_handle();
    set_sine_scenario(&engine, 440.0);
    controls.set_parameter(ParamId::Oscillator(0, GeneratorParam::DcOffset), 0.5);
    controls.set_parameter(ParamId::LimiterThreshold, 0.8);

    let mut buffer = vec![0.0; FRAMES];
    for _ in 0..4 {
        engine.process(&mut buffer, 1);
    }

    for sample in &buffer {
        assert!(sample.abs() <= 0.8 * (1.0 + 1e-4), "unlimited sample {sample}");
    }

    let expected_peak_db = 20.0 * 0.8f32.log10();
    assert!((engine.peak_db() - expected_peak_db).abs() < 0.1);
}

#[test]
fn wavetable_rebuild_waits_for_the_dirty_flag() {
    let mut engine = mono_engine();
    let controls = engine.control_handle();
    set_sine_scenario(&engine, 440.0);
    controls.set_parameter(
        ParamId::Oscillator(0, GeneratorParam::MixWeight(WaveformKind::Sine as usize)),
        0.0,
    );
    controls.set_parameter(
        ParamId::Oscillator(0, GeneratorParam::MixWeight(WaveformKind::Wavetable as usize)),
        1.0,
    );

    // Default harmonics are a bare fundamental, so the first callback builds
    // a sine table.
    let mut reference = vec![0.0; FRAMES];
    engine.process(&mut reference, 1);

    for (i, sample) in reference.iter().enumerate() {
        let expected = (TAU * 440.0 * i as f64 / f64::from(SAMPLE_RATE)).sin() as Sample;
        assert!(
            (sample - expected).abs() < 5e-3,
            "wavetable sine at {i}: {sample} vs {expected}"
        );
    }

    // Retuning the harmonics without marking dirty must not change the table.
    controls.set_parameter(ParamId::Oscillator(0, GeneratorParam::Harmonic(0)), 0.0);
    controls.set_parameter(ParamId::Oscillator(0, GeneratorParam::Harmonic(7)), 1.0);

    let mut stale = vec![0.0; FRAMES];
    let mut fresh = vec![0.0; FRAMES];
    engine.process(&mut stale, 1);

    controls.mark_wavetable_dirty();
    engine.process(&mut fresh, 1);

    let stale_matches_sine = stale
        .iter()
        .enumerate()
        .all(|(i, sample)| {
            let phase = 440.0 * (FRAMES + i) as f64 / f64::from(SAMPLE_RATE);
            (sample - (TAU * phase).sin() as Sample).abs() < 5e-3
        });
    assert!(stale_matches_sine, "table rebuilt without the dirty flag");

    // The 8th harmonic table is very unlike a fundamental sine.
    let divergence = fresh
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let phase = 440.0 * (2 * FRAMES + i) as f64 / f64::from(SAMPLE_RATE);
            (sample - (TAU * phase).sin() as Sample).abs()
        })
        .fold(0.0 as Sample, Sample::max);
    assert!(divergence > 0.5, "dirty flag had no effect: {divergence}");
}

#[test]
fn malformed_parameters_degrade_to_finite_output() {
    let mut engine = mono_engine();
    let controls = engine.control_handle();
    set_sine_scenario(&engine, 440.0);

    controls.set_parameter(ParamId::Oscillator(0, GeneratorParam::Frequency), Sample::NAN);
    controls.set_parameter(ParamId::Oscillator(0, GeneratorParam::DcOffset), Sample::INFINITY);
    controls.set_parameter(ParamId::ShaperEnabled, 1.0);
    controls.set_parameter(ParamId::ShaperDrive, Sample::NAN);
    controls.set_parameter(ParamId::EqEnabled(1), 1.0);
    controls.set_parameter(ParamId::EqFrequency(1), Sample::NAN);
    controls.set_parameter(ParamId::EqBoost(1), Sample::INFINITY);
    controls.set_parameter(ParamId::FilterEnabled(2), 1.0);
    controls.set_parameter(ParamId::FilterCutoff(2), -1.0);
    controls.set_parameter(ParamId::FilterResonance(2), Sample::NAN);
    controls.set_parameter(ParamId::CombEnabled, 1.0);
    controls.set_parameter(ParamId::CombDelay, Sample::NAN);
    controls.set_parameter(ParamId::CombFeedback, 40.0);
    controls.set_parameter(ParamId::LimiterThreshold, Sample::NAN);

    let mut buffer = vec![0.0; FRAMES];
    for _ in 0..8 {
        engine.process(&mut buffer, 1);
    }

    assert!(buffer.iter().all(|s| s.is_finite()));
}

#[test]
fn control_thread_mutation_never_corrupts_the_stream() {
    let mut engine = mono_engine();
    let controls = engine.control_handle();
    set_sine_scenario(&engine, 440.0);

    let writer = std::thread::spawn(move || {
        for step in 0..2_000 {
            let value = (step % 100) as Sample * 20.0;
            controls.set_parameter(ParamId::Oscillator(0, GeneratorParam::Frequency), value);
            controls.set_parameter(ParamId::FilterCutoff(0), value * 10.0);
            controls.set_parameter(ParamId::SlotAmount(3), value * 1e-3 - 1.0);

            if step % 50 == 0 {
                controls.mark_wavetable_dirty();
            }
        }
    });

    let mut buffer = vec![0.0; FRAMES];
    for _ in 0..50 {
        engine.process(&mut buffer, 1);
        assert!(buffer.iter().all(|s| s.is_finite() && s.abs() <= 1.0 + 1e-4));
    }

    writer.join().expect("writer thread");
}

#[test]
fn rejects_invalid_initialization() {
    assert!(SynthEngine::new(0.0, 1).is_err());
    assert!(SynthEngine::new(Sample::NAN, 1).is_err());
    assert!(SynthEngine::new(48_000.0, 0).is_err());
    assert!(SynthEngine::new(48_000.0, 3).is_err());
}

#[test]
fn buffer_length_changes_are_handled_between_callbacks() {
    let mut engine = mono_engine();
    set_sine_scenario(&engine, 440.0);

    for frames in [480, 64, 1_024, 480] {
        let mut buffer = vec![0.0; frames];
        engine.process(&mut buffer, 1);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
