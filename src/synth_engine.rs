use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, ensure};
use assert_no_alloc::assert_no_alloc;
use crossbeam::channel::{Receiver, Sender, bounded};
use log::{debug, info};
use parking_lot::Mutex;

mod comb;
mod config;
mod filters;
mod job;
mod limiter;
mod modulation;
mod oscillator;
mod types;
mod waveform;
mod waveshaper;
mod wavetable;

pub use comb::MAX_COMB_DELAY_MS;
pub use config::{
    CombConfig, EngineConfig, EqBandConfig, FrequencyFilterConfig, GeneratorParam, LimiterConfig,
    ModMatrixSlot, NUM_HARMONICS, NUM_LFOS, NUM_OSCILLATORS, OscillatorConfig, ParamId,
    WaveshaperConfig,
};
pub use filters::{FrequencyFilterKind, NUM_EQ_BANDS, NUM_FREQUENCY_FILTERS};
pub use modulation::{ModDestination, ModSource, NUM_DESTINATIONS, NUM_MOD_SLOTS};
pub use oscillator::CombineOp;
pub use types::{NUM_CHANNELS, Sample};
pub use waveform::{NUM_WAVEFORMS, WaveformKind};
pub use waveshaper::WaveshaperKind;

use job::RenderState;

struct SharedControls {
    config: Mutex<EngineConfig>,
    wavetables_dirty: AtomicBool,
}

// Control-rate surface handed to the mapping layer. Mutations only ever
// touch the config mutex; the audio side locks it for one copy per callback.
#[derive(Clone)]
pub struct ControlHandle {
    shared: Arc<SharedControls>,
}

impl ControlHandle {
    pub fn set_parameter(&self, id: ParamId, value: Sample) {
        self.shared.config.lock().apply(id, value);
    }

    pub fn mark_wavetable_dirty(&self) {
        self.shared.wavetables_dirty.store(true, Ordering::Release);
    }
}

struct RenderJob {
    config: EngineConfig,
    sample_rate: Sample,
    channels: usize,
    rebuild_tables: bool,
    buffer: Vec<Sample>,
}

struct RenderReply {
    buffer: Vec<Sample>,
    peak_db: Sample,
}

enum WorkerRequest {
    Render(RenderJob),
    Shutdown,
}

pub struct SynthEngine {
    shared: Arc<SharedControls>,
    sample_rate: Sample,
    peak_db: Sample,
    scratch: Vec<Sample>,
    requests: Sender<WorkerRequest>,
    replies: Receiver<RenderReply>,
    worker: Option<JoinHandle<()>>,
}

impl SynthEngine {
    pub fn new(sample_rate: Sample, channels: usize) -> Result<Self> {
        ensure!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "sample rate must be positive, got {sample_rate}"
        );
        ensure!(
            (1..=NUM_CHANNELS).contains(&channels),
            "channel count must be 1 or 2, got {channels}"
        );

        let shared = Arc::new(SharedControls {
            config: Mutex::new(EngineConfig::default()),
            wavetables_dirty: AtomicBool::new(true),
        });

        let (requests, request_rx) = bounded(1);
        let (reply_tx, replies) = bounded(1);
        let state = RenderState::new(sample_rate);

        let worker = thread::Builder::new()
            .name("biosynth-render".into())
            .spawn(move || worker_loop(request_rx, reply_tx, state))
            .context("failed to spawn the render worker")?;

        info!("synth engine up: {sample_rate} Hz, {channels} channel(s)");

        Ok(Self {
            shared,
            sample_rate,
            peak_db: Sample::NEG_INFINITY,
            scratch: Vec::new(),
            requests,
            replies,
            worker: Some(worker),
        })
    }

    pub fn control_handle(&self) -> ControlHandle {
        ControlHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    // Rare, control-driven. Takes effect at the next callback; the comb
    // line keeps its init-rate capacity and clamps accordingly.
    pub fn set_sample_rate(&mut self, sample_rate: Sample) {
        if sample_rate.is_finite() && sample_rate > 0.0 && sample_rate != self.sample_rate {
            info!("sample rate change: {} -> {sample_rate} Hz", self.sample_rate);
            self.sample_rate = sample_rate;
        }
    }

    pub fn sample_rate(&self) -> Sample {
        self.sample_rate
    }

    // Running post-limiter peak of everything rendered so far, dBFS.
    pub fn peak_db(&self) -> Sample {
        self.peak_db
    }

    // Snapshot the control surface, hand one buffer of work to the render
    // thread, and block until it is done. Added latency is bounded by the
    // buffer length; a dead worker degrades to silence.
    pub fn process(&mut self, output: &mut [Sample], channels: usize) {
        let channels = channels.clamp(1, NUM_CHANNELS);
        let frames = output.len() / channels;
        let wanted = frames * channels;

        let mut buffer = std::mem::take(&mut self.scratch);

        if buffer.len() != wanted {
            debug!("scratch buffer resize: {} -> {wanted}", buffer.len());
            buffer.resize(wanted, 0.0);
        }

        let job = RenderJob {
            config: *self.shared.config.lock(),
            sample_rate: self.sample_rate,
            channels,
            rebuild_tables: self.shared.wavetables_dirty.swap(false, Ordering::AcqRel),
            buffer,
        };

        if self.requests.send(WorkerRequest::Render(job)).is_err() {
            output.fill(0.0);
            return;
        }

        match self.replies.recv() {
            Ok(reply) => {
                self.peak_db = reply.peak_db;
                output[..wanted].copy_from_slice(&reply.buffer);
                output[wanted..].fill(0.0);
                self.scratch = reply.buffer;
            }
            Err(_) => output.fill(0.0),
        }
    }
}

impl Drop for SynthEngine {
    fn drop(&mut self) {
        let _ = self.requests.send(WorkerRequest::Shutdown);

        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        debug!("synth engine torn down");
    }
}

fn worker_loop(
    requests: Receiver<WorkerRequest>,
    replies: Sender<RenderReply>,
    mut state: RenderState,
) {
    while let Ok(request) = requests.recv() {
        match request {
            WorkerRequest::Render(mut job) => {
                assert_no_alloc(|| {
                    job::render(
                        &job.config,
                        job.sample_rate,
                        job.channels,
                        job.rebuild_tables,
                        &mut state,
                        &mut job.buffer,
                    );
                });

                let reply = RenderReply {
                    buffer: job.buffer,
                    peak_db: state.peak_db(),
                };

                if replies.send(reply).is_err() {
                    break;
                }
            }
            WorkerRequest::Shutdown => break,
        }
    }
}
