use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, Sender};

use crate::camera::domain::camera_source::{CameraError, CameraSource, CameraStream};
use crate::sampling::snapshot_encoder::SnapshotEncoder;
use crate::shared::frame::Frame;

/// One snapshot handed to the sampler callback.
#[derive(Clone, Debug)]
pub struct SampledFrame {
    /// Monotonic per sampler start; skipped ticks do not consume a number.
    pub sequence: u64,
    pub frame: Frame,
    /// JPEG data URL of `frame`.
    pub image: String,
}

pub type OnFrame = Box<dyn FnMut(SampledFrame) + Send>;

struct Running {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns a camera and, while started, snapshots the current frame on a
/// fixed cadence.
///
/// The callback runs on the sampler thread and must not block for long:
/// nothing is queued, so a slow callback simply delays the next tick.
pub struct FrameSampler {
    camera: Box<dyn CameraSource>,
    encoder: SnapshotEncoder,
    running: Option<Running>,
}

impl FrameSampler {
    pub fn new(camera: Box<dyn CameraSource>, encoder: SnapshotEncoder) -> Self {
        Self {
            camera,
            encoder,
            running: None,
        }
    }

    /// Opens the camera and starts invoking `on_frame` every `interval`.
    ///
    /// A running sampler is stopped first, so a flow never holds two
    /// streams.
    pub fn start(&mut self, interval: Duration, on_frame: OnFrame) -> Result<(), CameraError> {
        self.stop();

        let stream = self.camera.open()?;
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let encoder = self.encoder;

        let handle = thread::spawn(move || {
            run_sampling_loop(stream, encoder, interval, stop_rx, on_frame);
        });

        self.running = Some(Running { stop_tx, handle });
        Ok(())
    }

    /// Halts the cadence and releases the stream. No-op when stopped.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.stop_tx.send(());
        if running.handle.join().is_err() {
            log::error!("Sampler thread panicked");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl Drop for FrameSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_sampling_loop(
    mut stream: Box<dyn CameraStream>,
    encoder: SnapshotEncoder,
    interval: Duration,
    stop_rx: crossbeam_channel::Receiver<()>,
    mut on_frame: OnFrame,
) {
    let ticker = crossbeam_channel::tick(interval);
    let mut sequence: u64 = 0;

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                if let Some(sampled) = sample(&mut *stream, &encoder, sequence) {
                    sequence += 1;
                    on_frame(sampled);
                }
            }
        }
    }

    stream.stop();
    log::debug!("Camera stream released after {sequence} samples");
}

fn sample(stream: &mut dyn CameraStream, encoder: &SnapshotEncoder, sequence: u64) -> Option<SampledFrame> {
    let frame = match stream.current_frame() {
        Ok(frame) => frame,
        Err(e) => {
            log::warn!("Skipping tick: {e}");
            return None;
        }
    };
    if !frame.has_dimensions() {
        return None;
    }
    match encoder.encode_data_url(&frame) {
        Ok(image) => Some(SampledFrame {
            sequence,
            frame,
            image,
        }),
        Err(e) => {
            log::warn!("Skipping tick: {e}");
            None
        }
    }
}
