use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::camera::domain::camera_source::CameraError;
use crate::flows::response_gate::ResponseGate;
use crate::sampling::frame_sampler::{FrameSampler, OnFrame, SampledFrame};
use crate::server::domain::attendance_service::TransportError;
use crate::shared::frame::Frame;

/// Sends one sampled frame to the server.
pub type Dispatch<R> = Arc<dyn Fn(&SampledFrame) -> Result<R, TransportError> + Send + Sync>;

pub enum FlowEvent<R> {
    Sampled(SampledFrame),
    Responded {
        sequence: u64,
        /// The frame that was submitted, so overlays line up with it.
        frame: Frame,
        result: Result<R, TransportError>,
        elapsed: Duration,
    },
}

/// Per-flow controller state: the sampler, the event channel feeding the
/// flow's owner thread, and the gate deciding which responses still count.
///
/// Each tick dispatches its request on a fresh thread, so the timer never
/// waits on the server; results come back as [`FlowEvent::Responded`] in
/// whatever order the server answers.
pub struct FlowRuntime<R> {
    sampler: FrameSampler,
    events_tx: Sender<(u64, FlowEvent<R>)>,
    events_rx: Receiver<(u64, FlowEvent<R>)>,
    gate: ResponseGate,
    /// Bumped on every start; events from earlier runs are discarded.
    generation: u64,
}

impl<R: Send + 'static> FlowRuntime<R> {
    pub fn new(sampler: FrameSampler) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            sampler,
            events_tx,
            events_rx,
            gate: ResponseGate::new(),
            generation: 0,
        }
    }

    pub fn start(&mut self, interval: Duration, dispatch: Dispatch<R>) -> Result<(), CameraError> {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let tx = self.events_tx.clone();
        let on_frame: OnFrame = Box::new(move |sampled: SampledFrame| {
            let _ = tx.send((generation, FlowEvent::Sampled(sampled.clone())));

            let tx = tx.clone();
            let dispatch = dispatch.clone();
            thread::spawn(move || {
                let started = Instant::now();
                let result = dispatch(&sampled);
                let _ = tx.send((
                    generation,
                    FlowEvent::Responded {
                        sequence: sampled.sequence,
                        frame: sampled.frame,
                        result,
                        elapsed: started.elapsed(),
                    },
                ));
            });
        });

        self.sampler.start(interval, on_frame)?;
        self.gate.open();
        Ok(())
    }

    /// Waits up to `timeout` for the next event of the current run.
    ///
    /// Returns `None` on timeout or once the flow has stopped.
    pub fn next_event(&mut self, timeout: Duration) -> Option<FlowEvent<R>> {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.gate.is_active() {
                return None;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events_rx.recv_timeout(remaining) {
                Ok((generation, event)) if generation == self.generation => return Some(event),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }

    /// See [`ResponseGate::admit`].
    pub fn admit(&mut self, sequence: u64) -> bool {
        self.gate.admit(sequence)
    }

    pub fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    /// Stops sampling and releases the camera. In-flight requests keep
    /// running; their responses are ignored. Idempotent.
    pub fn stop(&mut self) {
        self.gate.close();
        self.sampler.stop();
        for _ in self.events_rx.try_iter() {}
    }
}
