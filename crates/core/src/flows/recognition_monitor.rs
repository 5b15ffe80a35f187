use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::display::domain::display_surface::DisplaySurface;
use crate::flows::flow_error::FlowError;
use crate::flows::flow_logger::FlowLogger;
use crate::flows::flow_runtime::{Dispatch, FlowEvent, FlowRuntime};
use crate::flows::notices;
use crate::flows::recognition_overlay::render_recognition;
use crate::sampling::frame_sampler::{FrameSampler, SampledFrame};
use crate::server::domain::attendance_service::{
    AttendanceService, RecognitionRequest, RecognitionResponse, TransportError,
};
use crate::shared::constants::RECOGNITION_ENDPOINT;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Live attendance view: samples the camera, asks the server who is in
/// each frame and overlays the answer.
pub struct RecognitionMonitor {
    runtime: FlowRuntime<RecognitionResponse>,
    service: Arc<dyn AttendanceService>,
    surface: Box<dyn DisplaySurface>,
    logger: Box<dyn FlowLogger>,
    interval: Duration,
    faces_in_view: usize,
}

impl RecognitionMonitor {
    pub fn new(
        sampler: FrameSampler,
        service: Arc<dyn AttendanceService>,
        surface: Box<dyn DisplaySurface>,
        logger: Box<dyn FlowLogger>,
        interval: Duration,
    ) -> Self {
        Self {
            runtime: FlowRuntime::new(sampler),
            service,
            surface,
            logger,
            interval,
            faces_in_view: 0,
        }
    }

    /// Opens the camera and begins sampling. A refused camera is reported
    /// to the operator and nothing is sent to the server.
    pub fn start(&mut self) -> Result<(), FlowError> {
        let service = self.service.clone();
        let dispatch: Dispatch<RecognitionResponse> = Arc::new(
            move |sampled: &SampledFrame| -> Result<RecognitionResponse, TransportError> {
                service.recognize(&RecognitionRequest {
                    image: sampled.image.clone(),
                })
            },
        );

        if let Err(e) = self.runtime.start(self.interval, dispatch) {
            let err = FlowError::from(e);
            self.surface.notify(&camera_notice(&err));
            return Err(err);
        }
        self.surface.show_status(notices::MONITOR_STARTED);
        self.logger.info(&format!(
            "Recognition monitor sampling every {}ms",
            self.interval.as_millis()
        ));
        Ok(())
    }

    /// Processes events until `cancelled` is set, then stops.
    pub fn run(&mut self, cancelled: &AtomicBool) {
        while self.runtime.is_active() && !cancelled.load(Ordering::Relaxed) {
            if let Some(event) = self.runtime.next_event(POLL_INTERVAL) {
                self.handle_event(event);
            }
        }
        self.stop();
        self.logger.summary();
    }

    pub(crate) fn handle_event(&mut self, event: FlowEvent<RecognitionResponse>) {
        let FlowEvent::Responded {
            sequence,
            frame,
            result,
            elapsed,
        } = event
        else {
            return;
        };

        match result {
            Ok(response) => {
                self.logger
                    .request_completed(RECOGNITION_ENDPOINT, elapsed.as_secs_f64() * 1000.0);
                if !self.runtime.admit(sequence) {
                    self.logger.stale_response(sequence);
                    return;
                }
                let drawn = render_recognition(self.surface.as_mut(), &frame, &response);
                self.surface.present();
                if drawn != self.faces_in_view {
                    log::debug!("Frame {sequence}: {drawn} face(s) in view");
                    self.faces_in_view = drawn;
                }
            }
            Err(e) => {
                log::warn!("Recognition request for frame {sequence} failed: {e}");
                self.logger.request_failed(RECOGNITION_ENDPOINT, &e);
            }
        }
    }

    /// Stops sampling and releases the camera. Idempotent.
    pub fn stop(&mut self) {
        self.runtime.stop();
    }

    pub fn is_running(&self) -> bool {
        self.runtime.is_active()
    }
}

pub(crate) fn camera_notice(err: &FlowError) -> String {
    match err {
        FlowError::CameraAccessDenied => notices::CAMERA_DENIED.to_string(),
        other => notices::camera_unavailable(&other.to_string()),
    }
}
