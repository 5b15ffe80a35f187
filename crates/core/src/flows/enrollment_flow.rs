use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::display::domain::display_surface::{Color, DisplaySurface};
use crate::flows::enrollment_session::{
    CaptureProgress, Enrollee, EnrollmentSession, EnrollmentState,
};
use crate::flows::flow_error::FlowError;
use crate::flows::flow_logger::FlowLogger;
use crate::flows::flow_runtime::{Dispatch, FlowEvent, FlowRuntime};
use crate::flows::notices;
use crate::flows::recognition_monitor::camera_notice;
use crate::flows::training_trigger::TrainingTrigger;
use crate::sampling::frame_sampler::{FrameSampler, SampledFrame};
use crate::server::domain::attendance_service::{
    AttendanceService, CaptureRequest, CaptureResponse, TransportError,
};
use crate::shared::constants::{CAPTURE_ENDPOINT, OVERLAY_LINE_WIDTH};
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const GUIDE_COLOR: Color = Color::LIME;

/// Guided face capture for one new person.
///
/// Streams frames to the capture endpoint until the server says it has
/// enough samples, then releases the camera and arms training.
pub struct EnrollmentFlow {
    runtime: FlowRuntime<CaptureResponse>,
    service: Arc<dyn AttendanceService>,
    surface: Box<dyn DisplaySurface>,
    logger: Box<dyn FlowLogger>,
    session: EnrollmentSession,
    training: TrainingTrigger,
    interval: Duration,
}

impl EnrollmentFlow {
    pub fn new(
        sampler: FrameSampler,
        service: Arc<dyn AttendanceService>,
        surface: Box<dyn DisplaySurface>,
        logger: Box<dyn FlowLogger>,
        interval: Duration,
        capture_target: u32,
    ) -> Self {
        Self {
            runtime: FlowRuntime::new(sampler),
            training: TrainingTrigger::disabled(service.clone()),
            service,
            surface,
            logger,
            session: EnrollmentSession::new(capture_target),
            interval,
        }
    }

    /// `Idle → Capturing`. Missing fields or a refused camera are shown
    /// to the operator and leave the session idle.
    pub fn start(&mut self, id: &str, name: &str) -> Result<(), FlowError> {
        if self.session.state() != EnrollmentState::Idle {
            return Err(FlowError::SessionAlreadyStarted);
        }
        let enrollee = match Enrollee::parse(id, name) {
            Ok(enrollee) => enrollee,
            Err(e) => {
                self.surface.notify(&e.to_string());
                return Err(e);
            }
        };

        let dispatch = capture_dispatch(self.service.clone(), &enrollee);
        if let Err(e) = self.runtime.start(self.interval, dispatch) {
            let err = FlowError::from(e);
            self.surface.notify(&camera_notice(&err));
            return Err(err);
        }

        self.logger.info(&format!(
            "Enrolling {} ({}) every {}ms",
            enrollee.name(),
            enrollee.id(),
            self.interval.as_millis()
        ));
        self.session.begin(enrollee)?;
        self.surface.show_status(notices::CAPTURE_STARTED);
        Ok(())
    }

    /// Processes events until the session completes or `cancelled` is set.
    ///
    /// Returns the state the session ended in; a cancelled run stops the
    /// camera but stays `Capturing`.
    pub fn run(&mut self, cancelled: &AtomicBool) -> EnrollmentState {
        while self.session.state() == EnrollmentState::Capturing
            && !cancelled.load(Ordering::Relaxed)
        {
            if let Some(event) = self.runtime.next_event(POLL_INTERVAL) {
                self.handle_event(event);
            }
        }
        self.runtime.stop();
        self.logger.summary();
        self.session.state()
    }

    pub(crate) fn handle_event(&mut self, event: FlowEvent<CaptureResponse>) {
        match event {
            FlowEvent::Sampled(sampled) => {
                self.surface.draw_frame(&sampled.frame);
                self.surface.present();
            }
            FlowEvent::Responded {
                sequence,
                frame,
                result,
                elapsed,
            } => match result {
                Ok(response) => {
                    self.logger
                        .request_completed(CAPTURE_ENDPOINT, elapsed.as_secs_f64() * 1000.0);
                    if !self.runtime.admit(sequence) {
                        self.logger.stale_response(sequence);
                        return;
                    }
                    self.apply(&frame, response);
                }
                Err(e) => {
                    log::warn!("Capture request for frame {sequence} failed: {e}");
                    self.logger.request_failed(CAPTURE_ENDPOINT, &e);
                }
            },
        }
    }

    fn apply(&mut self, frame: &Frame, response: CaptureResponse) {
        let completed = match self.session.record(response) {
            CaptureProgress::Ignored => return,
            CaptureProgress::Capturing { .. } => false,
            CaptureProgress::Completed { .. } => true,
        };

        self.surface.show_status(&self.session.progress_message());
        self.surface.stroke_rect(
            FaceBox::guide_for(frame.width(), frame.height()),
            GUIDE_COLOR,
            OVERLAY_LINE_WIDTH,
        );

        if completed {
            self.complete();
        }
        self.surface.present();
    }

    fn complete(&mut self) {
        self.runtime.stop();
        self.training.enable();
        self.surface.show_status(notices::CAPTURE_COMPLETE);
        self.surface.set_training_enabled(true);
        self.logger.info(&format!(
            "Enrollment complete with {} samples",
            self.session.captured()
        ));
    }

    /// Asks the server to retrain. Only available once capture completed.
    pub fn train(&mut self) -> Result<(), FlowError> {
        self.training.train(self.surface.as_mut())
    }

    /// Abandons capture and releases the camera. Idempotent.
    pub fn stop(&mut self) {
        self.runtime.stop();
    }

    pub fn state(&self) -> EnrollmentState {
        self.session.state()
    }

    pub fn captured(&self) -> u32 {
        self.session.captured()
    }

    pub fn enrollee(&self) -> Option<&Enrollee> {
        self.session.enrollee()
    }

    pub fn is_sampling(&self) -> bool {
        self.runtime.is_active()
    }
}

fn capture_dispatch(
    service: Arc<dyn AttendanceService>,
    enrollee: &Enrollee,
) -> Dispatch<CaptureResponse> {
    let id = enrollee.id().to_string();
    let name = enrollee.name().to_string();
    Arc::new(
        move |sampled: &SampledFrame| -> Result<CaptureResponse, TransportError> {
            service.capture_face(&CaptureRequest {
                id: id.clone(),
                name: name.clone(),
                image: sampled.image.clone(),
            })
        },
    )
}
