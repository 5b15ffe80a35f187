//! Fakes shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::camera::domain::camera_source::{CameraError, CameraSource, CameraStream};
use crate::display::domain::display_surface::{Color, DisplaySurface};
use crate::server::domain::attendance_service::{
    AttendanceService, CaptureRequest, CaptureResponse, RecognitionRequest, RecognitionResponse,
    RecognizedFace, TrainingResponse, TransportError,
};
use crate::shared::constants::{CAPTURE_TARGET, TRAINING_ENDPOINT};
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Camera that always shows the same frame. Clones share counters.
#[derive(Clone)]
pub struct FakeCamera {
    frame: Frame,
    denied: bool,
    opens: Arc<AtomicUsize>,
    polls: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn with_frame(frame: Frame) -> Self {
        Self {
            frame,
            denied: false,
            opens: Arc::new(AtomicUsize::new(0)),
            polls: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::with_frame(Frame::empty())
        }
    }

    pub fn opens(&self) -> Arc<AtomicUsize> {
        self.opens.clone()
    }

    pub fn polls(&self) -> Arc<AtomicUsize> {
        self.polls.clone()
    }

    pub fn releases(&self) -> Arc<AtomicUsize> {
        self.releases.clone()
    }
}

impl CameraSource for FakeCamera {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, CameraError> {
        if self.denied {
            return Err(CameraError::AccessDenied);
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            frame: self.frame.clone(),
            polls: self.polls.clone(),
            releases: self.releases.clone(),
            stopped: false,
        }))
    }
}

struct FakeStream {
    frame: Frame,
    polls: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
    stopped: bool,
}

impl CameraStream for FakeStream {
    fn current_frame(&mut self) -> Result<Frame, CameraError> {
        if self.stopped {
            return Err(CameraError::Read("stream stopped".into()));
        }
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainingOutcome {
    Success,
    Failure,
    TransportError,
}

/// In-memory attendance server.
///
/// Capture answers count the calls received so far, capped at the
/// target, and report `done` once the target is reached.
pub struct FakeService {
    faces: Option<Vec<RecognizedFace>>,
    training: TrainingOutcome,
    capture_target: u32,
    recognize_calls: AtomicUsize,
    capture_calls: AtomicUsize,
    train_calls: AtomicUsize,
    last_recognition: Mutex<Option<RecognitionRequest>>,
    last_capture: Mutex<Option<CaptureRequest>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            faces: None,
            training: TrainingOutcome::Success,
            capture_target: CAPTURE_TARGET,
            recognize_calls: AtomicUsize::new(0),
            capture_calls: AtomicUsize::new(0),
            train_calls: AtomicUsize::new(0),
            last_recognition: Mutex::new(None),
            last_capture: Mutex::new(None),
        }
    }

    pub fn with_faces(mut self, faces: Option<Vec<RecognizedFace>>) -> Self {
        self.faces = faces;
        self
    }

    pub fn with_training(mut self, outcome: TrainingOutcome) -> Self {
        self.training = outcome;
        self
    }

    pub fn with_capture_target(mut self, target: u32) -> Self {
        self.capture_target = target;
        self
    }

    pub fn recognize_calls(&self) -> usize {
        self.recognize_calls.load(Ordering::SeqCst)
    }

    pub fn capture_calls(&self) -> usize {
        self.capture_calls.load(Ordering::SeqCst)
    }

    pub fn train_calls(&self) -> usize {
        self.train_calls.load(Ordering::SeqCst)
    }

    pub fn last_recognition_image(&self) -> Option<String> {
        self.last_recognition
            .lock()
            .unwrap()
            .as_ref()
            .map(|r| r.image.clone())
    }

    pub fn last_capture_request(&self) -> Option<CaptureRequest> {
        self.last_capture.lock().unwrap().clone()
    }
}

impl AttendanceService for FakeService {
    fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResponse, TransportError> {
        self.recognize_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_recognition.lock().unwrap() = Some(request.clone());
        Ok(RecognitionResponse {
            faces: self.faces.clone(),
        })
    }

    fn capture_face(&self, request: &CaptureRequest) -> Result<CaptureResponse, TransportError> {
        let calls = self.capture_calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_capture.lock().unwrap() = Some(request.clone());
        let count = (calls as u32).min(self.capture_target);
        Ok(CaptureResponse {
            count,
            done: count >= self.capture_target,
        })
    }

    fn train_model(&self) -> Result<TrainingResponse, TransportError> {
        self.train_calls.fetch_add(1, Ordering::SeqCst);
        match self.training {
            TrainingOutcome::Success => Ok(TrainingResponse { success: true }),
            TrainingOutcome::Failure => Ok(TrainingResponse { success: false }),
            TrainingOutcome::TransportError => Err(TransportError::Status {
                endpoint: TRAINING_ENDPOINT.into(),
                status: 500,
                body: "internal error".into(),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct Recording {
    pub frames_drawn: usize,
    pub last_frame: Option<Frame>,
    /// Cleared by every `draw_frame`.
    pub rects: Vec<(FaceBox, Color, u32)>,
    /// Cleared by every `draw_frame`.
    pub texts: Vec<(String, i32, i32, Color)>,
    pub statuses: Vec<String>,
    pub notices: Vec<String>,
    pub training_enabled: bool,
    pub presents: usize,
}

/// Surface that records every call. Clones share one recording.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recording(&self) -> Arc<Mutex<Recording>> {
        self.recording.clone()
    }
}

impl DisplaySurface for RecordingSurface {
    fn draw_frame(&mut self, frame: &Frame) {
        let mut rec = self.recording.lock().unwrap();
        rec.frames_drawn += 1;
        rec.last_frame = Some(frame.clone());
        rec.rects.clear();
        rec.texts.clear();
    }

    fn stroke_rect(&mut self, rect: FaceBox, color: Color, line_width: u32) {
        self.recording
            .lock()
            .unwrap()
            .rects
            .push((rect, color, line_width));
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32, color: Color) {
        self.recording
            .lock()
            .unwrap()
            .texts
            .push((text.to_string(), x, y, color));
    }

    fn present(&mut self) {
        self.recording.lock().unwrap().presents += 1;
    }

    fn show_status(&mut self, message: &str) {
        self.recording
            .lock()
            .unwrap()
            .statuses
            .push(message.to_string());
    }

    fn notify(&mut self, message: &str) {
        self.recording
            .lock()
            .unwrap()
            .notices
            .push(message.to_string());
    }

    fn set_training_enabled(&mut self, enabled: bool) {
        self.recording.lock().unwrap().training_enabled = enabled;
    }
}
