use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::face_box::FaceBox;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    pub image: String,
}

/// One face found by the server, with its identity label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognizedFace {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl RecognizedFace {
    pub fn bounds(&self) -> FaceBox {
        FaceBox::new(self.x, self.y, self.w, self.h)
    }
}

/// `faces` is absent when the server has nothing to report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    #[serde(default)]
    pub faces: Option<Vec<RecognizedFace>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub id: String,
    pub name: String,
    pub image: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResponse {
    pub count: u32,
    pub done: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingResponse {
    #[serde(default)]
    pub success: bool,
}

/// The remote recognition/enrollment service.
///
/// Calls block; flows run them off the event loop. `Sync` because one
/// client is shared by every in-flight request of a flow.
pub trait AttendanceService: Send + Sync {
    fn recognize(&self, request: &RecognitionRequest)
        -> Result<RecognitionResponse, TransportError>;

    fn capture_face(&self, request: &CaptureRequest) -> Result<CaptureResponse, TransportError>;

    fn train_model(&self) -> Result<TrainingResponse, TransportError>;
}
