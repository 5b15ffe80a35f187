use thiserror::Error;

use crate::camera::domain::camera_source::CameraError;
use crate::server::domain::attendance_service::TransportError;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("camera access denied")]
    CameraAccessDenied,
    #[error(transparent)]
    Camera(CameraError),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server reported training failure")]
    TrainingFailure,
    #[error("training is not available until enrollment completes")]
    TrainingDisabled,
    #[error("enrollment session already started")]
    SessionAlreadyStarted,
}

impl From<CameraError> for FlowError {
    fn from(e: CameraError) -> Self {
        match e {
            CameraError::AccessDenied => FlowError::CameraAccessDenied,
            other => FlowError::Camera(other),
        }
    }
}
