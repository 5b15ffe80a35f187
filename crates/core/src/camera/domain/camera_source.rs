use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera access denied")]
    AccessDenied,
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read frame: {0}")]
    Read(String),
}

/// Something that can be asked for a live stream, e.g. a webcam.
///
/// Opening is the permission point: a refusal must surface as
/// [`CameraError::AccessDenied`] so callers can tell it apart from a
/// missing device.
pub trait CameraSource: Send {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// An open stream, exclusively owned by one sampler.
pub trait CameraStream: Send {
    /// Returns the most recent frame.
    ///
    /// A frame without dimensions means the stream has not warmed up yet.
    fn current_frame(&mut self) -> Result<Frame, CameraError>;

    /// Releases the device. Called exactly once by the owner.
    fn stop(&mut self);
}
