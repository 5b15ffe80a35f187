//! Operator-facing texts shown by the flows.

pub const CAMERA_DENIED: &str = "Camera access denied";
pub const MONITOR_STARTED: &str = "Camera started";

pub const MISSING_ENROLLEE_FIELDS: &str = "Enter Student ID and Name";
pub const CAPTURE_STARTED: &str = "Camera started. Capturing faces...";
pub const CAPTURE_COMPLETE: &str = "Capture complete. You can now train the model.";

pub const TRAINING_STARTED: &str = "Training model, please wait...";
pub const TRAINING_SUCCEEDED: &str = "Model trained successfully. You can now mark attendance.";
/// Shown for both a server-reported failure and a failed request.
pub const TRAINING_FAILED: &str = "Training failed. Check server logs.";

pub fn capture_progress(count: u32, target: u32) -> String {
    format!("Captured {count} / {target} faces")
}

pub fn camera_unavailable(reason: &str) -> String {
    format!("Camera unavailable: {reason}")
}
