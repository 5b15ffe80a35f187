pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

pub const RECOGNITION_ENDPOINT: &str = "/process_attendance";
pub const CAPTURE_ENDPOINT: &str = "/capture_face";
pub const TRAINING_ENDPOINT: &str = "/train_model";

pub const RECOGNITION_INTERVAL_MS: u64 = 1200;
pub const CAPTURE_INTERVAL_MS: u64 = 400;

/// Samples the server collects per person before reporting `done`.
pub const CAPTURE_TARGET: u32 = 30;

pub const DEFAULT_JPEG_QUALITY: u8 = 80;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Label the server uses for a detected face it could not match.
pub const UNKNOWN_LABEL: &str = "Unknown";

pub const OVERLAY_LINE_WIDTH: u32 = 3;
pub const OVERLAY_FONT_SIZE: u32 = 18;
/// Gap between a face box's top edge and its label baseline.
pub const LABEL_OFFSET: i32 = 8;

/// Enrollment guide box: inset and extent as fractions of the frame.
pub const GUIDE_INSET: f64 = 0.2;
pub const GUIDE_EXTENT: f64 = 0.6;

/// Consecutive transport failures before the flow logger warns once.
pub const UNREACHABLE_THRESHOLD: usize = 10;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
