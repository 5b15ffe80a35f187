use std::path::PathBuf;

use attendance_core::display::domain::display_surface::{Color, DisplaySurface};
use attendance_core::display::infrastructure::raster_canvas::RasterCanvas;
use attendance_core::shared::face_box::FaceBox;
use attendance_core::shared::frame::Frame;

/// Terminal stand-in for the kiosk page.
///
/// Status lines and notices go to stderr; the annotated frame is written
/// to `overlay_out` (if set) on every present.
pub struct ConsoleSurface {
    canvas: RasterCanvas,
    overlay_out: Option<PathBuf>,
    last_labels: Vec<String>,
}

impl ConsoleSurface {
    pub fn new(overlay_out: Option<PathBuf>) -> Self {
        Self {
            canvas: RasterCanvas::new(),
            overlay_out,
            last_labels: Vec::new(),
        }
    }

    fn report_labels(&mut self) {
        let labels: Vec<String> = self
            .canvas
            .labels()
            .iter()
            .map(|l| l.text.clone())
            .collect();
        if labels != self.last_labels {
            if labels.is_empty() {
                eprintln!("No faces in view");
            } else {
                eprintln!("In view: {}", labels.join(", "));
            }
            self.last_labels = labels;
        }
    }
}

impl DisplaySurface for ConsoleSurface {
    fn draw_frame(&mut self, frame: &Frame) {
        self.canvas.draw_frame(frame);
    }

    fn stroke_rect(&mut self, rect: FaceBox, color: Color, line_width: u32) {
        self.canvas.stroke_rect(rect, color, line_width);
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32, color: Color) {
        self.canvas.fill_text(text, x, y, color);
    }

    fn present(&mut self) {
        self.report_labels();
        let Some(path) = &self.overlay_out else {
            return;
        };
        if self.canvas.frame().is_none() {
            return;
        }
        if let Err(e) = self.canvas.save(path) {
            log::warn!("Failed to write overlay to {}: {e}", path.display());
        }
    }

    fn show_status(&mut self, message: &str) {
        log::debug!("status: {message}");
        eprintln!("{message}");
    }

    fn notify(&mut self, message: &str) {
        log::warn!("{message}");
        eprintln!("! {message}");
    }

    fn set_training_enabled(&mut self, enabled: bool) {
        if enabled {
            log::info!("Training is now available");
        }
    }
}
