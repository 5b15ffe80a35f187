use crate::display::domain::display_surface::{Color, DisplaySurface};
use crate::server::domain::attendance_service::RecognitionResponse;
use crate::shared::constants::{LABEL_OFFSET, OVERLAY_LINE_WIDTH, UNKNOWN_LABEL};
use crate::shared::frame::Frame;

pub const UNKNOWN_COLOR: Color = Color::RED;
pub const KNOWN_COLOR: Color = Color::LIME;
pub const LABEL_COLOR: Color = Color::YELLOW;

/// Box color for a recognition label.
pub fn label_color(label: &str) -> Color {
    if label == UNKNOWN_LABEL {
        UNKNOWN_COLOR
    } else {
        KNOWN_COLOR
    }
}

/// Redraws `frame` and overlays every face in `response`, replacing
/// whatever the surface showed before. Returns the number of boxes drawn.
pub fn render_recognition(
    surface: &mut dyn DisplaySurface,
    frame: &Frame,
    response: &RecognitionResponse,
) -> usize {
    surface.draw_frame(frame);

    let Some(faces) = response.faces.as_deref() else {
        return 0;
    };
    for face in faces {
        surface.stroke_rect(face.bounds(), label_color(&face.name), OVERLAY_LINE_WIDTH);
        surface.fill_text(&face.name, face.x, face.y.saturating_sub(LABEL_OFFSET), LABEL_COLOR);
    }
    faces.len()
}
