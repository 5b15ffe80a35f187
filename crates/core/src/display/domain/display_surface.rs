use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const LIME: Color = Color { r: 0, g: 255, b: 0 };
    pub const YELLOW: Color = Color { r: 255, g: 255, b: 0 };

    pub fn rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Where a flow draws its frames and reports to the operator.
///
/// Drawing calls build up the current picture; `present` publishes it.
/// `notify` is for notices the operator must acknowledge (denied camera,
/// missing enrollment fields), `show_status` for the running status line.
pub trait DisplaySurface: Send {
    fn draw_frame(&mut self, frame: &Frame);

    fn stroke_rect(&mut self, rect: FaceBox, color: Color, line_width: u32);

    /// Draws `text` with its baseline at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: i32, y: i32, color: Color);

    fn present(&mut self) {}

    fn show_status(&mut self, message: &str);

    fn notify(&mut self, message: &str);

    fn set_training_enabled(&mut self, enabled: bool);
}
