use std::fs;
use std::path::Path;

use crate::display::domain::display_surface::{Color, DisplaySurface};
use crate::shared::constants::OVERLAY_FONT_SIZE;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// A label placed on the canvas, kept for callers that report labels in
/// text form alongside the picture.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasLabel {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

/// Software canvas holding the last drawn frame plus overlays.
///
/// Boxes are rasterized into the pixel buffer. There is no glyph
/// rasterizer, so labels render as solid tag strips sized from the text
/// length at the overlay font size; the text itself is kept in
/// [`RasterCanvas::labels`].
#[derive(Default)]
pub struct RasterCanvas {
    frame: Option<Frame>,
    labels: Vec<CanvasLabel>,
}

impl RasterCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the canvas contents; earlier overlays are discarded.
    pub fn draw_frame(&mut self, frame: &Frame) {
        self.frame = Some(frame.clone());
        self.labels.clear();
    }

    /// Strokes `rect` with the line centered on its edges, clipped to the
    /// frame.
    pub fn stroke_rect(&mut self, rect: FaceBox, color: Color, line_width: u32) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        let lw = line_width.max(1) as i32;
        let (before, after) = (lw / 2, lw - lw / 2);

        let outer = (
            rect.x.saturating_sub(before),
            rect.y.saturating_sub(before),
            rect.right().saturating_add(after),
            rect.bottom().saturating_add(after),
        );
        let inner = (
            rect.x.saturating_add(after),
            rect.y.saturating_add(after),
            rect.right().saturating_sub(before),
            rect.bottom().saturating_sub(before),
        );

        let (x0, y0, x1, y1) = clip(frame, outer);
        let mut pixels = frame.as_ndarray_mut();
        for py in y0..y1 {
            for px in x0..x1 {
                let inside_inner = px >= inner.0 && px < inner.2 && py >= inner.1 && py < inner.3;
                if !inside_inner {
                    put(&mut pixels, px, py, color);
                }
            }
        }
    }

    pub fn fill_rect(&mut self, rect: FaceBox, color: Color) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        let (x0, y0, x1, y1) = clip(frame, (rect.x, rect.y, rect.right(), rect.bottom()));
        let mut pixels = frame.as_ndarray_mut();
        for py in y0..y1 {
            for px in x0..x1 {
                put(&mut pixels, px, py, color);
            }
        }
    }

    /// Places a label with its baseline at `(x, y)`.
    pub fn fill_text(&mut self, text: &str, x: i32, y: i32, color: Color) {
        let size = OVERLAY_FONT_SIZE as i32;
        let advance = size * 3 / 5;
        let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
        let width = chars.saturating_mul(advance);
        self.fill_rect(FaceBox::new(x, y.saturating_sub(size), width, size), color);
        self.labels.push(CanvasLabel {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn labels(&self) -> &[CanvasLabel] {
        &self.labels
    }

    /// Writes the canvas to `path`, format chosen by extension.
    ///
    /// Goes through a temp file and a rename so viewers polling the
    /// file never see a half-written image.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let frame = self.frame.as_ref().ok_or("Nothing drawn yet")?;
        if frame.channels() != 3 {
            return Err(format!("Cannot save {}-channel frame", frame.channels()).into());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;
        let format = image::ImageFormat::from_path(path)?;

        let temp_path = path.with_extension("part");
        img.save_with_format(&temp_path, format)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

/// Headless surface: operator messages go to the log only.
impl DisplaySurface for RasterCanvas {
    fn draw_frame(&mut self, frame: &Frame) {
        RasterCanvas::draw_frame(self, frame);
    }

    fn stroke_rect(&mut self, rect: FaceBox, color: Color, line_width: u32) {
        RasterCanvas::stroke_rect(self, rect, color, line_width);
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32, color: Color) {
        RasterCanvas::fill_text(self, text, x, y, color);
    }

    fn show_status(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn notify(&mut self, message: &str) {
        log::warn!("{message}");
    }

    fn set_training_enabled(&mut self, enabled: bool) {
        log::debug!("Training enabled: {enabled}");
    }
}

fn clip(frame: &Frame, (x0, y0, x1, y1): (i32, i32, i32, i32)) -> (i32, i32, i32, i32) {
    let w = frame.width() as i32;
    let h = frame.height() as i32;
    (x0.clamp(0, w), y0.clamp(0, h), x1.clamp(0, w), y1.clamp(0, h))
}

fn put(pixels: &mut ndarray::ArrayViewMut3<'_, u8>, x: i32, y: i32, color: Color) {
    let channels = pixels.shape()[2];
    let rgb = color.rgb();
    for (c, value) in rgb.iter().enumerate().take(channels) {
        pixels[[y as usize, x as usize, c]] = *value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pixel(canvas: &RasterCanvas, x: usize, y: usize) -> [u8; 3] {
        let arr = canvas.frame().unwrap().as_ndarray();
        [arr[[y, x, 0]], arr[[y, x, 1]], arr[[y, x, 2]]]
    }

    fn canvas(width: u32, height: u32) -> RasterCanvas {
        let mut canvas = RasterCanvas::new();
        canvas.draw_frame(&Frame::blank(width, height));
        canvas
    }

    #[test]
    fn test_drawing_before_frame_is_noop() {
        let mut canvas = RasterCanvas::new();
        canvas.stroke_rect(FaceBox::new(0, 0, 5, 5), Color::RED, 3);
        canvas.fill_rect(FaceBox::new(0, 0, 5, 5), Color::RED);
        assert!(canvas.frame().is_none());
    }

    #[rstest]
    #[case(10, 10)] // top-left corner on the edge
    #[case(9, 20)] // left band, outside half
    #[case(11, 20)] // left band, inside half
    #[case(30, 29)] // bottom band
    #[case(31, 25)] // right band
    fn test_stroke_covers_edges(#[case] x: usize, #[case] y: usize) {
        let mut canvas = canvas(50, 50);
        canvas.stroke_rect(FaceBox::new(10, 10, 20, 20), Color::LIME, 3);
        assert_eq!(pixel(&canvas, x, y), [0, 255, 0]);
    }

    #[rstest]
    #[case(20, 20)] // interior
    #[case(12, 20)] // just inside the band
    #[case(8, 20)] // just outside the band
    fn test_stroke_leaves_interior_and_exterior(#[case] x: usize, #[case] y: usize) {
        let mut canvas = canvas(50, 50);
        canvas.stroke_rect(FaceBox::new(10, 10, 20, 20), Color::LIME, 3);
        assert_eq!(pixel(&canvas, x, y), [0, 0, 0]);
    }

    #[test]
    fn test_stroke_clips_at_frame_edges() {
        let mut canvas = canvas(20, 20);
        canvas.stroke_rect(FaceBox::new(-10, -10, 50, 50), Color::RED, 3);
        // Nothing visible touches the interior of the frame.
        assert_eq!(pixel(&canvas, 10, 10), [0, 0, 0]);
        assert_eq!(pixel(&canvas, 0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_fill_text_places_strip_above_baseline() {
        let mut canvas = canvas(100, 60);
        canvas.fill_text("Bob", 10, 40, Color::YELLOW);

        assert_eq!(pixel(&canvas, 10, 39), [255, 255, 0]);
        assert_eq!(pixel(&canvas, 10, 22), [255, 255, 0]);
        assert_eq!(pixel(&canvas, 10, 40), [0, 0, 0]);
        assert_eq!(pixel(&canvas, 10, 21), [0, 0, 0]);
        // 3 chars * 10px advance
        assert_eq!(pixel(&canvas, 39, 30), [255, 255, 0]);
        assert_eq!(pixel(&canvas, 40, 30), [0, 0, 0]);
        assert_eq!(canvas.labels().len(), 1);
        assert_eq!(canvas.labels()[0].text, "Bob");
    }

    #[rstest]
    #[case(FaceBox::new(0, i32::MIN, 10, 10))]
    #[case(FaceBox::new(i32::MAX - 7, 0, 100, 10))]
    #[case(FaceBox::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX))]
    #[case(FaceBox::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX))]
    fn test_extreme_coordinates_draw_nothing_and_do_not_panic(#[case] rect: FaceBox) {
        let mut canvas = canvas(20, 20);
        canvas.stroke_rect(rect, Color::RED, 3);
        canvas.fill_rect(rect, Color::RED);
        canvas.fill_text("Alice", rect.x, rect.y, Color::YELLOW);
        canvas.fill_text("Alice", rect.x, i32::MIN, Color::YELLOW);

        assert_eq!(pixel(&canvas, 10, 10), [0, 0, 0]);
        assert_eq!(canvas.labels().len(), 2);
    }

    #[test]
    fn test_draw_frame_resets_labels_and_pixels() {
        let mut canvas = canvas(40, 40);
        canvas.fill_text("Alice", 0, 20, Color::YELLOW);
        canvas.draw_frame(&Frame::blank(40, 40));
        assert!(canvas.labels().is_empty());
        assert_eq!(pixel(&canvas, 1, 10), [0, 0, 0]);
    }

    #[test]
    fn test_save_writes_image_without_leftover_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");
        let mut canvas = canvas(30, 20);
        canvas.fill_rect(FaceBox::new(0, 0, 30, 20), Color::RED);

        canvas.save(&path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (30, 20));
        assert_eq!(img.get_pixel(5, 5).0, [255, 0, 0]);
        assert!(!path.with_extension("part").exists());
    }

    #[test]
    fn test_save_before_draw_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RasterCanvas::new().save(&dir.path().join("x.png")).is_err());
    }
}
