use serde::{Deserialize, Serialize};

use crate::shared::constants::{GUIDE_EXTENT, GUIDE_INSET};

/// Axis-aligned box in frame pixel coordinates.
///
/// May extend past the frame edges; drawing code clips. Coordinates come
/// straight from the server, so edge arithmetic saturates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Centered enrollment guide for a frame of the given size.
    pub fn guide_for(width: u32, height: u32) -> Self {
        let (fw, fh) = (width as f64, height as f64);
        Self {
            x: (fw * GUIDE_INSET).round() as i32,
            y: (fh * GUIDE_INSET).round() as i32,
            w: (fw * GUIDE_EXTENT).round() as i32,
            h: (fh * GUIDE_EXTENT).round() as i32,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }
}
