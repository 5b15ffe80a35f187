use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::camera::domain::camera_source::{CameraError, CameraSource, CameraStream};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Camera backed by a directory of still images, replayed in name order
/// and looping forever.
///
/// Lets kiosks without a capture driver (and tests) feed the flows. An
/// unreadable directory is treated as a refused permission; an empty one
/// behaves like a camera that never warms up.
pub struct ImageSequenceCamera {
    dir: PathBuf,
}

impl ImageSequenceCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CameraSource for ImageSequenceCamera {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, CameraError> {
        let paths = list_images(&self.dir)?;
        log::info!(
            "Opened image sequence camera at {} ({} frames)",
            self.dir.display(),
            paths.len()
        );
        Ok(Box::new(ImageSequenceStream {
            paths,
            next: 0,
            stopped: false,
        }))
    }
}

struct ImageSequenceStream {
    paths: Vec<PathBuf>,
    next: usize,
    stopped: bool,
}

impl CameraStream for ImageSequenceStream {
    fn current_frame(&mut self) -> Result<Frame, CameraError> {
        if self.stopped {
            return Err(CameraError::Read("stream stopped".into()));
        }
        if self.paths.is_empty() {
            return Ok(Frame::empty());
        }

        let path = &self.paths[self.next];
        self.next = (self.next + 1) % self.paths.len();

        let img = image::open(path)
            .map_err(|e| CameraError::Read(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let (w, h) = img.dimensions();
        Ok(Frame::new(img.into_raw(), w, h, 3))
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, CameraError> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => CameraError::AccessDenied,
        _ => CameraError::Unavailable(format!("{}: {e}", dir.display())),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32, shade: u8) {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([shade, shade, shade]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_frames_replay_in_name_order_and_loop() {
        let tmp = TempDir::new().unwrap();
        write_image(tmp.path(), "b.png", 4, 2, 200);
        write_image(tmp.path(), "a.png", 8, 6, 10);

        let mut stream = ImageSequenceCamera::new(tmp.path()).open().unwrap();

        let first = stream.current_frame().unwrap();
        let second = stream.current_frame().unwrap();
        let third = stream.current_frame().unwrap();

        assert_eq!((first.width(), first.height()), (8, 6));
        assert_eq!(first.data()[0], 10);
        assert_eq!((second.width(), second.height()), (4, 2));
        assert_eq!(third, first);
    }

    #[test]
    fn test_non_image_files_are_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
        write_image(tmp.path(), "only.png", 3, 3, 0);

        let mut stream = ImageSequenceCamera::new(tmp.path()).open().unwrap();

        assert_eq!(stream.current_frame().unwrap().width(), 3);
        assert_eq!(stream.current_frame().unwrap().width(), 3);
    }

    #[test]
    fn test_empty_directory_never_warms_up() {
        let tmp = TempDir::new().unwrap();
        let mut stream = ImageSequenceCamera::new(tmp.path()).open().unwrap();
        assert!(!stream.current_frame().unwrap().has_dimensions());
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let result = ImageSequenceCamera::new(tmp.path().join("missing")).open();
        assert!(matches!(result, Err(CameraError::Unavailable(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_access_denied() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let locked = tmp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users read through mode bits; nothing to check then.
        let readable = fs::read_dir(&locked).is_ok();
        let result = ImageSequenceCamera::new(&locked).open();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(CameraError::AccessDenied)));
        }
    }

    #[test]
    fn test_stopped_stream_refuses_reads() {
        let tmp = TempDir::new().unwrap();
        write_image(tmp.path(), "a.png", 2, 2, 0);
        let mut stream = ImageSequenceCamera::new(tmp.path()).open().unwrap();

        stream.stop();

        assert!(stream.current_frame().is_err());
    }
}
