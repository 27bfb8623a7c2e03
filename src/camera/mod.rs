//! Single-shot still capture.
//!
//! Every call to [`take_picture`] opens the camera, grabs one frame and releases
//! the device again before anything is written, so a failed shot never leaves
//! the device held or a file behind.

mod v4l_capture;

pub use v4l_capture::{V4lCamera, V4lDevice, yuyv_to_rgb};

use std::fs::{self, OpenOptions};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use log::{debug, info, warn};

use crate::config::Resolution;
use crate::error::CaptureError;

/// A source of capture devices. Opening hands out an exclusive handle which is
/// released when dropped.
pub trait Camera {
    type Device: CaptureDevice;

    fn open(&mut self) -> Result<Self::Device, CaptureError>;
}

pub trait CaptureDevice {
    /// Requests a frame size. Returns the size the device actually applied,
    /// which may differ from the request.
    fn set_resolution(&mut self, requested: Resolution) -> Result<Resolution, CaptureError>;

    /// Grabs exactly one frame.
    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError>;
}

/// A photo that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Opens the camera, grabs one frame at (about) `resolution` and writes it to
/// `path`. The extension of `path` selects the image format.
pub fn take_picture<C: Camera>(
    camera: &mut C,
    path: &Path,
    resolution: Resolution,
) -> Result<Saved, CaptureError> {
    let frame = {
        let mut device = camera.open()?;
        let applied = device.set_resolution(resolution)?;
        if applied != resolution {
            warn!(
                "Requested {}x{}, camera uses {}x{}",
                resolution.width, resolution.height, applied.width, applied.height
            );
        }
        device.grab_frame()?
    };

    let (width, height) = frame.dimensions();
    save(&frame, path)?;
    info!("Saved {} ({}x{})", path.display(), width, height);
    Ok(Saved {
        path: path.to_path_buf(),
        width,
        height,
    })
}

/// Encodes in memory first so that only a complete image ever reaches the file.
/// Refuses to overwrite an existing file.
fn save(frame: &RgbImage, path: &Path) -> Result<(), CaptureError> {
    let format = ImageFormat::from_path(path)?;
    let mut encoded = Cursor::new(Vec::new());
    frame.write_to(&mut encoded, format)?;
    let bytes = encoded.into_inner();
    debug!("encoded {:?}: {} bytes", format, bytes.len());

    let save_err = |source| CaptureError::Save {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(save_err)?;

    if let Err(source) = file.write_all(&bytes).and_then(|_| file.sync_all()) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(save_err(source));
    }
    Ok(())
}
