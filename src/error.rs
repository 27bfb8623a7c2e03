use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Raised while bringing up the GPIO peripheral. Fatal at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to access GPIO: {0}")]
    Gpio(#[source] rppal::gpio::Error),
    #[error("Failed to get GPIO pin {pin}: {source}")]
    Pin {
        pin: u8,
        #[source]
        source: rppal::gpio::Error,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single capture-and-save did not produce a file.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No camera could be opened: {0}")]
    Open(String),
    #[error("Camera rejected resolution {width}x{height}: {reason}")]
    Resolution {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("No frame available: {0}")]
    Grab(String),
    #[error("Frame could not be decoded: {0}")]
    Decode(String),
    #[error("Frame could not be encoded: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Cannot write {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
#[error("Beeper pin write failed: {0:?}")]
pub struct ToneError(pub embedded_hal::digital::ErrorKind);

/// A pin the control loop drives or reads reported an error.
#[derive(Debug, Error)]
pub enum ShutterError {
    #[error("LED pin write failed: {0:?}")]
    Led(embedded_hal::digital::ErrorKind),
    #[error("Switch pin read failed: {0:?}")]
    Switch(embedded_hal::digital::ErrorKind),
    #[error(transparent)]
    Tone(#[from] ToneError),
}
