//! Push-button still camera for the Raspberry Pi.
//!
//! A switch on a GPIO pin triggers a single-frame capture that is saved as a
//! numbered JPEG, with an LED and a piezo beeper reporting progress.

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod gpio;
pub mod shutter;
pub mod storage;
pub mod tone;

#[cfg(test)]
mod mock;

pub use config::{Config, PinConfig, Resolution};
pub use error::{CaptureError, SetupError, ShutterError, StorageError, ToneError};
pub use shutter::{Outcome, Shutter, State};
