use std::path::PathBuf;
use std::time::Duration;

// BCM numbering
const LED_PIN: u8 = 10;
const SW_PIN: u8 = 9;
const BEEP_PIN: u8 = 11;

const PHOTO_DIR: &str = "photo";
const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;
const POLL_INTERVAL_MS: u64 = 10;

/// GPIO pins used by the shutter, in BCM numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    pub led: u8,
    pub switch: u8,
    pub beeper: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            led: LED_PIN,
            switch: SW_PIN,
            beeper: BEEP_PIN,
        }
    }
}

/// Requested capture size. The device may substitute the nearest mode it supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(FRAME_WIDTH, FRAME_HEIGHT)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub pins: PinConfig,
    pub photo_dir: PathBuf,
    pub resolution: Resolution,
    /// Sleep between two reads of the switch while idle.
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pins: PinConfig::default(),
            photo_dir: PathBuf::from(PHOTO_DIR),
            resolution: Resolution::default(),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
        }
    }
}
