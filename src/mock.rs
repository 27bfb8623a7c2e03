//! Test doubles for pins, delays and cameras.

use std::cell::Cell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};
use image::{Rgb, RgbImage};

use crate::camera::{Camera, CaptureDevice};
use crate::config::Resolution;
use crate::error::CaptureError;

#[derive(Debug, Default)]
pub struct MockPin {
    pub is_high: bool,
    pub highs: u32,
    pub lows: u32,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.is_high = false;
        self.lows += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.is_high = true;
        self.highs += 1;
        Ok(())
    }
}

/// Replays a script of switch levels, then holds the last one.
#[derive(Debug)]
pub struct MockSwitch {
    levels: VecDeque<bool>,
    last: bool,
    pub reads: u32,
}

impl MockSwitch {
    pub fn new(levels: &[bool]) -> Self {
        Self {
            levels: levels.iter().copied().collect(),
            last: true,
            reads: 0,
        }
    }

    pub fn held(low: bool) -> Self {
        Self::new(&[!low])
    }
}

impl ErrorType for MockSwitch {
    type Error = Infallible;
}

impl InputPin for MockSwitch {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        self.reads += 1;
        if let Some(level) = self.levels.pop_front() {
            self.last = level;
        }
        Ok(self.last)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// A switch whose every read fails.
#[derive(Debug)]
pub struct BrokenSwitch;

impl ErrorType for BrokenSwitch {
    type Error = ErrorKind;
}

impl InputPin for BrokenSwitch {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        Err(ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        Err(ErrorKind::Other)
    }
}

/// Records requested delays without sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_us: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_us += u64::from(ns) / 1000;
    }

    fn delay_us(&mut self, us: u32) {
        self.total_us += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_us += u64::from(ms) * 1000;
    }
}

/// A camera producing a flat grey frame of `native` size, whatever is requested.
#[derive(Debug)]
pub struct MockCamera {
    native: Resolution,
    fail_open: bool,
    fail_grab: bool,
    opened: Rc<Cell<u32>>,
    released: Rc<Cell<u32>>,
}

impl MockCamera {
    pub fn new(native: Resolution) -> Self {
        Self {
            native,
            fail_open: false,
            fail_grab: false,
            opened: Rc::default(),
            released: Rc::default(),
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_grab(mut self) -> Self {
        self.fail_grab = true;
        self
    }

    pub fn opened(&self) -> u32 {
        self.opened.get()
    }

    pub fn released(&self) -> u32 {
        self.released.get()
    }
}

impl Camera for MockCamera {
    type Device = MockDevice;

    fn open(&mut self) -> Result<MockDevice, CaptureError> {
        if self.fail_open {
            return Err(CaptureError::Open("mock camera unplugged".to_string()));
        }
        self.opened.set(self.opened.get() + 1);
        Ok(MockDevice {
            native: self.native,
            fail_grab: self.fail_grab,
            released: Rc::clone(&self.released),
        })
    }
}

pub struct MockDevice {
    native: Resolution,
    fail_grab: bool,
    released: Rc<Cell<u32>>,
}

impl CaptureDevice for MockDevice {
    fn set_resolution(&mut self, _requested: Resolution) -> Result<Resolution, CaptureError> {
        Ok(self.native)
    }

    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError> {
        if self.fail_grab {
            return Err(CaptureError::Grab("mock camera has no frame".to_string()));
        }
        Ok(RgbImage::from_pixel(
            self.native.width,
            self.native.height,
            Rgb([90, 120, 200]),
        ))
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}
