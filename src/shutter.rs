//! The button-driven capture loop.
//!
//! Idle means LED on and the switch being polled. A low switch level starts a
//! capture: LED off and the start chirp, then one photo, then LED on again with
//! either the done or the failed melody. There is no debounce, so a button still
//! held when the melody ends takes another photo on the next poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, InputPin, OutputPin};
use log::{error, info};

use crate::camera::{self, Camera, Saved};
use crate::config::Resolution;
use crate::error::{CaptureError, ShutterError};
use crate::storage::PhotoDir;
use crate::tone::{self, Beeper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Capturing,
}

/// What one poll of the switch led to.
#[derive(Debug)]
pub enum Outcome {
    Released,
    Captured(Saved),
    Failed(CaptureError),
}

pub struct Shutter<L, S, B, D, C> {
    led: L,
    switch: S,
    beeper: Beeper<B, D>,
    camera: C,
    photos: PhotoDir,
    resolution: Resolution,
    state: State,
}

impl<L, S, B, D, C> Shutter<L, S, B, D, C>
where
    L: OutputPin,
    S: InputPin,
    B: OutputPin,
    D: DelayNs,
    C: Camera,
{
    pub fn new(
        led: L,
        switch: S,
        beeper: Beeper<B, D>,
        camera: C,
        photos: PhotoDir,
        resolution: Resolution,
    ) -> Self {
        Self {
            led,
            switch,
            beeper,
            camera,
            photos,
            resolution,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Enters idle: standby LED on.
    pub fn start(&mut self) -> Result<(), ShutterError> {
        self.state = State::Idle;
        self.led_on()
    }

    /// Polls the switch once and, if pressed, runs a whole capture cycle.
    pub fn step(&mut self) -> Result<Outcome, ShutterError> {
        let released = self
            .switch
            .is_high()
            .map_err(|e| ShutterError::Switch(e.kind()))?;
        if released {
            return Ok(Outcome::Released);
        }

        info!("Button is pressed, taking photo >>>");
        self.state = State::Capturing;
        self.led_off()?;
        self.beeper.melody(tone::START)?;

        let result = self
            .photos
            .next_path()
            .map_err(CaptureError::from)
            .and_then(|path| camera::take_picture(&mut self.camera, &path, self.resolution));

        self.led_on()?;
        let outcome = match result {
            Ok(saved) => {
                self.beeper.melody(tone::DONE)?;
                Outcome::Captured(saved)
            }
            Err(e) => {
                error!("Capture failed: {e}");
                self.beeper.melody(tone::FAILED)?;
                Outcome::Failed(e)
            }
        };
        self.state = State::Idle;
        info!("Waiting for button press...");
        Ok(outcome)
    }

    /// Polls until `running` is cleared, sleeping `poll_interval` between reads of
    /// a released switch. A capture in progress always runs to completion.
    ///
    /// LED and beeper are switched off on the way out, also when a pin fails.
    pub fn run(
        &mut self,
        running: &AtomicBool,
        poll_interval: Duration,
    ) -> Result<(), ShutterError> {
        let polled = self.start().and_then(|()| {
            info!("Waiting for button press...");
            while running.load(Ordering::SeqCst) {
                if let Outcome::Released = self.step()? {
                    thread::sleep(poll_interval);
                }
            }
            Ok(())
        });
        let cleanup = self.shutdown();
        polled.and(cleanup)
    }

    /// LED and beeper off.
    pub fn shutdown(&mut self) -> Result<(), ShutterError> {
        self.led_off()?;
        self.beeper.silence()?;
        Ok(())
    }

    fn led_on(&mut self) -> Result<(), ShutterError> {
        self.led.set_high().map_err(|e| ShutterError::Led(e.kind()))
    }

    fn led_off(&mut self) -> Result<(), ShutterError> {
        self.led.set_low().map_err(|e| ShutterError::Led(e.kind()))
    }

    #[cfg(test)]
    fn led(&self) -> &L {
        &self.led
    }

    #[cfg(test)]
    fn beeper(&self) -> &Beeper<B, D> {
        &self.beeper
    }

    #[cfg(test)]
    fn switch(&self) -> &S {
        &self.switch
    }
}
