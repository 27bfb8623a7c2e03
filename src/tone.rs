//! Square-wave tones on a passive piezo by toggling a plain output pin.
//!
//! The wave is open-loop and only roughly on pitch: each half period is a fixed
//! empirical constant divided by the frequency, shorter than the true half period
//! to make up for the time spent in the pin writes themselves.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};
use log::trace;

use crate::error::ToneError;

const HALF_PERIOD_NUMERATOR: u32 = 750_000;

/// Frequency in Hz and duration in ms. Frequency 0 is a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note(pub u32, pub u32);

/// Played when the shutter is pressed.
pub const START: &[Note] = &[Note(1319, 100), Note(1760, 100)];

/// Played after a photo was saved.
pub const DONE: &[Note] = &[
    Note(1975, 50),
    Note(0, 50),
    Note(1975, 50),
    Note(0, 50),
    Note(1975, 50),
    Note(0, 50),
    Note(2093, 200),
];

/// Played when the capture failed.
pub const FAILED: &[Note] = &[Note(880, 150), Note(0, 50), Note(440, 400)];

/// Microseconds the pin stays in one level for `hz`.
pub fn half_period_us(hz: u32) -> u32 {
    (HALF_PERIOD_NUMERATOR / hz.max(1)).max(1)
}

/// Number of high/low cycles needed to fill `ms` at `hz`, saturating at `u32::MAX`.
pub fn cycle_count(hz: u32, ms: u32) -> u32 {
    let cycle_us = 2 * u64::from(half_period_us(hz));
    u32::try_from(u64::from(ms) * 1000 / cycle_us).unwrap_or(u32::MAX)
}

/// Plays one note, blocking for its whole duration.
pub fn play<P: OutputPin, D: DelayNs>(
    pin: &mut P,
    delay: &mut D,
    note: Note,
) -> Result<(), ToneError> {
    let Note(hz, ms) = note;
    if hz == 0 {
        pin.set_low().map_err(|e| ToneError(e.kind()))?;
        delay.delay_ms(ms);
        return Ok(());
    }

    let half = half_period_us(hz);
    let cycles = cycle_count(hz, ms);
    trace!("tone {hz}Hz {ms}ms: {cycles} cycles of {half}us");
    for _ in 0..cycles {
        pin.set_high().map_err(|e| ToneError(e.kind()))?;
        delay.delay_us(half);
        pin.set_low().map_err(|e| ToneError(e.kind()))?;
        delay.delay_us(half);
    }
    Ok(())
}

/// A piezo on an output pin together with the delay used to time it.
pub struct Beeper<P, D> {
    pin: P,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Beeper<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Plays the notes back to back.
    pub fn melody(&mut self, notes: &[Note]) -> Result<(), ToneError> {
        for &note in notes {
            play(&mut self.pin, &mut self.delay, note)?;
        }
        Ok(())
    }

    pub fn silence(&mut self) -> Result<(), ToneError> {
        self.pin.set_low().map_err(|e| ToneError(e.kind()))
    }

    #[cfg(test)]
    pub(crate) fn parts(&self) -> (&P, &D) {
        (&self.pin, &self.delay)
    }
}
