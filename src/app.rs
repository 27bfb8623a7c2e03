//! Process startup order and exit status.

use std::error::Error;

use log::{error, info};

use crate::error::SetupError;

/// Exit status when the GPIO could not be brought up.
pub const EXIT_SETUP_FAILED: i32 = -1;
/// Exit status when anything after GPIO setup failed.
pub const EXIT_FAILURE: i32 = 1;

/// Runs `setup`, then hands its result to `serve` and returns the exit status.
///
/// A failed setup returns [`EXIT_SETUP_FAILED`] without calling `serve`, so no
/// directory is prepared and the polling loop is never entered.
pub fn launch<T, S, F>(setup: S, serve: F) -> i32
where
    S: FnOnce() -> Result<T, SetupError>,
    F: FnOnce(T) -> Result<(), Box<dyn Error>>,
{
    let parts = match setup() {
        Ok(parts) => parts,
        Err(e) => {
            error!("{e}");
            error!("Program Exit.");
            return EXIT_SETUP_FAILED;
        }
    };

    match serve(parts) {
        Ok(()) => {
            info!("Ending program");
            0
        }
        Err(e) => {
            error!("{e}");
            EXIT_FAILURE
        }
    }
}
