use log::{debug, info};
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::config::PinConfig;
use crate::error::SetupError;

/// The three pins the shutter drives, configured and ready.
pub struct Board {
    led: OutputPin,
    switch: InputPin,
    beeper: OutputPin,
}

impl Board {
    /// Opens the GPIO peripheral and configures LED and beeper as outputs and the
    /// switch as a pulled-up input, so the switch reads low only while pressed.
    ///
    /// Nothing is configured if the peripheral itself cannot be opened.
    pub fn setup(pins: &PinConfig) -> Result<Self, SetupError> {
        let gpio = Gpio::new().map_err(SetupError::Gpio)?;
        info!("GPIO opened: {}", gpio_model());

        let get = |pin: u8| gpio.get(pin).map_err(|source| SetupError::Pin { pin, source });

        let mut led = get(pins.led)?.into_output();
        let mut beeper = get(pins.beeper)?.into_output();
        let switch = get(pins.switch)?.into_input_pullup();
        led.set_low();
        beeper.set_low();

        debug!(
            "led=GPIO{} switch=GPIO{} (pull-up) beeper=GPIO{}",
            pins.led, pins.switch, pins.beeper
        );
        Ok(Self {
            led,
            switch,
            beeper,
        })
    }

    /// Splits into `(led, switch, beeper)`.
    pub fn into_parts(self) -> (OutputPin, InputPin, OutputPin) {
        (self.led, self.switch, self.beeper)
    }
}

fn gpio_model() -> String {
    match rppal::system::DeviceInfo::new() {
        Ok(info) => info.model().to_string(),
        Err(_) => "unknown board".to_string(),
    }
}
