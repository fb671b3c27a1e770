//! Digital on/off sensors: edge (cliff), touch and sound
//!
//! All three are plain GPIO inputs with no debouncing. A high line means
//! the sensor fired.

use crate::core::hal::Gpio;
use crate::error::Result;

/// Left and right downward-facing edge sensors
#[derive(Debug, Clone)]
pub struct EdgeSensors {
    left: u8,
    right: u8,
}

impl EdgeSensors {
    pub fn new(left: u8, right: u8) -> Self {
        Self { left, right }
    }

    pub fn initialize(&self, gpio: &mut dyn Gpio) -> Result<()> {
        gpio.setup_input(self.left)?;
        gpio.setup_input(self.right)?;
        Ok(())
    }

    /// `(left, right)`, `true` when that side sees an edge
    pub fn read(&self, gpio: &mut dyn Gpio) -> Result<(bool, bool)> {
        let left = gpio.read_level(self.left)?.is_high();
        let right = gpio.read_level(self.right)?.is_high();
        Ok((left, right))
    }
}

/// Capacitive touch pad
#[derive(Debug, Clone)]
pub struct TouchSensor {
    pin: u8,
}

impl TouchSensor {
    pub fn new(pin: u8) -> Self {
        Self { pin }
    }

    pub fn initialize(&self, gpio: &mut dyn Gpio) -> Result<()> {
        gpio.setup_input(self.pin)
    }

    pub fn is_touched(&self, gpio: &mut dyn Gpio) -> Result<bool> {
        Ok(gpio.read_level(self.pin)?.is_high())
    }
}

/// Sound level comparator module (digital output)
#[derive(Debug, Clone)]
pub struct SoundSensor {
    pin: u8,
}

impl SoundSensor {
    pub fn new(pin: u8) -> Self {
        Self { pin }
    }

    pub fn initialize(&self, gpio: &mut dyn Gpio) -> Result<()> {
        gpio.setup_input(self.pin)
    }

    pub fn is_sound_detected(&self, gpio: &mut dyn Gpio) -> Result<bool> {
        Ok(gpio.read_level(self.pin)?.is_high())
    }
}
