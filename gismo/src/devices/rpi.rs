//! Raspberry Pi hardware backend
//!
//! - GPIO through the kernel character device (`rppal::gpio`)
//! - PCA9685 PWM controller and MPU-6050 IMU on I2C bus 1

use crate::config::GismoConfig;
use crate::core::driver::{DeviceDriver, Hardware};
use crate::core::hal::{Clock, Gpio, Level, SystemClock};
use crate::devices::mpu6050::Mpu6050;
use crate::devices::pca9685::Pca9685;
use crate::error::{Error, Result};
use crate::transport::I2cBus;
use rppal::gpio::{InputPin, OutputPin};
use std::collections::HashMap;
use std::sync::Arc;

/// [`Gpio`] over rppal, BCM numbering
pub struct RpiGpio {
    gpio: rppal::gpio::Gpio,
    outputs: HashMap<u8, OutputPin>,
    inputs: HashMap<u8, InputPin>,
}

impl RpiGpio {
    pub fn new() -> Result<Self> {
        Ok(Self {
            gpio: rppal::gpio::Gpio::new()?,
            outputs: HashMap::new(),
            inputs: HashMap::new(),
        })
    }
}

impl Gpio for RpiGpio {
    fn setup_output(&mut self, pin: u8) -> Result<()> {
        self.inputs.remove(&pin);
        if !self.outputs.contains_key(&pin) {
            let output = self.gpio.get(pin)?.into_output_low();
            self.outputs.insert(pin, output);
        }
        Ok(())
    }

    fn setup_input(&mut self, pin: u8) -> Result<()> {
        self.outputs.remove(&pin);
        if !self.inputs.contains_key(&pin) {
            let input = self.gpio.get(pin)?.into_input();
            self.inputs.insert(pin, input);
        }
        Ok(())
    }

    fn set_level(&mut self, pin: u8, level: Level) -> Result<()> {
        let output = self
            .outputs
            .get_mut(&pin)
            .ok_or(Error::PinNotConfigured(pin))?;
        match level {
            Level::High => output.set_high(),
            Level::Low => output.set_low(),
        }
        Ok(())
    }

    fn read_level(&mut self, pin: u8) -> Result<Level> {
        let input = self.inputs.get(&pin).ok_or(Error::PinNotConfigured(pin))?;
        Ok(Level::from(input.is_high()))
    }

    fn cleanup(&mut self) {
        // Dropping the pins restores their original mode
        let released = self.outputs.len() + self.inputs.len();
        self.outputs.clear();
        self.inputs.clear();
        log::debug!("GPIO: released {} pins", released);
    }
}

/// Raspberry Pi device driver
pub struct RpiDriver {
    name: String,
    pca_address: u16,
    imu_address: u16,
}

impl RpiDriver {
    pub fn new(config: &GismoConfig) -> Self {
        Self {
            name: config.device.name.clone(),
            pca_address: config.pca.i2c_address,
            imu_address: config.imu.i2c_address,
        }
    }
}

impl DeviceDriver for RpiDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) -> Result<Hardware> {
        log::info!("Initializing Raspberry Pi hardware for {}", self.name);

        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let gpio = RpiGpio::new()?;

        let pwm = Pca9685::new(I2cBus::open(self.pca_address)?, Arc::clone(&clock))?;
        log::info!("PCA9685 ready at {:#04x}", self.pca_address);

        let imu = Mpu6050::new(I2cBus::open(self.imu_address)?)?;
        log::info!("MPU-6050 ready at {:#04x}", self.imu_address);

        Ok(Hardware {
            gpio: Box::new(gpio),
            pwm: Box::new(pwm),
            imu: Box::new(imu),
            clock,
        })
    }
}
