//! I2C transport on the Raspberry Pi

use super::RegisterBus;
use crate::error::{Error, Result};
use rppal::i2c::I2c;

/// One slave device on the Pi's primary I2C bus
pub struct I2cBus {
    i2c: I2c,
    address: u16,
}

impl I2cBus {
    /// Open the default I2C bus and address `address`
    ///
    /// # Arguments
    /// * `address` - 7-bit slave address (e.g., 0x40 for PCA9685)
    pub fn open(address: u16) -> Result<Self> {
        let mut i2c = I2c::new()?;
        i2c.set_slave_address(address)?;

        log::info!(
            "Opened I2C bus {} for device {:#04x} ({} Hz)",
            i2c.bus(),
            address,
            i2c.clock_speed().unwrap_or(0)
        );

        Ok(Self { i2c, address })
    }

    fn fault(&self, e: rppal::i2c::Error) -> Error {
        Error::I2c(format!("device {:#04x}: {}", self.address, e))
    }
}

impl RegisterBus for I2cBus {
    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.i2c
            .write(&[register, value])
            .map_err(|e| self.fault(e))?;
        Ok(())
    }

    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<()> {
        self.i2c
            .write_read(&[register], buffer)
            .map_err(|e| self.fault(e))?;
        Ok(())
    }
}
