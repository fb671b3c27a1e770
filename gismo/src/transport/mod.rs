//! Transport layer for register-oriented peripheral buses

use crate::error::Result;

#[cfg(feature = "rpi")]
mod i2c;
mod mock;

#[cfg(feature = "rpi")]
pub use i2c::I2cBus;
pub use mock::MockBus;

/// Register access to one peripheral on a shared bus
pub trait RegisterBus: Send {
    /// Write a single register
    fn write_register(&mut self, register: u8, value: u8) -> Result<()>;

    /// Read `buffer.len()` consecutive registers starting at `register`
    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<()>;

    /// Read a single register
    fn read_register(&mut self, register: u8) -> Result<u8> {
        let mut value = [0u8; 1];
        self.read_registers(register, &mut value)?;
        Ok(value[0])
    }
}
