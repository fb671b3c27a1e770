//! Mock register bus for testing

use super::RegisterBus;
use crate::error::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock register bus for unit testing chip drivers
///
/// Clones share the same register file, so a test can keep one handle while
/// the driver under test owns another.
#[derive(Clone)]
pub struct MockBus {
    inner: Arc<Mutex<MockBusInner>>,
}

struct MockBusInner {
    registers: [u8; 256],
    writes: Vec<(u8, u8)>,
    failing: bool,
}

impl MockBus {
    /// Create a new mock bus with every register zeroed
    pub fn new() -> Self {
        MockBus {
            inner: Arc::new(Mutex::new(MockBusInner {
                registers: [0; 256],
                writes: Vec::new(),
                failing: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockBusInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Preload registers starting at `register`
    pub fn inject_registers(&self, register: u8, data: &[u8]) {
        let mut inner = self.lock();
        for (offset, byte) in data.iter().enumerate() {
            inner.registers[(register as usize + offset) & 0xFF] = *byte;
        }
    }

    /// Current value of a register
    pub fn register(&self, register: u8) -> u8 {
        self.lock().registers[register as usize]
    }

    /// Get all (register, value) writes in order
    pub fn get_written(&self) -> Vec<(u8, u8)> {
        self.lock().writes.clone()
    }

    /// Clear written data
    pub fn clear_written(&self) {
        self.lock().writes.clear();
    }

    /// Make every subsequent transfer fail
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }
}

impl RegisterBus for MockBus {
    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        let mut inner = self.lock();
        if inner.failing {
            return Err(Error::I2c("mock bus write failed".to_string()));
        }
        inner.registers[register as usize] = value;
        inner.writes.push((register, value));
        Ok(())
    }

    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<()> {
        let inner = self.lock();
        if inner.failing {
            return Err(Error::I2c("mock bus read failed".to_string()));
        }
        for (offset, item) in buffer.iter_mut().enumerate() {
            *item = inner.registers[(register as usize + offset) & 0xFF];
        }
        Ok(())
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_back_injected_registers() {
        let mut bus = MockBus::new();
        bus.inject_registers(0x3B, &[0x12, 0x34, 0x56]);

        let mut buf = [0u8; 3];
        bus.read_registers(0x3B, &mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34, 0x56]);
        assert_eq!(bus.read_register(0x3C).unwrap(), 0x34);
    }

    #[test]
    fn test_writes_are_recorded_and_shared() {
        let observer = MockBus::new();
        let mut bus = observer.clone();
        bus.write_register(0x00, 0x10).unwrap();
        bus.write_register(0xFE, 0x79).unwrap();

        assert_eq!(observer.get_written(), vec![(0x00, 0x10), (0xFE, 0x79)]);
        assert_eq!(observer.register(0xFE), 0x79);

        observer.clear_written();
        assert!(observer.get_written().is_empty());
    }

    #[test]
    fn test_failing_bus() {
        let mut bus = MockBus::new();
        bus.set_failing(true);
        assert!(matches!(bus.write_register(0, 0), Err(Error::I2c(_))));
        let mut buf = [0u8; 2];
        assert!(bus.read_registers(0, &mut buf).is_err());
    }
}
