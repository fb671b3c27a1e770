//! PCA9685 16-channel, 12-bit PWM controller
//!
//! Drives the motors (H-bridge inputs), the RGB LED and the servos. Duty
//! cycles are given in 16-bit resolution and truncated to the chip's 12 bits.
//!
//! # Frequency
//!
//! ```text
//! prescale = round(25 MHz / (4096 × f)) - 1      (clamped to 3..=255)
//! ```
//!
//! The prescaler can only be written while the oscillator is asleep, so
//! [`Pca9685::set_frequency`] runs sleep → write prescale → wake → restart.

use crate::core::hal::{Clock, PwmController};
use crate::error::{Error, Result};
use crate::transport::RegisterBus;
use std::sync::Arc;
use std::time::Duration;

// Registers
const MODE1: u8 = 0x00;
const MODE2: u8 = 0x01;
const LED0_ON_L: u8 = 0x06;
const ALL_LED_OFF_H: u8 = 0xFD;
const PRESCALE: u8 = 0xFE;

// MODE1 bits
const MODE1_RESTART: u8 = 0x80;
const MODE1_AUTO_INCREMENT: u8 = 0x20;
const MODE1_SLEEP: u8 = 0x10;
const MODE1_ALLCALL: u8 = 0x01;

// MODE2 bits
const MODE2_OUTDRV: u8 = 0x04;

/// Bit 4 of the ON_H/OFF_H registers forces the output fully on/off
const FULL_BIT: u16 = 0x1000;

const OSCILLATOR_HZ: f64 = 25_000_000.0;
const CHANNELS: u8 = 16;

/// Oscillator start-up time after clearing SLEEP
const OSCILLATOR_SETTLE: Duration = Duration::from_micros(500);

/// PCA9685 driver over any [`RegisterBus`]
pub struct Pca9685<B: RegisterBus> {
    bus: B,
    clock: Arc<dyn Clock>,
    frequency: f64,
    duty: [u16; CHANNELS as usize],
}

impl<B: RegisterBus> Pca9685<B> {
    /// Reset the controller to totem-pole outputs with register auto-increment
    pub fn new(mut bus: B, clock: Arc<dyn Clock>) -> Result<Self> {
        bus.write_register(ALL_LED_OFF_H, 0x10)?;
        bus.write_register(MODE2, MODE2_OUTDRV)?;
        bus.write_register(MODE1, MODE1_AUTO_INCREMENT | MODE1_ALLCALL)?;
        clock.sleep(OSCILLATOR_SETTLE);

        log::debug!("PCA9685: initialized, all outputs off");

        Ok(Self {
            bus,
            clock,
            // Power-on prescale 0x1E
            frequency: prescale_to_frequency(0x1E),
            duty: [0; CHANNELS as usize],
        })
    }

    /// Last duty cycle written to `channel`
    pub fn duty_cycle(&self, channel: u8) -> Option<u16> {
        self.duty.get(channel as usize).copied()
    }
}

/// Prescaler register value for `hz`
pub fn frequency_to_prescale(hz: f64) -> u8 {
    let prescale = (OSCILLATOR_HZ / (4096.0 * hz)).round() - 1.0;
    prescale.clamp(3.0, 255.0) as u8
}

/// Output frequency produced by a prescaler value
pub fn prescale_to_frequency(prescale: u8) -> f64 {
    OSCILLATOR_HZ / (4096.0 * (prescale as f64 + 1.0))
}

/// Split a 16-bit duty into the chip's (ON, OFF) 13-bit register pair
fn duty_to_registers(duty: u16) -> (u16, u16) {
    match duty {
        0xFFFF => (FULL_BIT, 0),
        d if d < 0x0010 => (0, FULL_BIT),
        d => (0, d >> 4),
    }
}

impl<B: RegisterBus> PwmController for Pca9685<B> {
    fn set_frequency(&mut self, hz: f64) -> Result<()> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "PWM frequency must be positive, got {}",
                hz
            )));
        }

        let prescale = frequency_to_prescale(hz);
        let old_mode = self.bus.read_register(MODE1)? & !MODE1_RESTART;

        self.bus.write_register(MODE1, old_mode | MODE1_SLEEP)?;
        self.bus.write_register(PRESCALE, prescale)?;
        self.bus.write_register(MODE1, old_mode & !MODE1_SLEEP)?;
        self.clock.sleep(OSCILLATOR_SETTLE);
        self.bus.write_register(
            MODE1,
            (old_mode & !MODE1_SLEEP) | MODE1_RESTART | MODE1_AUTO_INCREMENT,
        )?;

        self.frequency = prescale_to_frequency(prescale);
        log::debug!(
            "PCA9685: requested {:.1} Hz, prescale {} -> {:.2} Hz",
            hz,
            prescale,
            self.frequency
        );
        Ok(())
    }

    fn frequency(&self) -> f64 {
        self.frequency
    }

    fn set_duty_cycle(&mut self, channel: u8, duty: u16) -> Result<()> {
        if channel >= CHANNELS {
            return Err(Error::InvalidParameter(format!(
                "PCA9685 channel {} out of range (0-15)",
                channel
            )));
        }

        let (on, off) = duty_to_registers(duty);
        let base = LED0_ON_L + 4 * channel;
        self.bus.write_register(base, (on & 0xFF) as u8)?;
        self.bus.write_register(base + 1, (on >> 8) as u8)?;
        self.bus.write_register(base + 2, (off & 0xFF) as u8)?;
        self.bus.write_register(base + 3, (off >> 8) as u8)?;

        self.duty[channel as usize] = duty;
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        self.bus.write_register(ALL_LED_OFF_H, 0x10)?;
        let mode = self.bus.read_register(MODE1)?;
        self.bus
            .write_register(MODE1, (mode & !MODE1_RESTART) | MODE1_SLEEP)?;
        self.duty = [0; CHANNELS as usize];
        log::debug!("PCA9685: all outputs off, oscillator asleep");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::mock::MockClock;
    use crate::transport::MockBus;

    fn pca(bus: MockBus) -> Pca9685<MockBus> {
        Pca9685::new(bus, Arc::new(MockClock::new())).unwrap()
    }

    #[test]
    fn test_prescale_for_common_frequencies() {
        // 25 MHz / (4096 * 50) = 122.07 -> 122 - 1
        assert_eq!(frequency_to_prescale(50.0), 121);
        // 25 MHz / (4096 * 60) = 101.7 -> 102 - 1
        assert_eq!(frequency_to_prescale(60.0), 101);
        // Out of range requests clamp
        assert_eq!(frequency_to_prescale(1.0), 255);
        assert_eq!(frequency_to_prescale(100_000.0), 3);
    }

    #[test]
    fn test_duty_register_encoding() {
        assert_eq!(duty_to_registers(0xFFFF), (0x1000, 0));
        assert_eq!(duty_to_registers(0), (0, 0x1000));
        assert_eq!(duty_to_registers(0x000F), (0, 0x1000));
        assert_eq!(duty_to_registers(0x8000), (0, 0x0800));
    }

    #[test]
    fn test_set_frequency_writes_prescale_while_asleep() {
        let bus = MockBus::new();
        let mut pca = pca(bus.clone());
        bus.clear_written();

        pca.set_frequency(50.0).unwrap();

        let writes = bus.get_written();
        let prescale_idx = writes.iter().position(|&(r, _)| r == PRESCALE).unwrap();
        assert_eq!(writes[prescale_idx].1, 121);
        // Preceding MODE1 write must put the oscillator to sleep
        let (reg, mode) = writes[prescale_idx - 1];
        assert_eq!(reg, MODE1);
        assert_ne!(mode & MODE1_SLEEP, 0);
        // Final MODE1 write restarts with sleep cleared
        let (reg, mode) = *writes.last().unwrap();
        assert_eq!(reg, MODE1);
        assert_eq!(mode & MODE1_SLEEP, 0);
        assert_ne!(mode & MODE1_RESTART, 0);

        assert!((pca.frequency() - 50.0).abs() < 0.2);
    }

    #[test]
    fn test_oscillator_settles_on_injected_clock() {
        let clock = MockClock::new();
        let mut pca = Pca9685::new(MockBus::new(), Arc::new(clock.clone())).unwrap();
        assert!(clock.peek() >= OSCILLATOR_SETTLE);

        let before = clock.peek();
        pca.set_frequency(50.0).unwrap();
        assert!(clock.peek() - before >= OSCILLATOR_SETTLE);
    }

    #[test]
    fn test_set_duty_cycle_channel_registers() {
        let bus = MockBus::new();
        let mut pca = pca(bus.clone());

        pca.set_duty_cycle(2, 0x8000).unwrap();
        let base = LED0_ON_L + 8;
        assert_eq!(bus.register(base), 0x00);
        assert_eq!(bus.register(base + 1), 0x00);
        assert_eq!(bus.register(base + 2), 0x00);
        assert_eq!(bus.register(base + 3), 0x08);
        assert_eq!(pca.duty_cycle(2), Some(0x8000));

        pca.set_duty_cycle(2, 0xFFFF).unwrap();
        assert_eq!(bus.register(base + 1), 0x10);
        assert_eq!(bus.register(base + 3), 0x00);
    }

    #[test]
    fn test_rejects_bad_channel_and_frequency() {
        let mut pca = pca(MockBus::new());
        assert!(matches!(
            pca.set_duty_cycle(16, 100),
            Err(Error::InvalidParameter(_))
        ));
        assert!(pca.set_frequency(0.0).is_err());
    }

    #[test]
    fn test_deinit_turns_everything_off() {
        let bus = MockBus::new();
        let mut pca = pca(bus.clone());
        pca.set_duty_cycle(0, 0x4000).unwrap();

        pca.deinit().unwrap();

        assert_eq!(bus.register(ALL_LED_OFF_H), 0x10);
        assert_ne!(bus.register(MODE1) & MODE1_SLEEP, 0);
        assert_eq!(pca.duty_cycle(0), Some(0));
    }
}
