//! Hardware access traits.
//!
//! Sensors and actuators never own hardware. They receive `&mut dyn Gpio`,
//! `&mut dyn PwmController` or `&dyn Clock` from the [`Robot`](crate::robot::Robot)
//! context on every call, so one owner holds every handle and tests can swap in
//! the mock device.

use crate::core::types::ImuData;
use crate::error::Result;
use std::time::{Duration, Instant};

/// Logic level of a GPIO line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[inline]
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    #[inline]
    pub fn is_low(self) -> bool {
        self == Level::Low
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

impl std::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// GPIO line control (BCM numbering)
///
/// Both operations are expected to complete in microseconds and do no
/// debouncing.
pub trait Gpio: Send {
    /// Claim `pin` as an output, driven low
    fn setup_output(&mut self, pin: u8) -> Result<()>;

    /// Claim `pin` as an input
    fn setup_input(&mut self, pin: u8) -> Result<()>;

    /// Drive an output pin
    fn set_level(&mut self, pin: u8, level: Level) -> Result<()>;

    /// Sample an input pin
    fn read_level(&mut self, pin: u8) -> Result<Level>;

    /// Release every claimed pin
    fn cleanup(&mut self) {}
}

/// Monotonic time source
pub trait Clock: Send + Sync {
    /// Time since the clock's origin. Never decreases.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Below this, `SystemClock::sleep` spins instead of yielding to the scheduler
const SPIN_THRESHOLD: Duration = Duration::from_micros(200);

/// [`Clock`] backed by [`std::time::Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        if duration < SPIN_THRESHOLD {
            // thread::sleep overshoots short waits by tens of microseconds
            let start = Instant::now();
            while start.elapsed() < duration {
                std::hint::spin_loop();
            }
        } else {
            std::thread::sleep(duration);
        }
    }
}

/// 16-channel PWM controller (PCA9685 style)
pub trait PwmController: Send {
    /// Set the shared output frequency in Hz
    fn set_frequency(&mut self, hz: f64) -> Result<()>;

    /// Current output frequency in Hz
    fn frequency(&self) -> f64;

    /// Set a channel's duty cycle (0 = off, 0xFFFF = fully on)
    fn set_duty_cycle(&mut self, channel: u8, duty: u16) -> Result<()>;

    /// Switch every channel off
    fn deinit(&mut self) -> Result<()>;
}

/// Inertial sensor driver
pub trait ImuDriver: Send {
    /// Linear acceleration [x, y, z] in m/s²
    fn read_accel(&mut self) -> Result<[f64; 3]>;

    /// Angular rate [x, y, z] in °/s
    fn read_gyro(&mut self) -> Result<[f64; 3]>;

    /// Read both vectors
    fn read(&mut self) -> Result<ImuData> {
        let accel = self.read_accel()?;
        let gyro = self.read_gyro()?;
        Ok(ImuData::new(accel, gyro))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_conversions() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert_eq!(!Level::High, Level::Low);
        assert!(Level::High.is_high());
        assert!(Level::Low.is_low());
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        clock.sleep(Duration::from_micros(50));
        let b = clock.now();
        assert!(b >= a + Duration::from_micros(50));
    }
}
