//! Mock device driver for hardware-free runs
//!
//! Stands in for the Raspberry Pi so the daemon and the test suite run on a
//! workstation. Nothing here models physics: sensors return scripted values.
//!
//! | Component | Stand-in |
//! |-----------|----------|
//! | GPIO | [`MockGpio`]: settable inputs, recorded outputs, scripted echo |
//! | HC-SR04 echo | [`EchoScript`] answering each trigger with a fixed distance |
//! | PCA9685 | The real [`Pca9685`] driver over a [`MockBus`] register file |
//! | MPU-6050 | [`MockImu`]: fixed readings plus seeded Gaussian noise |
//! | Time | [`SystemClock`] by default, [`MockClock`] in tests |
//!
//! ```toml
//! [device]
//! type = "mock"
//!
//! [mock]
//! distance_cm = 100.0    # negative = no echo
//! gyro = [0.0, 0.0, 2.0]
//! gyro_stddev = 0.05
//! random_seed = 42       # 0 = random each run
//! ```

mod clock;
mod gpio;
mod imu;
mod noise;

pub use clock::MockClock;
pub use gpio::{EchoResponse, EchoScript, MockGpio};
pub use imu::MockImu;
pub use noise::NoiseGenerator;

use crate::config::GismoConfig;
use crate::core::driver::{DeviceDriver, Hardware};
use crate::core::hal::{Clock, SystemClock};
use crate::devices::pca9685::Pca9685;
use crate::error::Result;
use crate::transport::MockBus;
use std::sync::Arc;
use std::time::Duration;

/// Mock device driver
///
/// The handles returned by [`gpio`](Self::gpio), [`imu`](Self::imu) and
/// [`bus`](Self::bus) share state with the hardware handed out by
/// `initialize`, so tests can script inputs after the robot owns it.
pub struct MockDriver {
    name: String,
    clock: Arc<dyn Clock>,
    gpio: MockGpio,
    imu: MockImu,
    bus: MockBus,
}

impl MockDriver {
    /// Mock driver running on wall-clock time
    pub fn new(config: &GismoConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Mock driver on an explicit clock
    pub fn with_clock(config: &GismoConfig, clock: Arc<dyn Clock>) -> Self {
        let mock = &config.mock;

        let gpio = MockGpio::new(Arc::clone(&clock));
        let response = if mock.distance_cm < 0.0 {
            EchoResponse::Silent
        } else {
            EchoResponse::Reflect {
                delay: Duration::from_micros(mock.echo_delay_us),
                distance_cm: mock.distance_cm,
            }
        };
        gpio.set_echo(EchoScript {
            trigger: config.pins.ultrasonic_trigger,
            echo: config.pins.ultrasonic_echo,
            response,
        });

        let imu = MockImu::with_noise(
            mock.accel,
            mock.gyro,
            mock.accel_stddev,
            mock.gyro_stddev,
            mock.random_seed,
        );

        Self {
            name: format!("{} (mock)", config.device.name),
            clock,
            gpio,
            imu,
            bus: MockBus::new(),
        }
    }

    /// Shared handle to the mock GPIO
    pub fn gpio(&self) -> MockGpio {
        self.gpio.clone()
    }

    /// Shared handle to the mock IMU
    pub fn imu(&self) -> MockImu {
        self.imu.clone()
    }

    /// Shared handle to the PCA9685 register file
    pub fn bus(&self) -> MockBus {
        self.bus.clone()
    }
}

impl DeviceDriver for MockDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) -> Result<Hardware> {
        let pwm = Pca9685::new(self.bus.clone(), Arc::clone(&self.clock))?;
        log::info!("{}: scripted hardware ready", self.name);

        Ok(Hardware {
            gpio: Box::new(self.gpio.clone()),
            pwm: Box::new(pwm),
            imu: Box::new(self.imu.clone()),
            clock: Arc::clone(&self.clock),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hal::{Gpio, Level};

    #[test]
    fn test_initialize_shares_handles() {
        let mut config = GismoConfig::default();
        config.mock.gyro = [0.0, 0.0, 3.0];
        let mut driver = MockDriver::new(&config);
        let mut hw = driver.initialize().unwrap();

        hw.gpio.setup_input(22).unwrap();
        driver.gpio().set_input(22, Level::High);
        assert_eq!(hw.gpio.read_level(22).unwrap(), Level::High);

        assert_eq!(hw.imu.read_gyro().unwrap()[2], 3.0);

        hw.pwm.set_duty_cycle(0, 0xFFFF).unwrap();
        // LED0_ON_H carries the full-on bit
        assert_eq!(driver.bus().register(0x07), 0x10);
    }
}
