//! DeviceDriver trait definition

use crate::core::hal::{Clock, Gpio, ImuDriver, PwmController};
use crate::error::Result;
use std::sync::Arc;

/// Hardware handles produced by [`DeviceDriver::initialize`]
///
/// Ownership moves into [`Robot`](crate::robot::Robot), which lends the
/// handles to sensors and actuators as needed.
pub struct Hardware {
    pub gpio: Box<dyn Gpio>,
    pub pwm: Box<dyn PwmController>,
    pub imu: Box<dyn ImuDriver>,
    pub clock: Arc<dyn Clock>,
}

/// Device driver trait for hardware abstraction
pub trait DeviceDriver: Send {
    /// Driver name for log output
    fn name(&self) -> &str;

    /// Open buses and peripherals and hand them over
    ///
    /// The driver should:
    /// 1. Open the GPIO controller
    /// 2. Open the I2C bus(es) and wake the PWM controller and IMU
    /// 3. Return the handles bundled as [`Hardware`]
    fn initialize(&mut self) -> Result<Hardware>;
}
