//! Device implementations

pub mod mock;
pub mod mpu6050;
pub mod pca9685;
#[cfg(feature = "rpi")]
pub mod rpi;

use crate::config::GismoConfig;
use crate::core::driver::DeviceDriver;
use crate::error::{Error, Result};

/// Create a device driver based on configuration
pub fn create_device(config: &GismoConfig) -> Result<Box<dyn DeviceDriver>> {
    match config.device.device_type.as_str() {
        "rpi" => create_rpi(config),
        "mock" => Ok(Box::new(mock::MockDriver::new(config))),
        _ => Err(Error::UnknownDevice(config.device.device_type.clone())),
    }
}

#[cfg(feature = "rpi")]
fn create_rpi(config: &GismoConfig) -> Result<Box<dyn DeviceDriver>> {
    Ok(Box::new(rpi::RpiDriver::new(config)))
}

#[cfg(not(feature = "rpi"))]
fn create_rpi(_config: &GismoConfig) -> Result<Box<dyn DeviceDriver>> {
    Err(Error::NotSupported(
        "device type \"rpi\" needs a build with `--features rpi`".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_device() {
        let mut config = GismoConfig::default();
        config.device.device_type = "mock".to_string();
        let driver = create_device(&config).unwrap();
        assert_eq!(driver.name(), "Gismo (mock)");
    }

    #[test]
    fn test_unknown_device_type() {
        let mut config = GismoConfig::default();
        config.device.device_type = "esp32".to_string();
        assert!(matches!(
            create_device(&config),
            Err(Error::UnknownDevice(t)) if t == "esp32"
        ));
    }

    #[cfg(not(feature = "rpi"))]
    #[test]
    fn test_rpi_requires_feature() {
        let config = GismoConfig::default();
        assert!(matches!(create_device(&config), Err(Error::NotSupported(_))));
    }
}
