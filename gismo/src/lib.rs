//! Gismo - hardware control for a small wandering robot on a Raspberry Pi
//!
//! The robot measures distance with an HC-SR04, watches two edge sensors, a
//! touch pad and a sound sensor, and keeps a rough pose by integrating an
//! MPU-6050. It drives two DC motors, three servos and an RGB LED through a
//! PCA9685, and a buzzer from a GPIO pin.
//!
//! ## Features
//!
//! - `rpi`: Raspberry Pi backend (GPIO and I2C through `rppal`). Without it
//!   only the mock device is available.

pub mod actuators;
pub mod app;
pub mod calibration;
pub mod config;
pub mod control;
pub mod core;
pub mod devices;
pub mod error;
pub mod odometry;
pub mod robot;
pub mod sensors;
pub mod transport;

// Re-export commonly used types
pub use config::GismoConfig;
pub use error::{Error, Result};
pub use odometry::{DeadReckoning, PoseEstimate};
pub use robot::Robot;
pub use sensors::{DistanceError, DistanceSampler};
