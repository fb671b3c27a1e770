//! Core abstractions for hardware access.
//!
//! - [`hal`]: Traits the sensors and actuators are written against
//! - [`driver::DeviceDriver`]: Trait to implement for a new hardware backend
//! - [`types`]: Sensor sample types shared across modules

pub mod driver;
pub mod hal;
pub mod types;
