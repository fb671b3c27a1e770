//! Sensor front-ends
//!
//! - [`ultrasonic`]: HC-SR04 distance sampler
//! - [`digital`]: edge, touch and sound inputs

pub mod digital;
pub mod ultrasonic;

pub use digital::{EdgeSensors, SoundSensor, TouchSensor};
pub use ultrasonic::{
    DistanceError, DistanceSampler, EchoPhase, DISTANCE_SENTINEL_CM, SOUND_CM_PER_S,
};
