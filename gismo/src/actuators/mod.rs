//! Actuators: drive motors, servos, status LED and buzzer
//!
//! Motors, servos and the LED share the PCA9685; the buzzer toggles a GPIO
//! pin directly.

pub mod buzzer;
pub mod led;
pub mod motor;
pub mod servo;

pub use buzzer::{Buzzer, Note, Sound};
pub use led::{Emotion, RgbLed};
pub use motor::{Motor, Movement};
pub use servo::{PulseRange, ServoRig};
