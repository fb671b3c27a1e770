//! HC-SR04 ultrasonic distance sampler
//!
//! # Measurement cycle
//!
//! ```text
//! trigger  ‾‾\__/‾‾‾‾‾‾‾‾‾‾\_________________________________
//!            2µs   10µs
//! echo     ___________________/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾\____________
//!                             ^ pulse_start    ^ pulse_end
//!          |<-- rise timeout -->|<-- fall timeout -->|
//! ```
//!
//! `distance_cm = round((pulse_end - pulse_start) × 17150, 2)`: the echo
//! width is the round trip time, and half the speed of sound (343 m/s) is
//! 17150 cm/s.
//!
//! Each wait is bounded by the monotonic clock (20 ms by default), so one
//! call blocks for at most about 40 ms. The sampler keeps no state between
//! calls.

use crate::core::hal::{Clock, Gpio, Level};
use std::time::Duration;

/// Distance reported by [`DistanceSampler::measure_distance`] when a
/// measurement fails
pub const DISTANCE_SENTINEL_CM: f64 = 999.99;

/// Half the speed of sound in cm/s
pub const SOUND_CM_PER_S: f64 = 17150.0;

/// Default bound on each echo wait
pub const DEFAULT_ECHO_TIMEOUT: Duration = Duration::from_millis(20);

const TRIGGER_SETTLE: Duration = Duration::from_micros(2);
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

/// Which echo edge the sampler gave up waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoPhase {
    /// Echo never went high
    Rise,
    /// Echo went high but never came back low
    Fall,
}

impl std::fmt::Display for EchoPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EchoPhase::Rise => write!(f, "rise"),
            EchoPhase::Fall => write!(f, "fall"),
        }
    }
}

/// Why a distance measurement failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistanceError {
    #[error("timed out waiting for echo {0}")]
    MeasurementTimeout(EchoPhase),

    #[error("hardware access fault: {0}")]
    HardwareAccessFault(String),
}

impl From<crate::error::Error> for DistanceError {
    fn from(e: crate::error::Error) -> Self {
        DistanceError::HardwareAccessFault(e.to_string())
    }
}

/// Ultrasonic distance sampler bound to a trigger and an echo pin
#[derive(Debug, Clone)]
pub struct DistanceSampler {
    trigger: u8,
    echo: u8,
    timeout: Duration,
}

impl DistanceSampler {
    pub fn new(trigger: u8, echo: u8) -> Self {
        Self::with_timeout(trigger, echo, DEFAULT_ECHO_TIMEOUT)
    }

    pub fn with_timeout(trigger: u8, echo: u8, timeout: Duration) -> Self {
        Self {
            trigger,
            echo,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Claim the trigger as an output and the echo as an input
    pub fn initialize(&self, gpio: &mut dyn Gpio) -> crate::error::Result<()> {
        gpio.setup_output(self.trigger)?;
        gpio.setup_input(self.echo)?;
        log::debug!(
            "Ultrasonic: trigger GPIO{}, echo GPIO{}, timeout {:?}",
            self.trigger,
            self.echo,
            self.timeout
        );
        Ok(())
    }

    /// Measure the distance to the nearest obstacle in centimeters
    pub fn measure(&self, gpio: &mut dyn Gpio, clock: &dyn Clock) -> Result<f64, DistanceError> {
        gpio.set_level(self.trigger, Level::Low)?;
        clock.sleep(TRIGGER_SETTLE);
        gpio.set_level(self.trigger, Level::High)?;
        clock.sleep(TRIGGER_PULSE);
        gpio.set_level(self.trigger, Level::Low)?;

        let pulse_start = self.wait_for(gpio, clock, Level::High, EchoPhase::Rise)?;
        let pulse_end = self.wait_for(gpio, clock, Level::Low, EchoPhase::Fall)?;

        let width = pulse_end.saturating_sub(pulse_start);
        Ok(pulse_to_distance_cm(width))
    }

    /// [`measure`](Self::measure) with every failure mapped to
    /// [`DISTANCE_SENTINEL_CM`]
    pub fn measure_distance(&self, gpio: &mut dyn Gpio, clock: &dyn Clock) -> f64 {
        match self.measure(gpio, clock) {
            Ok(distance) => distance,
            Err(e) => {
                log::warn!("Error reading distance: {}", e);
                DISTANCE_SENTINEL_CM
            }
        }
    }

    /// Poll the echo until it reads `level`, returning the time it did
    fn wait_for(
        &self,
        gpio: &mut dyn Gpio,
        clock: &dyn Clock,
        level: Level,
        phase: EchoPhase,
    ) -> Result<Duration, DistanceError> {
        let wait_start = clock.now();
        loop {
            let current = gpio.read_level(self.echo)?;
            let now = clock.now();
            if current == level {
                return Ok(now);
            }
            if now.saturating_sub(wait_start) > self.timeout {
                return Err(DistanceError::MeasurementTimeout(phase));
            }
        }
    }
}

/// Convert an echo pulse width to centimeters, rounded to 2 decimals
pub fn pulse_to_distance_cm(width: Duration) -> f64 {
    let distance = width.as_secs_f64() * SOUND_CM_PER_S;
    (distance * 100.0).round() / 100.0
}
