//! Hobby servos on PCA9685 channels
//!
//! ```text
//! pulse_us = angle / 180 · (max - min) + min      (clamped to [min, max])
//! duty     = pulse_us / period_us · 65535         (period from PWM frequency)
//! ```

use crate::config::{ChannelConfig, ServoConfig};
use crate::core::hal::{Clock, PwmController};
use crate::error::{Error, Result};
use std::time::Duration;

/// Pause between poses of the self-test sweep
const SWEEP_PAUSE: Duration = Duration::from_millis(500);

/// Pulse width limits of one servo model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseRange {
    pub min_us: f64,
    pub max_us: f64,
}

impl PulseRange {
    pub fn new(min_us: f64, max_us: f64) -> Self {
        Self { min_us, max_us }
    }

    /// Pulse width for `angle` degrees
    pub fn angle_to_pulse_us(&self, angle: f64) -> f64 {
        let pulse = angle / 180.0 * (self.max_us - self.min_us) + self.min_us;
        pulse.clamp(self.min_us, self.max_us)
    }

    /// Angle a pulse width corresponds to, truncated to whole degrees
    pub fn pulse_to_angle(&self, pulse_us: f64) -> i32 {
        let span = self.max_us - self.min_us;
        if span <= 0.0 {
            return 0;
        }
        ((pulse_us - self.min_us) / span * 180.0) as i32
    }
}

/// Duty cycle that produces a `pulse_us` wide pulse at `frequency` Hz
pub fn pulse_to_duty(pulse_us: f64, frequency: f64) -> u16 {
    let period_us = 1_000_000.0 / frequency;
    (pulse_us / period_us * f64::from(u16::MAX)).clamp(0.0, f64::from(u16::MAX)) as u16
}

/// Move the servo on `channel` to `angle` degrees (0-180)
pub fn set_servo_angle(
    pwm: &mut dyn PwmController,
    range: &PulseRange,
    channel: u8,
    angle: f64,
) -> Result<()> {
    if !(0.0..=180.0).contains(&angle) {
        return Err(Error::InvalidParameter(format!(
            "servo angle {} out of range (0-180)",
            angle
        )));
    }
    let pulse = range.angle_to_pulse_us(angle);
    let duty = pulse_to_duty(pulse, pwm.frequency());
    pwm.set_duty_cycle(channel, duty)?;
    log::debug!(
        "Servo channel {} angle set to {} degrees (pulse width: {:.0} µs)",
        channel,
        angle,
        pulse
    );
    Ok(())
}

/// Both arms and the head
#[derive(Debug, Clone)]
pub struct ServoRig {
    range: PulseRange,
    left_arm: u8,
    right_arm: u8,
    head: u8,
    poses: ServoConfig,
}

impl ServoRig {
    pub fn new(channels: &ChannelConfig, poses: &ServoConfig) -> Self {
        Self {
            range: PulseRange::new(poses.min_pulse_us, poses.max_pulse_us),
            left_arm: channels.servo_left_arm,
            right_arm: channels.servo_right_arm,
            head: channels.servo_head,
            poses: poses.clone(),
        }
    }

    pub fn range(&self) -> PulseRange {
        self.range
    }

    /// Centre every servo
    pub fn initialize(&self, pwm: &mut dyn PwmController) -> Result<()> {
        for channel in [self.left_arm, self.right_arm, self.head] {
            set_servo_angle(pwm, &self.range, channel, 90.0)?;
        }
        log::info!("Servos centred");
        Ok(())
    }

    pub fn raise_arms(&self, pwm: &mut dyn PwmController) -> Result<()> {
        set_servo_angle(pwm, &self.range, self.left_arm, self.poses.left_arm_up)?;
        set_servo_angle(pwm, &self.range, self.right_arm, self.poses.right_arm_up)
    }

    pub fn lower_arms(&self, pwm: &mut dyn PwmController) -> Result<()> {
        set_servo_angle(pwm, &self.range, self.left_arm, self.poses.left_arm_down)?;
        set_servo_angle(pwm, &self.range, self.right_arm, self.poses.right_arm_down)
    }

    pub fn move_head_up(&self, pwm: &mut dyn PwmController) -> Result<()> {
        set_servo_angle(pwm, &self.range, self.head, self.poses.head_up)
    }

    pub fn move_head_down(&self, pwm: &mut dyn PwmController) -> Result<()> {
        set_servo_angle(pwm, &self.range, self.head, self.poses.head_down)
    }

    pub fn move_head_center(&self, pwm: &mut dyn PwmController) -> Result<()> {
        set_servo_angle(pwm, &self.range, self.head, self.poses.head_center)
    }

    /// Sweep through every pose and back to centre
    pub fn test_servos(&self, pwm: &mut dyn PwmController, clock: &dyn Clock) -> Result<()> {
        log::info!("Testing servos...");
        self.raise_arms(pwm)?;
        clock.sleep(SWEEP_PAUSE);
        self.lower_arms(pwm)?;
        clock.sleep(SWEEP_PAUSE);
        self.move_head_up(pwm)?;
        clock.sleep(SWEEP_PAUSE);
        self.move_head_down(pwm)?;
        clock.sleep(SWEEP_PAUSE);
        self.move_head_center(pwm)?;
        self.initialize(pwm)
    }
}
