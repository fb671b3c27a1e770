//! DC motors on H-bridge inputs driven by PCA9685 channels

use crate::core::hal::{Clock, PwmController};
use crate::error::Result;
use std::time::Duration;

/// Convert a speed magnitude (0.0-1.0) into a 16-bit duty cycle
pub fn speed_to_duty(speed: f64) -> u16 {
    (speed.abs().clamp(0.0, 1.0) * f64::from(u16::MAX)).round() as u16
}

/// One motor: IN1 drives forward, IN2 drives backward
#[derive(Debug, Clone)]
pub struct Motor {
    forward_channel: u8,
    backward_channel: u8,
}

impl Motor {
    pub fn new(forward_channel: u8, backward_channel: u8) -> Self {
        Self {
            forward_channel,
            backward_channel,
        }
    }

    /// Set speed in `-1.0..=1.0`; negative runs backward, out of range clamps
    pub fn set_speed(&self, pwm: &mut dyn PwmController, speed: f64) -> Result<()> {
        let speed = if speed.is_nan() { 0.0 } else { speed.clamp(-1.0, 1.0) };
        let duty = speed_to_duty(speed);
        let (forward, backward) = if speed >= 0.0 { (duty, 0) } else { (0, duty) };
        pwm.set_duty_cycle(self.forward_channel, forward)?;
        pwm.set_duty_cycle(self.backward_channel, backward)?;
        Ok(())
    }

    pub fn stop(&self, pwm: &mut dyn PwmController) -> Result<()> {
        self.set_speed(pwm, 0.0)
    }
}

/// Differential drive built from two [`Motor`]s
#[derive(Debug, Clone)]
pub struct Movement {
    pub left: Motor,
    pub right: Motor,
    forward_speed: f64,
    turn_speed: f64,
    turn_duration: Duration,
}

impl Movement {
    pub fn new(
        left: Motor,
        right: Motor,
        forward_speed: f64,
        turn_speed: f64,
        turn_duration: Duration,
    ) -> Self {
        Self {
            left,
            right,
            forward_speed,
            turn_speed,
            turn_duration,
        }
    }

    pub fn forward_speed(&self) -> f64 {
        self.forward_speed
    }

    pub fn turn_duration(&self) -> Duration {
        self.turn_duration
    }

    /// Drive each side independently
    pub fn drive(&self, pwm: &mut dyn PwmController, left: f64, right: f64) -> Result<()> {
        self.left.set_speed(pwm, left)?;
        self.right.set_speed(pwm, right)?;
        Ok(())
    }

    pub fn move_forward(&self, pwm: &mut dyn PwmController, speed: f64) -> Result<()> {
        self.drive(pwm, speed.abs(), speed.abs())
    }

    pub fn move_backward(&self, pwm: &mut dyn PwmController, speed: f64) -> Result<()> {
        self.drive(pwm, -speed.abs(), -speed.abs())
    }

    /// Spin counter-clockwise for `duration`, then stop
    pub fn turn_left_in_place(
        &self,
        pwm: &mut dyn PwmController,
        clock: &dyn Clock,
        duration: Duration,
    ) -> Result<()> {
        self.drive(pwm, -self.turn_speed, self.turn_speed)?;
        clock.sleep(duration);
        self.stop_all_motors(pwm)
    }

    /// Spin clockwise for `duration`, then stop
    pub fn turn_right_in_place(
        &self,
        pwm: &mut dyn PwmController,
        clock: &dyn Clock,
        duration: Duration,
    ) -> Result<()> {
        self.drive(pwm, self.turn_speed, -self.turn_speed)?;
        clock.sleep(duration);
        self.stop_all_motors(pwm)
    }

    /// Half the time turning left, half turning right
    pub fn wiggle(
        &self,
        pwm: &mut dyn PwmController,
        clock: &dyn Clock,
        duration: Duration,
    ) -> Result<()> {
        self.turn_left_in_place(pwm, clock, duration / 2)?;
        self.turn_right_in_place(pwm, clock, duration / 2)
    }

    pub fn stop_all_motors(&self, pwm: &mut dyn PwmController) -> Result<()> {
        self.left.stop(pwm)?;
        self.right.stop(pwm)
    }
}
