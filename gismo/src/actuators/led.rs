//! RGB status LED on three PCA9685 channels

use crate::core::hal::{Clock, PwmController};
use crate::error::{Error, Result};
use std::str::FromStr;
use std::time::Duration;

/// 8-bit RGB triple
pub type Color = (u8, u8, u8);

pub const OFF: Color = (0, 0, 0);
pub const RED: Color = (255, 0, 0);
pub const GREEN: Color = (0, 255, 0);
pub const BLUE: Color = (0, 0, 255);
pub const YELLOW: Color = (255, 255, 0);
pub const CYAN: Color = (0, 255, 255);
pub const MAGENTA: Color = (255, 0, 255);
pub const WHITE: Color = (255, 255, 255);

/// Colours shown by [`RgbLed::test`], in order
pub const TEST_SEQUENCE: [Color; 7] = [RED, GREEN, BLUE, YELLOW, CYAN, MAGENTA, WHITE];

const TEST_STEP: Duration = Duration::from_millis(500);

/// Mood shown on the LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Searching,
    Neutral,
}

impl Emotion {
    pub fn color(self) -> Color {
        match self {
            Emotion::Happy => GREEN,
            Emotion::Sad => BLUE,
            Emotion::Angry => RED,
            Emotion::Surprised => YELLOW,
            Emotion::Searching => CYAN,
            Emotion::Neutral => WHITE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::Searching => "searching",
            Emotion::Neutral => "neutral",
        }
    }
}

impl FromStr for Emotion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(Emotion::Happy),
            "sad" => Ok(Emotion::Sad),
            "angry" => Ok(Emotion::Angry),
            "surprised" => Ok(Emotion::Surprised),
            "searching" => Ok(Emotion::Searching),
            "neutral" => Ok(Emotion::Neutral),
            other => Err(Error::InvalidParameter(format!("unknown emotion '{}'", other))),
        }
    }
}

/// Duty cycle for one 8-bit colour component
pub fn component_to_duty(value: u8, common_anode: bool) -> u16 {
    let duty = u16::from(value) * 257;
    if common_anode {
        u16::MAX - duty
    } else {
        duty
    }
}

/// RGB LED
#[derive(Debug, Clone)]
pub struct RgbLed {
    channels: [u8; 3],
    common_anode: bool,
    current: Color,
}

impl RgbLed {
    pub fn new(red: u8, green: u8, blue: u8, common_anode: bool) -> Self {
        Self {
            channels: [red, green, blue],
            common_anode,
            current: OFF,
        }
    }

    /// Colour last written
    pub fn color(&self) -> Color {
        self.current
    }

    pub fn set_color(&mut self, pwm: &mut dyn PwmController, r: u8, g: u8, b: u8) -> Result<()> {
        for (channel, value) in self.channels.iter().zip([r, g, b]) {
            pwm.set_duty_cycle(*channel, component_to_duty(value, self.common_anode))?;
        }
        self.current = (r, g, b);
        Ok(())
    }

    pub fn set_emotion(&mut self, pwm: &mut dyn PwmController, emotion: Emotion) -> Result<()> {
        let (r, g, b) = emotion.color();
        log::debug!("LED: {}", emotion.name());
        self.set_color(pwm, r, g, b)
    }

    pub fn off(&mut self, pwm: &mut dyn PwmController) -> Result<()> {
        self.set_color(pwm, OFF.0, OFF.1, OFF.2)
    }

    /// Cycle through the named colours, then switch off
    pub fn test(&mut self, pwm: &mut dyn PwmController, clock: &dyn Clock) -> Result<()> {
        log::info!("Testing RGB LED...");
        for (r, g, b) in TEST_SEQUENCE {
            self.set_color(pwm, r, g, b)?;
            clock.sleep(TEST_STEP);
        }
        self.off(pwm)
    }
}
