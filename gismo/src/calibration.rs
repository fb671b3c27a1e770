//! Interactive servo calibration
//!
//! Input handling for the `servo-calibration` tool. The binary only reads
//! lines and forwards them here, then writes the resulting pulse width to
//! the PWM controller.
//!
//! ```text
//! > calibrate 8          enter a session on channel 8
//!   u / d                pulse ±50 µs (500-2500)
//!   s, then min / max    store the current pulse as a limit
//!   q                    leave the session
//! > set 8 90             move channel 8 to 90°
//! > q                    quit
//! ```

use crate::actuators::servo::{pulse_to_duty, PulseRange};
use crate::error::{Error, Result};

pub const PULSE_STEP_US: f64 = 50.0;
pub const PULSE_FLOOR_US: f64 = 500.0;
pub const PULSE_CEILING_US: f64 = 2500.0;
pub const MAX_CHANNEL: u8 = 15;

pub const TOP_PROMPT: &str = "Enter 'calibrate' followed by the channel number (e.g., calibrate 0), \
'set' followed by channel and angle (e.g., set 0 90), or 'q' to quit: ";

/// Top-level tool command
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCommand {
    Calibrate(u8),
    Set { channel: u8, angle: f64 },
    Quit,
}

fn parse_channel(token: &str) -> Result<u8> {
    let channel: u8 = token
        .parse()
        .map_err(|_| Error::InvalidParameter(format!("'{}' is not a channel number", token)))?;
    if channel > MAX_CHANNEL {
        return Err(Error::InvalidParameter(
            "Invalid channel number. Must be between 0 and 15.".to_string(),
        ));
    }
    Ok(channel)
}

impl ToolCommand {
    pub fn parse(line: &str) -> Result<ToolCommand> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [q] if q.eq_ignore_ascii_case("q") => Ok(ToolCommand::Quit),
            [cmd, rest @ ..] if cmd.eq_ignore_ascii_case("calibrate") => match rest {
                [channel] => Ok(ToolCommand::Calibrate(parse_channel(channel)?)),
                _ => Err(Error::InvalidParameter(
                    "Invalid command format. Use 'calibrate <channel>'.".to_string(),
                )),
            },
            [cmd, rest @ ..] if cmd.eq_ignore_ascii_case("set") => match rest {
                [channel, angle] => {
                    let channel = parse_channel(channel)?;
                    let angle: f64 = angle.parse().map_err(|_| {
                        Error::InvalidParameter(
                            "Invalid command format. Use 'set <channel> <angle>'.".to_string(),
                        )
                    })?;
                    Ok(ToolCommand::Set { channel, angle })
                }
                _ => Err(Error::InvalidParameter(
                    "Invalid command format. Use 'set <channel> <angle>'.".to_string(),
                )),
            },
            _ => Err(Error::InvalidParameter("Invalid command.".to_string())),
        }
    }
}

/// Result of feeding one line to a [`CalibrationSession`]
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReply {
    pub lines: Vec<String>,
    pub finished: bool,
}

impl SessionReply {
    fn say(lines: Vec<String>) -> Self {
        Self {
            lines,
            finished: false,
        }
    }
}

/// Calibration of one servo channel
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    channel: u8,
    pulse_us: f64,
    range: PulseRange,
    awaiting_limit: bool,
}

impl CalibrationSession {
    /// Start at the midpoint of `range`
    pub fn new(channel: u8, range: PulseRange) -> Self {
        Self {
            channel,
            pulse_us: ((range.min_us + range.max_us) / 2.0).floor(),
            range,
            awaiting_limit: false,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn pulse_us(&self) -> f64 {
        self.pulse_us
    }

    /// Limits as adjusted so far
    pub fn range(&self) -> PulseRange {
        self.range
    }

    /// Angle the current pulse maps to under the current limits
    pub fn estimated_angle(&self) -> i32 {
        self.range.pulse_to_angle(self.pulse_us)
    }

    /// Duty cycle for the current pulse at `frequency` Hz
    pub fn duty(&self, frequency: f64) -> u16 {
        pulse_to_duty(self.pulse_us, frequency)
    }

    pub fn prompt(&self) -> &'static str {
        if self.awaiting_limit {
            "Set as minimum (min) or maximum (max)? "
        } else {
            "Enter command (u/d/s/q): "
        }
    }

    fn status(&self) -> String {
        format!(
            "Current pulse: {}, Estimated angle: {}",
            self.pulse_us,
            self.estimated_angle()
        )
    }

    pub fn handle(&mut self, input: &str) -> SessionReply {
        let input = input.trim().to_ascii_lowercase();

        if self.awaiting_limit {
            self.awaiting_limit = false;
            let message = match input.as_str() {
                "min" if self.pulse_us < self.range.max_us => {
                    self.range.min_us = self.pulse_us;
                    format!("Minimum pulse width set to: {}", self.pulse_us)
                }
                "max" if self.pulse_us > self.range.min_us => {
                    self.range.max_us = self.pulse_us;
                    format!("Maximum pulse width set to: {}", self.pulse_us)
                }
                "min" | "max" => "Minimum must stay below maximum.".to_string(),
                _ => "Invalid limit type.".to_string(),
            };
            return SessionReply::say(vec![message, self.status()]);
        }

        match input.as_str() {
            "u" => {
                self.pulse_us = (self.pulse_us + PULSE_STEP_US).min(PULSE_CEILING_US);
                SessionReply::say(vec![self.status()])
            }
            "d" => {
                self.pulse_us = (self.pulse_us - PULSE_STEP_US).max(PULSE_FLOOR_US);
                SessionReply::say(vec![self.status()])
            }
            "s" => {
                self.awaiting_limit = true;
                SessionReply::say(Vec::new())
            }
            "q" => SessionReply {
                lines: vec!["Exiting calibration.".to_string()],
                finished: true,
            },
            _ => SessionReply::say(vec!["Invalid command.".to_string(), self.status()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CalibrationSession {
        CalibrationSession::new(8, PulseRange::new(500.0, 2500.0))
    }

    #[test]
    fn test_parse_tool_commands() {
        assert_eq!(ToolCommand::parse("calibrate 3").unwrap(), ToolCommand::Calibrate(3));
        assert_eq!(
            ToolCommand::parse("set 0 90").unwrap(),
            ToolCommand::Set {
                channel: 0,
                angle: 90.0
            }
        );
        assert_eq!(ToolCommand::parse(" Q ").unwrap(), ToolCommand::Quit);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ToolCommand::parse("calibrate 16").is_err());
        assert!(ToolCommand::parse("calibrate").is_err());
        assert!(ToolCommand::parse("set 1").is_err());
        assert!(ToolCommand::parse("set 1 abc").is_err());
        assert!(ToolCommand::parse("spin").is_err());
    }

    #[test]
    fn test_session_starts_at_midpoint() {
        let s = session();
        assert_eq!(s.pulse_us(), 1500.0);
        assert_eq!(s.estimated_angle(), 90);
        assert_eq!(s.duty(50.0), 4915);
    }

    #[test]
    fn test_steps_are_clamped() {
        let mut s = session();
        for _ in 0..30 {
            s.handle("u");
        }
        assert_eq!(s.pulse_us(), PULSE_CEILING_US);
        for _ in 0..60 {
            s.handle("D");
        }
        assert_eq!(s.pulse_us(), PULSE_FLOOR_US);
    }

    #[test]
    fn test_set_limit_recomputes_angle() {
        let mut s = session();
        s.handle("u");
        s.handle("u");
        let reply = s.handle("s");
        assert!(reply.lines.is_empty());
        assert_eq!(s.prompt(), "Set as minimum (min) or maximum (max)? ");

        let reply = s.handle("max");
        assert_eq!(reply.lines[0], "Maximum pulse width set to: 1600");
        assert_eq!(s.range().max_us, 1600.0);
        assert_eq!(s.estimated_angle(), 180);
        assert_eq!(s.prompt(), "Enter command (u/d/s/q): ");
    }

    #[test]
    fn test_invalid_limit_and_quit() {
        let mut s = session();
        s.handle("s");
        let reply = s.handle("middle");
        assert_eq!(reply.lines[0], "Invalid limit type.");
        assert!(!reply.finished);

        assert!(s.handle("q").finished);
    }
}
