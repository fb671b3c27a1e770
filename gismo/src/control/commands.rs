//! Operator commands read line by line from stdin

use crate::actuators::{Emotion, Sound};
use crate::config::MovementConfig;
use crate::robot::Action;
use std::time::Duration;

/// Default length of a `wiggle`
pub const WIGGLE_DURATION: Duration = Duration::from_millis(500);

pub const HELP_TEXT: &str = "Available commands: forward, backward, left, right, stop, wiggle, \
happy, sad, angry, surprised, searching, neutral, arms up, arms down, head up, head down, \
head center, play tune, get position, help, exit, start, stop";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
    Wiggle,
    Emotion(Emotion),
    ArmsUp,
    ArmsDown,
    HeadUp,
    HeadDown,
    HeadCenter,
    PlayTune,
    GetPosition,
    Help,
    Exit,
    Start,
    Unknown(String),
}

impl Command {
    /// Parse one input line; `None` for a blank line
    ///
    /// Matching ignores case and surrounding whitespace, and runs of
    /// whitespace between words.
    pub fn parse(line: &str) -> Option<Command> {
        let normalized = line
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        let command = match normalized.as_str() {
            "forward" => Command::Forward,
            "backward" => Command::Backward,
            "left" => Command::Left,
            "right" => Command::Right,
            "stop" => Command::Stop,
            "wiggle" => Command::Wiggle,
            "arms up" => Command::ArmsUp,
            "arms down" => Command::ArmsDown,
            "head up" => Command::HeadUp,
            "head down" => Command::HeadDown,
            "head center" => Command::HeadCenter,
            "play tune" => Command::PlayTune,
            "get position" => Command::GetPosition,
            "help" => Command::Help,
            "exit" => Command::Exit,
            "start" => Command::Start,
            other => match other.parse::<Emotion>() {
                Ok(emotion) => Command::Emotion(emotion),
                Err(_) => Command::Unknown(line.trim().to_string()),
            },
        };
        Some(command)
    }

    /// Actuator steps for commands that only move hardware
    ///
    /// `None` for commands the control loop handles itself (mode changes,
    /// queries and unknown input).
    pub fn actions(&self, movement: &MovementConfig) -> Option<Vec<Action>> {
        let turn = movement.turn_duration();
        let actions = match self {
            Command::Forward => vec![Action::Forward(movement.forward_speed)],
            Command::Backward => vec![Action::Backward(movement.forward_speed)],
            Command::Left => vec![Action::TurnLeft(turn)],
            Command::Right => vec![Action::TurnRight(turn)],
            Command::Stop => vec![Action::Stop],
            Command::Wiggle => vec![Action::Wiggle(WIGGLE_DURATION)],
            Command::Emotion(emotion) => vec![Action::Emotion(*emotion)],
            Command::ArmsUp => vec![Action::RaiseArms],
            Command::ArmsDown => vec![Action::LowerArms],
            Command::HeadUp => vec![Action::HeadUp],
            Command::HeadDown => vec![Action::HeadDown],
            Command::HeadCenter => vec![Action::HeadCenter],
            Command::PlayTune => vec![Action::Play(Sound::ImperialMarch)],
            Command::GetPosition
            | Command::Help
            | Command::Exit
            | Command::Start
            | Command::Unknown(_) => return None,
        };
        Some(actions)
    }
}
