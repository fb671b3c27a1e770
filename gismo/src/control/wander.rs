//! Wandering behaviour
//!
//! [`plan`] turns one [`Observation`] into the actuator steps for that tick.
//! It touches no hardware, so the decision logic is tested without a robot.
//!
//! Priority, highest first:
//!
//! | Condition | Reaction |
//! |-----------|----------|
//! | obstacle closer than threshold | stop, startle, turn a random way |
//! | left edge | turn right |
//! | right edge | turn left |
//! | otherwise | cruise forward |
//!
//! Sound and touch reactions run before the table above and do not replace it.

use crate::actuators::{Emotion, Sound};
use crate::config::MovementConfig;
use crate::robot::{Action, Observation};
use rand::Rng;
use std::time::Duration;

const STARTLE_PAUSE: Duration = Duration::from_millis(500);
const TOUCH_WIGGLE: Duration = Duration::from_millis(500);

/// Main reaction chosen for a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reaction {
    Obstacle { distance_cm: f64 },
    LeftEdge,
    RightEdge,
    Cruise,
}

/// What the robot does this tick
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub reaction: Reaction,
    pub heard_sound: bool,
    pub touched: bool,
    pub actions: Vec<Action>,
}

pub fn plan<R: Rng + ?Sized>(
    observation: &Observation,
    settings: &MovementConfig,
    rng: &mut R,
) -> Plan {
    let turn = settings.turn_duration();
    let mut actions = Vec::new();

    if observation.sound {
        actions.extend([
            Action::TurnLeft(turn * 2),
            Action::Forward(settings.forward_speed),
            Action::Emotion(Emotion::Surprised),
            Action::Play(Sound::ImperialMarch),
            Action::Pause(STARTLE_PAUSE),
            Action::Stop,
            Action::Emotion(Emotion::Neutral),
        ]);
    }

    if observation.touched {
        actions.extend([
            Action::Emotion(Emotion::Happy),
            Action::Wiggle(TOUCH_WIGGLE),
        ]);
    }

    // A failed measurement says nothing about obstacles
    let obstacle = observation
        .distance
        .as_ref()
        .ok()
        .copied()
        .filter(|d| *d < settings.obstacle_distance_cm);

    let reaction = if let Some(distance_cm) = obstacle {
        let escape = if rng.gen_bool(0.5) {
            Action::TurnLeft(turn)
        } else {
            Action::TurnRight(turn)
        };
        actions.extend([
            Action::Stop,
            Action::RaiseArms,
            Action::Pause(STARTLE_PAUSE),
            Action::HeadUp,
            Action::Emotion(Emotion::Surprised),
            Action::Play(Sound::Obstacle),
            Action::Pause(STARTLE_PAUSE),
            Action::HeadCenter,
            Action::LowerArms,
            escape,
        ]);
        Reaction::Obstacle { distance_cm }
    } else if observation.left_edge {
        actions.extend([
            Action::TurnRight(turn),
            Action::Emotion(Emotion::Angry),
            Action::Play(Sound::Edge),
        ]);
        Reaction::LeftEdge
    } else if observation.right_edge {
        actions.extend([
            Action::TurnLeft(turn),
            Action::Emotion(Emotion::Angry),
            Action::Play(Sound::Edge),
        ]);
        Reaction::RightEdge
    } else {
        actions.extend([
            Action::Drive {
                left: settings.forward_speed,
                right: settings.forward_speed,
            },
            Action::Emotion(Emotion::Searching),
        ]);
        Reaction::Cruise
    };

    Plan {
        reaction,
        heard_sound: observation.sound,
        touched: observation.touched,
        actions,
    }
}
