//! Passive buzzer driven by a software square wave on one GPIO pin

use crate::core::hal::{Clock, Gpio, Level};
use crate::error::Result;
use std::time::Duration;

/// One note of a tune; a frequency of 0 is a rest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency: f64,
    pub duration: Duration,
}

impl Note {
    pub const fn new(frequency: f64, millis: u64) -> Self {
        Self {
            frequency,
            duration: Duration::from_millis(millis),
        }
    }

    pub const fn rest(millis: u64) -> Self {
        Self::new(0.0, millis)
    }
}

// Note frequencies (Hz)
const C4: f64 = 261.63;
const E4: f64 = 329.63;
const F4: f64 = 349.23;
const G4: f64 = 392.00;
const GS4: f64 = 415.30;
const A4: f64 = 440.00;
const C5: f64 = 523.25;
const E5: f64 = 659.25;
const F5: f64 = 698.46;
const G5: f64 = 783.99;

pub const STARTUP: &[Note] = &[
    Note::new(C4, 120),
    Note::new(E4, 120),
    Note::new(G4, 120),
    Note::new(C5, 250),
];

pub const SHUTDOWN: &[Note] = &[
    Note::new(C5, 120),
    Note::new(G4, 120),
    Note::new(E4, 120),
    Note::new(C4, 250),
];

pub const OBSTACLE: &[Note] = &[Note::new(G5, 100), Note::rest(50), Note::new(G5, 100)];

pub const EDGE: &[Note] = &[Note::new(C4, 200), Note::new(F4, 150)];

pub const IMPERIAL_MARCH: &[Note] = &[
    Note::new(A4, 500),
    Note::new(A4, 500),
    Note::new(A4, 500),
    Note::new(F4, 350),
    Note::new(C5, 150),
    Note::new(A4, 500),
    Note::new(F4, 350),
    Note::new(C5, 150),
    Note::new(A4, 650),
    Note::rest(150),
    Note::new(E5, 500),
    Note::new(E5, 500),
    Note::new(E5, 500),
    Note::new(F5, 350),
    Note::new(C5, 150),
    Note::new(GS4, 500),
    Note::new(F4, 350),
    Note::new(C5, 150),
    Note::new(A4, 650),
];

/// Silence between consecutive notes
const NOTE_GAP: Duration = Duration::from_millis(30);

/// Named sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Startup,
    Shutdown,
    Obstacle,
    Edge,
    ImperialMarch,
}

impl Sound {
    pub fn notes(self) -> &'static [Note] {
        match self {
            Sound::Startup => STARTUP,
            Sound::Shutdown => SHUTDOWN,
            Sound::Obstacle => OBSTACLE,
            Sound::Edge => EDGE,
            Sound::ImperialMarch => IMPERIAL_MARCH,
        }
    }
}

/// Buzzer on a GPIO output
#[derive(Debug, Clone)]
pub struct Buzzer {
    pin: u8,
}

impl Buzzer {
    pub fn new(pin: u8) -> Self {
        Self { pin }
    }

    pub fn initialize(&self, gpio: &mut dyn Gpio) -> Result<()> {
        gpio.setup_output(self.pin)
    }

    /// Square wave at `frequency` Hz for `duration`; blocks until done
    pub fn play_tone(
        &self,
        gpio: &mut dyn Gpio,
        clock: &dyn Clock,
        frequency: f64,
        duration: Duration,
    ) -> Result<()> {
        if !frequency.is_finite() || frequency <= 0.0 {
            clock.sleep(duration);
            return Ok(());
        }

        let half_period = Duration::from_secs_f64(0.5 / frequency);
        // Whole cycles only; the remainder is silence
        let cycles = (duration.as_secs_f64() * frequency + 1e-9).floor() as u32;
        for _ in 0..cycles {
            gpio.set_level(self.pin, Level::High)?;
            clock.sleep(half_period);
            gpio.set_level(self.pin, Level::Low)?;
            clock.sleep(half_period);
        }
        clock.sleep(duration.saturating_sub(half_period * 2 * cycles));
        Ok(())
    }

    pub fn play_tune(&self, gpio: &mut dyn Gpio, clock: &dyn Clock, notes: &[Note]) -> Result<()> {
        for note in notes {
            self.play_tone(gpio, clock, note.frequency, note.duration)?;
            clock.sleep(NOTE_GAP);
        }
        Ok(())
    }

    pub fn play(&self, gpio: &mut dyn Gpio, clock: &dyn Clock, sound: Sound) -> Result<()> {
        log::debug!("Buzzer: {:?}", sound);
        self.play_tune(gpio, clock, sound.notes())
    }
}
