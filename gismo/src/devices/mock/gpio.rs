//! Scripted GPIO controller
//!
//! Input pins hold whatever level the test sets. The ultrasonic echo pin is
//! driven by an [`EchoScript`] that reacts to the trigger pulse.

use crate::core::hal::{Clock, Gpio, Level};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Speed of sound used to turn a scripted distance into a pulse width (cm/s)
const SOUND_CM_PER_S: f64 = 17150.0;

/// How the echo line answers a trigger pulse
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EchoResponse {
    /// Rise `delay` after the trigger's falling edge and stay high for the
    /// round trip time of `distance_cm`
    Reflect { delay: Duration, distance_cm: f64 },
    /// Never rise
    Silent,
    /// Rise after `delay` and never fall
    StuckHigh { delay: Duration },
}

/// Binds an [`EchoResponse`] to the trigger and echo pins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoScript {
    pub trigger: u8,
    pub echo: u8,
    pub response: EchoResponse,
}

impl EchoScript {
    /// Echo pulse width for the scripted response
    pub fn pulse_width(&self) -> Option<Duration> {
        match self.response {
            EchoResponse::Reflect { distance_cm, .. } => {
                Some(Duration::from_secs_f64(distance_cm.max(0.0) / SOUND_CM_PER_S))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Input,
    Output,
}

struct GpioState {
    modes: HashMap<u8, Mode>,
    outputs: HashMap<u8, Level>,
    inputs: HashMap<u8, Level>,
    history: Vec<(Duration, u8, Level)>,
    echo: Option<EchoScript>,
    trigger_fell_at: Option<Duration>,
    failing: HashSet<u8>,
    fail_all: bool,
    cleaned_up: bool,
}

/// Mock [`Gpio`] implementation
///
/// Clones share state, so a test can hand one handle to the robot and keep
/// another to script inputs and inspect outputs.
#[derive(Clone)]
pub struct MockGpio {
    state: Arc<Mutex<GpioState>>,
    clock: Arc<dyn Clock>,
}

impl MockGpio {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(GpioState {
                modes: HashMap::new(),
                outputs: HashMap::new(),
                inputs: HashMap::new(),
                history: Vec::new(),
                echo: None,
                trigger_fell_at: None,
                failing: HashSet::new(),
                fail_all: false,
                cleaned_up: false,
            })),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GpioState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Level an input pin reads from now on
    pub fn set_input(&self, pin: u8, level: Level) {
        self.lock().inputs.insert(pin, level);
    }

    /// Install (or replace) the echo script
    pub fn set_echo(&self, script: EchoScript) {
        let mut state = self.lock();
        state.echo = Some(script);
        state.trigger_fell_at = None;
    }

    /// Make every access to `pin` fail
    pub fn fail_pin(&self, pin: u8) {
        self.lock().failing.insert(pin);
    }

    /// Make every access to any pin fail
    pub fn set_failing(&self, failing: bool) {
        self.lock().fail_all = failing;
    }

    /// Last level driven on an output pin
    pub fn output_level(&self, pin: u8) -> Option<Level> {
        self.lock().outputs.get(&pin).copied()
    }

    /// Every `(time, level)` driven on `pin`, oldest first
    pub fn output_history(&self, pin: u8) -> Vec<(Duration, Level)> {
        self.lock()
            .history
            .iter()
            .filter(|(_, p, _)| *p == pin)
            .map(|&(t, _, level)| (t, level))
            .collect()
    }

    /// Number of rising edges driven on `pin`
    pub fn rising_edges(&self, pin: u8) -> usize {
        let history = self.output_history(pin);
        history
            .windows(2)
            .filter(|w| w[0].1.is_low() && w[1].1.is_high())
            .count()
            + usize::from(history.first().is_some_and(|&(_, l)| l.is_high()))
    }

    pub fn is_output(&self, pin: u8) -> bool {
        self.lock().modes.get(&pin) == Some(&Mode::Output)
    }

    pub fn is_input(&self, pin: u8) -> bool {
        self.lock().modes.get(&pin) == Some(&Mode::Input)
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.lock().cleaned_up
    }

    fn check_fault(state: &GpioState, pin: u8) -> Result<()> {
        if state.fail_all || state.failing.contains(&pin) {
            return Err(Error::Gpio(format!("mock fault on pin {}", pin)));
        }
        Ok(())
    }

    fn echo_level(script: &EchoScript, fell_at: Option<Duration>, now: Duration) -> Level {
        let Some(fell_at) = fell_at else {
            return Level::Low;
        };
        match script.response {
            EchoResponse::Silent => Level::Low,
            EchoResponse::StuckHigh { delay } => Level::from(now >= fell_at + delay),
            EchoResponse::Reflect { delay, .. } => {
                let rise = fell_at + delay;
                let fall = rise + script.pulse_width().unwrap_or_default();
                Level::from(now >= rise && now < fall)
            }
        }
    }
}

impl Gpio for MockGpio {
    fn setup_output(&mut self, pin: u8) -> Result<()> {
        let now = self.clock.now();
        let mut state = self.lock();
        Self::check_fault(&state, pin)?;
        state.modes.insert(pin, Mode::Output);
        state.outputs.insert(pin, Level::Low);
        state.history.push((now, pin, Level::Low));
        state.cleaned_up = false;
        Ok(())
    }

    fn setup_input(&mut self, pin: u8) -> Result<()> {
        let mut state = self.lock();
        Self::check_fault(&state, pin)?;
        state.modes.insert(pin, Mode::Input);
        state.cleaned_up = false;
        Ok(())
    }

    fn set_level(&mut self, pin: u8, level: Level) -> Result<()> {
        let now = self.clock.now();
        let mut state = self.lock();
        Self::check_fault(&state, pin)?;
        if state.modes.get(&pin) != Some(&Mode::Output) {
            return Err(Error::PinNotConfigured(pin));
        }

        let previous = state.outputs.insert(pin, level);
        state.history.push((now, pin, level));

        let is_trigger = state.echo.is_some_and(|s| s.trigger == pin);
        if is_trigger && previous == Some(Level::High) && level.is_low() {
            state.trigger_fell_at = Some(now);
        }
        Ok(())
    }

    fn read_level(&mut self, pin: u8) -> Result<Level> {
        let now = self.clock.now();
        let state = self.lock();
        Self::check_fault(&state, pin)?;
        if state.modes.get(&pin) != Some(&Mode::Input) {
            return Err(Error::PinNotConfigured(pin));
        }

        if let Some(script) = state.echo.filter(|s| s.echo == pin) {
            return Ok(Self::echo_level(&script, state.trigger_fell_at, now));
        }
        Ok(state.inputs.get(&pin).copied().unwrap_or(Level::Low))
    }

    fn cleanup(&mut self) {
        let mut state = self.lock();
        state.modes.clear();
        state.cleaned_up = true;
    }
}
