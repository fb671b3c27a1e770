//! Control loop for the Gismo daemon
//!
//! Runs the wandering behaviour and the operator command shell on one
//! thread. Stdin lines arrive over a channel from a reader thread, so the
//! loop never blocks on input.

use crate::actuators::{Emotion, Sound};
use crate::control::commands::{Command, HELP_TEXT};
use crate::control::wander::{self, Reaction};
use crate::error::{Error, Result};
use crate::robot::{Action, Robot};
use crossbeam_channel::Receiver;
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Operating mode of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Autonomous: avoid obstacles and edges, cruise otherwise
    Wandering,
    /// Idle until the operator sends commands
    Command,
}

/// Whether the loop keeps going after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Spawn the named thread that forwards stdin lines to the control loop
///
/// The thread ends at EOF or once the receiver is dropped.
pub fn spawn_stdin_reader() -> Result<Receiver<String>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
            debug!("stdin reader finished");
        })
        .map_err(|e| Error::Other(format!("Failed to spawn stdin reader: {}", e)))?;
    Ok(rx)
}

/// Gismo application: robot, mode and operator output
///
/// Replies to operator commands go to `out` (stdout in the daemon).
pub struct App<W: Write = io::Stdout> {
    robot: Robot,
    mode: Mode,
    rng: SmallRng,
    out: W,
    last_report: Duration,
}

impl App<io::Stdout> {
    pub fn new(robot: Robot) -> Self {
        Self::with_output(robot, io::stdout(), SmallRng::from_entropy())
    }
}

impl<W: Write> App<W> {
    pub fn with_output(robot: Robot, out: W, rng: SmallRng) -> Self {
        let last_report = robot.clock().now();
        Self {
            robot,
            mode: Mode::Wandering,
            rng,
            out,
            last_report,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Loop until `exit`, Ctrl-C (`running` cleared) or an output failure
    pub fn run(&mut self, commands: &Receiver<String>, running: &AtomicBool) -> Result<()> {
        let period = Duration::from_millis(self.robot.config().control.loop_period_ms);
        writeln!(
            self.out,
            "Gismo is in wandering mode. Type 'stop' to enter command mode."
        )?;

        let result = loop {
            if !running.load(Ordering::Relaxed) {
                info!("Received shutdown signal");
                break Ok(());
            }
            let lines: Vec<String> = commands.try_iter().collect();
            match self.tick(lines) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break Ok(()),
                Err(e) => break Err(e),
            }
            self.robot.clock().sleep(period);
        };

        self.shutdown()?;
        result
    }

    /// One loop iteration: wander (if wandering), then handle queued input
    pub fn tick<I>(&mut self, lines: I) -> Result<Flow>
    where
        I: IntoIterator<Item = String>,
    {
        if self.mode == Mode::Wandering {
            self.wander_step();
        }

        for line in lines {
            if self.handle_line(&line)? == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    fn wander_step(&mut self) {
        self.robot.update_dead_reckoning();
        let observation = self.robot.observe();

        let now = self.robot.clock().now();
        let interval = Duration::from_millis(self.robot.config().control.report_interval_ms);
        if now.saturating_sub(self.last_report) >= interval {
            info!("{}", self.robot.pose());
            self.last_report = now;
        }

        let plan = wander::plan(&observation, &self.robot.config().movement, &mut self.rng);
        if plan.heard_sound {
            info!("Sound detected! Reacting...");
        }
        if plan.touched {
            info!("Touch detected!");
        }
        match plan.reaction {
            Reaction::Obstacle { distance_cm } => {
                info!("Obstacle detected at {:.2} cm!", distance_cm)
            }
            Reaction::LeftEdge => info!("Left edge detected! Turning right..."),
            Reaction::RightEdge => info!("Right edge detected! Turning left..."),
            Reaction::Cruise => {}
        }

        let failed = self.robot.execute_each(&plan.actions);
        if failed > 0 {
            warn!("Wandering step: {} of {} actions failed", failed, plan.actions.len());
        }
    }

    /// Act on one stdin line
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let Some(command) = Command::parse(line) else {
            return Ok(Flow::Continue);
        };

        match command {
            Command::Exit => return Ok(Flow::Exit),
            Command::Stop => {
                self.mode = Mode::Command;
                self.run_actions(&[Action::Stop, Action::Emotion(Emotion::Neutral)]);
                writeln!(
                    self.out,
                    "Entering command mode. Type 'start' to resume wandering."
                )?;
            }
            Command::Start => {
                self.mode = Mode::Wandering;
                self.run_actions(&[Action::Emotion(Emotion::Searching)]);
                writeln!(self.out, "Resuming wandering...")?;
            }
            _ if self.mode == Mode::Wandering => {
                writeln!(
                    self.out,
                    "Command ignored in wandering mode. Type 'stop' to enter command mode."
                )?;
            }
            Command::GetPosition => {
                writeln!(self.out, "{}", self.robot.pose())?;
            }
            Command::Help => {
                writeln!(self.out, "{}", HELP_TEXT)?;
            }
            Command::Unknown(input) => {
                debug!("Unknown command '{}'", input);
                writeln!(self.out, "Invalid command.")?;
            }
            other => {
                if let Some(actions) = other.actions(&self.robot.config().movement) {
                    self.run_actions(&actions);
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn run_actions(&mut self, actions: &[Action]) {
        if let Err(e) = self.robot.execute_all(actions) {
            warn!("Command failed: {}", e);
        }
    }

    /// Stop motors, switch the LED off, play the shutdown sound and release
    /// the hardware
    pub fn shutdown(&mut self) -> Result<()> {
        writeln!(self.out, "Stopping motors and exiting...")?;
        self.run_actions(&[Action::Stop, Action::LedOff, Action::Play(Sound::Shutdown)]);
        self.robot.cleanup();
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GismoConfig;
    use crate::core::driver::DeviceDriver;
    use crate::devices::mock::{MockClock, MockDriver};
    use std::sync::Arc;

    fn app() -> (App<Vec<u8>>, MockDriver) {
        let mut config = GismoConfig::default();
        config.control.startup_self_test = false;
        let clock = MockClock::new();
        let mut driver = MockDriver::with_clock(&config, Arc::new(clock));
        let mut robot = Robot::new(config, driver.initialize().unwrap());
        robot.initialize().unwrap();
        (
            App::with_output(robot, Vec::new(), SmallRng::seed_from_u64(9)),
            driver,
        )
    }

    fn output(app: &App<Vec<u8>>) -> String {
        String::from_utf8_lossy(app.output()).into_owned()
    }

    #[test]
    fn test_starts_wandering() {
        let (mut app, _) = app();
        assert_eq!(app.mode(), Mode::Wandering);
        assert_eq!(app.tick(Vec::new()).unwrap(), Flow::Continue);
        assert!(app.robot().dead_reckoning().is_tracking());
    }

    #[test]
    fn test_commands_ignored_while_wandering() {
        let (mut app, _) = app();
        app.handle_line("happy").unwrap();
        assert!(output(&app).contains("Command ignored in wandering mode"));
        assert_ne!(app.robot().led_color(), Emotion::Happy.color());
    }

    #[test]
    fn test_stop_start_and_commands() {
        let (mut app, _) = app();
        app.handle_line("STOP").unwrap();
        assert_eq!(app.mode(), Mode::Command);
        assert_eq!(app.robot().led_color(), Emotion::Neutral.color());

        app.handle_line("happy").unwrap();
        assert_eq!(app.robot().led_color(), Emotion::Happy.color());

        app.handle_line("get position").unwrap();
        app.handle_line("help").unwrap();
        app.handle_line("fly").unwrap();
        let text = output(&app);
        assert!(text.contains("Position (X, Y): (0.00, 0.00), Heading: 0.00 degrees"));
        assert!(text.contains("Available commands:"));
        assert!(text.contains("Invalid command."));

        app.handle_line("start").unwrap();
        assert_eq!(app.mode(), Mode::Wandering);
    }

    #[test]
    fn test_command_mode_skips_sensing() {
        let (mut app, _) = app();
        app.handle_line("stop").unwrap();
        app.tick(Vec::new()).unwrap();
        assert!(!app.robot().dead_reckoning().is_tracking());
    }

    #[test]
    fn test_exit_from_either_mode() {
        let (mut app, _) = app();
        assert_eq!(
            app.tick(vec!["exit".to_string(), "stop".to_string()]).unwrap(),
            Flow::Exit
        );
        // Lines after exit are not processed
        assert_eq!(app.mode(), Mode::Wandering);
    }

    #[test]
    fn test_run_until_exit_then_shutdown() {
        let (mut app, driver) = app();
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send("exit".to_string()).unwrap();
        let running = AtomicBool::new(true);

        app.run(&rx, &running).unwrap();

        assert!(output(&app).contains("Stopping motors and exiting..."));
        assert_eq!(app.robot().led_color(), (0, 0, 0));
        assert!(driver.gpio().is_cleaned_up());
    }

    #[test]
    fn test_run_stops_when_flag_cleared() {
        let (mut app, _) = app();
        let (_tx, rx) = crossbeam_channel::unbounded::<String>();
        let running = AtomicBool::new(false);
        app.run(&rx, &running).unwrap();
        assert!(output(&app).contains("Stopping motors and exiting..."));
    }
}
