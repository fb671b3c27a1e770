//! Robot context
//!
//! Owns every hardware handle and every component built on top of them.
//! Constructed once in `main` from the [`Hardware`] a device driver hands
//! over, then passed by `&mut` to the control loop.

use crate::actuators::{Buzzer, Emotion, Motor, Movement, RgbLed, ServoRig, Sound};
use crate::config::GismoConfig;
use crate::core::driver::Hardware;
use crate::core::hal::{Clock, Gpio, ImuDriver, PwmController};
use crate::error::Result;
use crate::odometry::{Bias, BiasEstimator, DeadReckoning, PoseEstimate};
use crate::sensors::{DistanceError, DistanceSampler, EdgeSensors, SoundSensor, TouchSensor};
use std::sync::Arc;
use std::time::Duration;

/// Spacing of the stationary samples taken for bias calibration
const CALIBRATION_INTERVAL: Duration = Duration::from_millis(10);

/// One poll of every sensor the control loop reacts to
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub distance: std::result::Result<f64, DistanceError>,
    pub left_edge: bool,
    pub right_edge: bool,
    pub touched: bool,
    pub sound: bool,
}

impl Observation {
    /// Nothing detected, obstacle at `distance_cm`
    pub fn clear(distance_cm: f64) -> Self {
        Self {
            distance: Ok(distance_cm),
            left_edge: false,
            right_edge: false,
            touched: false,
            sound: false,
        }
    }
}

/// A single actuator step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Stop,
    /// Per-side speeds in `-1.0..=1.0`
    Drive { left: f64, right: f64 },
    Forward(f64),
    Backward(f64),
    TurnLeft(Duration),
    TurnRight(Duration),
    Wiggle(Duration),
    RaiseArms,
    LowerArms,
    HeadUp,
    HeadDown,
    HeadCenter,
    Emotion(Emotion),
    LedOff,
    Play(Sound),
    Pause(Duration),
}

/// The robot: hardware plus the components driving it
pub struct Robot {
    config: GismoConfig,
    gpio: Box<dyn Gpio>,
    pwm: Box<dyn PwmController>,
    imu: Box<dyn ImuDriver>,
    clock: Arc<dyn Clock>,

    sampler: DistanceSampler,
    edges: EdgeSensors,
    touch: TouchSensor,
    sound: SoundSensor,

    movement: Movement,
    servos: ServoRig,
    led: RgbLed,
    buzzer: Buzzer,

    dead_reckoning: DeadReckoning,
    cleaned_up: bool,
}

impl Robot {
    pub fn new(config: GismoConfig, hardware: Hardware) -> Self {
        let Hardware {
            gpio,
            pwm,
            imu,
            clock,
        } = hardware;
        let pins = &config.pins;
        let ch = &config.channels;
        let mv = &config.movement;

        let sampler = DistanceSampler::with_timeout(
            pins.ultrasonic_trigger,
            pins.ultrasonic_echo,
            Duration::from_millis(config.ultrasonic.echo_timeout_ms),
        );
        let movement = Movement::new(
            Motor::new(ch.motor_left_forward, ch.motor_left_backward),
            Motor::new(ch.motor_right_forward, ch.motor_right_backward),
            mv.forward_speed,
            mv.turn_speed,
            mv.turn_duration(),
        );
        let dead_reckoning =
            DeadReckoning::with_bias(Arc::clone(&clock), Bias::from(&config.dead_reckoning));

        Self {
            sampler,
            edges: EdgeSensors::new(pins.left_edge, pins.right_edge),
            touch: TouchSensor::new(pins.touch),
            sound: SoundSensor::new(pins.sound),
            movement,
            servos: ServoRig::new(ch, &config.servo),
            led: RgbLed::new(ch.led_red, ch.led_green, ch.led_blue, config.led.common_anode),
            buzzer: Buzzer::new(pins.buzzer),
            dead_reckoning,
            gpio,
            pwm,
            imu,
            clock,
            config,
            cleaned_up: false,
        }
    }

    /// Configure pins and peripherals, calibrate and run the self-test
    pub fn initialize(&mut self) -> Result<()> {
        let gpio = self.gpio.as_mut();
        self.sampler.initialize(gpio)?;
        self.edges.initialize(gpio)?;
        self.touch.initialize(gpio)?;
        self.sound.initialize(gpio)?;
        self.buzzer.initialize(gpio)?;

        self.pwm.set_frequency(self.config.pca.frequency)?;
        self.movement.stop_all_motors(self.pwm.as_mut())?;
        self.servos.initialize(self.pwm.as_mut())?;

        let samples = self.config.dead_reckoning.calibration_samples;
        if samples > 0 {
            log::info!("Calibrating IMU bias, keep the robot still...");
            let bias = BiasEstimator::new(samples).collect(
                self.imu.as_mut(),
                self.clock.as_ref(),
                CALIBRATION_INTERVAL,
            )?;
            self.dead_reckoning.set_bias(bias);
        }

        if self.config.control.startup_self_test {
            let clock = self.clock.as_ref();
            self.buzzer.play(self.gpio.as_mut(), clock, Sound::Startup)?;
            self.servos.test_servos(self.pwm.as_mut(), clock)?;
            self.led.test(self.pwm.as_mut(), clock)?;
        }

        self.cleaned_up = false;
        log::info!("{} initialized", self.config.device.name);
        Ok(())
    }

    /// Poll every sensor once
    ///
    /// Failed digital reads are logged and count as "not triggered".
    pub fn observe(&mut self) -> Observation {
        let gpio = self.gpio.as_mut();
        let distance = self.sampler.measure(gpio, self.clock.as_ref());
        if let Err(e) = &distance {
            log::warn!("Error reading distance: {}", e);
        }

        let (left_edge, right_edge) = self.edges.read(gpio).unwrap_or_else(|e| {
            log::warn!("Error reading edge sensors: {}", e);
            (false, false)
        });
        let touched = self.touch.is_touched(gpio).unwrap_or_else(|e| {
            log::warn!("Error reading touch sensor: {}", e);
            false
        });
        let sound = self.sound.is_sound_detected(gpio).unwrap_or_else(|e| {
            log::warn!("Error reading sound sensor: {}", e);
            false
        });

        Observation {
            distance,
            left_edge,
            right_edge,
            touched,
            sound,
        }
    }

    /// Distance in centimeters, 999.99 on failure
    pub fn measure_distance(&mut self) -> f64 {
        self.sampler
            .measure_distance(self.gpio.as_mut(), self.clock.as_ref())
    }

    /// Feed one IMU sample to the estimator; a failed read is logged and skipped
    pub fn update_dead_reckoning(&mut self) {
        if let Err(e) = self.dead_reckoning.update_from_imu(self.imu.as_mut()) {
            log::warn!("Dead reckoning update skipped: {}", e);
        }
    }

    pub fn pose(&self) -> PoseEstimate {
        self.dead_reckoning.pose()
    }

    pub fn dead_reckoning(&self) -> &DeadReckoning {
        &self.dead_reckoning
    }

    pub fn config(&self) -> &GismoConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// LED colour last written
    pub fn led_color(&self) -> (u8, u8, u8) {
        self.led.color()
    }

    pub fn execute(&mut self, action: Action) -> Result<()> {
        let pwm = self.pwm.as_mut();
        let clock = self.clock.as_ref();
        match action {
            Action::Stop => self.movement.stop_all_motors(pwm),
            Action::Drive { left, right } => self.movement.drive(pwm, left, right),
            Action::Forward(speed) => self.movement.move_forward(pwm, speed),
            Action::Backward(speed) => self.movement.move_backward(pwm, speed),
            Action::TurnLeft(d) => self.movement.turn_left_in_place(pwm, clock, d),
            Action::TurnRight(d) => self.movement.turn_right_in_place(pwm, clock, d),
            Action::Wiggle(d) => self.movement.wiggle(pwm, clock, d),
            Action::RaiseArms => self.servos.raise_arms(pwm),
            Action::LowerArms => self.servos.lower_arms(pwm),
            Action::HeadUp => self.servos.move_head_up(pwm),
            Action::HeadDown => self.servos.move_head_down(pwm),
            Action::HeadCenter => self.servos.move_head_center(pwm),
            Action::Emotion(emotion) => self.led.set_emotion(pwm, emotion),
            Action::LedOff => self.led.off(pwm),
            Action::Play(sound) => self.buzzer.play(self.gpio.as_mut(), clock, sound),
            Action::Pause(d) => {
                clock.sleep(d);
                Ok(())
            }
        }
    }

    /// Execute `actions` in order, stopping at the first failure
    pub fn execute_all(&mut self, actions: &[Action]) -> Result<()> {
        actions.iter().try_for_each(|&action| self.execute(action))
    }

    /// Execute every action in `actions`, logging failures and carrying on
    ///
    /// A faulty servo or buzzer must not cancel the motion steps that follow
    /// it. Returns the number of actions that failed.
    pub fn execute_each(&mut self, actions: &[Action]) -> usize {
        let mut failed = 0;
        for &action in actions {
            if let Err(e) = self.execute(action) {
                log::warn!("{:?} failed: {}", action, e);
                failed += 1;
            }
        }
        failed
    }

    /// Stop motors, switch the LED and PWM outputs off and release GPIO
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        if let Err(e) = self.movement.stop_all_motors(self.pwm.as_mut()) {
            log::warn!("Motors may not have stopped: {}", e);
        }
        if let Err(e) = self.led.off(self.pwm.as_mut()) {
            log::warn!("Failed to switch LED off: {}", e);
        }
        if let Err(e) = self.pwm.deinit() {
            log::warn!("Failed to release PWM controller: {}", e);
        }
        self.gpio.cleanup();
        self.cleaned_up = true;
        log::info!("Hardware released");
    }
}

impl Drop for Robot {
    fn drop(&mut self) {
        self.cleanup();
    }
}
