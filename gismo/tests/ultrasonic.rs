//! Distance sampling against the mock device
//!
//! Exercises the HC-SR04 path the way the daemon wires it: config, mock
//! driver, robot. Time is simulated, so timeouts run instantly.
//!
//! Run with: `cargo test --test ultrasonic`

use approx::assert_abs_diff_eq;
use gismo::core::driver::DeviceDriver;
use gismo::core::hal::Gpio;
use gismo::devices::mock::{EchoResponse, EchoScript, MockClock, MockDriver};
use gismo::sensors::{EchoPhase, DISTANCE_SENTINEL_CM, SOUND_CM_PER_S};
use gismo::{DistanceError, DistanceSampler, GismoConfig, Robot};
use std::sync::Arc;
use std::time::Duration;

fn mock_config(distance_cm: f64) -> GismoConfig {
    let mut config = GismoConfig::default();
    config.device.device_type = "mock".to_string();
    config.control.startup_self_test = false;
    config.mock.distance_cm = distance_cm;
    config
}

fn robot(config: GismoConfig) -> (Robot, MockDriver, MockClock) {
    let clock = MockClock::new();
    let mut driver = MockDriver::with_clock(&config, Arc::new(clock.clone()));
    let mut robot = Robot::new(config, driver.initialize().unwrap());
    robot.initialize().unwrap();
    (robot, driver, clock)
}

/// Expected reading for an echo pulse of `width`
fn expected_cm(width: Duration) -> f64 {
    (width.as_secs_f64() * SOUND_CM_PER_S * 100.0).round() / 100.0
}

#[test]
fn test_distance_follows_echo_width() {
    // Simulated time steps 1 µs per clock read, so the measured width is a
    // few microseconds off the scripted one: 0.1 cm covers it.
    for distance in [2.0, 15.5, 34.3, 120.0, 300.0] {
        let (mut robot, _driver, _clock) = robot(mock_config(distance));
        let measured = robot.measure_distance();
        assert_abs_diff_eq!(measured, distance, epsilon = 0.1);
    }
}

#[test]
fn test_two_millisecond_echo_reads_34_3_cm() {
    let width = Duration::from_millis(2);
    assert_abs_diff_eq!(expected_cm(width), 34.3, epsilon = 1e-9);

    let (mut robot, _driver, _clock) = robot(mock_config(34.3));
    assert_abs_diff_eq!(robot.measure_distance(), 34.3, epsilon = 0.1);
}

#[test]
fn test_readings_are_rounded_to_two_decimals() {
    let (mut robot, _driver, _clock) = robot(mock_config(57.123_456));
    let measured = robot.measure_distance();
    assert_abs_diff_eq!(measured * 100.0, (measured * 100.0).round(), epsilon = 1e-6);
}

#[test]
fn test_missing_echo_returns_sentinel() {
    let (mut robot, _driver, clock) = robot(mock_config(-1.0));

    let start = clock.peek();
    assert_eq!(robot.measure_distance(), DISTANCE_SENTINEL_CM);
    let elapsed = clock.peek() - start;

    // Rise timeout of 20 ms plus the trigger pulse, never a hang
    assert!(elapsed >= Duration::from_millis(20));
    assert!(elapsed < Duration::from_millis(25));
}

#[test]
fn test_configured_timeout_is_honoured() {
    let mut config = mock_config(-1.0);
    config.ultrasonic.echo_timeout_ms = 35;
    let (mut robot, _driver, clock) = robot(config);

    let start = clock.peek();
    assert_eq!(robot.measure_distance(), DISTANCE_SENTINEL_CM);
    let elapsed = clock.peek() - start;
    assert!(elapsed >= Duration::from_millis(35));
    assert!(elapsed < Duration::from_millis(40));
}

#[test]
fn test_observation_carries_typed_timeout() {
    let (mut robot, driver, _clock) = robot(mock_config(50.0));
    let config = robot.config().clone();
    driver.gpio().set_echo(EchoScript {
        trigger: config.pins.ultrasonic_trigger,
        echo: config.pins.ultrasonic_echo,
        response: EchoResponse::StuckHigh {
            delay: Duration::from_micros(200),
        },
    });

    let observation = robot.observe();
    assert_eq!(
        observation.distance,
        Err(DistanceError::MeasurementTimeout(EchoPhase::Fall))
    );
}

#[test]
fn test_gpio_fault_is_reported_not_propagated() {
    let (mut robot, driver, _clock) = robot(mock_config(50.0));
    driver.gpio().fail_pin(robot.config().pins.ultrasonic_echo);

    assert!(matches!(
        robot.observe().distance,
        Err(DistanceError::HardwareAccessFault(_))
    ));
    assert_eq!(robot.measure_distance(), DISTANCE_SENTINEL_CM);
}

#[test]
fn test_consecutive_measurements_are_independent() {
    let clock = MockClock::new();
    let config = mock_config(80.0);
    let mut driver = MockDriver::with_clock(&config, Arc::new(clock.clone()));
    let mut hardware = driver.initialize().unwrap();
    let sampler = DistanceSampler::new(
        config.pins.ultrasonic_trigger,
        config.pins.ultrasonic_echo,
    );
    sampler.initialize(hardware.gpio.as_mut()).unwrap();

    let first = sampler.measure(hardware.gpio.as_mut(), &clock).unwrap();
    driver.gpio().set_echo(EchoScript {
        trigger: config.pins.ultrasonic_trigger,
        echo: config.pins.ultrasonic_echo,
        response: EchoResponse::Reflect {
            delay: Duration::from_micros(300),
            distance_cm: 12.0,
        },
    });
    let second = sampler.measure(hardware.gpio.as_mut(), &clock).unwrap();

    assert_abs_diff_eq!(first, 80.0, epsilon = 0.1);
    assert_abs_diff_eq!(second, 12.0, epsilon = 0.1);
    assert!(driver.gpio().rising_edges(config.pins.ultrasonic_trigger) >= 2);
    assert!(hardware.gpio.read_level(config.pins.ultrasonic_echo).is_ok());
}
