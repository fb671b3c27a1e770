//! Dead-reckoning accuracy tests
//!
//! Synthetic IMU sequences with known closed-form answers:
//!
//! | Scenario | Expected |
//! |----------|----------|
//! | Stationary, no bias | pose stays at origin |
//! | 90 °/s for 1 s | heading 90° |
//! | -90 °/s for 1 s | heading 270° (wrapped) |
//! | 1 m/s² for 1 s in small steps | x ≈ ½·a·t² |
//! | Constant gyro bias, matching correction | heading stays 0 |
//!
//! Run with: `cargo test --test dead_reckoning`

use approx::{assert_abs_diff_eq, assert_relative_eq};
use gismo::core::driver::DeviceDriver;
use gismo::devices::mock::{MockClock, MockDriver, MockImu};
use gismo::odometry::{Bias, BiasEstimator};
use gismo::{DeadReckoning, GismoConfig, PoseEstimate, Robot};
use std::sync::Arc;
use std::time::Duration;

fn estimator() -> DeadReckoning {
    DeadReckoning::new(Arc::new(MockClock::new()))
}

/// Feed `steps` identical samples spaced `dt` apart after a baseline at t=0
fn integrate(dr: &mut DeadReckoning, accel: [f64; 2], gyro_z: f64, dt: Duration, steps: u32) {
    dr.update_at(accel[0], accel[1], gyro_z, Duration::ZERO);
    for i in 1..=steps {
        dr.update_at(accel[0], accel[1], gyro_z, dt * i);
    }
}

#[test]
fn test_stationary_robot_does_not_drift() {
    let mut dr = estimator();
    integrate(&mut dr, [0.0, 0.0], 0.0, Duration::from_millis(10), 1000);
    assert_eq!(dr.pose(), PoseEstimate::default());
}

#[test]
fn test_rotation_in_place() {
    let mut dr = estimator();
    integrate(&mut dr, [0.0, 0.0], 90.0, Duration::from_millis(10), 100);

    assert_relative_eq!(dr.heading(), 90.0, epsilon = 1e-6);
    let (x, y) = dr.position();
    assert_eq!((x, y), (0.0, 0.0));
}

#[test]
fn test_negative_rotation_wraps() {
    let mut dr = estimator();
    integrate(&mut dr, [0.0, 0.0], -90.0, Duration::from_millis(10), 100);
    assert_relative_eq!(dr.heading(), 270.0, epsilon = 1e-6);
}

#[test]
fn test_full_turns_stay_in_range() {
    let mut dr = estimator();
    integrate(&mut dr, [0.0, 0.0], 720.0, Duration::from_millis(5), 250);
    let heading = dr.heading();
    assert!((0.0..360.0).contains(&heading), "heading {}", heading);
    // 720 °/s for 1.25 s = 900° = 180° after wrapping
    assert_abs_diff_eq!(heading, 180.0, epsilon = 1e-6);
}

#[test]
fn test_constant_acceleration_small_steps() {
    let mut dr = estimator();
    let a = 1.0;
    let steps = 1000;
    integrate(&mut dr, [a, 0.0], 0.0, Duration::from_millis(1), steps);

    // Semi-implicit Euler: x = a·dt²·N(N+1)/2, within 0.1% of ½·a·t²
    let (x, y) = dr.position();
    assert_relative_eq!(x, 0.5 * a * 1.0 * 1.0, max_relative = 2e-3);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
}

#[test]
fn test_single_one_second_step() {
    let mut dr = estimator();
    integrate(&mut dr, [1.0, 0.0], 0.0, Duration::from_secs(1), 1);
    let (x, y) = dr.position();
    assert_relative_eq!(x, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
}

#[test]
fn test_acceleration_follows_heading() {
    let mut dr = estimator();
    // Turn to 90° first, then push along the body x axis
    integrate(&mut dr, [0.0, 0.0], 90.0, Duration::from_millis(10), 100);
    for i in 101..=200u32 {
        dr.update_at(1.0, 0.0, 0.0, Duration::from_millis(10) * i);
    }

    let (x, y) = dr.position();
    assert_abs_diff_eq!(x, 0.0, epsilon = 1e-6);
    assert!(y > 0.45 && y < 0.56, "y = {}", y);
}

#[test]
fn test_gyro_bias_correction() {
    let clock = Arc::new(MockClock::new());
    let bias = Bias {
        accel: [0.02, -0.01],
        gyro_z: 0.8,
    };
    let mut dr = DeadReckoning::with_bias(clock, bias);
    integrate(&mut dr, [0.02, -0.01], 0.8, Duration::from_millis(10), 500);

    assert_abs_diff_eq!(dr.heading(), 0.0, epsilon = 1e-9);
    let (x, y) = dr.position();
    assert_abs_diff_eq!(x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
}

#[test]
fn test_mock_imu_drives_estimator() {
    // Each clock read advances 10 ms, one read per update
    let clock = Arc::new(MockClock::with_step(Duration::from_millis(10)));
    let mut dr = DeadReckoning::new(clock);
    let mut imu = MockImu::new([0.0, 0.0, 9.80665], [0.0, 0.0, 45.0]);

    for _ in 0..=100 {
        dr.update_from_imu(&mut imu).unwrap();
    }
    assert_relative_eq!(dr.heading(), 45.0, epsilon = 1e-6);
}

#[test]
fn test_estimated_bias_cancels_noisy_drift() {
    let clock = MockClock::new();
    let mut imu = MockImu::with_noise([0.05, -0.03, 9.8], [0.0, 0.0, 1.5], 0.01, 0.05, 7);

    let bias = BiasEstimator::new(500)
        .collect(&mut imu, &clock, Duration::from_millis(10))
        .unwrap();
    assert_abs_diff_eq!(bias.gyro_z, 1.5, epsilon = 0.02);
    assert_abs_diff_eq!(bias.accel[0], 0.05, epsilon = 0.005);
    assert_abs_diff_eq!(bias.accel[1], -0.03, epsilon = 0.005);

    let mut uncorrected = DeadReckoning::new(Arc::new(clock.clone()));
    let mut corrected = DeadReckoning::with_bias(Arc::new(clock.clone()), bias);
    for _ in 0..200 {
        clock.advance(Duration::from_millis(10));
        uncorrected.update_from_imu(&mut imu).unwrap();
        corrected.update_from_imu(&mut imu).unwrap();
    }

    let drift = |h: f64| h.min(360.0 - h);
    assert!(drift(corrected.heading()) < drift(uncorrected.heading()));
    assert!(drift(corrected.heading()) < 0.5);
}

#[test]
fn test_robot_calibrates_at_startup() {
    let mut config = GismoConfig::default();
    config.device.device_type = "mock".to_string();
    config.control.startup_self_test = false;
    config.dead_reckoning.calibration_samples = 50;
    config.mock.gyro = [0.0, 0.0, 2.0];

    let clock = MockClock::new();
    let mut driver = MockDriver::with_clock(&config, Arc::new(clock.clone()));
    let mut robot = Robot::new(config, driver.initialize().unwrap());
    robot.initialize().unwrap();

    assert_relative_eq!(robot.dead_reckoning().bias().gyro_z, 2.0, epsilon = 1e-9);
    for _ in 0..100 {
        clock.advance(Duration::from_millis(10));
        robot.update_dead_reckoning();
    }
    assert_abs_diff_eq!(robot.pose().heading_degrees, 0.0, epsilon = 1e-9);
}

#[test]
fn test_failed_reads_are_skipped() {
    let mut config = GismoConfig::default();
    config.control.startup_self_test = false;

    let clock = MockClock::with_step(Duration::from_millis(10));
    let mut driver = MockDriver::with_clock(&config, Arc::new(clock));
    let mut robot = Robot::new(config, driver.initialize().unwrap());
    robot.initialize().unwrap();
    driver.imu().set_gyro([0.0, 0.0, 10.0]);

    robot.update_dead_reckoning();
    driver.imu().set_failing(true);
    robot.update_dead_reckoning();
    assert_eq!(robot.pose(), PoseEstimate::default());
    assert!(robot.dead_reckoning().is_tracking());

    driver.imu().set_failing(false);
    robot.update_dead_reckoning();
    assert!(robot.pose().heading_degrees > 0.0);
}
