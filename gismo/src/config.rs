//! Configuration for Gismo
//!
//! Loads configuration from a TOML file. Every parameter has a default that
//! matches the stock Gismo wiring, so a config file only needs the values that
//! differ on a given robot.
//!
//! ```toml
//! [device]
//! type = "rpi"
//! name = "Gismo"
//!
//! [pins]
//! ultrasonic_trigger = 23
//! ultrasonic_echo = 24
//!
//! [movement]
//! obstacle_distance_cm = 25.0
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GismoConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub pins: PinConfig,
    #[serde(default)]
    pub pca: PcaConfig,
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub imu: ImuConfig,
    #[serde(default)]
    pub ultrasonic: UltrasonicConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub servo: ServoConfig,
    #[serde(default)]
    pub led: LedConfig,
    #[serde(default)]
    pub dead_reckoning: DeadReckoningConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub mock: MockConfig,
}

/// Device selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Backend: "rpi" (Raspberry Pi hardware) or "mock"
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,
    /// Human readable robot name used in log output
    #[serde(default = "default_device_name")]
    pub name: String,
}

/// BCM GPIO pin assignments
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PinConfig {
    #[serde(default = "default_ultrasonic_trigger")]
    pub ultrasonic_trigger: u8,
    #[serde(default = "default_ultrasonic_echo")]
    pub ultrasonic_echo: u8,
    #[serde(default = "default_left_edge")]
    pub left_edge: u8,
    #[serde(default = "default_right_edge")]
    pub right_edge: u8,
    #[serde(default = "default_touch")]
    pub touch: u8,
    #[serde(default = "default_sound")]
    pub sound: u8,
    #[serde(default = "default_buzzer")]
    pub buzzer: u8,
}

/// PCA9685 PWM controller
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PcaConfig {
    /// 7-bit I2C address (0x40 unless the address jumpers are bridged)
    #[serde(default = "default_pca_address")]
    pub i2c_address: u16,
    /// Output frequency in Hz, shared by servos, motors and LED
    #[serde(default = "default_pca_frequency")]
    pub frequency: f64,
}

/// PCA9685 channel map (0-15)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    #[serde(default = "default_ch_left_forward")]
    pub motor_left_forward: u8,
    #[serde(default = "default_ch_left_backward")]
    pub motor_left_backward: u8,
    #[serde(default = "default_ch_right_forward")]
    pub motor_right_forward: u8,
    #[serde(default = "default_ch_right_backward")]
    pub motor_right_backward: u8,
    #[serde(default = "default_ch_led_red")]
    pub led_red: u8,
    #[serde(default = "default_ch_led_green")]
    pub led_green: u8,
    #[serde(default = "default_ch_led_blue")]
    pub led_blue: u8,
    #[serde(default = "default_ch_left_arm")]
    pub servo_left_arm: u8,
    #[serde(default = "default_ch_right_arm")]
    pub servo_right_arm: u8,
    #[serde(default = "default_ch_head")]
    pub servo_head: u8,
}

/// MPU-6050 inertial sensor
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImuConfig {
    #[serde(default = "default_imu_address")]
    pub i2c_address: u16,
}

/// HC-SR04 timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UltrasonicConfig {
    /// Maximum wait for each echo edge in milliseconds
    #[serde(default = "default_echo_timeout_ms")]
    pub echo_timeout_ms: u64,
}

/// Wandering behaviour parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MovementConfig {
    /// Cruise speed as a fraction of full duty (0.0-1.0)
    #[serde(default = "default_forward_speed")]
    pub forward_speed: f64,
    /// In-place turn speed (0.0-1.0)
    #[serde(default = "default_turn_speed")]
    pub turn_speed: f64,
    /// Duration of an avoidance turn in seconds
    #[serde(default = "default_turn_duration")]
    pub turn_duration_s: f64,
    /// Obstacles closer than this trigger avoidance
    #[serde(default = "default_obstacle_distance")]
    pub obstacle_distance_cm: f64,
}

/// Longest avoidance turn `validate` accepts
pub const MAX_TURN_DURATION_S: f64 = 60.0;

impl MovementConfig {
    /// Avoidance turn length
    ///
    /// Values no `Duration` can hold (only reachable by skipping `validate`)
    /// become zero.
    pub fn turn_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.turn_duration_s).unwrap_or_default()
    }
}

/// Servo pulse limits and pose angles (degrees, 0-180)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServoConfig {
    #[serde(default = "default_servo_min_pulse")]
    pub min_pulse_us: f64,
    #[serde(default = "default_servo_max_pulse")]
    pub max_pulse_us: f64,
    #[serde(default = "default_left_arm_up")]
    pub left_arm_up: f64,
    #[serde(default = "default_left_arm_down")]
    pub left_arm_down: f64,
    #[serde(default = "default_right_arm_up")]
    pub right_arm_up: f64,
    #[serde(default = "default_right_arm_down")]
    pub right_arm_down: f64,
    #[serde(default = "default_head_up")]
    pub head_up: f64,
    #[serde(default = "default_head_down")]
    pub head_down: f64,
    #[serde(default = "default_head_center")]
    pub head_center: f64,
}

/// RGB LED wiring
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LedConfig {
    /// Common-anode LEDs are lit by pulling the channel low
    #[serde(default)]
    pub common_anode: bool,
}

/// Dead-reckoning bias terms
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeadReckoningConfig {
    /// Static accelerometer bias [x, y] in m/s², subtracted before integration
    #[serde(default)]
    pub accel_bias: [f64; 2],
    /// Static gyro Z bias in °/s
    #[serde(default)]
    pub gyro_bias_z: f64,
    /// Stationary samples averaged at startup to estimate the biases (0 = off)
    #[serde(default)]
    pub calibration_samples: usize,
}

/// Control loop timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    #[serde(default = "default_loop_period_ms")]
    pub loop_period_ms: u64,
    /// Interval between pose log lines while wandering
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
    /// Play the startup sound, sweep servos and cycle the LED at boot
    #[serde(default = "default_true")]
    pub startup_self_test: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Scripted values for the mock device
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MockConfig {
    /// Distance the mock echo reports, in centimeters (negative = no echo)
    #[serde(default = "default_mock_distance")]
    pub distance_cm: f64,
    /// Delay between trigger and echo rise in microseconds
    #[serde(default = "default_mock_echo_delay")]
    pub echo_delay_us: u64,
    #[serde(default = "default_mock_accel")]
    pub accel: [f64; 3],
    #[serde(default)]
    pub gyro: [f64; 3],
    /// Gaussian noise standard deviation for accel (m/s²)
    #[serde(default)]
    pub accel_stddev: f64,
    /// Gaussian noise standard deviation for gyro (°/s)
    #[serde(default)]
    pub gyro_stddev: f64,
    /// Noise seed (0 = random each run)
    #[serde(default = "default_mock_seed")]
    pub random_seed: u64,
}

// Default value functions
fn default_device_type() -> String {
    "rpi".to_string()
}
fn default_device_name() -> String {
    "Gismo".to_string()
}
fn default_ultrasonic_trigger() -> u8 {
    23
}
fn default_ultrasonic_echo() -> u8 {
    24
}
fn default_left_edge() -> u8 {
    17
}
fn default_right_edge() -> u8 {
    27
}
fn default_touch() -> u8 {
    22
}
fn default_sound() -> u8 {
    25
}
fn default_buzzer() -> u8 {
    18
}
fn default_pca_address() -> u16 {
    0x40
}
fn default_pca_frequency() -> f64 {
    50.0
}
fn default_ch_left_forward() -> u8 {
    0
}
fn default_ch_left_backward() -> u8 {
    1
}
fn default_ch_right_forward() -> u8 {
    2
}
fn default_ch_right_backward() -> u8 {
    3
}
fn default_ch_led_red() -> u8 {
    4
}
fn default_ch_led_green() -> u8 {
    5
}
fn default_ch_led_blue() -> u8 {
    6
}
fn default_ch_left_arm() -> u8 {
    8
}
fn default_ch_right_arm() -> u8 {
    9
}
fn default_ch_head() -> u8 {
    10
}
fn default_imu_address() -> u16 {
    0x68
}
fn default_echo_timeout_ms() -> u64 {
    20
}
fn default_forward_speed() -> f64 {
    0.6
}
fn default_turn_speed() -> f64 {
    0.5
}
fn default_turn_duration() -> f64 {
    0.5
}
fn default_obstacle_distance() -> f64 {
    20.0
}
fn default_servo_min_pulse() -> f64 {
    500.0
}
fn default_servo_max_pulse() -> f64 {
    2500.0
}
fn default_left_arm_up() -> f64 {
    160.0
}
fn default_left_arm_down() -> f64 {
    20.0
}
fn default_right_arm_up() -> f64 {
    20.0
}
fn default_right_arm_down() -> f64 {
    160.0
}
fn default_head_up() -> f64 {
    120.0
}
fn default_head_down() -> f64 {
    60.0
}
fn default_head_center() -> f64 {
    90.0
}
fn default_loop_period_ms() -> u64 {
    100
}
fn default_report_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_mock_distance() -> f64 {
    100.0
}
fn default_mock_echo_delay() -> u64 {
    450
}
fn default_mock_accel() -> [f64; 3] {
    [0.0, 0.0, 9.80665]
}
fn default_mock_seed() -> u64 {
    42
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            name: default_device_name(),
        }
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            ultrasonic_trigger: default_ultrasonic_trigger(),
            ultrasonic_echo: default_ultrasonic_echo(),
            left_edge: default_left_edge(),
            right_edge: default_right_edge(),
            touch: default_touch(),
            sound: default_sound(),
            buzzer: default_buzzer(),
        }
    }
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            i2c_address: default_pca_address(),
            frequency: default_pca_frequency(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            motor_left_forward: default_ch_left_forward(),
            motor_left_backward: default_ch_left_backward(),
            motor_right_forward: default_ch_right_forward(),
            motor_right_backward: default_ch_right_backward(),
            led_red: default_ch_led_red(),
            led_green: default_ch_led_green(),
            led_blue: default_ch_led_blue(),
            servo_left_arm: default_ch_left_arm(),
            servo_right_arm: default_ch_right_arm(),
            servo_head: default_ch_head(),
        }
    }
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            i2c_address: default_imu_address(),
        }
    }
}

impl Default for UltrasonicConfig {
    fn default() -> Self {
        Self {
            echo_timeout_ms: default_echo_timeout_ms(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            forward_speed: default_forward_speed(),
            turn_speed: default_turn_speed(),
            turn_duration_s: default_turn_duration(),
            obstacle_distance_cm: default_obstacle_distance(),
        }
    }
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: default_servo_min_pulse(),
            max_pulse_us: default_servo_max_pulse(),
            left_arm_up: default_left_arm_up(),
            left_arm_down: default_left_arm_down(),
            right_arm_up: default_right_arm_up(),
            right_arm_down: default_right_arm_down(),
            head_up: default_head_up(),
            head_down: default_head_down(),
            head_center: default_head_center(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            loop_period_ms: default_loop_period_ms(),
            report_interval_ms: default_report_interval_ms(),
            startup_self_test: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            distance_cm: default_mock_distance(),
            echo_delay_us: default_mock_echo_delay(),
            accel: default_mock_accel(),
            gyro: [0.0, 0.0, 0.0],
            accel_stddev: 0.0,
            gyro_stddev: 0.0,
            random_seed: default_mock_seed(),
        }
    }
}

impl GismoConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use gismo::config::GismoConfig;
    ///
    /// let config = GismoConfig::load("gismo.toml")?;
    /// # Ok::<(), gismo::Error>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: GismoConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let c = &self.channels;
        for (name, ch) in [
            ("motor_left_forward", c.motor_left_forward),
            ("motor_left_backward", c.motor_left_backward),
            ("motor_right_forward", c.motor_right_forward),
            ("motor_right_backward", c.motor_right_backward),
            ("led_red", c.led_red),
            ("led_green", c.led_green),
            ("led_blue", c.led_blue),
            ("servo_left_arm", c.servo_left_arm),
            ("servo_right_arm", c.servo_right_arm),
            ("servo_head", c.servo_head),
        ] {
            if ch > 15 {
                return Err(Error::Config(format!(
                    "channels.{} = {} (PCA9685 has channels 0-15)",
                    name, ch
                )));
            }
        }

        let m = &self.movement;
        if !(0.0..=1.0).contains(&m.forward_speed) || !(0.0..=1.0).contains(&m.turn_speed) {
            return Err(Error::Config(
                "movement speeds must be within 0.0-1.0".to_string(),
            ));
        }
        if !(0.0..=MAX_TURN_DURATION_S).contains(&m.turn_duration_s) {
            return Err(Error::Config(format!(
                "movement.turn_duration_s = {} (must be within 0-{} s)",
                m.turn_duration_s, MAX_TURN_DURATION_S
            )));
        }

        if self.ultrasonic.echo_timeout_ms == 0 {
            return Err(Error::Config(
                "ultrasonic.echo_timeout_ms must be positive".to_string(),
            ));
        }

        let s = &self.servo;
        if s.min_pulse_us >= s.max_pulse_us {
            return Err(Error::Config(format!(
                "servo.min_pulse_us ({}) must be below servo.max_pulse_us ({})",
                s.min_pulse_us, s.max_pulse_us
            )));
        }
        for (name, angle) in [
            ("left_arm_up", s.left_arm_up),
            ("left_arm_down", s.left_arm_down),
            ("right_arm_up", s.right_arm_up),
            ("right_arm_down", s.right_arm_down),
            ("head_up", s.head_up),
            ("head_down", s.head_down),
            ("head_center", s.head_center),
        ] {
            if !(0.0..=180.0).contains(&angle) {
                return Err(Error::Config(format!(
                    "servo.{} = {} (servo angles are 0-180 degrees)",
                    name, angle
                )));
            }
        }

        if !(24.0..=1526.0).contains(&self.pca.frequency) {
            return Err(Error::Config(format!(
                "pca.frequency = {} Hz (supported range 24-1526 Hz)",
                self.pca.frequency
            )));
        }

        if self.control.loop_period_ms == 0 {
            return Err(Error::Config(
                "control.loop_period_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Load `path`, falling back to built-in defaults if the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/gismo.toml";

/// Command line options shared by the binaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: String,
    /// Force the mock device regardless of `device.type`
    pub mock: bool,
}

impl CliArgs {
    /// Parse arguments (without the program name)
    ///
    /// Supports:
    /// - `gismo <path>` (positional)
    /// - `gismo --config <path>` / `gismo -c <path>`
    /// - `--mock` anywhere
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut config_path = None;
        let mut positional = None;
        let mut mock = false;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    if let Some(path) = iter.next() {
                        config_path = Some(path.clone());
                    }
                }
                "--mock" => mock = true,
                other if !other.starts_with('-') && positional.is_none() => {
                    positional = Some(other.to_string());
                }
                _ => {}
            }
        }

        Self {
            config_path: config_path
                .or(positional)
                .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string()),
            mock,
        }
    }

    /// Load the configuration these arguments point at
    pub fn load_config(&self) -> Result<GismoConfig> {
        let mut config = GismoConfig::load_or_default(&self.config_path)?;
        if self.mock {
            config.device.device_type = "mock".to_string();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GismoConfig::default();
        assert_eq!(config.device.device_type, "rpi");
        assert_eq!(config.pins.ultrasonic_trigger, 23);
        assert_eq!(config.pins.ultrasonic_echo, 24);
        assert_eq!(config.ultrasonic.echo_timeout_ms, 20);
        assert_eq!(config.pca.i2c_address, 0x40);
        assert_eq!(config.control.loop_period_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_serialization() {
        let config = GismoConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[device]"));
        assert!(toml_string.contains("[pins]"));
        assert!(toml_string.contains("[movement]"));
        assert!(toml_string.contains("[dead_reckoning]"));
        assert!(toml_string.contains("type = \"rpi\""));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_content = r#"
[device]
type = "mock"

[movement]
obstacle_distance_cm = 35.0

[dead_reckoning]
gyro_bias_z = 0.25
"#;

        let config: GismoConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.device.device_type, "mock");
        assert_eq!(config.device.name, "Gismo");
        assert_eq!(config.movement.obstacle_distance_cm, 35.0);
        assert_eq!(config.movement.forward_speed, 0.6);
        assert_eq!(config.dead_reckoning.gyro_bias_z, 0.25);
        assert_eq!(config.dead_reckoning.accel_bias, [0.0, 0.0]);
        assert_eq!(config.pins.buzzer, 18);
    }

    #[test]
    fn test_validate_rejects_bad_channel() {
        let mut config = GismoConfig::default();
        config.channels.servo_head = 16;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_servo_limits() {
        let mut config = GismoConfig::default();
        config.servo.min_pulse_us = 2600.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_speed_out_of_range() {
        let mut config = GismoConfig::default();
        config.movement.forward_speed = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_pose_out_of_range() {
        let config: GismoConfig = toml::from_str("[servo]\nleft_arm_up = 200.0").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        for pose in [-1.0, 180.5, f64::NAN] {
            let mut config = GismoConfig::default();
            config.servo.head_center = pose;
            assert!(config.validate().is_err(), "head_center = {}", pose);
        }

        let mut config = GismoConfig::default();
        config.servo.right_arm_down = 180.0;
        config.servo.head_down = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_huge_turn_duration() {
        let config: GismoConfig = toml::from_str("[movement]\nturn_duration_s = 1e30").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = GismoConfig::default();
        config.movement.turn_duration_s = MAX_TURN_DURATION_S;
        assert!(config.validate().is_ok());
        config.movement.turn_duration_s = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_turn_duration_never_panics() {
        let mut movement = MovementConfig::default();
        movement.turn_duration_s = 1e30;
        assert_eq!(movement.turn_duration(), Duration::ZERO);
        movement.turn_duration_s = 1.5;
        assert_eq!(movement.turn_duration(), Duration::from_millis(1500));
    }

    #[test]
    fn test_validate_rejects_zero_echo_timeout() {
        let mut config = GismoConfig::default();
        config.ultrasonic.echo_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml_maps_to_config_error() {
        let err: Error = toml::from_str::<GismoConfig>("[pins]\nbuzzer = \"x\"")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_cli_args() {
        let args = CliArgs::parse(Vec::<String>::new());
        assert_eq!(args.config_path, DEFAULT_CONFIG_PATH);
        assert!(!args.mock);

        assert_eq!(CliArgs::parse(["robot.toml"]).config_path, "robot.toml");
        let args = CliArgs::parse(["--mock", "-c", "a.toml", "b.toml"]);
        assert_eq!(args.config_path, "a.toml");
        assert!(args.mock);
        assert_eq!(
            CliArgs::parse(["--config", "x.toml"]).config_path,
            "x.toml"
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let args = CliArgs::parse(["/nonexistent/gismo.toml", "--mock"]);
        let config = args.load_config().unwrap();
        assert_eq!(config.device.device_type, "mock");
        assert_eq!(config.pins.buzzer, 18);
    }

    #[test]
    fn test_save_and_load_round_trip_file() {
        let path = std::env::temp_dir().join(format!("gismo-config-{}.toml", std::process::id()));
        let mut config = GismoConfig::default();
        config.movement.obstacle_distance_cm = 42.0;
        config.to_file(&path).unwrap();

        let loaded = GismoConfig::load(&path).unwrap();
        assert_eq!(loaded.movement.obstacle_distance_cm, 42.0);
        let _ = fs::remove_file(&path);
    }
}
