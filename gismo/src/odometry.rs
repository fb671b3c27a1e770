//! IMU dead reckoning
//!
//! Integrates planar acceleration and yaw rate into a 2D pose. There is no
//! wheel odometry and no correction, so drift grows without bound; the
//! estimate is only meaningful over short runs.
//!
//! # Update step
//!
//! ```text
//! dt       = now - previous                  (first update: baseline only)
//! heading += (gyro_z - bias_gz) · dt         (degrees)
//! a_world  = R(heading) · (accel - bias_a)   (updated heading)
//! v       += a_world · dt
//! p       += v · dt                          (semi-implicit Euler)
//! heading  = heading mod 360
//! ```

use crate::config::DeadReckoningConfig;
use crate::core::hal::{Clock, ImuDriver};
use crate::core::types::ImuData;
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Position (meters) and heading (degrees, `[0, 360)`)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseEstimate {
    pub x: f64,
    pub y: f64,
    pub heading_degrees: f64,
}

impl std::fmt::Display for PoseEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Position (X, Y): ({:.2}, {:.2}), Heading: {:.2} degrees",
            self.x, self.y, self.heading_degrees
        )
    }
}

/// Static sensor offsets subtracted before integration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bias {
    /// Accelerometer [x, y] in m/s²
    pub accel: [f64; 2],
    /// Gyroscope z in °/s
    pub gyro_z: f64,
}

impl From<&DeadReckoningConfig> for Bias {
    fn from(config: &DeadReckoningConfig) -> Self {
        Self {
            accel: config.accel_bias,
            gyro_z: config.gyro_bias_z,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct VelocityState {
    vx: f64,
    vy: f64,
}

/// Dead-reckoning estimator
pub struct DeadReckoning {
    clock: Arc<dyn Clock>,
    bias: Bias,
    pose: PoseEstimate,
    velocity: VelocityState,
    /// `None` until the first update sets the time baseline
    previous: Option<Duration>,
}

impl DeadReckoning {
    /// Estimator at the zero pose with no bias correction
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_bias(clock, Bias::default())
    }

    pub fn with_bias(clock: Arc<dyn Clock>, bias: Bias) -> Self {
        Self {
            clock,
            bias,
            pose: PoseEstimate::default(),
            velocity: VelocityState::default(),
            previous: None,
        }
    }

    pub fn bias(&self) -> Bias {
        self.bias
    }

    /// Replace the bias terms; the pose is kept
    pub fn set_bias(&mut self, bias: Bias) {
        self.bias = bias;
    }

    /// Integrate one sample stamped with the estimator's clock
    ///
    /// `accel_x`/`accel_y` in m/s², `gyro_z` in °/s.
    pub fn update(&mut self, accel_x: f64, accel_y: f64, gyro_z: f64) {
        let now = self.clock.now();
        self.update_at(accel_x, accel_y, gyro_z, now);
    }

    /// Integrate one sample taken at monotonic time `now`
    pub fn update_at(&mut self, accel_x: f64, accel_y: f64, gyro_z: f64, now: Duration) {
        let Some(previous) = self.previous.replace(now) else {
            log::debug!("Dead reckoning: time baseline set at {:?}", now);
            return;
        };
        let dt = now.saturating_sub(previous).as_secs_f64();

        let heading = self.pose.heading_degrees + (gyro_z - self.bias.gyro_z) * dt;

        let ax = accel_x - self.bias.accel[0];
        let ay = accel_y - self.bias.accel[1];
        let (sin, cos) = heading.to_radians().sin_cos();
        let world_x = ax * cos - ay * sin;
        let world_y = ax * sin + ay * cos;

        self.velocity.vx += world_x * dt;
        self.velocity.vy += world_y * dt;
        self.pose.x += self.velocity.vx * dt;
        self.pose.y += self.velocity.vy * dt;
        self.pose.heading_degrees = wrap_degrees(heading);

        log::trace!(
            "Dead reckoning: dt={:.4}s v=({:.3}, {:.3}) {}",
            dt,
            self.velocity.vx,
            self.velocity.vy,
            self.pose
        );
    }

    /// Read the IMU and integrate the sample
    ///
    /// On a failed read the estimator is left untouched, including its time
    /// baseline, and [`Error::SensorRead`] is returned.
    pub fn update_from_imu(&mut self, imu: &mut dyn ImuDriver) -> Result<()> {
        let data = imu.read().map_err(|e| match e {
            Error::SensorRead(msg) => Error::SensorRead(msg),
            other => Error::SensorRead(other.to_string()),
        })?;
        self.update(data.accel[0], data.accel[1], data.gyro[2]);
        Ok(())
    }

    /// `(x, y)` in meters
    pub fn position(&self) -> (f64, f64) {
        (self.pose.x, self.pose.y)
    }

    /// Heading in degrees, `[0, 360)`
    pub fn heading(&self) -> f64 {
        self.pose.heading_degrees
    }

    pub fn pose(&self) -> PoseEstimate {
        self.pose
    }

    /// Whether the time baseline has been set
    pub fn is_tracking(&self) -> bool {
        self.previous.is_some()
    }
}

/// Wrap an angle in degrees into `[0, 360)`
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Rotation rate above which a calibration sample counts as moving
const STILL_GYRO_DPS: f64 = 10.0;

/// Averages stationary IMU samples into a [`Bias`]
///
/// Collect while the robot is standing still, before the first move.
#[derive(Debug)]
pub struct BiasEstimator {
    target_samples: usize,
    sum: [f64; 3],
    sum_sq: [f64; 3],
    count: usize,
}

impl BiasEstimator {
    pub fn new(target_samples: usize) -> Self {
        Self {
            target_samples: target_samples.max(1),
            sum: [0.0; 3],
            sum_sq: [0.0; 3],
            count: 0,
        }
    }

    /// Add a sample; ignored once enough have been collected
    pub fn add_sample(&mut self, data: &ImuData) {
        if self.is_ready() {
            return;
        }
        let values = [data.accel[0], data.accel[1], data.gyro[2]];
        for (i, value) in values.iter().enumerate() {
            self.sum[i] += value;
            self.sum_sq[i] += value * value;
        }
        self.count += 1;
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.target_samples
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }

    /// Mean of the collected samples, `None` before the first sample
    pub fn bias(&self) -> Option<Bias> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(Bias {
            accel: [self.sum[0] / n, self.sum[1] / n],
            gyro_z: self.sum[2] / n,
        })
    }

    /// Standard deviation of gyro z samples in °/s
    pub fn gyro_std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.sum[2] / n;
        ((self.sum_sq[2] / n) - mean * mean).max(0.0).sqrt()
    }

    /// Read `target_samples` samples from `imu`, `interval` apart
    pub fn collect(
        mut self,
        imu: &mut dyn ImuDriver,
        clock: &dyn Clock,
        interval: Duration,
    ) -> Result<Bias> {
        let mut moving = 0;
        while !self.is_ready() {
            let data = imu.read()?;
            if data.gyro_magnitude() > STILL_GYRO_DPS {
                moving += 1;
            }
            self.add_sample(&data);
            clock.sleep(interval);
        }
        if moving > 0 {
            log::warn!(
                "IMU bias: {} of {} samples show rotation above {} °/s, was the robot moving?",
                moving,
                self.count,
                STILL_GYRO_DPS
            );
        }
        let bias = self.bias().unwrap_or_default();
        log::info!(
            "IMU bias from {} samples: accel=({:.4}, {:.4}) m/s², gyro_z={:.4} °/s (σ={:.4})",
            self.count,
            bias.accel[0],
            bias.accel[1],
            bias.gyro_z,
            self.gyro_std_dev()
        );
        Ok(bias)
    }
}
