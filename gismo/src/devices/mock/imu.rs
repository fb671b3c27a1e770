//! Scripted inertial sensor

use super::noise::NoiseGenerator;
use crate::core::hal::ImuDriver;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

struct ImuState {
    accel: [f64; 3],
    gyro: [f64; 3],
    /// Queued samples consumed before the steady values
    queue: VecDeque<([f64; 3], [f64; 3])>,
    accel_stddev: f64,
    gyro_stddev: f64,
    noise: NoiseGenerator,
    failing: bool,
}

/// Mock [`ImuDriver`] returning configured readings plus optional noise
///
/// Clones share state.
#[derive(Clone)]
pub struct MockImu {
    state: Arc<Mutex<ImuState>>,
}

impl MockImu {
    /// Noise-free sensor reporting `accel` (m/s²) and `gyro` (°/s)
    pub fn new(accel: [f64; 3], gyro: [f64; 3]) -> Self {
        Self::with_noise(accel, gyro, 0.0, 0.0, 0)
    }

    pub fn with_noise(
        accel: [f64; 3],
        gyro: [f64; 3],
        accel_stddev: f64,
        gyro_stddev: f64,
        seed: u64,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ImuState {
                accel,
                gyro,
                queue: VecDeque::new(),
                accel_stddev,
                gyro_stddev,
                noise: NoiseGenerator::new(seed),
                failing: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ImuState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_gyro(&self, gyro: [f64; 3]) {
        self.lock().gyro = gyro;
    }

    /// Queue one `(accel, gyro)` sample; each queued sample serves one
    /// accel read and one gyro read
    pub fn push_sample(&self, accel: [f64; 3], gyro: [f64; 3]) {
        self.lock().queue.push_back((accel, gyro));
    }

    /// Make every read fail with [`Error::SensorRead`]
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }
}

impl ImuDriver for MockImu {
    fn read_accel(&mut self) -> Result<[f64; 3]> {
        let mut state = self.lock();
        if state.failing {
            return Err(Error::SensorRead("mock accelerometer fault".to_string()));
        }
        let accel = state.queue.front().map_or(state.accel, |s| s.0);
        let stddev = state.accel_stddev;
        Ok(state.noise.perturb(accel, stddev))
    }

    fn read_gyro(&mut self) -> Result<[f64; 3]> {
        let mut state = self.lock();
        if state.failing {
            return Err(Error::SensorRead("mock gyroscope fault".to_string()));
        }
        let gyro = match state.queue.pop_front() {
            Some((_, gyro)) => gyro,
            None => state.gyro,
        };
        let stddev = state.gyro_stddev;
        Ok(state.noise.perturb(gyro, stddev))
    }
}
