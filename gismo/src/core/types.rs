//! Sensor sample types

/// IMU sensor data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuData {
    /// Accelerometer data (m/s²)
    pub accel: [f64; 3], // x, y, z
    /// Gyroscope data (°/s)
    pub gyro: [f64; 3], // x, y, z
}

impl ImuData {
    /// Create new IMU data
    pub fn new(accel: [f64; 3], gyro: [f64; 3]) -> Self {
        Self { accel, gyro }
    }

    /// Create zero IMU data
    pub fn zero() -> Self {
        Self {
            accel: [0.0, 0.0, 0.0],
            gyro: [0.0, 0.0, 0.0],
        }
    }

    /// Get gyroscope magnitude
    pub fn gyro_magnitude(&self) -> f64 {
        (self.gyro[0].powi(2) + self.gyro[1].powi(2) + self.gyro[2].powi(2)).sqrt()
    }
}

impl Default for ImuData {
    fn default() -> Self {
        Self::zero()
    }
}
