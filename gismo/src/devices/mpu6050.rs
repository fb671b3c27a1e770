//! MPU-6050 6-axis inertial sensor
//!
//! Configured for the power-on ranges: ±2 g accelerometer and ±250 °/s
//! gyroscope. Samples are big-endian i16 triplets.

use crate::core::hal::ImuDriver;
use crate::error::{Error, Result};
use crate::transport::RegisterBus;

// Registers
const GYRO_CONFIG: u8 = 0x1B;
const ACCEL_CONFIG: u8 = 0x1C;
const ACCEL_XOUT_H: u8 = 0x3B;
const GYRO_XOUT_H: u8 = 0x43;
const PWR_MGMT_1: u8 = 0x6B;
const WHO_AM_I: u8 = 0x75;

const EXPECTED_WHO_AM_I: u8 = 0x68;

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// ±2 g range: 16384 LSB/g
const ACCEL_LSB_PER_G: f64 = 16384.0;

/// ±250 °/s range: 131 LSB/(°/s)
const GYRO_LSB_PER_DPS: f64 = 131.0;

/// MPU-6050 driver over any [`RegisterBus`]
pub struct Mpu6050<B: RegisterBus> {
    bus: B,
}

impl<B: RegisterBus> Mpu6050<B> {
    /// Wake the sensor and select the ±2 g / ±250 °/s ranges
    pub fn new(mut bus: B) -> Result<Self> {
        let who_am_i = bus.read_register(WHO_AM_I)?;
        if who_am_i != EXPECTED_WHO_AM_I {
            // MPU-6500/9250 clones answer 0x70/0x71 but share the register map
            log::warn!(
                "MPU-6050: unexpected WHO_AM_I {:#04x} (expected {:#04x})",
                who_am_i,
                EXPECTED_WHO_AM_I
            );
        }

        bus.write_register(PWR_MGMT_1, 0x00)?;
        bus.write_register(ACCEL_CONFIG, 0x00)?;
        bus.write_register(GYRO_CONFIG, 0x00)?;

        log::debug!("MPU-6050: awake (±2 g, ±250 °/s)");
        Ok(Self { bus })
    }

    fn read_triplet(&mut self, register: u8) -> Result<[i16; 3]> {
        let mut raw = [0u8; 6];
        self.bus.read_registers(register, &mut raw)?;
        Ok([
            i16::from_be_bytes([raw[0], raw[1]]),
            i16::from_be_bytes([raw[2], raw[3]]),
            i16::from_be_bytes([raw[4], raw[5]]),
        ])
    }
}

/// Convert raw accelerometer counts to m/s²
pub fn accel_to_mps2(raw: [i16; 3]) -> [f64; 3] {
    raw.map(|v| v as f64 / ACCEL_LSB_PER_G * STANDARD_GRAVITY)
}

/// Convert raw gyroscope counts to °/s
pub fn gyro_to_dps(raw: [i16; 3]) -> [f64; 3] {
    raw.map(|v| v as f64 / GYRO_LSB_PER_DPS)
}

impl<B: RegisterBus> ImuDriver for Mpu6050<B> {
    fn read_accel(&mut self) -> Result<[f64; 3]> {
        let raw = self
            .read_triplet(ACCEL_XOUT_H)
            .map_err(|e| Error::SensorRead(format!("MPU-6050 accelerometer: {}", e)))?;
        Ok(accel_to_mps2(raw))
    }

    fn read_gyro(&mut self) -> Result<[f64; 3]> {
        let raw = self
            .read_triplet(GYRO_XOUT_H)
            .map_err(|e| Error::SensorRead(format!("MPU-6050 gyroscope: {}", e)))?;
        Ok(gyro_to_dps(raw))
    }
}
