//! Error types for Gismo

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Gismo error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// GPIO access failed
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// I2C bus access failed
    #[error("I2C error: {0}")]
    I2c(String),

    /// Pin used before it was configured for that direction
    #[error("GPIO pin {0} is not configured")]
    PinNotConfigured(u8),

    /// Inertial sensor read failed
    #[error("Sensor read failed: {0}")]
    SensorRead(String),

    /// Unknown device type in configuration
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation not supported
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(feature = "rpi")]
impl From<rppal::gpio::Error> for Error {
    fn from(e: rppal::gpio::Error) -> Self {
        Error::Gpio(e.to_string())
    }
}

#[cfg(feature = "rpi")]
impl From<rppal::i2c::Error> for Error {
    fn from(e: rppal::i2c::Error) -> Self {
        Error::I2c(e.to_string())
    }
}
