use core::fmt;

/// Possible errors from the AHTx driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// Error from the I2C bus, including a missing acknowledge.
    I2c(E),
    /// The sensor returned fewer bytes than requested.
    ShortRead {
        /// Number of bytes requested.
        expected: usize,
        /// Number of bytes actually received.
        received: usize,
    },
    /// Neither the AHT20 nor the AHT10 init command was acknowledged.
    NotDetected,
    /// The sensor answered but its calibration bit is not set.
    NotCalibrated,
    /// A measurement was requested before a successful `begin`.
    NotInitialized,
    /// The sensor still reports busy.
    BusyTimeout,
    /// Received CRC does not match the computed one.
    ///
    /// Reads never return this: a mismatch only disables CRC checking.
    CrcMismatch {
        /// CRC byte sent by the sensor.
        received: u8,
        /// CRC computed over the status and data bytes.
        computed: u8,
    },
    /// A configuration value is outside its valid range.
    InvalidParam,
    /// The sensor family has no such feature.
    NotSupported,
}

impl<E> Error<E> {
    /// The result code recorded by the driver for this error.
    pub fn code(&self) -> ResultCode {
        match self {
            Error::I2c(_) | Error::ShortRead { .. } | Error::NotDetected => ResultCode::I2cError,
            Error::NotCalibrated | Error::NotInitialized => ResultCode::NotInitialized,
            Error::BusyTimeout => ResultCode::BusyTimeout,
            Error::CrcMismatch { .. } => ResultCode::CrcMismatch,
            Error::InvalidParam => ResultCode::InvalidParam,
            Error::NotSupported => ResultCode::NotSupported,
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C error: {e:?}"),
            Error::ShortRead { expected, received } => {
                write!(f, "short read: expected {expected} bytes, got {received}")
            }
            Error::NotDetected => {
                f.write_str("no AHT10/AHT20 sensor acknowledged the init command")
            }
            Error::NotCalibrated => f.write_str("sensor calibration bit is not set"),
            Error::NotInitialized => f.write_str("driver is not initialized"),
            Error::BusyTimeout => f.write_str("sensor is still busy measuring"),
            Error::CrcMismatch { received, computed } => {
                write!(
                    f,
                    "CRC mismatch: received {received:#04x}, computed {computed:#04x}"
                )
            }
            Error::InvalidParam => f.write_str("invalid parameter"),
            Error::NotSupported => f.write_str("not supported by this sensor"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

/// Outcome of the most recent driver operation.
///
/// Stays queryable through [`Aht::last_error`](crate::Aht::last_error)
/// after a failure.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultCode {
    /// The operation succeeded.
    #[default]
    Ok,
    /// Bus failure, missing acknowledge or short read.
    I2cError,
    /// The driver is not initialized, or the sensor is not calibrated.
    NotInitialized,
    /// The sensor still reported busy.
    BusyTimeout,
    /// Reserved: CRC mismatches are absorbed by disabling CRC.
    CrcMismatch,
    /// A configuration value is outside its valid range.
    InvalidParam,
    /// The sensor family has no such feature.
    NotSupported,
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

    #[test]
    fn test_codes() {
        let nack: Error<ErrorKind> = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address).into();
        assert_eq!(nack.code(), ResultCode::I2cError);

        let short: Error<ErrorKind> = Error::ShortRead {
            expected: 7,
            received: 3,
        };
        assert_eq!(short.code(), ResultCode::I2cError);
        assert_eq!(Error::<ErrorKind>::NotDetected.code(), ResultCode::I2cError);
        assert_eq!(
            Error::<ErrorKind>::NotCalibrated.code(),
            ResultCode::NotInitialized
        );
        assert_eq!(
            Error::<ErrorKind>::NotSupported.code(),
            ResultCode::NotSupported
        );
    }

    #[test]
    fn test_display() {
        let err: Error<ErrorKind> = Error::ShortRead {
            expected: 7,
            received: 3,
        };
        assert_eq!(err.to_string(), "short read: expected 7 bytes, got 3");

        let err: Error<ErrorKind> = Error::CrcMismatch {
            received: 0x12,
            computed: 0x58,
        };
        assert_eq!(
            err.to_string(),
            "CRC mismatch: received 0x12, computed 0x58"
        );
    }
}
