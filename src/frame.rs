//! Measurement frame decoding.
//!
//! A measurement response is one status byte followed by five data bytes that
//! pack two 20-bit big-endian values, optionally followed by a CRC byte:
//!
//! ```text
//! | status | hum[19:12] | hum[11:4] | hum[3:0] temp[19:16] | temp[15:8] | temp[7:0] | crc |
//! ```

use crc::{CRC_8_NRSC_5, Crc};

/// Length of a measurement frame without the CRC byte.
pub const FRAME_LEN: usize = 6;

/// Length of a measurement frame including the trailing CRC byte.
pub const FRAME_LEN_WITH_CRC: usize = FRAME_LEN + 1;

/// Full scale of the 20-bit raw fields (2^20).
const RAW_FULL_SCALE: f32 = 1_048_576.0;

/// CRC-8 with polynomial 0x31 and initial value 0xFF, no reflection.
const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

const STATUS_BUSY: u8 = 0b1000_0000;
const STATUS_CALIBRATED: u8 = 0b0000_1000;

/// Computes the sensor CRC8 over `data`.
pub fn crc8(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}

/// View over the sensor status byte.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorStatus(pub u8);

impl SensorStatus {
    /// True while a conversion is in progress (bit 7).
    pub fn is_busy(self) -> bool {
        self.0 & STATUS_BUSY != 0
    }

    /// True once the sensor's internal calibration has completed (bit 3).
    pub fn is_calibrated(self) -> bool {
        self.0 & STATUS_CALIBRATED != 0
    }
}

/// The undecoded 20-bit humidity and temperature fields of a frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSample {
    pub humidity: u32,
    pub temperature: u32,
}

impl RawSample {
    /// Extracts both raw fields from a status + data frame.
    pub fn from_frame(frame: &[u8; FRAME_LEN]) -> Self {
        let [_status, hum_hi, hum_mid, split, temp_mid, temp_lo] = *frame;

        let humidity =
            (u32::from(hum_hi) << 12) | (u32::from(hum_mid) << 4) | (u32::from(split) >> 4);
        let temperature =
            (u32::from(split & 0x0F) << 16) | (u32::from(temp_mid) << 8) | u32::from(temp_lo);

        RawSample {
            humidity,
            temperature,
        }
    }

    /// Relative humidity in percent, before offsets and clamping.
    pub fn humidity_percent(&self) -> f32 {
        self.humidity as f32 * 100.0 / RAW_FULL_SCALE
    }

    /// Temperature in degrees Celsius, before offsets.
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature as f32 * 200.0 / RAW_FULL_SCALE - 50.0
    }
}

/// Reading returned by the AHTx sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub relative_humidity: f32,
}

impl Reading {
    /// Temperature in degrees Fahrenheit.
    pub fn temperature_fahrenheit(&self) -> f32 {
        to_fahrenheit(self.temperature)
    }

    /// Temperature in Kelvin.
    pub fn temperature_kelvin(&self) -> f32 {
        to_kelvin(self.temperature)
    }
}

/// Converts degrees Celsius to degrees Fahrenheit.
pub fn to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Converts degrees Celsius to Kelvin.
pub fn to_kelvin(celsius: f32) -> f32 {
    celsius + 273.15
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_crc8_vectors() {
        assert_eq!(crc8(&[0x1C, 0x00, 0x00, 0x00, 0x00, 0x00]), 0x58);
        assert_eq!(crc8(b"123456789"), 0xF7);
        // Captured from an AHT20
        assert_eq!(crc8(&[0x1C, 0x65, 0xB4, 0x25, 0xCD, 0x26]), 0xC6);
    }

    #[test]
    fn test_crc8_empty() {
        assert_eq!(crc8(&[]), 0xFF);
    }

    #[test]
    fn test_raw_fields() {
        let raw = RawSample::from_frame(&[0x18, 0x19, 0x99, 0x87, 0x6A, 0x6B]);

        assert_eq!(
            raw,
            RawSample {
                humidity: 0x19998,
                temperature: 0x76A6B,
            }
        );
    }

    #[test]
    fn test_convert_hand_computed() {
        // 0x19998 * 100 / 2^20 = 9.99985
        // 0x76A6B * 200 / 2^20 - 50 = 42.69619
        let raw = RawSample::from_frame(&[0x18, 0x19, 0x99, 0x87, 0x6A, 0x6B]);

        assert_close(raw.humidity_percent(), 9.9998);
        assert_close(raw.temperature_celsius(), 42.6962);
    }

    #[test]
    fn test_convert_midscale() {
        // Humidity 0x80000 is exactly half of full scale
        let raw = RawSample::from_frame(&[0x18, 0x80, 0x00, 0x05, 0x66, 0x66]);

        assert_eq!(raw.humidity_percent(), 50.0);
        assert_close(raw.temperature_celsius(), 17.4999);
    }

    #[test]
    fn test_convert_extremes() {
        let low = RawSample::from_frame(&[0x18, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(low.humidity_percent(), 0.0);
        assert_eq!(low.temperature_celsius(), -50.0);

        let high = RawSample::from_frame(&[0x18, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(high.humidity, 0xFFFFF);
        assert_eq!(high.temperature, 0xFFFFF);
        assert_close(high.humidity_percent(), 100.0);
        assert_close(high.temperature_celsius(), 150.0);
    }

    #[test]
    fn test_status_bits() {
        let status = SensorStatus(0x18);
        assert!(!status.is_busy());
        assert!(status.is_calibrated());

        let status = SensorStatus(0x80);
        assert!(status.is_busy());
        assert!(!status.is_calibrated());
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(to_fahrenheit(0.0), 32.0);
        assert_eq!(to_fahrenheit(100.0), 212.0);
        assert_close(to_fahrenheit(-40.0), -40.0);
        assert_close(to_kelvin(0.0), 273.15);
        assert_close(to_kelvin(-273.15), 0.0);

        let reading = Reading {
            temperature: 25.0,
            relative_humidity: 40.0,
        };
        assert_eq!(reading.temperature_fahrenheit(), 77.0);
        assert_close(reading.temperature_kelvin(), 298.15);
    }
}
