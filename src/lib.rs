//! AHT10/AHT20/AHT21 Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the Aosong AHT10, AHT20
//! and AHT21 temperature and humidity sensors, built on top of the
//! [`embedded-hal`] traits.
//!
//! # Features
//! - Auto-detection of AHT20 and AHT10 parts during [`Aht::begin`]
//! - Blocking read ([`Aht::read_temperature_humidity`]) and a
//!   trigger/poll/read sequence ([`Aht::start_measurement`],
//!   [`Aht::poll_ready`], [`Aht::read_result`]) that lets the caller do
//!   other work during the conversion
//! - Optional CRC8 checking that turns itself off when the sensor or bus
//!   drops or corrupts the CRC byte
//! - User temperature and humidity offsets
//! - Designed for `no_std` environments
//!
//! # Dependencies
//! - [`I2c`] for bus access, through the [`I2cBus`] adapter, or any custom
//!   [`Transport`]
//! - [`DelayNs`] for timing
//! - a [`Clock`] for measurement timestamps ([`NoClock`] if there is none)
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and emits driver events through `defmt`
//!
//! # Example
//!
//! ```no_run
//! # use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use ahtx_sensor::{Aht, Config, I2cBus, NoClock};
//!
//! # fn run(i2c: impl I2c, delay: impl DelayNs) {
//! let mut aht = Aht::new(I2cBus::new(i2c), delay, NoClock, Config::default());
//! aht.begin().unwrap();
//!
//! let reading = aht.read().unwrap();
//! let _ = (reading.temperature, reading.relative_humidity);
//! # }
//! ```
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`I2c`]: embedded_hal::i2c::I2c
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod aht;
pub mod config;
pub mod error;
pub mod frame;
pub mod transport;

pub use aht::{Aht, DEFAULT_TIMEOUT_MS};
pub use config::{Config, DEFAULT_ADDRESS, Variant};
pub use error::{Error, ResultCode};
pub use frame::{RawSample, Reading, SensorStatus, to_fahrenheit, to_kelvin};
pub use transport::{Clock, I2cBus, NoClock, Transport};
