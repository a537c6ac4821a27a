//! Bus and clock abstractions consumed by the driver.

use core::fmt::Debug;

use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Byte-oriented command/response bus addressed by a 7-bit device address.
///
/// Reads report how many bytes actually arrived so the driver can handle
/// short responses instead of treating them as bus failures.
pub trait Transport {
    /// Error returned by the bus. A missing acknowledge is reported as an error.
    type Error: Debug;

    /// Requests a bus clock rate in Hz.
    ///
    /// The default does nothing, for buses whose clock is fixed at construction.
    fn set_bus_frequency(&mut self, _hz: u32) {}

    /// Writes `bytes` to `address` and releases the bus with a stop condition.
    fn write(&mut self, address: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Writes `bytes` then reads into `buffer` with a repeated start, without
    /// releasing the bus in between.
    ///
    /// Returns the number of bytes received.
    fn write_read(
        &mut self,
        address: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error>;

    /// Reads up to `buffer.len()` bytes from `address`.
    ///
    /// Returns the number of bytes received.
    fn read(&mut self, address: SevenBitAddress, buffer: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn set_bus_frequency(&mut self, hz: u32) {
        T::set_bus_frequency(self, hz)
    }

    fn write(&mut self, address: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        T::write(self, address, bytes)
    }

    fn write_read(
        &mut self,
        address: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error> {
        T::write_read(self, address, bytes, buffer)
    }

    fn read(&mut self, address: SevenBitAddress, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        T::read(self, address, buffer)
    }
}

/// Adapter from an `embedded-hal` I2C bus to [`Transport`].
///
/// `embedded-hal` reads either fill the whole buffer or fail, so this adapter
/// never reports a short read. Its clock rate is whatever the HAL was
/// configured with.
pub struct I2cBus<I> {
    i2c: I,
}

impl<I: I2c> I2cBus<I> {
    /// Wraps an I2C bus.
    pub fn new(i2c: I) -> Self {
        I2cBus { i2c }
    }

    /// Releases the wrapped I2C bus.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> Transport for I2cBus<I> {
    type Error = I::Error;

    fn write(&mut self, address: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(address, bytes)
    }

    fn write_read(
        &mut self,
        address: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error> {
        self.i2c.write_read(address, bytes, buffer)?;
        Ok(buffer.len())
    }

    fn read(&mut self, address: SevenBitAddress, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        self.i2c.read(address, buffer)?;
        Ok(buffer.len())
    }
}

/// Monotonic millisecond time source.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed point.
    fn now_ms(&mut self) -> u64;
}

impl<F: FnMut() -> u64> Clock for F {
    fn now_ms(&mut self) -> u64 {
        self()
    }
}

/// Clock for hosts without a time source. Always reads zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoClock;

impl Clock for NoClock {
    fn now_ms(&mut self) -> u64 {
        0
    }
}
