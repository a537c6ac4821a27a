use embedded_hal::delay::DelayNs;

use crate::config::{Config, Variant, in_bus_frequency_band};
use crate::error::{Error, ResultCode};
use crate::frame::{FRAME_LEN, FRAME_LEN_WITH_CRC, RawSample, Reading, SensorStatus, crc8};
use crate::transport::{Clock, Transport};

/// Soft reset command. Takes no parameters.
const CMD_SOFT_RESET: u8 = 0xBA;

/// Returns one status byte.
const CMD_STATUS: u8 = 0x71;

/// Trigger measurement command with its two fixed parameter bytes.
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

/// Fixed parameter bytes sent after either init opcode.
const INIT_PARAMS: [u8; 2] = [0x08, 0x00];

/// Time the sensor needs to come back after a soft reset.
const SOFT_RESET_MS: u32 = 20;

/// Extra settle time after the reset issued by `begin`.
const POWER_ON_SETTLE_MS: u32 = 40;

/// Time the sensor needs after an init command.
const INIT_SETTLE_MS: u32 = 10;

/// Minimum conversion time of a triggered measurement.
const MIN_CONVERSION_MS: u32 = 90;

/// Wait used by [`Aht::read`].
pub const DEFAULT_TIMEOUT_MS: u32 = 120;

const MAX_ADDRESS: u8 = 0x7F;

/// Driver for the AHT10, AHT20 and AHT21 temperature and humidity sensors.
pub struct Aht<B, D, C> {
    bus: B,
    delay: D,
    clock: C,
    address: u8,
    bus_frequency_hz: u32,
    variant: Variant,
    initialized: bool,
    measuring: bool,
    crc_enabled: bool,
    status: SensorStatus,
    last_error: ResultCode,
    temperature_offset_c: f32,
    humidity_offset_pct: f32,
    measurement_started_ms: u64,
}

impl<B, D, C> Aht<B, D, C>
where
    B: Transport,
    D: DelayNs,
    C: Clock,
{
    /// Creates a new, uninitialized driver.
    ///
    /// # Arguments
    ///
    /// * `bus` - The bus the sensor is attached to.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `clock` - Millisecond time source used to stamp measurement starts.
    /// * `config` - Address, bus clock, variant hint, CRC and offset settings.
    pub fn new(bus: B, delay: D, clock: C, config: Config) -> Self {
        Aht {
            bus,
            delay,
            clock,
            address: config.address,
            bus_frequency_hz: config.bus_frequency_hz,
            variant: config.variant,
            initialized: false,
            measuring: false,
            crc_enabled: config.crc_enabled,
            status: SensorStatus::default(),
            last_error: ResultCode::Ok,
            temperature_offset_c: config.temperature_offset_c,
            humidity_offset_pct: config.humidity_offset_pct,
            measurement_started_ms: 0,
        }
    }

    /// Resets the sensor, detects the part and verifies its calibration.
    ///
    /// The AHT20 init command is tried first, then the AHT10 one. The
    /// configured bus clock is forwarded to the transport only when it lies
    /// between 100 kHz and 400 kHz.
    ///
    /// # Returns
    ///
    /// * `Ok(Variant)` with the detected part.
    /// * `Err(Error::NotDetected)` if neither init command was acknowledged.
    /// * `Err(Error::NotCalibrated)` if the sensor is present but not calibrated.
    /// * `Err(Error::InvalidParam)` if the address does not fit in 7 bits.
    pub fn begin(&mut self) -> Result<Variant, Error<B::Error>> {
        let result = self.begin_sequence();
        self.record(result)
    }

    fn begin_sequence(&mut self) -> Result<Variant, Error<B::Error>> {
        self.initialized = false;
        self.measuring = false;

        if self.address > MAX_ADDRESS {
            return Err(Error::InvalidParam);
        }
        if in_bus_frequency_band(self.bus_frequency_hz) {
            self.bus.set_bus_frequency(self.bus_frequency_hz);
        }

        self.reset()?;
        self.delay.delay_ms(POWER_ON_SETTLE_MS);

        let variant = self.detect()?;

        if !self.read_status()?.is_calibrated() {
            warn!("status {=u8:#x}: sensor not calibrated", self.status.0);
            return Err(Error::NotCalibrated);
        }

        self.initialized = true;
        Ok(variant)
    }

    fn detect(&mut self) -> Result<Variant, Error<B::Error>> {
        for variant in [Variant::Aht20, Variant::Aht10] {
            if self.send_init(variant).is_ok() {
                debug!("detected {}", variant);
                self.variant = variant;
                self.delay.delay_ms(INIT_SETTLE_MS);
                return Ok(variant);
            }
        }
        Err(Error::NotDetected)
    }

    /// Marks the driver uninitialized. Nothing is sent to the sensor.
    pub fn end(&mut self) {
        self.initialized = false;
        self.measuring = false;
    }

    /// Releases the bus, delay and clock.
    pub fn release(self) -> (B, D, C) {
        (self.bus, self.delay, self.clock)
    }

    /// Sends the soft reset command and waits for the sensor to restart.
    pub fn soft_reset(&mut self) -> Result<(), Error<B::Error>> {
        let result = self.reset();
        self.record(result)
    }

    fn reset(&mut self) -> Result<(), Error<B::Error>> {
        self.bus.write(self.address, &[CMD_SOFT_RESET])?;
        self.delay.delay_ms(SOFT_RESET_MS);
        Ok(())
    }

    /// Resends the init command of the current variant.
    ///
    /// Recovers a sensor that lost its calibration state without running the
    /// full detection again.
    pub fn reinitialize(&mut self) -> Result<(), Error<B::Error>> {
        let result = self
            .send_init(self.variant)
            .map(|()| self.delay.delay_ms(INIT_SETTLE_MS));
        self.record(result)
    }

    fn send_init(&mut self, variant: Variant) -> Result<(), Error<B::Error>> {
        let [p1, p2] = INIT_PARAMS;
        self.bus
            .write(self.address, &[variant.init_command(), p1, p2])?;
        Ok(())
    }

    /// Reads temperature and humidity with the default wait of 120 ms.
    pub fn read(&mut self) -> Result<Reading, Error<B::Error>> {
        self.read_temperature_humidity(DEFAULT_TIMEOUT_MS)
    }

    /// Triggers a measurement, waits, and reads the result.
    ///
    /// The wait is `timeout_ms`, but never less than the 90 ms conversion
    /// time. The busy bit is not consulted.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` with offsets applied and humidity clamped to 0..=100.
    /// * `Err(Error::NotInitialized)` before a successful `begin`.
    /// * `Err(Error::I2c)` or `Err(Error::ShortRead)` on bus failure.
    ///
    /// A failed frame read leaves the measurement pending, so
    /// [`read_result`](Self::read_result) can retry it.
    pub fn read_temperature_humidity(
        &mut self,
        timeout_ms: u32,
    ) -> Result<Reading, Error<B::Error>> {
        let result = self.measure_blocking(timeout_ms);
        self.record(result)
    }

    fn measure_blocking(&mut self, timeout_ms: u32) -> Result<Reading, Error<B::Error>> {
        self.ensure_initialized()?;
        self.trigger()?;
        self.delay.delay_ms(timeout_ms.max(MIN_CONVERSION_MS));
        self.fetch()
    }

    /// Triggers a measurement and returns immediately.
    ///
    /// Follow with [`poll_ready`](Self::poll_ready) and
    /// [`read_result`](Self::read_result).
    pub fn start_measurement(&mut self) -> Result<(), Error<B::Error>> {
        let result = self.ensure_initialized().and_then(|()| self.trigger());
        self.record(result)
    }

    fn trigger(&mut self) -> Result<(), Error<B::Error>> {
        self.bus.write(self.address, &CMD_TRIGGER)?;
        self.measuring = true;
        self.measurement_started_ms = self.clock.now_ms();
        Ok(())
    }

    /// Reads the status byte and reports whether the measurement finished.
    ///
    /// Always false when no measurement is in progress or the status read
    /// fails. Does not change the measuring state or the last error.
    pub fn poll_ready(&mut self) -> bool {
        if !self.initialized || !self.measuring {
            return false;
        }
        match self.read_status() {
            Ok(status) => !status.is_busy(),
            Err(_) => false,
        }
    }

    /// Reads the result of a measurement started with
    /// [`start_measurement`](Self::start_measurement).
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` with offsets applied and humidity clamped to 0..=100.
    /// * `Err(Error::BusyTimeout)` if the last polled status still shows busy.
    ///   No bytes are read in that case.
    /// * `Err(Error::NotInitialized)` before a successful `begin`.
    pub fn read_result(&mut self) -> Result<Reading, Error<B::Error>> {
        let result = self.collect();
        self.record(result)
    }

    fn collect(&mut self) -> Result<Reading, Error<B::Error>> {
        self.ensure_initialized()?;
        if self.measuring && self.status.is_busy() {
            debug!("measurement still in progress");
            return Err(Error::BusyTimeout);
        }
        self.fetch()
    }

    /// Reads a measurement frame, validates it and converts it.
    ///
    /// A CRC byte that does not arrive, or does not match, disables CRC
    /// checking for the rest of this driver's life; the data is still used.
    fn fetch(&mut self) -> Result<Reading, Error<B::Error>> {
        let mut buf = [0u8; FRAME_LEN_WITH_CRC];
        let wanted = if self.crc_enabled {
            FRAME_LEN_WITH_CRC
        } else {
            FRAME_LEN
        };

        let received = self.bus.read(self.address, &mut buf[..wanted])?;
        if received != wanted {
            if self.crc_enabled && received == FRAME_LEN {
                warn!("CRC byte missing, disabling CRC");
                self.crc_enabled = false;
            } else {
                return Err(Error::ShortRead {
                    expected: wanted,
                    received,
                });
            }
        }

        let mut frame = [0u8; FRAME_LEN];
        frame.copy_from_slice(&buf[..FRAME_LEN]);

        if self.crc_enabled {
            let computed = crc8(&frame);
            if computed != buf[FRAME_LEN] {
                warn!(
                    "CRC mismatch (got {=u8:#x}, computed {=u8:#x}), disabling CRC",
                    buf[FRAME_LEN],
                    computed,
                );
                self.crc_enabled = false;
            }
        }

        self.status = SensorStatus(frame[0]);
        let reading = self.convert(RawSample::from_frame(&frame));
        self.measuring = false;
        Ok(reading)
    }

    fn convert(&self, raw: RawSample) -> Reading {
        let temperature = raw.temperature_celsius() + self.temperature_offset_c;
        let relative_humidity =
            (raw.humidity_percent() + self.humidity_offset_pct).clamp(0.0, 100.0);

        Reading {
            temperature,
            relative_humidity,
        }
    }

    /// Writes the status command and reads one byte back without a stop in between.
    fn read_status(&mut self) -> Result<SensorStatus, Error<B::Error>> {
        let mut buf = [0u8; 1];
        let received = self.bus.write_read(self.address, &[CMD_STATUS], &mut buf)?;
        if received != buf.len() {
            return Err(Error::ShortRead {
                expected: buf.len(),
                received,
            });
        }
        self.status = SensorStatus(buf[0]);
        Ok(self.status)
    }

    /// Heater control is not available on this sensor family.
    ///
    /// Always returns `Err(Error::NotSupported)`.
    pub fn set_heater(&mut self, _on: bool) -> Result<(), Error<B::Error>> {
        self.record(Err(Error::NotSupported))
    }

    fn ensure_initialized(&self) -> Result<(), Error<B::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn record<T>(&mut self, result: Result<T, Error<B::Error>>) -> Result<T, Error<B::Error>> {
        self.last_error = match &result {
            Ok(_) => ResultCode::Ok,
            Err(e) => e.code(),
        };
        result
    }
}

impl<B, D, C> Aht<B, D, C> {
    /// Sets the offset added to every temperature reading, in degrees Celsius.
    pub fn set_temperature_offset_c(&mut self, offset: f32) {
        self.temperature_offset_c = offset;
    }

    /// Sets the offset added to every humidity reading, in percent.
    ///
    /// Applied before clamping to 0..=100.
    pub fn set_humidity_offset_pct(&mut self, offset: f32) {
        self.humidity_offset_pct = offset;
    }

    /// Offset added to every temperature reading, in degrees Celsius.
    pub fn temperature_offset_c(&self) -> f32 {
        self.temperature_offset_c
    }

    /// Offset added to every humidity reading, in percent.
    pub fn humidity_offset_pct(&self) -> f32 {
        self.humidity_offset_pct
    }

    /// Turns CRC checking on or off.
    ///
    /// The driver turns it off by itself after a missing or wrong CRC byte;
    /// only this call turns it back on.
    pub fn enable_crc(&mut self, enabled: bool) {
        self.crc_enabled = enabled;
    }

    /// Whether the CRC byte is currently requested and checked.
    pub fn crc_enabled(&self) -> bool {
        self.crc_enabled
    }

    /// Outcome of the most recent operation.
    pub fn last_error(&self) -> ResultCode {
        self.last_error
    }

    /// Most recently observed status byte.
    pub fn last_status_byte(&self) -> u8 {
        self.status.0
    }

    /// Most recently observed status byte, decoded.
    pub fn status(&self) -> SensorStatus {
        self.status
    }

    /// 7-bit bus address of the sensor.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Detected part, or the configured hint before detection.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// True after a successful `begin` and until `end`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// True between a trigger and the read that completes it.
    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    /// Clock timestamp of the last trigger.
    ///
    /// No timeout is enforced against it; callers polling with
    /// [`poll_ready`](Self::poll_ready) decide when to give up.
    pub fn measurement_started_ms(&self) -> u64 {
        self.measurement_started_ms
    }
}
