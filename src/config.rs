//! Driver configuration.

/// Default 7-bit I2C address of every sensor in the family.
pub const DEFAULT_ADDRESS: u8 = 0x38;

/// Default bus clock rate in Hz.
pub const DEFAULT_BUS_FREQUENCY_HZ: u32 = 100_000;

/// Lowest bus clock rate forwarded to the transport.
pub const MIN_BUS_FREQUENCY_HZ: u32 = 100_000;

/// Highest bus clock rate forwarded to the transport.
pub const MAX_BUS_FREQUENCY_HZ: u32 = 400_000;

/// True if `hz` lies within 100 kHz to 400 kHz inclusive.
pub(crate) const fn in_bus_frequency_band(hz: u32) -> bool {
    hz >= MIN_BUS_FREQUENCY_HZ && hz <= MAX_BUS_FREQUENCY_HZ
}

/// Sensor part within the AHTx family.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    /// AHT10, initialized with 0xE1.
    Aht10,
    /// AHT20, initialized with 0xBE.
    #[default]
    Aht20,
    /// AHT21, same protocol as the AHT20.
    Aht21,
}

impl Variant {
    /// Opcode of the init/calibrate command for this part.
    pub const fn init_command(self) -> u8 {
        match self {
            Variant::Aht10 => 0xE1,
            Variant::Aht20 | Variant::Aht21 => 0xBE,
        }
    }
}

/// Settings consumed by [`Aht::new`](crate::Aht::new) and
/// [`Aht::begin`](crate::Aht::begin).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// 7-bit device address.
    pub address: u8,
    /// Bus clock rate in Hz. Ignored outside 100 kHz to 400 kHz.
    pub bus_frequency_hz: u32,
    /// Part assumed until auto-detection resolves it.
    pub variant: Variant,
    /// Whether to request and check the CRC byte.
    pub crc_enabled: bool,
    /// Added to every temperature reading, in degrees Celsius.
    pub temperature_offset_c: f32,
    /// Added to every humidity reading, in percent.
    pub humidity_offset_pct: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Default settings: address 0x38, 100 kHz, AHT20, CRC off, no offsets.
    pub const fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            bus_frequency_hz: DEFAULT_BUS_FREQUENCY_HZ,
            variant: Variant::Aht20,
            crc_enabled: false,
            temperature_offset_c: 0.0,
            humidity_offset_pct: 0.0,
        }
    }

    /// Sets the 7-bit device address.
    pub const fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Sets the bus clock rate in Hz.
    pub const fn bus_frequency_hz(mut self, hz: u32) -> Self {
        self.bus_frequency_hz = hz;
        self
    }

    /// Sets the part assumed before detection.
    pub const fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets whether the CRC byte is requested and checked.
    pub const fn crc_enabled(mut self, enabled: bool) -> Self {
        self.crc_enabled = enabled;
        self
    }

    /// Sets the temperature offset in degrees Celsius.
    pub const fn temperature_offset_c(mut self, offset: f32) -> Self {
        self.temperature_offset_c = offset;
        self
    }

    /// Sets the humidity offset in percent.
    pub const fn humidity_offset_pct(mut self, offset: f32) -> Self {
        self.humidity_offset_pct = offset;
        self
    }

    /// True if `bus_frequency_hz` lies in the accepted band.
    pub const fn bus_frequency_in_band(&self) -> bool {
        in_bus_frequency_band(self.bus_frequency_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.address, 0x38);
        assert_eq!(config.bus_frequency_hz, 100_000);
        assert_eq!(config.variant, Variant::Aht20);
        assert!(!config.crc_enabled);
        assert_eq!(config.temperature_offset_c, 0.0);
        assert_eq!(config.humidity_offset_pct, 0.0);
    }

    #[test]
    fn test_frequency_band() {
        let band = |hz| Config::new().bus_frequency_hz(hz).bus_frequency_in_band();

        assert!(band(100_000));
        assert!(band(400_000));
        assert!(!band(99_999));
        assert!(!band(1_000_000));
    }

    #[test]
    fn test_init_commands() {
        assert_eq!(Variant::Aht10.init_command(), 0xE1);
        assert_eq!(Variant::Aht20.init_command(), 0xBE);
        assert_eq!(Variant::Aht21.init_command(), 0xBE);
    }
}
