/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Drivers for two I2C environmental sensors:
//!
//! * [`sht31::Sht31`]: Sensirion SHT31 humidity and temperature sensor, with
//!   single shot and periodic acquisition, per-word CRC checking and the
//!   programmable alert pin.
//! * [`tsl2591::Tsl2591`]: ams TSL2591 dual photodiode light sensor, with
//!   gain/integration control and the persistence filtered interrupt pin.
//!
//! Both drivers are synchronous and talk through the `embedded-hal` blocking
//! I2C traits. Neither waits for interrupts: the caller owns the GPIO edge
//! and calls a fetch followed by the matching clear operation when it fires.

#![cfg_attr(not(test), no_std)]

use embedded_hal as hal;

pub mod codec;
mod interface;
pub mod sht31;
pub mod tsl2591;

pub use interface::{I2cInterface, SensorInterface};

use sht31::{Measurement, PeriodicInterval, Repeatability, Sht31};
use tsl2591::Tsl2591;

/// Errors in this crate
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<CommE> {
    /// Sensor communication error
    #[error("sensor communication error: {0:?}")]
    Comm(CommE),

    /// A received word failed its CRC check. `partial` carries whatever
    /// channel of a measurement did pass.
    #[error("checksum mismatch on {channel:?}")]
    ChecksumMismatch {
        channel: Channel,
        partial: Option<Measurement>,
    },

    /// A clear threshold sits outside its set threshold
    #[error("{limit:?} alert clear threshold is outside its set threshold")]
    InvalidHysteresis { limit: AlertSide },

    /// The value has no encoding in the target register
    #[error("threshold {value} outside {min}..={max}")]
    ThresholdOutOfRange { value: f32, min: f32, max: f32 },

    /// The device defines no command for this mode pairing
    #[error("no periodic command for {repeatability:?} repeatability at {interval:?}")]
    UnsupportedCombination {
        repeatability: Repeatability,
        interval: PeriodicInterval,
    },

    /// Periodic fetch without periodic acquisition running
    #[error("periodic acquisition is not running")]
    NotInPeriodicMode,

    /// Single shot requested while periodic acquisition is running
    #[error("periodic acquisition is running")]
    PeriodicModeActive,

    /// Data requested while the light sensor is disabled
    #[error("sensor is not enabled")]
    NotEnabled,

    /// Unrecognized chip ID
    #[error("unknown chip id 0x{0:02x}")]
    UnknownChipId(u8),
}

impl<CommE> From<codec::OutOfRange> for Error<CommE> {
    fn from(err: codec::OutOfRange) -> Self {
        Error::ThresholdOutOfRange {
            value: err.value,
            min: err.min,
            max: err.max,
        }
    }
}

/// Which part of a received frame failed its checksum
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Temperature,
    Humidity,
    /// Both words of a measurement
    Both,
    Status,
    AlertLimit,
}

/// The high or low pair of alert thresholds
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertSide {
    High,
    Low,
}

pub struct Builder {}

impl Builder {
    /// Create a new SHT31 driver at `address` (usually `sht31::DEFAULT_ADDRESS`)
    pub fn new_sht31<I2C, CommE>(i2c: I2C, address: u8) -> Sht31<I2cInterface<I2C>>
    where
        I2C: hal::blocking::i2c::Read<Error = CommE>
            + hal::blocking::i2c::Write<Error = CommE>
            + hal::blocking::i2c::WriteRead<Error = CommE>,
    {
        let iface = interface::I2cInterface::new(i2c, address);
        Sht31::new_with_interface(iface)
    }

    /// Create a new TSL2591 driver at `address` (usually `tsl2591::DEFAULT_ADDRESS`)
    pub fn new_tsl2591<I2C, CommE>(i2c: I2C, address: u8) -> Tsl2591<I2cInterface<I2C>>
    where
        I2C: hal::blocking::i2c::Read<Error = CommE>
            + hal::blocking::i2c::Write<Error = CommE>
            + hal::blocking::i2c::WriteRead<Error = CommE>,
    {
        let iface = interface::I2cInterface::new(i2c, address);
        Tsl2591::new_with_interface(iface)
    }
}
