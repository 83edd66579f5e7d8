/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Driver for the Sensirion SHT31 humidity and temperature sensor.
//!
//! Every command is a 16-bit word sent MSB first. Every data word the sensor
//! returns (measurements, status, alert limits) is followed by a CRC byte,
//! and every data word written to it (alert limits) must carry one too.

use embedded_hal::blocking::delay::DelayMs;

use crate::codec;
use crate::interface::{I2cInterface, SensorInterface};
use crate::{AlertSide, Channel, Error};

/// I2C address with the ADDR pin low
pub const DEFAULT_ADDRESS: u8 = 0x44;
/// I2C address with the ADDR pin high
pub const ALTERNATE_ADDRESS: u8 = 0x45;

const CMD_FETCH_DATA: u16 = 0xE000;
const CMD_ART: u16 = 0x2B32;
const CMD_BREAK: u16 = 0x3093;
const CMD_SOFT_RESET: u16 = 0x30A2;
const CMD_HEATER_ON: u16 = 0x306D;
const CMD_HEATER_OFF: u16 = 0x3066;
const CMD_READ_STATUS: u16 = 0xF32D;
const CMD_CLEAR_STATUS: u16 = 0x3041;

const CMD_READ_HIGH_SET: u16 = 0xE11F;
const CMD_READ_HIGH_CLEAR: u16 = 0xE114;
const CMD_READ_LOW_CLEAR: u16 = 0xE109;
const CMD_READ_LOW_SET: u16 = 0xE102;
const CMD_WRITE_HIGH_SET: u16 = 0x611D;
const CMD_WRITE_HIGH_CLEAR: u16 = 0x6116;
const CMD_WRITE_LOW_CLEAR: u16 = 0x610B;
const CMD_WRITE_LOW_SET: u16 = 0x6100;

/// Soft reset completes within 1.5 ms
const SOFT_RESET_TIME_MS: u8 = 2;

/// Temperature + CRC, humidity + CRC
const MEASUREMENT_LEN: usize = 6;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Trades measurement noise for conversion time
pub enum Repeatability {
    Low,
    Medium,
    #[default]
    High,
}

impl Repeatability {
    /// Single shot command; with clock stretching the sensor holds SCL low
    /// until the result is ready so the read can follow immediately.
    fn single_shot_command(&self, clock_stretch: bool) -> u16 {
        match (clock_stretch, self) {
            (true, Repeatability::High) => 0x2C06,
            (true, Repeatability::Medium) => 0x2C0D,
            (true, Repeatability::Low) => 0x2C10,
            (false, Repeatability::High) => 0x2400,
            (false, Repeatability::Medium) => 0x240B,
            (false, Repeatability::Low) => 0x2416,
        }
    }

    /// Maximum conversion time in milliseconds
    pub fn conversion_time_ms(&self) -> u8 {
        match self {
            Repeatability::Low => 4,
            Repeatability::Medium => 6,
            Repeatability::High => 15,
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Periodic acquisition rate in measurements per second
pub enum PeriodicInterval {
    /// No periodic acquisition
    #[default]
    Off,
    Mps_0_5,
    Mps_1,
    Mps_2,
    Mps_4,
    Mps_10,
}

/// The sensor encodes rate and repeatability jointly in one command
fn periodic_command(repeatability: Repeatability, interval: PeriodicInterval) -> Option<u16> {
    use PeriodicInterval::*;
    use Repeatability::*;

    let command = match (interval, repeatability) {
        (Off, _) => return None,
        (Mps_0_5, High) => 0x2032,
        (Mps_0_5, Medium) => 0x2024,
        (Mps_0_5, Low) => 0x202F,
        (Mps_1, High) => 0x2130,
        (Mps_1, Medium) => 0x2126,
        (Mps_1, Low) => 0x212D,
        (Mps_2, High) => 0x2236,
        (Mps_2, Medium) => 0x2220,
        (Mps_2, Low) => 0x222B,
        (Mps_4, High) => 0x2334,
        (Mps_4, Medium) => 0x2322,
        (Mps_4, Low) => 0x2329,
        (Mps_10, High) => 0x2737,
        (Mps_10, Medium) => 0x2721,
        (Mps_10, Low) => 0x272A,
    };
    Some(command)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Unit used for reported temperatures and for temperature thresholds
pub enum TemperatureScale {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Host side configuration snapshot
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub repeatability: Repeatability,
    /// Rate of the running periodic acquisition, `Off` when idle
    pub periodic_interval: PeriodicInterval,
    pub scale: TemperatureScale,
}

/// Acquisition mode. Single shot is only possible from `Idle`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Idle,
    Periodic(PeriodicInterval),
    /// Accelerated response time: 4 Hz periodic acquisition
    Art,
}

/// Alert pin state as known to the host
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertState {
    /// Thresholds not programmed by this driver
    Unarmed,
    Armed,
    /// The status register reported a pending alert
    Fired,
}

/// One alert threshold: temperature in the configured scale, humidity in %RH
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertLimit {
    pub temperature: f32,
    pub humidity: f32,
}

impl AlertLimit {
    pub fn new(temperature: f32, humidity: f32) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

/// The four alert limits. The alert asserts when a reading crosses a `set`
/// limit and releases when it comes back past the matching `clear` limit.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertThresholds {
    pub high_set: AlertLimit,
    pub high_clear: AlertLimit,
    pub low_set: AlertLimit,
    pub low_clear: AlertLimit,
}

impl AlertThresholds {
    /// Clear limits must sit inside their set limits on both channels
    pub fn check_hysteresis(&self) -> Result<(), AlertSide> {
        if self.high_clear.temperature > self.high_set.temperature
            || self.high_clear.humidity > self.high_set.humidity
        {
            return Err(AlertSide::High);
        }
        if self.low_clear.temperature < self.low_set.temperature
            || self.low_clear.humidity < self.low_set.humidity
        {
            return Err(AlertSide::Low);
        }
        Ok(())
    }
}

/// A decoded measurement. A channel is `None` when its CRC failed.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// In the configured scale
    pub temperature: Option<f32>,
    /// Relative humidity, %
    pub humidity: Option<f32>,
}

impl Measurement {
    pub fn is_valid(&self) -> bool {
        self.temperature.is_some() && self.humidity.is_some()
    }
}

/// Status register contents
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u16);

impl Status {
    pub fn alert_pending(&self) -> bool {
        self.0 & (1 << 15) != 0
    }

    pub fn heater_on(&self) -> bool {
        self.0 & (1 << 13) != 0
    }

    pub fn humidity_alert(&self) -> bool {
        self.0 & (1 << 11) != 0
    }

    pub fn temperature_alert(&self) -> bool {
        self.0 & (1 << 10) != 0
    }

    /// Reset (power on, soft reset or reset pin) since the last clear
    pub fn reset_detected(&self) -> bool {
        self.0 & (1 << 4) != 0
    }

    /// The last command was not processed
    pub fn command_error(&self) -> bool {
        self.0 & (1 << 1) != 0
    }

    /// The checksum of the last write transfer was wrong
    pub fn write_checksum_error(&self) -> bool {
        self.0 & 1 != 0
    }
}

pub struct Sht31<SI> {
    pub(crate) si: SI,

    config: Config,
    mode: Mode,
    alert: AlertState,
    /// Encoded limit words as last programmed, in write order
    limit_words: Option<[(u16, u16); 4]>,
}

impl<SI, CommE> Sht31<SI>
where
    SI: SensorInterface<InterfaceError = Error<CommE>>,
{
    pub(crate) fn new_with_interface(sensor_interface: SI) -> Self {
        Self {
            si: sensor_interface,
            config: Config::default(),
            mode: Mode::Idle,
            alert: AlertState::Unarmed,
            limit_words: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn alert_state(&self) -> AlertState {
        self.alert
    }

    /// Takes effect with the next measurement command
    pub fn set_repeatability(&mut self, repeatability: Repeatability) {
        self.config.repeatability = repeatability;
    }

    /// Takes effect with the next measurement or threshold access
    pub fn set_scale(&mut self, scale: TemperatureScale) {
        self.config.scale = scale;
    }

    fn send_command(&mut self, command: u16) -> Result<(), Error<CommE>> {
        self.si.write_block(&command.to_be_bytes())
    }

    /// Read one CRC protected word in response to `command`
    fn read_word(&mut self, command: u16, channel: Channel) -> Result<u16, Error<CommE>> {
        let mut frame = [0u8; 3];
        self.si
            .write_read_block(&command.to_be_bytes(), &mut frame)?;
        codec::checked_word(&frame).ok_or_else(|| {
            log::warn!("SHT31 checksum mismatch on {:?}", channel);
            Error::ChecksumMismatch {
                channel,
                partial: None,
            }
        })
    }

    fn temperature_from_raw(&self, raw: u16) -> f32 {
        match self.config.scale {
            TemperatureScale::Celsius => codec::raw_to_celsius(raw),
            TemperatureScale::Fahrenheit => codec::raw_to_fahrenheit(raw),
        }
    }

    fn decode_measurement(&self, frame: &[u8; MEASUREMENT_LEN]) -> Result<Measurement, Error<CommE>> {
        let temperature = codec::checked_word(&[frame[0], frame[1], frame[2]])
            .map(|raw| self.temperature_from_raw(raw));
        let humidity =
            codec::checked_word(&[frame[3], frame[4], frame[5]]).map(codec::raw_to_humidity);
        let reading = Measurement {
            temperature,
            humidity,
        };

        let channel = match (temperature, humidity) {
            (Some(_), Some(_)) => return Ok(reading),
            (None, Some(_)) => Channel::Temperature,
            (Some(_), None) => Channel::Humidity,
            (None, None) => Channel::Both,
        };
        log::warn!("SHT31 checksum mismatch on {:?}", channel);
        let partial = if channel == Channel::Both {
            None
        } else {
            Some(reading)
        };
        Err(Error::ChecksumMismatch { channel, partial })
    }

    /// Start periodic acquisition at `interval` with the current repeatability.
    /// A running acquisition is stopped first.
    pub fn enter_periodic_mode(&mut self, interval: PeriodicInterval) -> Result<(), Error<CommE>> {
        let repeatability = self.config.repeatability;
        let command = periodic_command(repeatability, interval).ok_or(
            Error::UnsupportedCombination {
                repeatability,
                interval,
            },
        )?;

        if self.mode != Mode::Idle {
            self.stop_periodic_mode()?;
        }
        self.send_command(command)?;
        self.mode = Mode::Periodic(interval);
        self.config.periodic_interval = interval;
        log::debug!("SHT31 periodic {:?} {:?}", interval, repeatability);
        Ok(())
    }

    /// Start 4 Hz accelerated response time acquisition
    pub fn enter_art_mode(&mut self) -> Result<(), Error<CommE>> {
        if self.mode != Mode::Idle {
            self.stop_periodic_mode()?;
        }
        self.send_command(CMD_ART)?;
        self.mode = Mode::Art;
        self.config.periodic_interval = PeriodicInterval::Off;
        log::debug!("SHT31 ART mode");
        Ok(())
    }

    /// Stop periodic acquisition and return to idle
    pub fn stop_periodic_mode(&mut self) -> Result<(), Error<CommE>> {
        if self.mode == Mode::Idle {
            return Ok(());
        }
        self.send_command(CMD_BREAK)?;
        self.mode = Mode::Idle;
        self.config.periodic_interval = PeriodicInterval::Off;
        Ok(())
    }

    /// Fetch the latest periodic result. The sensor NACKs the read when no
    /// new result is available, which surfaces as `Error::Comm`.
    pub fn periodic_fetch(&mut self) -> Result<Measurement, Error<CommE>> {
        if self.mode == Mode::Idle {
            return Err(Error::NotInPeriodicMode);
        }
        self.send_command(CMD_FETCH_DATA)?;
        let mut frame = [0u8; MEASUREMENT_LEN];
        self.si.read_block(&mut frame)?;
        self.decode_measurement(&frame)
    }

    /// Single shot measurement with clock stretching: one write-read
    /// transaction that blocks in the transport for the conversion time.
    pub fn single_shot_fetch(&mut self) -> Result<Measurement, Error<CommE>> {
        if self.mode != Mode::Idle {
            return Err(Error::PeriodicModeActive);
        }
        let command = self.config.repeatability.single_shot_command(true);
        let mut frame = [0u8; MEASUREMENT_LEN];
        self.si
            .write_read_block(&command.to_be_bytes(), &mut frame)?;
        self.decode_measurement(&frame)
    }

    /// Single shot measurement without clock stretching, for buses that
    /// cannot tolerate it: trigger, wait out the conversion, then read.
    pub fn single_shot_fetch_polled(
        &mut self,
        delay_source: &mut impl DelayMs<u8>,
    ) -> Result<Measurement, Error<CommE>> {
        if self.mode != Mode::Idle {
            return Err(Error::PeriodicModeActive);
        }
        let repeatability = self.config.repeatability;
        self.send_command(repeatability.single_shot_command(false))?;
        delay_source.delay_ms(repeatability.conversion_time_ms());
        let mut frame = [0u8; MEASUREMENT_LEN];
        self.si.read_block(&mut frame)?;
        self.decode_measurement(&frame)
    }

    fn encode_limit(&self, limit: &AlertLimit) -> Result<u16, Error<CommE>> {
        let AlertLimit {
            temperature,
            humidity,
        } = *limit;
        let word = match self.config.scale {
            TemperatureScale::Celsius => codec::encode_alert_limit(temperature, humidity)?,
            TemperatureScale::Fahrenheit => {
                codec::encode_alert_limit_fahrenheit(temperature, humidity)?
            }
        };
        Ok(word)
    }

    fn decode_limit(&self, word: u16) -> AlertLimit {
        let (celsius, humidity) = codec::decode_alert_limit(word);
        let temperature = match self.config.scale {
            TemperatureScale::Celsius => celsius,
            TemperatureScale::Fahrenheit => codec::celsius_to_fahrenheit(celsius),
        };
        AlertLimit::new(temperature, humidity)
    }

    /// Program all four alert limits. Nothing is written unless every limit
    /// is in range and both clear limits sit inside their set limits.
    pub fn set_alert_thresholds(
        &mut self,
        high_set: AlertLimit,
        high_clear: AlertLimit,
        low_set: AlertLimit,
        low_clear: AlertLimit,
    ) -> Result<(), Error<CommE>> {
        let thresholds = AlertThresholds {
            high_set,
            high_clear,
            low_set,
            low_clear,
        };
        thresholds
            .check_hysteresis()
            .map_err(|limit| Error::InvalidHysteresis { limit })?;

        let writes = [
            (CMD_WRITE_HIGH_SET, self.encode_limit(&thresholds.high_set)?),
            (CMD_WRITE_HIGH_CLEAR, self.encode_limit(&thresholds.high_clear)?),
            (CMD_WRITE_LOW_CLEAR, self.encode_limit(&thresholds.low_clear)?),
            (CMD_WRITE_LOW_SET, self.encode_limit(&thresholds.low_set)?),
        ];

        self.write_limit_words(&writes)?;
        self.limit_words = Some(writes);
        Ok(())
    }

    fn write_limit_words(&mut self, writes: &[(u16, u16); 4]) -> Result<(), Error<CommE>> {
        for (command, word) in writes.iter() {
            let [cmd_msb, cmd_lsb] = command.to_be_bytes();
            let [msb, lsb, crc] = codec::word_with_crc(*word);
            self.si.write_block(&[cmd_msb, cmd_lsb, msb, lsb, crc])?;
        }

        self.alert = AlertState::Armed;
        log::debug!("SHT31 alert thresholds programmed");
        Ok(())
    }

    /// Read the alert limits back from the sensor, in the configured scale
    pub fn alert_thresholds(&mut self) -> Result<AlertThresholds, Error<CommE>> {
        let high_set = self.read_word(CMD_READ_HIGH_SET, Channel::AlertLimit)?;
        let high_clear = self.read_word(CMD_READ_HIGH_CLEAR, Channel::AlertLimit)?;
        let low_clear = self.read_word(CMD_READ_LOW_CLEAR, Channel::AlertLimit)?;
        let low_set = self.read_word(CMD_READ_LOW_SET, Channel::AlertLimit)?;

        Ok(AlertThresholds {
            high_set: self.decode_limit(high_set),
            high_clear: self.decode_limit(high_clear),
            low_set: self.decode_limit(low_set),
            low_clear: self.decode_limit(low_clear),
        })
    }

    /// Read the status register. A pending alert moves an armed alert to fired.
    pub fn status(&mut self) -> Result<Status, Error<CommE>> {
        let status = Status(self.read_word(CMD_READ_STATUS, Channel::Status)?);
        if status.alert_pending() && self.alert == AlertState::Armed {
            log::debug!("SHT31 alert fired");
            self.alert = AlertState::Fired;
        }
        Ok(status)
    }

    /// Clear the status register flags, acknowledging a fired alert
    pub fn clear_alert(&mut self) -> Result<(), Error<CommE>> {
        self.send_command(CMD_CLEAR_STATUS)?;
        if self.alert == AlertState::Fired {
            self.alert = AlertState::Armed;
        }
        Ok(())
    }

    pub fn set_heater(&mut self, on: bool) -> Result<(), Error<CommE>> {
        self.send_command(if on { CMD_HEATER_ON } else { CMD_HEATER_OFF })
    }

    /// Perform a soft reset on the sensor. The sensor comes back idle with
    /// its default alert limits, so the limit words last programmed through
    /// this driver are written again unchanged.
    pub fn soft_reset(&mut self, delay_source: &mut impl DelayMs<u8>) -> Result<(), Error<CommE>> {
        self.stop_periodic_mode()?;
        self.send_command(CMD_SOFT_RESET)?;
        delay_source.delay_ms(SOFT_RESET_TIME_MS);

        self.alert = AlertState::Unarmed;
        if let Some(writes) = self.limit_words {
            self.write_limit_words(&writes)?;
        }
        Ok(())
    }
}

impl<I2C> Sht31<I2cInterface<I2C>> {
    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.si.release()
    }
}
