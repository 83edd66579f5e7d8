//! Device-native number formats shared by the drivers.
//!
//! Everything in here is pure: no bus access, no driver state. Physical values
//! outside the range a register can represent are rejected with
//! [`OutOfRange`] instead of being clamped, so a threshold can never silently
//! end up somewhere the caller did not ask for.

use crc::{Crc, CRC_8_NRSC_5};

/// Sensirion CRC-8: polynomial 0x31, init 0xFF, no reflection, no final xor
const SENSIRION_CRC: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

/// Lowest temperature the SHT31 encodes, °C
pub const TEMPERATURE_MIN_C: f32 = -45.0;
/// Highest temperature the SHT31 encodes, °C
pub const TEMPERATURE_MAX_C: f32 = 130.0;
/// Relative humidity limits, %
pub const HUMIDITY_MIN: f32 = 0.0;
pub const HUMIDITY_MAX: f32 = 100.0;

/// The same temperature limits in °F
pub const TEMPERATURE_MIN_F: f32 = -49.0;
pub const TEMPERATURE_MAX_F: f32 = 266.0;

const TEMPERATURE_SPAN_C: f32 = TEMPERATURE_MAX_C - TEMPERATURE_MIN_C;
const TEMPERATURE_SPAN_F: f32 = TEMPERATURE_MAX_F - TEMPERATURE_MIN_F;
const RAW_FULL_SCALE: f32 = 65535.0;

/// Alert limit word: humidity in bits 15:9, temperature in bits 8:0
const LIMIT_HUMIDITY_MASK: u16 = 0xFE00;
const LIMIT_TEMPERATURE_MASK: u16 = 0x01FF;
/// The 9 temperature bits are the top 9 bits of the 16-bit raw temperature
const LIMIT_TEMPERATURE_SHIFT: u32 = 7;

/// A value that has no encoding in the target register
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange {
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

fn check_range(value: f32, min: f32, max: f32) -> Result<f32, OutOfRange> {
    // NaN fails `contains` too
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(OutOfRange { value, min, max })
    }
}

/// CRC over a data word as transmitted by the SHT31
pub fn crc8(data: &[u8]) -> u8 {
    SENSIRION_CRC.checksum(data)
}

/// Serialize a word MSB first followed by its CRC
pub fn word_with_crc(word: u16) -> [u8; 3] {
    let [msb, lsb] = word.to_be_bytes();
    [msb, lsb, crc8(&[msb, lsb])]
}

/// Extract the word from a `[msb, lsb, crc]` frame, `None` if the CRC is wrong
pub fn checked_word(frame: &[u8; 3]) -> Option<u16> {
    if crc8(&frame[..2]) == frame[2] {
        Some(u16::from_be_bytes([frame[0], frame[1]]))
    } else {
        None
    }
}

pub fn raw_to_celsius(raw: u16) -> f32 {
    TEMPERATURE_MIN_C + TEMPERATURE_SPAN_C * (f32::from(raw) / RAW_FULL_SCALE)
}

pub fn raw_to_fahrenheit(raw: u16) -> f32 {
    TEMPERATURE_MIN_F + TEMPERATURE_SPAN_F * (f32::from(raw) / RAW_FULL_SCALE)
}

pub fn raw_to_humidity(raw: u16) -> f32 {
    HUMIDITY_MAX * (f32::from(raw) / RAW_FULL_SCALE)
}

pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Inverse of [`raw_to_celsius`], truncating toward the lower code
pub fn celsius_to_raw(celsius: f32) -> Result<u16, OutOfRange> {
    let celsius = check_range(celsius, TEMPERATURE_MIN_C, TEMPERATURE_MAX_C)?;
    Ok(((celsius - TEMPERATURE_MIN_C) * RAW_FULL_SCALE / TEMPERATURE_SPAN_C) as u16)
}

/// Inverse of [`raw_to_humidity`], truncating toward the lower code
pub fn humidity_to_raw(percent: f32) -> Result<u16, OutOfRange> {
    let percent = check_range(percent, HUMIDITY_MIN, HUMIDITY_MAX)?;
    Ok((percent * RAW_FULL_SCALE / HUMIDITY_MAX) as u16)
}

/// Pack a (temperature, humidity) pair into an SHT31 alert limit word.
///
/// The limit keeps the 7 most significant bits of the raw humidity and the
/// 9 most significant bits of the raw temperature, so the resolution is
/// 100/128 % and 175/512 °C.
pub fn encode_alert_limit(celsius: f32, percent: f32) -> Result<u16, OutOfRange> {
    let temperature = celsius_to_raw(celsius)?;
    let humidity = humidity_to_raw(percent)?;
    Ok((humidity & LIMIT_HUMIDITY_MASK)
        | ((temperature >> LIMIT_TEMPERATURE_SHIFT) & LIMIT_TEMPERATURE_MASK))
}

/// Like [`encode_alert_limit`] with the temperature in °F. A temperature
/// outside the sensor range is reported in °F.
pub fn encode_alert_limit_fahrenheit(fahrenheit: f32, percent: f32) -> Result<u16, OutOfRange> {
    let fahrenheit = check_range(fahrenheit, TEMPERATURE_MIN_F, TEMPERATURE_MAX_F)?;
    encode_alert_limit(fahrenheit_to_celsius(fahrenheit), percent)
}

/// Unpack an SHT31 alert limit word into (°C, %RH)
pub fn decode_alert_limit(word: u16) -> (f32, f32) {
    let temperature = (word & LIMIT_TEMPERATURE_MASK) << LIMIT_TEMPERATURE_SHIFT;
    let humidity = word & LIMIT_HUMIDITY_MASK;
    (raw_to_celsius(temperature), raw_to_humidity(humidity))
}

/// A threshold window must not be inverted
pub fn check_window(low: u16, high: u16) -> Result<(), OutOfRange> {
    check_range(f32::from(low), 0.0, f32::from(high)).map(|_| ())
}

pub fn encode_u16_le(word: u16) -> [u8; 2] {
    word.to_le_bytes()
}

pub fn decode_u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}
