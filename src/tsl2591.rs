/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Driver for the ams TSL2591 light to digital converter.
//!
//! Registers are addressed through a command byte: `0xA0 | register` for
//! normal register access, `0xE0 | function` for the special functions that
//! force or clear interrupts. Multi-byte values are little-endian.

use crate::codec;
use crate::interface::{I2cInterface, SensorInterface};
use crate::Error;

/// The TSL2591 has a single fixed address
pub const DEFAULT_ADDRESS: u8 = 0x29;

/// Command bit plus normal transaction type
const COMMAND_NORMAL: u8 = 0xA0;
/// Command bit plus special function transaction type
const COMMAND_SPECIAL: u8 = 0xE0;

const SF_FORCE_INTERRUPT: u8 = 0x04;
const SF_CLEAR_ALS_INTERRUPT: u8 = 0x06;
const SF_CLEAR_ALL_INTERRUPTS: u8 = 0x07;

const REG_ENABLE: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;
const REG_AILTL: u8 = 0x04;
const REG_AIHTL: u8 = 0x06;
const REG_NPAILTL: u8 = 0x08;
const REG_NPAIHTL: u8 = 0x0A;
const REG_PERSIST: u8 = 0x0C;
const REG_ID: u8 = 0x12;
const REG_STATUS: u8 = 0x13;
const REG_C0DATAL: u8 = 0x14;

const ENABLE_PON: u8 = 0x01;
const ENABLE_AEN: u8 = 0x02;
const ENABLE_AIEN: u8 = 0x10;
const ENABLE_SAI: u8 = 0x40;
const ENABLE_NPIEN: u8 = 0x80;

const CONFIG_SRESET: u8 = 0x80;
const CONFIG_AGAIN_MASK: u8 = 0x30;
const CONFIG_ATIME_MASK: u8 = 0x07;

const STATUS_AVALID: u8 = 0x01;
const STATUS_AINT: u8 = 0x10;
const STATUS_NPINTR: u8 = 0x20;

/// Device ID for the TSL2591
const TSL2591_ID: u8 = 0x50;

/// Counts per lux scale factor used by the lux estimate
const LUX_DF: f32 = 408.0;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Analog gain. The numeric values are the AGAIN field already in place.
pub enum Gain {
    /// 1x
    #[default]
    Low = 0x00,
    /// 25x
    Medium = 0x10,
    /// 428x
    High = 0x20,
    /// 9876x
    Max = 0x30,
}

impl Gain {
    /// Nominal gain multiplier
    pub fn multiplier(&self) -> f32 {
        match self {
            Gain::Low => 1.0,
            Gain::Medium => 25.0,
            Gain::High => 428.0,
            Gain::Max => 9876.0,
        }
    }
}

#[repr(u8)]
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// ADC integration time, also the time between results.
/// The numeric values are the ATIME field.
pub enum IntegrationTime {
    #[default]
    Ms_100 = 0b000,
    Ms_200 = 0b001,
    Ms_300 = 0b010,
    Ms_400 = 0b011,
    Ms_500 = 0b100,
    Ms_600 = 0b101,
}

impl IntegrationTime {
    pub fn millis(&self) -> u16 {
        (*self as u16 + 1) * 100
    }

    /// Highest count a channel can reach; anything at or above is clipped
    pub fn max_count(&self) -> u16 {
        match self {
            IntegrationTime::Ms_100 => 36863,
            _ => 65535,
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Number of consecutive out-of-window integration cycles before the
/// persistent interrupt asserts
pub enum Persist {
    /// Every ALS cycle generates an interrupt
    #[default]
    Every = 0x0,
    /// Any single value outside the window
    Any = 0x1,
    Cycles2 = 0x2,
    Cycles3 = 0x3,
    Cycles5 = 0x4,
    Cycles10 = 0x5,
    Cycles15 = 0x6,
    Cycles20 = 0x7,
    Cycles25 = 0x8,
    Cycles30 = 0x9,
    Cycles35 = 0xA,
    Cycles40 = 0xB,
    Cycles45 = 0xC,
    Cycles50 = 0xD,
    Cycles55 = 0xE,
    Cycles60 = 0xF,
}

/// Host side configuration snapshot. Defaults match the state after
/// `system_reset`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub gain: Gain,
    pub integration_time: IntegrationTime,
    pub persist: Persist,
    /// Persistent interrupt window on channel 0, raw counts
    pub interrupt_low: u16,
    pub interrupt_high: u16,
    /// No-persist interrupt window on channel 0, raw counts
    pub no_persist_low: u16,
    pub no_persist_high: u16,
    /// Also enable the no-persist interrupt on the next `enable`
    pub no_persist_interrupt: bool,
    /// Power down after an interrupt until it is cleared
    pub sleep_after_interrupt: bool,
}

impl Config {
    /// Estimate illuminance from a raw reading taken with this
    /// configuration. The result is only as good as the vendor's
    /// undocumented coefficient.
    pub fn lux(&self, raw: RawLuminosity) -> f32 {
        if raw.full == 0 {
            return 0.0;
        }
        let full = f32::from(raw.full);
        let ir = f32::from(raw.ir);
        let counts_per_lux =
            f32::from(self.integration_time.millis()) * self.gain.multiplier() / LUX_DF;
        (full - ir) * (1.0 - ir / full) / counts_per_lux
    }
}

/// Channel 0 (full spectrum) and channel 1 (infrared) counts
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawLuminosity {
    pub full: u16,
    pub ir: u16,
}

impl RawLuminosity {
    pub fn visible(&self) -> u16 {
        self.full.saturating_sub(self.ir)
    }
}

/// A reading, or a clipped one that should not be trusted as a maximum
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlsReading {
    Valid(RawLuminosity),
    Saturated(RawLuminosity),
}

impl AlsReading {
    pub fn is_saturated(&self) -> bool {
        matches!(self, AlsReading::Saturated(_))
    }

    /// The counts, whether or not they were clipped
    pub fn raw(&self) -> RawLuminosity {
        match self {
            AlsReading::Valid(raw) | AlsReading::Saturated(raw) => *raw,
        }
    }
}

/// ALS engine and interrupt state as known to the host
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Disabled,
    /// Converting, interrupt pin not in use
    Polling,
    InterruptArmed,
    /// The status register reported an ALS interrupt
    InterruptPending,
}

/// Status register contents
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u8);

impl Status {
    /// An integration cycle completed since the ALS was enabled
    pub fn valid(&self) -> bool {
        self.0 & STATUS_AVALID != 0
    }

    pub fn als_interrupt(&self) -> bool {
        self.0 & STATUS_AINT != 0
    }

    pub fn no_persist_interrupt(&self) -> bool {
        self.0 & STATUS_NPINTR != 0
    }
}

pub struct Tsl2591<SI> {
    pub(crate) si: SI,

    config: Config,
    state: State,
}

impl<SI, CommE> Tsl2591<SI>
where
    SI: SensorInterface<InterfaceError = Error<CommE>>,
{
    pub(crate) fn new_with_interface(sensor_interface: SI) -> Self {
        Self {
            si: sensor_interface,
            config: Config::default(),
            state: State::Disabled,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn read_register(&mut self, reg: u8) -> Result<u8, Error<CommE>> {
        self.si.register_read(COMMAND_NORMAL | reg)
    }

    fn write_register(&mut self, reg: u8, val: u8) -> Result<(), Error<CommE>> {
        self.si.register_write(COMMAND_NORMAL | reg, val)
    }

    fn write_word(&mut self, reg: u8, word: u16) -> Result<(), Error<CommE>> {
        let [lo, hi] = codec::encode_u16_le(word);
        self.si.write_block(&[COMMAND_NORMAL | reg, lo, hi])
    }

    fn special_function(&mut self, function: u8) -> Result<(), Error<CommE>> {
        self.si.write_block(&[COMMAND_SPECIAL | function])
    }

    pub fn device_id(&mut self) -> Result<u8, Error<CommE>> {
        self.read_register(REG_ID)
    }

    /// Verify that the chip answering at our address is a TSL2591
    pub fn check_identity(&mut self) -> Result<(), Error<CommE>> {
        let chip_id = self.device_id()?;
        if chip_id == TSL2591_ID {
            log::debug!("found TSL2591");
            Ok(())
        } else {
            log::debug!("bogus chip id: 0x{:02x}", chip_id);
            Err(Error::UnknownChipId(chip_id))
        }
    }

    /// Reset the device to its power-on defaults: ALS off, low gain,
    /// 100 ms integration. Settings are not restored afterwards.
    ///
    /// Some parts reset before acknowledging the write, so a bus error is
    /// still returned but the host side state is reset either way.
    pub fn system_reset(&mut self) -> Result<(), Error<CommE>> {
        let rc = self.write_register(REG_CONFIG, CONFIG_SRESET);
        self.config = Config::default();
        self.state = State::Disabled;
        match &rc {
            Ok(()) => log::debug!("TSL2591 reset"),
            Err(_) => log::warn!("TSL2591 reset not acknowledged"),
        }
        rc
    }

    /// Replace one field of the CONFIG register, keeping the other
    fn update_config_register(&mut self, mask: u8, field: u8) -> Result<(), Error<CommE>> {
        let current = self.read_register(REG_CONFIG)?;
        let updated = (current & !(mask | CONFIG_SRESET)) | (field & mask);
        self.write_register(REG_CONFIG, updated)
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), Error<CommE>> {
        self.update_config_register(CONFIG_AGAIN_MASK, gain as u8)?;
        self.config.gain = gain;
        Ok(())
    }

    pub fn set_integration_time(&mut self, time: IntegrationTime) -> Result<(), Error<CommE>> {
        self.update_config_register(CONFIG_ATIME_MASK, time as u8)?;
        self.config.integration_time = time;
        Ok(())
    }

    /// Program the persistent interrupt window on channel 0 and its filter.
    /// Must be done before `enable(true)`.
    pub fn set_interrupt_thresholds(
        &mut self,
        low: u16,
        high: u16,
        persist: Persist,
    ) -> Result<(), Error<CommE>> {
        codec::check_window(low, high)?;
        self.write_word(REG_AILTL, low)?;
        self.write_word(REG_AIHTL, high)?;
        self.write_register(REG_PERSIST, persist as u8)?;
        self.config.interrupt_low = low;
        self.config.interrupt_high = high;
        self.config.persist = persist;
        Ok(())
    }

    /// Program the no-persist interrupt window, which ignores the filter
    pub fn set_no_persist_thresholds(&mut self, low: u16, high: u16) -> Result<(), Error<CommE>> {
        codec::check_window(low, high)?;
        self.write_word(REG_NPAILTL, low)?;
        self.write_word(REG_NPAIHTL, high)?;
        self.config.no_persist_low = low;
        self.config.no_persist_high = high;
        Ok(())
    }

    /// Takes effect on the next `enable`
    pub fn set_no_persist_interrupt(&mut self, enabled: bool) {
        self.config.no_persist_interrupt = enabled;
    }

    /// Takes effect on the next `enable`
    pub fn set_sleep_after_interrupt(&mut self, enabled: bool) {
        self.config.sleep_after_interrupt = enabled;
    }

    /// Power on and start integrating. The first cycle starts immediately,
    /// so gain, timing and thresholds should already be configured.
    pub fn enable(&mut self, interrupt: bool) -> Result<(), Error<CommE>> {
        let mut enable = ENABLE_PON | ENABLE_AEN;
        if interrupt {
            enable |= ENABLE_AIEN;
        }
        if self.config.no_persist_interrupt {
            enable |= ENABLE_NPIEN;
        }
        if self.config.sleep_after_interrupt {
            enable |= ENABLE_SAI;
        }
        self.write_register(REG_ENABLE, enable)?;
        self.state = if interrupt {
            State::InterruptArmed
        } else {
            State::Polling
        };
        log::debug!("TSL2591 enabled: {:?}", self.state);
        Ok(())
    }

    /// Power the device down
    pub fn disable(&mut self) -> Result<(), Error<CommE>> {
        self.write_register(REG_ENABLE, 0x00)?;
        self.state = State::Disabled;
        Ok(())
    }

    /// Read both channels in one transaction
    pub fn raw_data(&mut self) -> Result<AlsReading, Error<CommE>> {
        if self.state == State::Disabled {
            return Err(Error::NotEnabled);
        }
        let mut block = [0u8; 4];
        self.si
            .write_read_block(&[COMMAND_NORMAL | REG_C0DATAL], &mut block)?;
        let raw = RawLuminosity {
            full: codec::decode_u16_le([block[0], block[1]]),
            ir: codec::decode_u16_le([block[2], block[3]]),
        };

        let max_count = self.config.integration_time.max_count();
        if raw.full >= max_count || raw.ir >= max_count {
            log::warn!("TSL2591 saturated: {:?}", raw);
            Ok(AlsReading::Saturated(raw))
        } else {
            Ok(AlsReading::Valid(raw))
        }
    }

    /// Read the status register. An ALS interrupt moves an armed
    /// interrupt to pending.
    pub fn status(&mut self) -> Result<Status, Error<CommE>> {
        let status = Status(self.read_register(REG_STATUS)?);
        if status.als_interrupt() && self.state == State::InterruptArmed {
            self.state = State::InterruptPending;
        }
        Ok(status)
    }

    /// Clear the ALS interrupt so the pin can assert again
    pub fn clear_interrupt(&mut self) -> Result<(), Error<CommE>> {
        self.special_function(SF_CLEAR_ALS_INTERRUPT)?;
        self.rearm();
        Ok(())
    }

    /// Clear both the ALS and the no-persist interrupt
    pub fn clear_all_interrupts(&mut self) -> Result<(), Error<CommE>> {
        self.special_function(SF_CLEAR_ALL_INTERRUPTS)?;
        self.rearm();
        Ok(())
    }

    /// Assert the interrupt regardless of the thresholds
    pub fn force_interrupt(&mut self) -> Result<(), Error<CommE>> {
        self.special_function(SF_FORCE_INTERRUPT)?;
        if self.state == State::InterruptArmed {
            self.state = State::InterruptPending;
        }
        Ok(())
    }

    fn rearm(&mut self) {
        if self.state == State::InterruptPending {
            self.state = State::InterruptArmed;
        }
    }
}

impl<I2C> Tsl2591<I2cInterface<I2C>> {
    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.si.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Builder;
    use embedded_hal_mock::eh0::i2c::{Mock as I2cMock, Transaction};
    use embedded_hal_mock::eh0::MockError;
    use std::io::ErrorKind;

    const ADDR: u8 = DEFAULT_ADDRESS;

    #[test]
    fn identity() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0xB2], vec![0x50]),
            Transaction::write_read(ADDR, vec![0xB2], vec![0x12]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        assert!(sensor.check_identity().is_ok());
        assert!(matches!(
            sensor.check_identity(),
            Err(Error::UnknownChipId(0x12))
        ));
        sensor.release().done();
    }

    #[test]
    fn gain_keeps_integration_time() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0xA1], vec![0x03]),
            Transaction::write(ADDR, vec![0xA1, 0x23]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor.set_gain(Gain::High).unwrap();
        assert_eq!(sensor.config().gain, Gain::High);
        sensor.release().done();
    }

    #[test]
    fn gain_and_time_are_order_independent() {
        // power-on register has the default gain and time: 0x00
        let gain_first = [
            Transaction::write_read(ADDR, vec![0xA1], vec![0x00]),
            Transaction::write(ADDR, vec![0xA1, 0x10]),
            Transaction::write_read(ADDR, vec![0xA1], vec![0x10]),
            Transaction::write(ADDR, vec![0xA1, 0x14]),
        ];
        let time_first = [
            Transaction::write_read(ADDR, vec![0xA1], vec![0x00]),
            Transaction::write(ADDR, vec![0xA1, 0x04]),
            Transaction::write_read(ADDR, vec![0xA1], vec![0x04]),
            Transaction::write(ADDR, vec![0xA1, 0x14]),
        ];

        let mut sensor = Builder::new_tsl2591(I2cMock::new(&gain_first), ADDR);
        sensor.set_gain(Gain::Medium).unwrap();
        sensor.set_integration_time(IntegrationTime::Ms_500).unwrap();
        let config_a = *sensor.config();
        sensor.release().done();

        let mut sensor = Builder::new_tsl2591(I2cMock::new(&time_first), ADDR);
        sensor.set_integration_time(IntegrationTime::Ms_500).unwrap();
        sensor.set_gain(Gain::Medium).unwrap();
        assert_eq!(*sensor.config(), config_a);
        sensor.release().done();
    }

    #[test]
    fn reset_bit_is_never_written_back() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0xA1], vec![0x80]),
            Transaction::write(ADDR, vec![0xA1, 0x30]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor.set_gain(Gain::Max).unwrap();
        sensor.release().done();
    }

    #[test]
    fn system_reset_returns_to_defaults() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0xA1], vec![0x00]),
            Transaction::write(ADDR, vec![0xA1, 0x20]),
            Transaction::write(ADDR, vec![0xA0, 0x03]),
            Transaction::write(ADDR, vec![0xA1, 0x80]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor.set_gain(Gain::High).unwrap();
        sensor.enable(false).unwrap();
        sensor.system_reset().unwrap();
        assert_eq!(*sensor.config(), Config::default());
        assert_eq!(sensor.state(), State::Disabled);
        sensor.release().done();
    }

    #[test]
    fn unacknowledged_reset_still_resets_state() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0xA1], vec![0x00]),
            Transaction::write(ADDR, vec![0xA1, 0x20]),
            Transaction::write(ADDR, vec![0xA0, 0x03]),
            Transaction::write(ADDR, vec![0xA1, 0x80])
                .with_error(MockError::Io(ErrorKind::Other)),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor.set_gain(Gain::High).unwrap();
        sensor.enable(false).unwrap();
        assert!(matches!(sensor.system_reset(), Err(Error::Comm(_))));
        assert_eq!(*sensor.config(), Config::default());
        assert_eq!(sensor.state(), State::Disabled);
        assert!(matches!(sensor.raw_data(), Err(Error::NotEnabled)));
        sensor.release().done();
    }

    #[test]
    fn thresholds_are_little_endian() {
        let expectations = [
            Transaction::write(ADDR, vec![0xA4, 0x34, 0x12]),
            Transaction::write(ADDR, vec![0xA6, 0xCD, 0xAB]),
            Transaction::write(ADDR, vec![0xAC, 0x05]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor
            .set_interrupt_thresholds(0x1234, 0xABCD, Persist::Cycles10)
            .unwrap();
        assert_eq!(sensor.config().persist, Persist::Cycles10);
        sensor.release().done();
    }

    #[test]
    fn inverted_window_writes_nothing() {
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&[]), ADDR);
        let rc = sensor.set_interrupt_thresholds(500, 100, Persist::Any);
        assert!(matches!(rc, Err(Error::ThresholdOutOfRange { .. })));
        let rc = sensor.set_no_persist_thresholds(2, 1);
        assert!(matches!(rc, Err(Error::ThresholdOutOfRange { .. })));
        sensor.release().done();
    }

    #[test]
    fn no_persist_window() {
        let expectations = [
            Transaction::write(ADDR, vec![0xA8, 0x64, 0x00]),
            Transaction::write(ADDR, vec![0xAA, 0x10, 0x27]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor.set_no_persist_thresholds(100, 10_000).unwrap();
        sensor.release().done();
    }

    #[test]
    fn enable_bits() {
        let expectations = [
            Transaction::write(ADDR, vec![0xA0, 0x03]),
            Transaction::write(ADDR, vec![0xA0, 0x13]),
            Transaction::write(ADDR, vec![0xA0, 0xD3]),
            Transaction::write(ADDR, vec![0xA0, 0x00]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor.enable(false).unwrap();
        assert_eq!(sensor.state(), State::Polling);
        sensor.enable(true).unwrap();
        assert_eq!(sensor.state(), State::InterruptArmed);
        sensor.set_no_persist_interrupt(true);
        sensor.set_sleep_after_interrupt(true);
        sensor.enable(true).unwrap();
        sensor.disable().unwrap();
        assert_eq!(sensor.state(), State::Disabled);
        sensor.release().done();
    }

    #[test]
    fn raw_data_decodes_both_channels() {
        let expectations = [
            Transaction::write(ADDR, vec![0xA0, 0x03]),
            Transaction::write_read(ADDR, vec![0xB4], vec![0x34, 0x12, 0x00, 0x00]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor.enable(false).unwrap();
        let reading = sensor.raw_data().unwrap();
        assert_eq!(
            reading,
            AlsReading::Valid(RawLuminosity {
                full: 0x1234,
                ir: 0x0000
            })
        );
        assert_eq!(reading.raw().visible(), 0x1234);
        sensor.release().done();
    }

    #[test]
    fn raw_data_flags_saturation() {
        let expectations = [
            Transaction::write(ADDR, vec![0xA0, 0x03]),
            Transaction::write_read(ADDR, vec![0xB4], vec![0xFF, 0xFF, 0xFF, 0xFF]),
            // 36863 is full scale at 100 ms
            Transaction::write_read(ADDR, vec![0xB4], vec![0xFF, 0x8F, 0x00, 0x10]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor.enable(false).unwrap();
        assert!(sensor.raw_data().unwrap().is_saturated());
        assert!(sensor.raw_data().unwrap().is_saturated());
        sensor.release().done();
    }

    #[test]
    fn raw_data_requires_enable() {
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&[]), ADDR);
        assert!(matches!(sensor.raw_data(), Err(Error::NotEnabled)));
        sensor.release().done();
    }

    #[test]
    fn interrupt_cycle() {
        let expectations = [
            Transaction::write(ADDR, vec![0xA4, 0x64, 0x00]),
            Transaction::write(ADDR, vec![0xA6, 0xE8, 0x03]),
            Transaction::write(ADDR, vec![0xAC, 0x02]),
            Transaction::write(ADDR, vec![0xA0, 0x13]),
            Transaction::write_read(ADDR, vec![0xB3], vec![0x11]),
            Transaction::write_read(ADDR, vec![0xB4], vec![0xD0, 0x07, 0x10, 0x00]),
            Transaction::write(ADDR, vec![0xE6]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor
            .set_interrupt_thresholds(100, 1000, Persist::Cycles2)
            .unwrap();
        sensor.enable(true).unwrap();

        let status = sensor.status().unwrap();
        assert!(status.valid());
        assert!(status.als_interrupt());
        assert!(!status.no_persist_interrupt());
        assert_eq!(sensor.state(), State::InterruptPending);

        let reading = sensor.raw_data().unwrap();
        assert_eq!(reading.raw().full, 2000);

        sensor.clear_interrupt().unwrap();
        assert_eq!(sensor.state(), State::InterruptArmed);
        sensor.release().done();
    }

    #[test]
    fn forced_interrupt_and_clear_all() {
        let expectations = [
            Transaction::write(ADDR, vec![0xA0, 0x13]),
            Transaction::write(ADDR, vec![0xE4]),
            Transaction::write(ADDR, vec![0xE7]),
        ];
        let mut sensor = Builder::new_tsl2591(I2cMock::new(&expectations), ADDR);
        sensor.enable(true).unwrap();
        sensor.force_interrupt().unwrap();
        assert_eq!(sensor.state(), State::InterruptPending);
        sensor.clear_all_interrupts().unwrap();
        assert_eq!(sensor.state(), State::InterruptArmed);
        sensor.release().done();
    }

    #[test]
    fn lux_estimate() {
        let config = Config::default();
        let raw = RawLuminosity {
            full: 1000,
            ir: 200,
        };
        // (800 * 0.8) / (100 * 1 / 408)
        assert!((config.lux(raw) - 2611.2).abs() < 0.5);
        assert_eq!(config.lux(RawLuminosity { full: 0, ir: 0 }), 0.0);
    }

    #[test]
    fn integration_times() {
        assert_eq!(IntegrationTime::Ms_100.millis(), 100);
        assert_eq!(IntegrationTime::Ms_600.millis(), 600);
        assert_eq!(IntegrationTime::Ms_200.max_count(), 65535);
    }
}
