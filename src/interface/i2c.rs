use embedded_hal as hal;

use super::SensorInterface;
use crate::Error;

/// Binds an I2C bus to the address of one sensor on that bus
pub struct I2cInterface<I2C> {
    /// i2c port
    i2c_port: I2C,
    /// address for i2c communications
    address: u8,
}

impl<I2C, CommE> I2cInterface<I2C>
where
    I2C: hal::blocking::i2c::Read<Error = CommE>
        + hal::blocking::i2c::Write<Error = CommE>
        + hal::blocking::i2c::WriteRead<Error = CommE>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c_port: i2c,
            address,
        }
    }
}

impl<I2C> I2cInterface<I2C> {
    /// The 7-bit device address this interface talks to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release owned resources
    pub fn release(self) -> I2C {
        self.i2c_port
    }
}

impl<I2C, CommE> SensorInterface for I2cInterface<I2C>
where
    I2C: hal::blocking::i2c::Read<Error = CommE>
        + hal::blocking::i2c::Write<Error = CommE>
        + hal::blocking::i2c::WriteRead<Error = CommE>,
{
    type InterfaceError = Error<CommE>;

    fn write_block(&mut self, block: &[u8]) -> Result<(), Self::InterfaceError> {
        log::trace!("i2c 0x{:02x} write {:02x?}", self.address, block);
        self.i2c_port
            .write(self.address, block)
            .map_err(Error::Comm)
    }

    fn read_block(&mut self, buffer: &mut [u8]) -> Result<(), Self::InterfaceError> {
        self.i2c_port
            .read(self.address, buffer)
            .map_err(Error::Comm)?;
        log::trace!("i2c 0x{:02x} read {:02x?}", self.address, buffer);
        Ok(())
    }

    fn write_read_block(
        &mut self,
        command: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::InterfaceError> {
        self.i2c_port
            .write_read(self.address, command, buffer)
            .map_err(Error::Comm)?;
        log::trace!(
            "i2c 0x{:02x} write {:02x?} read {:02x?}",
            self.address,
            command,
            buffer
        );
        Ok(())
    }
}
