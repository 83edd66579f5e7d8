pub mod i2c;

pub use self::i2c::I2cInterface;

/// A method of communicating with the sensor
pub trait SensorInterface {
    /// Interface error type
    type InterfaceError;

    /// Write the whole block provided, command bytes first
    fn write_block(&mut self, block: &[u8]) -> Result<(), Self::InterfaceError>;

    /// Read exactly `buffer.len()` bytes from the sensor
    fn read_block(&mut self, buffer: &mut [u8]) -> Result<(), Self::InterfaceError>;

    /// Send a command and read the response in one bus transaction
    /// (repeated start, no stop in between)
    fn write_read_block(
        &mut self,
        command: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::InterfaceError>;

    /// Read a single byte register addressed by a one-byte command
    fn register_read(&mut self, command: u8) -> Result<u8, Self::InterfaceError> {
        let mut block = [0u8; 1];
        self.write_read_block(&[command], &mut block)?;
        Ok(block[0])
    }

    /// Write a single byte register addressed by a one-byte command
    fn register_write(&mut self, command: u8, val: u8) -> Result<(), Self::InterfaceError> {
        self.write_block(&[command, val])
    }
}
