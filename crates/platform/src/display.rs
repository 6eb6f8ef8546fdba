//! LCD transport abstraction
//!
//! The driver never touches a peripheral directly. Every byte it sends to the
//! controller goes through [`LcdBus`], which hides whether the panel hangs off
//! a 16-bit FSMC bus or an 8-bit SPI link with a D/C line.

/// Raw command/data transport to an ILI9341-class controller.
///
/// Implementations block until the transfer has completed. A transport that
/// never completes blocks its caller forever; no timeout is imposed here.
pub trait LcdBus {
    /// Error type for bus operations
    type Error: core::fmt::Debug;

    /// Pulse the controller's hardware reset line.
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Write one command byte (D/C low).
    fn write_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Write one 16-bit data word (D/C high).
    ///
    /// Pixel words are RGB565. On an 8-bit serial link the word is sent high
    /// byte first.
    fn write_data(&mut self, word: u16) -> Result<(), Self::Error>;

    /// Read one data word from the controller.
    fn read_data(&mut self) -> Result<u16, Self::Error>;

    /// Read the answer to a memory read (`RAMRD`) for one pixel as
    /// `[r, g, b]`, each colour in the high bits of its byte.
    ///
    /// The default follows the 16-bit parallel layout: a dummy word, then R
    /// and G packed in one word, then B in the high byte of the next.
    /// Serial transports override this with their byte-wide layout.
    fn read_rgb(&mut self) -> Result<[u8; 3], Self::Error> {
        let _ = self.read_data()?;
        let [r, g] = self.read_data()?.to_be_bytes();
        let [b, _] = self.read_data()?.to_be_bytes();
        Ok([r, g, b])
    }

    /// Write one command parameter byte.
    ///
    /// On a 16-bit parallel bus a parameter occupies the low byte of a data
    /// word, which is what the default does. Serial transports override this
    /// to send exactly one byte.
    fn write_param(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write_data(u16::from(byte))
    }

    /// Write `count` copies of `word`.
    fn write_data_repeated(&mut self, word: u16, count: u32) -> Result<(), Self::Error> {
        for _ in 0..count {
            self.write_data(word)?;
        }
        Ok(())
    }

    /// Write a run of data words in order.
    fn write_data_slice(&mut self, words: &[u16]) -> Result<(), Self::Error> {
        for &word in words {
            self.write_data(word)?;
        }
        Ok(())
    }
}

impl<T: LcdBus + ?Sized> LcdBus for &mut T {
    type Error = T::Error;

    fn reset(&mut self) -> Result<(), Self::Error> {
        T::reset(self)
    }

    fn write_command(&mut self, command: u8) -> Result<(), Self::Error> {
        T::write_command(self, command)
    }

    fn write_data(&mut self, word: u16) -> Result<(), Self::Error> {
        T::write_data(self, word)
    }

    fn read_data(&mut self) -> Result<u16, Self::Error> {
        T::read_data(self)
    }

    fn read_rgb(&mut self) -> Result<[u8; 3], Self::Error> {
        T::read_rgb(self)
    }

    fn write_param(&mut self, byte: u8) -> Result<(), Self::Error> {
        T::write_param(self, byte)
    }

    fn write_data_repeated(&mut self, word: u16, count: u32) -> Result<(), Self::Error> {
        T::write_data_repeated(self, word, count)
    }

    fn write_data_slice(&mut self, words: &[u16]) -> Result<(), Self::Error> {
        T::write_data_slice(self, words)
    }
}

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// SPI or FSMC transfer failed
    Communication,
    /// D/C or reset line could not be driven
    Gpio,
}

#[cfg(feature = "std")]
impl std::error::Error for BusError {}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Communication => write!(f, "LCD bus transfer failed"),
            Self::Gpio => write!(f, "LCD control line error"),
        }
    }
}
