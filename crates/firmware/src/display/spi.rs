//! 4-wire SPI transport for the ILI9341.
//!
//! # Wiring (STM32 example)
//!
//! | Signal | STM32 pin | Direction |
//! |--------|-----------|-----------|
//! | SCK    | PA5 (SPI1_SCK)  | Host → Display |
//! | MOSI   | PA7 (SPI1_MOSI) | Host → Display |
//! | MISO   | PA6 (SPI1_MISO) | Display → Host |
//! | DC     | PB0 (GPIO)      | Host → Display |
//! | CS     | Managed by `SpiDevice` | Host → Display |
//! | RST    | PB2 (GPIO)      | Host → Display |
//!
//! Pixel words go out big-endian, parameters as single bytes. Reads return
//! one byte per call in the low half of the word; a pixel read is one
//! transfer of a dummy byte followed by R, G and B.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use platform::{BusError, LcdBus};

/// Bytes per SPI transfer when streaming pixels.
const CHUNK: usize = 64;

/// [`LcdBus`] over an `embedded-hal` SPI device plus D/C and reset pins.
pub struct SpiInterface<SPI, DC, RST, DELAY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    delay: DELAY,
}

impl<SPI, DC, RST, DELAY> SpiInterface<SPI, DC, RST, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Wrap the SPI device and control pins.
    pub fn new(spi: SPI, dc: DC, rst: RST, delay: DELAY) -> Self {
        Self { spi, dc, rst, delay }
    }

    /// Give back the SPI device, pins and delay.
    pub fn release(self) -> (SPI, DC, RST, DELAY) {
        (self.spi, self.dc, self.rst, self.delay)
    }

    /// Assert DC high (data mode) and send bytes over SPI.
    fn send_data(&mut self, data: &[u8]) -> Result<(), BusError> {
        if data.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(|_| BusError::Gpio)?;
        self.spi.write(data).map_err(|_| BusError::Communication)
    }

    /// Stream `words` big-endian in [`CHUNK`]-byte transfers.
    // len is always even and below CHUNK before a word is stored, so both
    // stores and the final slice stay inside buf.
    #[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
    fn send_words(&mut self, words: impl Iterator<Item = u16>) -> Result<(), BusError> {
        self.dc.set_high().map_err(|_| BusError::Gpio)?;
        let mut buf = [0u8; CHUNK];
        let mut len = 0;
        for word in words {
            let [hi, lo] = word.to_be_bytes();
            buf[len] = hi;
            buf[len + 1] = lo;
            len += 2;
            if len == CHUNK {
                self.spi.write(&buf).map_err(|_| BusError::Communication)?;
                len = 0;
            }
        }
        if len > 0 {
            self.spi
                .write(&buf[..len])
                .map_err(|_| BusError::Communication)?;
        }
        Ok(())
    }
}

impl<SPI, DC, RST, DELAY> LcdBus for SpiInterface<SPI, DC, RST, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    type Error = BusError;

    /// RST HIGH 1 ms → LOW 1 ms → HIGH, then 5 ms before the first command.
    fn reset(&mut self) -> Result<(), BusError> {
        self.rst.set_high().map_err(|_| BusError::Gpio)?;
        self.delay.delay_ms(1);
        self.rst.set_low().map_err(|_| BusError::Gpio)?;
        self.delay.delay_ms(1);
        self.rst.set_high().map_err(|_| BusError::Gpio)?;
        self.delay.delay_ms(5);
        Ok(())
    }

    /// Assert DC low (command mode) and send one command byte over SPI.
    ///
    /// `SpiDevice` handles CS assertion/de-assertion per transaction.
    fn write_command(&mut self, command: u8) -> Result<(), BusError> {
        self.dc.set_low().map_err(|_| BusError::Gpio)?;
        self.spi
            .write(&[command])
            .map_err(|_| BusError::Communication)
    }

    fn write_data(&mut self, word: u16) -> Result<(), BusError> {
        self.send_data(&word.to_be_bytes())
    }

    fn read_data(&mut self) -> Result<u16, BusError> {
        self.dc.set_high().map_err(|_| BusError::Gpio)?;
        let mut buf = [0u8; 1];
        self.spi
            .read(&mut buf)
            .map_err(|_| BusError::Communication)?;
        let [byte] = buf;
        Ok(u16::from(byte))
    }

    fn read_rgb(&mut self) -> Result<[u8; 3], BusError> {
        self.dc.set_high().map_err(|_| BusError::Gpio)?;
        let mut buf = [0u8; 4];
        self.spi
            .read(&mut buf)
            .map_err(|_| BusError::Communication)?;
        let [_, r, g, b] = buf;
        Ok([r, g, b])
    }

    fn write_param(&mut self, byte: u8) -> Result<(), BusError> {
        self.send_data(&[byte])
    }

    fn write_data_repeated(&mut self, word: u16, count: u32) -> Result<(), BusError> {
        if count == 0 {
            return Ok(());
        }
        self.send_words(core::iter::repeat(word).take(count as usize))
    }

    fn write_data_slice(&mut self, words: &[u16]) -> Result<(), BusError> {
        if words.is_empty() {
            return Ok(());
        }
        self.send_words(words.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    type TestInterface = SpiInterface<SpiMock<u8>, PinMock, PinMock, NoopDelay>;

    /// TransactionStart + Write(data) + TransactionEnd, as one
    /// `SpiDevice::write` call is seen by the mock.
    fn spi_device_write(data: &[u8]) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(data.to_vec()),
            SpiTransaction::transaction_end(),
        ]
    }

    fn idle_pin() -> PinMock {
        PinMock::new(&[])
    }

    fn interface(spi: &[SpiTransaction<u8>], dc: &[PinTransaction]) -> TestInterface {
        SpiInterface::new(SpiMock::new(spi), PinMock::new(dc), idle_pin(), NoopDelay::new())
    }

    fn done(iface: TestInterface) {
        let (mut spi, mut dc, mut rst, _) = iface.release();
        spi.done();
        dc.done();
        rst.done();
    }

    #[test]
    fn test_command_drives_dc_low() {
        let mut iface = interface(&spi_device_write(&[0x2A]), &[PinTransaction::set(PinState::Low)]);
        iface.write_command(0x2A).unwrap();
        done(iface);
    }

    #[test]
    fn test_param_is_one_byte() {
        let mut iface = interface(&spi_device_write(&[0x48]), &[PinTransaction::set(PinState::High)]);
        iface.write_param(0x48).unwrap();
        done(iface);
    }

    #[test]
    fn test_data_word_is_big_endian() {
        let mut iface = interface(&spi_device_write(&[0xF8, 0x00]), &[PinTransaction::set(PinState::High)]);
        iface.write_data(0xF800).unwrap();
        done(iface);
    }

    #[test]
    fn test_repeated_words_share_one_transfer() {
        let mut iface = interface(
            &spi_device_write(&[0x07, 0xE0, 0x07, 0xE0, 0x07, 0xE0]),
            &[PinTransaction::set(PinState::High)],
        );
        iface.write_data_repeated(0x07E0, 3).unwrap();
        done(iface);
    }

    #[test]
    fn test_long_runs_split_into_chunks() {
        let mut spi = Vec::new();
        spi.extend(spi_device_write(&[0xFF; CHUNK]));
        spi.extend(spi_device_write(&[0xFF; 4]));
        let mut iface = interface(&spi, &[PinTransaction::set(PinState::High)]);
        iface.write_data_repeated(0xFFFF, (CHUNK / 2 + 2) as u32).unwrap();
        done(iface);
    }

    #[test]
    fn test_slice_streams_in_order() {
        let mut iface = interface(
            &spi_device_write(&[0x12, 0x34, 0xAB, 0xCD]),
            &[PinTransaction::set(PinState::High)],
        );
        iface.write_data_slice(&[0x1234, 0xABCD]).unwrap();
        done(iface);
    }

    #[test]
    fn test_empty_runs_send_nothing() {
        let mut iface = interface(&[], &[]);
        iface.write_data_repeated(0x1234, 0).unwrap();
        iface.write_data_slice(&[]).unwrap();
        done(iface);
    }

    #[test]
    fn test_read_returns_low_byte() {
        let mut iface = interface(
            &[
                SpiTransaction::transaction_start(),
                SpiTransaction::read(0x93),
                SpiTransaction::transaction_end(),
            ],
            &[PinTransaction::set(PinState::High)],
        );
        assert_eq!(iface.read_data().unwrap(), 0x0093);
        done(iface);
    }

    #[test]
    fn test_pixel_read_skips_dummy_byte() {
        let mut iface = interface(
            &[
                SpiTransaction::transaction_start(),
                SpiTransaction::read_vec(vec![0x00, 0xF8, 0x84, 0x10]),
                SpiTransaction::transaction_end(),
            ],
            &[PinTransaction::set(PinState::High)],
        );
        assert_eq!(iface.read_rgb().unwrap(), [0xF8, 0x84, 0x10]);
        done(iface);
    }

    #[test]
    fn test_reset_pulse() {
        let rst = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let mut iface = SpiInterface::new(SpiMock::new(&[]), idle_pin(), rst, NoopDelay::new());
        iface.reset().unwrap();
        done(iface);
    }
}
