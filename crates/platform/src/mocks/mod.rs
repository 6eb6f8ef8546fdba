//! Mock implementations for testing
//!
//! Memory-backed stand-ins for the LCD transport, the backlight pin, the
//! delay provider and the NOR flash chip, for use in unit and integration
//! tests of the driver.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::indexing_slicing)] // GRAM indices are bounds-checked before use
#![allow(clippy::arithmetic_side_effects)] // window cursor math stays within GRAM_DIM

use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_storage::nor_flash::{ErrorType as FlashErrorType, NorFlashErrorKind, ReadNorFlash};

use crate::config::{PANEL_HEIGHT, PANEL_WIDTH};
use crate::display::{BusError, LcdBus};

/// Side length of the simulated GRAM, large enough for either orientation.
pub const GRAM_DIM: u16 = if PANEL_WIDTH > PANEL_HEIGHT { PANEL_WIDTH } else { PANEL_HEIGHT };

const CASET: u8 = 0x2A;
const PASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const RAMRD: u8 = 0x2E;
const MADCTL: u8 = 0x36;

/// One recorded transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    /// Hardware reset pulse
    Reset,
    /// Command byte
    Command(u8),
    /// Parameter byte
    Param(u8),
    /// Data word
    Data(u16),
    /// Word returned by a read
    Read(u16),
}

/// Memory-backed ILI9341 transport.
///
/// Records every call and interprets the addressing commands well enough to
/// keep a simulated frame memory: `CASET`/`PASET` program the window, `RAMWR`
/// starts a stream that fills it x-fastest, `RAMRD` queues the pixel at the
/// window start in the controller's read-back format. Addresses are logical;
/// `MADCTL` is recorded but not applied.
pub struct MockLcdBus {
    ops: Vec<BusOp>,
    gram: Vec<u16>,
    columns: (u16, u16),
    pages: (u16, u16),
    write_pos: Option<(u16, u16)>,
    command: Option<u8>,
    params: Vec<u8>,
    madctl: u8,
    readback: VecDeque<u16>,
    queued_reads: VecDeque<u16>,
    fail_after: Option<usize>,
    calls: usize,
}

impl MockLcdBus {
    /// Create a mock with black GRAM and an empty log.
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            gram: std::vec![0; usize::from(GRAM_DIM) * usize::from(GRAM_DIM)],
            columns: (0, PANEL_WIDTH - 1),
            pages: (0, PANEL_HEIGHT - 1),
            write_pos: None,
            command: None,
            params: Vec::new(),
            madctl: 0,
            readback: VecDeque::new(),
            queued_reads: VecDeque::new(),
            fail_after: None,
            calls: 0,
        }
    }

    /// Every call recorded so far.
    pub fn ops(&self) -> &[BusOp] {
        &self.ops
    }

    /// Forget the recorded calls (GRAM is kept).
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Command bytes in order.
    pub fn commands(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Parameter bytes in order.
    pub fn params(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Param(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Data words in order.
    pub fn data_words(&self) -> Vec<u16> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Data(w) => Some(*w),
                _ => None,
            })
            .collect()
    }

    /// How many times `command` was sent.
    pub fn command_count(&self, command: u8) -> usize {
        self.ops
            .iter()
            .filter(|op| **op == BusOp::Command(command))
            .count()
    }

    /// Last programmed window as `(x0, y0, x1, y1)`.
    pub fn window(&self) -> (u16, u16, u16, u16) {
        (self.columns.0, self.pages.0, self.columns.1, self.pages.1)
    }

    /// Last `MADCTL` parameter.
    pub fn madctl(&self) -> u8 {
        self.madctl
    }

    /// Simulated GRAM content at `(x, y)`; 0 outside the GRAM.
    pub fn pixel(&self, x: u16, y: u16) -> u16 {
        Self::index(x, y).map_or(0, |i| self.gram[i])
    }

    /// Overwrite the whole GRAM with `color` without logging anything.
    pub fn fill_gram(&mut self, color: u16) {
        self.gram.fill(color);
    }

    /// Words returned by subsequent reads outside a `RAMRD` sequence.
    pub fn queue_reads(&mut self, words: &[u16]) {
        self.queued_reads.extend(words.iter().copied());
    }

    /// Fail every call after the next `calls` succeed.
    pub fn fail_after(&mut self, calls: usize) {
        self.fail_after = Some(self.calls + calls);
    }

    fn index(x: u16, y: u16) -> Option<usize> {
        (x < GRAM_DIM && y < GRAM_DIM).then(|| usize::from(y) * usize::from(GRAM_DIM) + usize::from(x))
    }

    fn check(&mut self) -> Result<(), BusError> {
        if self.fail_after.is_some_and(|limit| self.calls >= limit) {
            return Err(BusError::Communication);
        }
        self.calls += 1;
        Ok(())
    }

    fn accept_param(&mut self, byte: u8) {
        self.params.push(byte);
        let word = |hi: u8, lo: u8| u16::from_be_bytes([hi, lo]);
        match (self.command, self.params.as_slice()) {
            (Some(CASET), [hi, lo]) => self.columns.0 = word(*hi, *lo),
            (Some(CASET), [_, _, hi, lo]) => self.columns.1 = word(*hi, *lo),
            (Some(PASET), [hi, lo]) => self.pages.0 = word(*hi, *lo),
            (Some(PASET), [_, _, hi, lo]) => self.pages.1 = word(*hi, *lo),
            (Some(MADCTL), [value]) => self.madctl = *value,
            _ => {}
        }
    }

    fn store_pixel(&mut self, word: u16) {
        let Some((x, y)) = self.write_pos else {
            return;
        };
        if let Some(i) = Self::index(x, y) {
            self.gram[i] = word;
        }
        let (mut nx, mut ny) = (x + 1, y);
        if nx > self.columns.1 {
            nx = self.columns.0;
            ny += 1;
            if ny > self.pages.1 {
                ny = self.pages.0;
            }
        }
        self.write_pos = Some((nx, ny));
    }

    fn start_readback(&mut self) {
        let p = self.pixel(self.columns.0, self.pages.0);
        let r = (p >> 11) << 3;
        let g = ((p >> 5) & 0x3F) << 2;
        let b = (p & 0x1F) << 3;
        self.readback.clear();
        self.readback.extend([0, (r << 8) | g, b << 8]);
    }
}

impl Default for MockLcdBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LcdBus for MockLcdBus {
    type Error = BusError;

    fn reset(&mut self) -> Result<(), BusError> {
        self.check()?;
        self.ops.push(BusOp::Reset);
        self.write_pos = None;
        self.command = None;
        Ok(())
    }

    fn write_command(&mut self, command: u8) -> Result<(), BusError> {
        self.check()?;
        self.ops.push(BusOp::Command(command));
        self.command = Some(command);
        self.params.clear();
        self.write_pos = (command == RAMWR).then_some((self.columns.0, self.pages.0));
        if command == RAMRD {
            self.start_readback();
        }
        Ok(())
    }

    fn write_param(&mut self, byte: u8) -> Result<(), BusError> {
        self.check()?;
        self.ops.push(BusOp::Param(byte));
        self.accept_param(byte);
        Ok(())
    }

    fn write_data(&mut self, word: u16) -> Result<(), BusError> {
        self.check()?;
        self.ops.push(BusOp::Data(word));
        if self.write_pos.is_some() {
            self.store_pixel(word);
        } else {
            self.accept_param(word.to_be_bytes()[1]);
        }
        Ok(())
    }

    fn read_data(&mut self) -> Result<u16, BusError> {
        self.check()?;
        let word = self
            .readback
            .pop_front()
            .or_else(|| self.queued_reads.pop_front())
            .unwrap_or(0);
        self.ops.push(BusOp::Read(word));
        Ok(word)
    }
}

/// Output pin that records its level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MockPin {
    high: bool,
    transitions: usize,
}

impl MockPin {
    /// Current level.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Number of `set_low`/`set_high` calls.
    pub fn transitions(&self) -> usize {
        self.transitions
    }
}

impl PinErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        self.transitions += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        self.transitions += 1;
        Ok(())
    }
}

/// Delay provider that records requested delays instead of waiting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MockDelay {
    delays_ms: Vec<u32>,
    total_ns: u64,
}

impl MockDelay {
    /// Millisecond delays in request order.
    pub fn delays_ms(&self) -> &[u32] {
        &self.delays_ms
    }

    /// Sum of every delay requested, in nanoseconds.
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}

/// RAM-backed NOR flash.
#[derive(Debug, Clone)]
pub struct MockFlash {
    data: Vec<u8>,
    reads: usize,
}

impl MockFlash {
    /// Flash holding `data`.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, reads: 0 }
    }

    /// Number of read calls served.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl FlashErrorType for MockFlash {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for MockFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = usize::try_from(offset).map_err(|_| NorFlashErrorKind::OutOfBounds)?;
        let end = start
            .checked_add(bytes.len())
            .ok_or(NorFlashErrorKind::OutOfBounds)?;
        let src = self
            .data
            .get(start..end)
            .ok_or(NorFlashErrorKind::OutOfBounds)?;
        bytes.copy_from_slice(src);
        self.reads += 1;
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn program_window(bus: &mut MockLcdBus, x0: u16, y0: u16, x1: u16, y1: u16) {
        bus.write_command(CASET).unwrap();
        for b in x0.to_be_bytes().into_iter().chain(x1.to_be_bytes()) {
            bus.write_param(b).unwrap();
        }
        bus.write_command(PASET).unwrap();
        for b in y0.to_be_bytes().into_iter().chain(y1.to_be_bytes()) {
            bus.write_param(b).unwrap();
        }
        bus.write_command(RAMWR).unwrap();
    }

    #[test]
    fn test_stream_fills_window_x_fastest() {
        let mut bus = MockLcdBus::new();
        program_window(&mut bus, 10, 20, 11, 21);
        bus.write_data_slice(&[1, 2, 3, 4]).unwrap();

        assert_eq!(bus.window(), (10, 20, 11, 21));
        assert_eq!(bus.pixel(10, 20), 1);
        assert_eq!(bus.pixel(11, 20), 2);
        assert_eq!(bus.pixel(10, 21), 3);
        assert_eq!(bus.pixel(11, 21), 4);
    }

    #[test]
    fn test_stream_wraps_to_window_start() {
        let mut bus = MockLcdBus::new();
        program_window(&mut bus, 0, 0, 0, 0);
        bus.write_data_slice(&[5, 6]).unwrap();
        assert_eq!(bus.pixel(0, 0), 6);
        assert_eq!(bus.pixel(1, 0), 0);
    }

    #[test]
    fn test_memory_read_returns_readback_format() {
        let mut bus = MockLcdBus::new();
        program_window(&mut bus, 3, 4, 3, 4);
        bus.write_data(0xF81F).unwrap();

        bus.write_command(RAMRD).unwrap();
        assert_eq!(bus.read_data().unwrap(), 0);
        assert_eq!(bus.read_data().unwrap(), 0xF800);
        assert_eq!(bus.read_data().unwrap(), 0xF800);
    }

    #[test]
    fn test_queued_reads_served_in_order() {
        let mut bus = MockLcdBus::new();
        bus.queue_reads(&[0x00, 0x93, 0x41]);
        assert_eq!(bus.read_data().unwrap(), 0x00);
        assert_eq!(bus.read_data().unwrap(), 0x93);
        assert_eq!(bus.read_data().unwrap(), 0x41);
        assert_eq!(bus.read_data().unwrap(), 0);
    }

    #[test]
    fn test_fail_after_injects_errors() {
        let mut bus = MockLcdBus::new();
        bus.fail_after(2);
        assert!(bus.write_command(0x01).is_ok());
        assert!(bus.write_command(0x11).is_ok());
        assert_eq!(bus.write_command(0x29), Err(BusError::Communication));
        assert_eq!(bus.commands(), [0x01, 0x11]);
    }

    #[test]
    fn test_madctl_recorded() {
        let mut bus = MockLcdBus::new();
        bus.write_command(MADCTL).unwrap();
        bus.write_param(0x48).unwrap();
        assert_eq!(bus.madctl(), 0x48);
    }

    #[test]
    fn test_pin_and_delay_record_activity() {
        let mut pin = MockPin::default();
        pin.set_high().unwrap();
        assert!(pin.is_high());
        assert_eq!(pin.transitions(), 1);

        let mut delay = MockDelay::default();
        delay.delay_ms(50);
        delay.delay_us(10);
        assert_eq!(delay.delays_ms(), [50]);
        assert_eq!(delay.total_ns(), 50_010_000);
    }

    #[test]
    fn test_flash_reads_in_bounds_only() {
        let mut flash = MockFlash::new(vec![1, 2, 3, 4]);
        let mut buf = [0u8; 2];
        flash.read(2, &mut buf).unwrap();
        assert_eq!(buf, [3, 4]);
        assert_eq!(flash.read(3, &mut buf), Err(NorFlashErrorKind::OutOfBounds));
        assert_eq!(flash.reads(), 1);
    }
}
