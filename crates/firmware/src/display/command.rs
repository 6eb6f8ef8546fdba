//! ILI9341 command set and power-on initialisation table.

use super::DisplayError;

/// ILI9341 command codes used by the driver.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Software reset: 0 params; wait 5 ms (120 ms from sleep).
    SoftwareReset = 0x01,
    /// Sleep out: 0 params; wait 120 ms.
    SleepOut = 0x11,
    /// Display inversion off: 0 params.
    InversionOff = 0x20,
    /// Display inversion on: 0 params.
    InversionOn = 0x21,
    /// Gamma curve select: 1 param.
    GammaSet = 0x26,
    /// Display off: 0 params.
    DisplayOff = 0x28,
    /// Display on: 0 params.
    DisplayOn = 0x29,
    /// Column address set: 4 params (start hi/lo, end hi/lo).
    ColumnAddressSet = 0x2A,
    /// Page (row) address set: 4 params (start hi/lo, end hi/lo).
    PageAddressSet = 0x2B,
    /// Memory write: followed by pixel words.
    MemoryWrite = 0x2C,
    /// Memory read: dummy word then packed R,G / B words.
    MemoryRead = 0x2E,
    /// Tearing effect line off: 0 params.
    TearingEffectOff = 0x34,
    /// Tearing effect line on: 1 param (mode).
    TearingEffectOn = 0x35,
    /// Memory access control (MADCTL): 1 param.
    MemoryAccessControl = 0x36,
    /// Pixel format set: 1 param (0x55 = 16 bpp).
    PixelFormatSet = 0x3A,
    /// Frame rate control, normal mode: 2 params.
    FrameRateControl = 0xB1,
    /// Display function control: 4 params.
    DisplayFunctionControl = 0xB6,
    /// Entry mode set: 1 param.
    EntryModeSet = 0xB7,
    /// Power control 1: 1 param.
    PowerControl1 = 0xC0,
    /// Power control 2: 1 param.
    PowerControl2 = 0xC1,
    /// VCOM control 1: 2 params.
    VcomControl1 = 0xC5,
    /// VCOM control 2: 1 param.
    VcomControl2 = 0xC7,
    /// Power control A: 5 params.
    PowerControlA = 0xCB,
    /// Power control B: 3 params.
    PowerControlB = 0xCF,
    /// Read ID4: dummy, dummy, ID high, ID low.
    ReadId4 = 0xD3,
    /// Positive gamma correction: 15 params.
    PositiveGamma = 0xE0,
    /// Negative gamma correction: 15 params.
    NegativeGamma = 0xE1,
    /// Driver timing control A: 3 params.
    DriverTimingControlA = 0xE8,
    /// Driver timing control B: 2 params.
    DriverTimingControlB = 0xEA,
    /// Power-on sequence control: 4 params.
    PowerOnSequence = 0xED,
    /// Enable 3-gamma control: 1 param.
    Enable3Gamma = 0xF2,
    /// Pump ratio control: 1 param.
    PumpRatioControl = 0xF7,
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command as u8
    }
}

/// Count bytes above this value mean "no parameters, then delay this many ms".
pub const DELAY_THRESHOLD: u8 = 15;

/// Terminates an init table.
pub const TABLE_END: u8 = 0x00;

use Command as C;

/// Power-on initialisation table.
///
/// Entries are `command, count, params…`. A count above
/// [`DELAY_THRESHOLD`] carries no parameters and asks for a delay of that
/// many milliseconds after the command. The table ends with [`TABLE_END`].
#[rustfmt::skip]
pub const INIT_TABLE: [u8; 123] = [
    C::DisplayOff as u8,             0,
    C::PowerControlB as u8,          3, 0x00, 0x83, 0x30,
    C::PowerOnSequence as u8,        4, 0x64, 0x03, 0x12, 0x81,
    C::DriverTimingControlA as u8,   3, 0x85, 0x01, 0x79,
    C::PowerControlA as u8,          5, 0x39, 0x2C, 0x00, 0x34, 0x02,
    C::PumpRatioControl as u8,       1, 0x20,
    C::DriverTimingControlB as u8,   2, 0x00, 0x00,
    C::PowerControl1 as u8,          1, 0x26,
    C::PowerControl2 as u8,          1, 0x11,
    C::VcomControl1 as u8,           2, 0x35, 0x3E,
    C::VcomControl2 as u8,           1, 0xBE,
    C::MemoryAccessControl as u8,    1, 0x00,
    C::PixelFormatSet as u8,         1, 0x55,
    C::FrameRateControl as u8,       2, 0x00, 0x1B,
    C::Enable3Gamma as u8,           1, 0x08,
    C::GammaSet as u8,               1, 0x01,
    C::PositiveGamma as u8,         15, 0x1F, 0x1A, 0x18, 0x0A, 0x0F, 0x06, 0x56, 0x87,
                                        0x32, 0x0A, 0x07, 0x02, 0x07, 0x05, 0x00,
    C::NegativeGamma as u8,         15, 0x00, 0x25, 0x27, 0x05, 0x10, 0x09, 0x3A, 0x78,
                                        0x4D, 0x05, 0x18, 0x0D, 0x38, 0x3A, 0x1F,
    C::ColumnAddressSet as u8,       4, 0x00, 0x00, 0x00, 0xEF,
    C::PageAddressSet as u8,         4, 0x00, 0x00, 0x01, 0x3F,
    C::EntryModeSet as u8,           1, 0x07,
    C::DisplayFunctionControl as u8, 4, 0x0A, 0x82, 0x27, 0x00,
    C::SleepOut as u8,             120,
    C::DisplayOn as u8,            100,
    C::MemoryWrite as u8,            0,
    TABLE_END,
];

/// What follows a command in an init table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction<'a> {
    /// Parameter bytes (possibly none).
    Params(&'a [u8]),
    /// Delay in milliseconds.
    Delay(u8),
}

/// One decoded init table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitStep<'a> {
    /// Command byte.
    pub command: u8,
    /// Parameters or delay.
    pub action: StepAction<'a>,
}

/// A validated init table.
///
/// Construction walks the whole table once, so iterating a parsed table
/// never meets a truncated entry and a bad table is refused before any byte
/// of it reaches the controller.
#[derive(Debug, Clone, Copy)]
pub struct InitTable<'a> {
    bytes: &'a [u8],
}

impl<'a> InitTable<'a> {
    /// Validate `bytes` as an init table.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, DisplayError> {
        let mut rest = bytes;
        loop {
            let (step, tail) = split_entry(rest)?;
            if step.is_none() {
                return Ok(Self { bytes });
            }
            rest = tail;
        }
    }

    /// Iterate the entries in order (the terminator is not yielded).
    pub fn steps(&self) -> InitSteps<'a> {
        InitSteps { rest: self.bytes }
    }

    /// Number of command entries.
    pub fn len(&self) -> usize {
        self.steps().count()
    }

    /// `true` if the table holds only the terminator.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Iterator over [`InitStep`]s of a parsed table.
#[derive(Debug, Clone)]
pub struct InitSteps<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for InitSteps<'a> {
    type Item = InitStep<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (step, tail) = split_entry(self.rest).ok()?;
        self.rest = if step.is_some() { tail } else { &[] };
        step
    }
}

/// Split one entry off the front of `bytes`. `Ok((None, _))` is the terminator.
fn split_entry(bytes: &[u8]) -> Result<(Option<InitStep<'_>>, &[u8]), DisplayError> {
    let (&command, rest) = bytes.split_first().ok_or(DisplayError::InvalidInitTable)?;
    if command == TABLE_END {
        return Ok((None, rest));
    }
    let (&count, rest) = rest.split_first().ok_or(DisplayError::InvalidInitTable)?;
    if count > DELAY_THRESHOLD {
        let step = InitStep { command, action: StepAction::Delay(count) };
        return Ok((Some(step), rest));
    }
    let count = usize::from(count);
    if rest.len() < count {
        return Err(DisplayError::InvalidInitTable);
    }
    let (params, rest) = rest.split_at(count);
    let step = InitStep { command, action: StepAction::Params(params) };
    Ok((Some(step), rest))
}
