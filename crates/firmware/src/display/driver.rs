//! ILI9341 controller protocol engine and driver state
//!
//! Owns the transport, the backlight pin and the delay provider together
//! with everything the drawing layers need: logical geometry, the cached
//! MADCTL bytes, the text context and the text cursor.
//!
//! # Wiring (STM32F4 FSMC example)
//!
//! | Signal | STM32 pin | Direction |
//! |--------|-----------|-----------|
//! | D0–D15 | FSMC_D0–D15 | Bidirectional |
//! | RS (D/C) | FSMC_A16 | Host → Display |
//! | CS     | FSMC_NE1 | Host → Display |
//! | RST    | PC5 (GPIO) | Host → Display |
//! | BL     | PB1 (GPIO) | Host → Display |
//!
//! With the panel on SPI instead, wrap the SPI device, D/C and RST pins in
//! [`super::SpiInterface`].
//!
//! # Failure model
//!
//! Control operations (init, orientation, reads, toggles) return
//! `Result<_, DisplayError>`. Drawing operations return `()`: a transport
//! error raised while drawing is latched into [`Ili9341::fault`] and the
//! rest of the drawing call carries on. A transport that never completes
//! blocks the caller forever; nothing here times out.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use platform::LcdBus;

use super::command::{Command, InitTable, StepAction};
use super::orientation::{Orientation, OrientationTable};
use super::{PIXEL_HEIGHT, PIXEL_WIDTH};
use crate::config::DisplayConfig;
use crate::graphics::color::{self, color565};
use crate::text::{CursorPosition, TextContext};

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Geometry and mode flags of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayProperties {
    /// Native width (portrait).
    pub pixel_width: u16,
    /// Native height (portrait).
    pub pixel_height: u16,
    /// Current logical width.
    pub width: u16,
    /// Current logical height.
    pub height: u16,
    /// Current orientation.
    pub orientation: Orientation,
    /// Display inversion is on.
    pub inverted_color: bool,
    /// Backlight is lit.
    pub backlight_on: bool,
}

impl DisplayProperties {
    const fn new(orientation: Orientation) -> Self {
        let (width, height) = orientation.logical_size(PIXEL_WIDTH, PIXEL_HEIGHT);
        Self {
            pixel_width: PIXEL_WIDTH,
            pixel_height: PIXEL_HEIGHT,
            width,
            height,
            orientation,
            inverted_color: false,
            backlight_on: false,
        }
    }
}

/// Tearing-effect output line mode.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TearingMode {
    /// Pulse on V-blank only.
    VBlank = 0x00,
    /// Pulse on both V-blank and H-blank.
    VAndHBlank = 0x01,
}

// ---------------------------------------------------------------------------
// Driver struct
// ---------------------------------------------------------------------------

/// ILI9341 display driver.
///
/// Generic over:
/// - `BUS`: the [`platform::LcdBus`] transport (FSMC or [`super::SpiInterface`]).
/// - `BL`: backlight [`embedded_hal::digital::OutputPin`] (high = lit).
/// - `DELAY`: [`embedded_hal::delay::DelayNs`] for reset and table delays.
///
/// Every operation takes `&mut self`. To share one panel between execution
/// contexts, put the whole driver behind a mutex.
pub struct Ili9341<BUS, BL, DELAY> {
    pub(crate) bus: BUS,
    backlight: BL,
    delay: DELAY,
    config: DisplayConfig,
    orientations: OrientationTable,
    pub(crate) props: DisplayProperties,
    pub(crate) text: TextContext,
    pub(crate) cursor: CursorPosition,
    fault: Option<DisplayError>,
}

impl<BUS, BL, DELAY> Ili9341<BUS, BL, DELAY>
where
    BUS: LcdBus,
    BL: OutputPin,
    DELAY: DelayNs,
{
    /// Create a new driver instance.
    ///
    /// Computes the orientation table; sends nothing. Call [`Self::init`]
    /// before drawing.
    pub fn new(bus: BUS, backlight: BL, delay: DELAY, config: DisplayConfig) -> Self {
        Self {
            bus,
            backlight,
            delay,
            orientations: OrientationTable::new(),
            props: DisplayProperties::new(Orientation::Portrait),
            text: config.text,
            cursor: CursorPosition::default(),
            fault: None,
            config,
        }
    }

    /// Give back the transport, backlight pin and delay provider.
    pub fn release(self) -> (BUS, BL, DELAY) {
        (self.bus, self.backlight, self.delay)
    }

    // -----------------------------------------------------------------------
    // Low-level bus helpers
    // -----------------------------------------------------------------------

    pub(crate) fn send_command(&mut self, command: Command) -> Result<(), DisplayError> {
        self.bus
            .write_command(command.into())
            .map_err(|_| DisplayError::Bus)
    }

    pub(crate) fn send_params(&mut self, params: &[u8]) -> Result<(), DisplayError> {
        for &byte in params {
            self.bus.write_param(byte).map_err(|_| DisplayError::Bus)?;
        }
        Ok(())
    }

    fn read_word(&mut self) -> Result<u16, DisplayError> {
        self.bus.read_data().map_err(|_| DisplayError::Bus)
    }

    pub(crate) fn write_words(&mut self, words: &[u16]) -> Result<(), DisplayError> {
        self.bus
            .write_data_slice(words)
            .map_err(|_| DisplayError::Bus)
    }

    pub(crate) fn write_repeated(&mut self, word: u16, count: u32) -> Result<(), DisplayError> {
        self.bus
            .write_data_repeated(word, count)
            .map_err(|_| DisplayError::Bus)
    }

    /// Program `(x0, y0)..=(x1, y1)` and stream one `color` word per pixel.
    ///
    /// Callers pass an ordered, on-canvas window.
    pub(crate) fn fill_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: u16,
    ) -> Result<(), DisplayError> {
        self.set_window(x0, y0, x1, y1)?;
        let columns = u32::from(x1.saturating_sub(x0)).saturating_add(1);
        let rows = u32::from(y1.saturating_sub(y0)).saturating_add(1);
        self.write_repeated(color, columns.saturating_mul(rows))
    }

    /// Record the first error of a drawing call as the sticky fault.
    pub(crate) fn latch(&mut self, result: Result<(), DisplayError>) {
        if let Err(error) = result {
            if self.fault.is_none() {
                warn!("ILI9341: bus fault latched: {}", error);
                self.fault = Some(error);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Initialisation
    // -----------------------------------------------------------------------

    /// Hardware reset pulse, software reset, settle delay.
    fn reset(&mut self) -> Result<(), DisplayError> {
        self.bus.reset().map_err(|_| DisplayError::Bus)?;
        self.send_command(Command::SoftwareReset)?;
        self.delay.delay_ms(self.config.reset_delay_ms);
        Ok(())
    }

    /// Full power-on sequence.
    ///
    /// 1. Validate the configured init table (nothing is sent if it is malformed).
    /// 2. Hardware reset, software reset, settle delay.
    /// 3. Stream the init table, honoring its delays.
    /// 4. Fill the frame with black.
    /// 5. Backlight on.
    /// 6. Apply the configured orientation, if any.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        let table = InitTable::parse(self.config.init_table)?;
        info!("ILI9341: init ({} table entries)", table.len());

        self.reset()?;

        for step in table.steps() {
            self.bus
                .write_command(step.command)
                .map_err(|_| DisplayError::Bus)?;
            match step.action {
                StepAction::Params(params) => self.send_params(params)?,
                StepAction::Delay(ms) => self.delay.delay_ms(u32::from(ms)),
            }
        }

        // The table leaves the controller in native portrait addressing.
        let props = DisplayProperties::new(Orientation::Portrait);
        self.props = DisplayProperties {
            inverted_color: false,
            backlight_on: self.props.backlight_on,
            ..props
        };

        let (right, bottom) = self.bottom_right();
        self.fill_window(0, 0, right, bottom, color::BLACK)?;
        self.backlight_on()?;

        if let Some(orientation) = self.config.orientation {
            self.set_orientation(orientation)?;
        }

        info!("ILI9341: init complete");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Addressing
    // -----------------------------------------------------------------------

    /// Program the addressing window `(x0, y0)..=(x1, y1)` and open a
    /// memory write.
    ///
    /// Each address goes out high byte first. The caller streams
    /// `(x1 - x0 + 1) * (y1 - y0 + 1)` words afterwards, x fastest.
    pub fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), DisplayError> {
        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();

        self.send_command(Command::ColumnAddressSet)?;
        self.send_params(&[x0h, x0l, x1h, x1l])?;
        self.send_command(Command::PageAddressSet)?;
        self.send_params(&[y0h, y0l, y1h, y1l])?;
        self.send_command(Command::MemoryWrite)
    }

    /// Switch orientation, update the logical size and open a full-canvas
    /// window.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), DisplayError> {
        let madctl = self.orientations.get(orientation);
        self.send_command(Command::MemoryAccessControl)?;
        self.send_params(&[madctl])?;

        let (width, height) =
            orientation.logical_size(self.props.pixel_width, self.props.pixel_height);
        self.props.orientation = orientation;
        self.props.width = width;
        self.props.height = height;
        debug!("ILI9341: orientation {} (MADCTL {=u8:#x}), {}x{}", orientation, madctl, width, height);

        let (right, bottom) = self.bottom_right();
        self.set_window(0, 0, right, bottom)
    }

    /// Move the text cursor and open a 1×1 window there.
    pub fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), DisplayError> {
        self.cursor = CursorPosition { x, y };
        self.set_window(x, y, x, y)
    }

    /// Cursor to the origin and a full-canvas window.
    pub fn home(&mut self) -> Result<(), DisplayError> {
        self.cursor = CursorPosition::default();
        let (right, bottom) = self.bottom_right();
        self.set_window(0, 0, right, bottom)
    }

    pub(crate) fn bottom_right(&self) -> (u16, u16) {
        (
            self.props.width.saturating_sub(1),
            self.props.height.saturating_sub(1),
        )
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Read the controller identifier (`0x9341` on a genuine part).
    ///
    /// `RDID4` answers with four words; the first two are discarded and the
    /// last two carry the high and low byte.
    pub fn read_controller_id(&mut self) -> Result<u16, DisplayError> {
        self.send_command(Command::ReadId4)?;
        let _ = self.read_word()?;
        let _ = self.read_word()?;
        let [_, high] = self.read_word()?.to_be_bytes();
        let [_, low] = self.read_word()?.to_be_bytes();
        let id = u16::from_be_bytes([high, low]);
        debug!("ILI9341: controller id {=u16:#x}", id);
        Ok(id)
    }

    /// Read back one pixel as RGB565.
    ///
    /// Off-canvas coordinates return 0 without touching the bus. The
    /// transport decodes the controller's answer (see [`LcdBus::read_rgb`]).
    pub fn read_pixel(&mut self, x: i16, y: i16) -> Result<u16, DisplayError> {
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return Ok(0);
        };
        if x >= self.props.width || y >= self.props.height {
            return Ok(0);
        }

        self.send_command(Command::ColumnAddressSet)?;
        self.send_params(&x.to_be_bytes())?;
        self.send_command(Command::PageAddressSet)?;
        self.send_params(&y.to_be_bytes())?;
        self.send_command(Command::MemoryRead)?;

        let [r, g, b] = self.bus.read_rgb().map_err(|_| DisplayError::Bus)?;
        Ok(color565(r, g, b))
    }

    // -----------------------------------------------------------------------
    // Mode toggles
    // -----------------------------------------------------------------------

    /// Display on, backlight on.
    pub fn display_on(&mut self) -> Result<(), DisplayError> {
        self.send_command(Command::DisplayOn)?;
        self.backlight_on()
    }

    /// Display off, backlight off.
    pub fn display_off(&mut self) -> Result<(), DisplayError> {
        self.send_command(Command::DisplayOff)?;
        self.backlight_off()
    }

    /// Invert every pixel on the glass.
    pub fn inversion_on(&mut self) -> Result<(), DisplayError> {
        self.send_command(Command::InversionOn)?;
        self.props.inverted_color = true;
        Ok(())
    }

    /// Back to normal colors.
    pub fn inversion_off(&mut self) -> Result<(), DisplayError> {
        self.send_command(Command::InversionOff)?;
        self.props.inverted_color = false;
        Ok(())
    }

    /// Enable the TE output line.
    pub fn tearing_on(&mut self, mode: TearingMode) -> Result<(), DisplayError> {
        self.send_command(Command::TearingEffectOn)?;
        self.send_params(&[mode as u8])
    }

    /// Disable the TE output line.
    pub fn tearing_off(&mut self) -> Result<(), DisplayError> {
        self.send_command(Command::TearingEffectOff)
    }

    /// Light the backlight.
    pub fn backlight_on(&mut self) -> Result<(), DisplayError> {
        self.backlight.set_high().map_err(|_| DisplayError::Gpio)?;
        self.props.backlight_on = true;
        Ok(())
    }

    /// Switch the backlight off.
    pub fn backlight_off(&mut self) -> Result<(), DisplayError> {
        self.backlight.set_low().map_err(|_| DisplayError::Gpio)?;
        self.props.backlight_on = false;
        Ok(())
    }
}

// Accessors that need no hardware bounds.
impl<BUS, BL, DELAY> Ili9341<BUS, BL, DELAY> {
    /// Current logical width.
    pub fn width(&self) -> u16 {
        self.props.width
    }

    /// Current logical height.
    pub fn height(&self) -> u16 {
        self.props.height
    }

    /// Current orientation.
    pub fn orientation(&self) -> Orientation {
        self.props.orientation
    }

    /// Geometry and mode flags.
    pub fn properties(&self) -> &DisplayProperties {
        &self.props
    }

    /// Configuration the driver was built with.
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// First transport error latched by a drawing call, if any.
    pub fn fault(&self) -> Option<DisplayError> {
        self.fault
    }

    /// Return and clear the latched fault.
    pub fn clear_fault(&mut self) -> Option<DisplayError> {
        self.fault.take()
    }

    /// The transport, for raw traffic the driver does not model.
    pub fn bus(&self) -> &BUS {
        &self.bus
    }

    /// Mutable access to the transport.
    pub fn bus_mut(&mut self) -> &mut BUS {
        &mut self.bus
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors returned by the ILI9341 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Transport reported a failed transfer.
    Bus,
    /// Backlight pin could not be driven.
    Gpio,
    /// Init table entry runs past the end, or the terminator is missing.
    InvalidInitTable,
    /// Flash page read failed during a blit.
    Flash,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus => write!(f, "LCD bus error"),
            Self::Gpio => write!(f, "GPIO error"),
            Self::InvalidInitTable => write!(f, "Malformed init table"),
            Self::Flash => write!(f, "Flash read error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DisplayError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
