//! ILI9341 controller driver
//!
//! This module holds the controller protocol engine (init table, addressing
//! window, MADCTL), the orientation model, the driver state and the SPI
//! transport adapter. Drawing and text live in [`crate::graphics`] and
//! [`crate::text`] as further `impl` blocks on [`Ili9341`].

pub mod command;
pub mod driver;
pub mod orientation;
pub mod spi;

pub use command::{Command, InitStep, InitTable, StepAction, INIT_TABLE};
pub use driver::{DisplayError, DisplayProperties, Ili9341, TearingMode};
pub use orientation::{AddressOrder, ColorOrder, MemoryAccessAxes, Orientation, OrientationTable};
pub use spi::SpiInterface;

/// Native panel width in pixels (portrait).
pub const PIXEL_WIDTH: u16 = platform::config::PANEL_WIDTH;

/// Native panel height in pixels (portrait).
pub const PIXEL_HEIGHT: u16 = platform::config::PANEL_HEIGHT;
