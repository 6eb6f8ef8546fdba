//! ILI9341 TFT driver stack
//!
//! Driver and graphics-primitive layer for an ILI9341 240×320 TFT controller
//! with pictures streamed from an external SPI NOR flash.
//!
//! # Architecture
//!
//! ```text
//! Application loop (flash picture → blit, diagnostics → print)
//!         ↓
//! Text renderer (text) / Rasterizer (graphics)
//!         ↓
//! Controller protocol engine + orientation model (display)
//!         ↓
//! Transport (platform::LcdBus: FSMC, or display::SpiInterface)
//! ```
//!
//! Every drawing call computes the smallest addressing window it needs,
//! programs it through the protocol engine and streams one RGB565 word per
//! pixel. Nothing is buffered on the host side.
//!
//! # Features
//!
//! - `std` - Enable standard library (host builds, error trait impls)
//! - `defmt` - Log init, orientation changes and bus faults through defmt
//!
//! # Example
//!
//! ```no_run
//! use firmware::{colors, DisplayConfig, Ili9341};
//! # fn run<B, P, D>(bus: B, backlight: P, delay: D)
//! # where B: platform::LcdBus, P: embedded_hal::digital::OutputPin, D: embedded_hal::delay::DelayNs {
//! let mut lcd = Ili9341::new(bus, backlight, delay, DisplayConfig::default());
//! lcd.init().ok();
//! lcd.fill_circle(120, 160, 40, colors::RED);
//! lcd.print(format_args!("ID: {:#06x}", 0x9341));
//! # }
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for raster code:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_arguments)]

// Must come first so the logging macros are visible in every module.
#[macro_use]
mod fmt;

pub mod config;
pub mod display;
pub mod graphics;
pub mod text;

// Re-export key types
pub use config::DisplayConfig;
pub use display::{
    Command, DisplayError, DisplayProperties, Ili9341, InitTable, MemoryAccessAxes, Orientation,
    OrientationTable, SpiInterface, TearingMode, INIT_TABLE, PIXEL_HEIGHT, PIXEL_WIDTH,
};
pub use graphics::color::{self as colors, color565};
pub use graphics::image::ImageBuffer;
pub use text::font::{GlyphTable, FONT_16, FONT_8};
pub use text::{CursorPosition, TextContext, PRINT_BUFFER_LEN};
