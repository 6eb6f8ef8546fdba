//! Hardware contracts for the ILI9341 flash viewer
//!
//! This crate provides the trait-level seams between the display driver and
//! the board: the LCD transport and the flash page source. Both are consumed,
//! never implemented, by the driver crate, so the whole stack runs on the host
//! against the memory-backed mocks in [`mocks`].
//!
//! # Architecture Layers
//!
//! ```text
//! Application loop (read image from flash, blit, print diagnostics)
//!         ↓
//! Display driver (firmware crate: protocol engine, rasterizer, text)
//!         ↓
//! Platform contracts (this crate: LcdBus, PageSource)
//!         ↓
//! Board HAL (FSMC bus, SPI peripheral, NOR flash chip)
//! ```
//!
//! # Features
//!
//! - `std`: Enable standard library support and the [`mocks`] module
//! - `defmt`: Enable defmt::Format derives
//!
//! # Example
//!
//! ```no_run
//! use platform::LcdBus;
//!
//! fn blank<B: LcdBus>(bus: &mut B) -> Result<(), B::Error> {
//!     bus.write_command(0x2C)?;
//!     bus.write_data_repeated(0x0000, 240 * 320)
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
// Pedantic lints suppressed for this hardware contract crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod display;
pub mod image_store;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use display::{BusError, LcdBus};
pub use image_store::{NorFlashPages, PageSource};
