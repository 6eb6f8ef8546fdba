//! SPI NOR flash image store abstraction
//!
//! Full-screen RGB565 pictures are stored raw in an external SPI NOR flash
//! (W25Q-series) and streamed into the panel one page at a time. The driver
//! only needs page reads, so the contract here is [`PageSource`]; any chip
//! driver implementing `embedded-storage`'s [`ReadNorFlash`] is adapted by
//! [`NorFlashPages`].
//!
//! # Flash Layout
//!
//! ```text
//! page 0      ┌──────────────────────┐
//!             │  Picture 0           │   600 pages (240 × 320 × 2 bytes)
//! page 600    ├──────────────────────┤
//!             │  Picture 1           │   600 pages
//! page 1200   ├──────────────────────┤
//!             │  ...                 │
//!             └──────────────────────┘
//! ```
//!
//! Pixel words are stored little-endian, as the MCU wrote them from RAM.
//! Pictures are written once by the factory programmer; the driver
//! never erases or programs the chip.

use embedded_storage::nor_flash::ReadNorFlash;

use crate::config::{FLASH_PAGE_SIZE, PICTURE_PAGES};

/// Paged, read-only byte source.
pub trait PageSource {
    /// Error type
    type Error: core::fmt::Debug;

    /// Page size in bytes.
    const PAGE_SIZE: usize;

    /// Read `buf.len()` bytes of `page`, starting `offset` bytes into it.
    ///
    /// `offset + buf.len()` must not exceed [`Self::PAGE_SIZE`].
    fn read_page(&mut self, buf: &mut [u8], page: u32, offset: usize) -> Result<(), Self::Error>;
}

/// [`PageSource`] over any `embedded-storage` NOR flash.
pub struct NorFlashPages<F> {
    flash: F,
}

impl<F: ReadNorFlash> NorFlashPages<F> {
    /// Wrap a NOR flash driver.
    pub fn new(flash: F) -> Self {
        Self { flash }
    }

    /// Number of whole pages the chip holds.
    pub fn page_count(&self) -> u32 {
        let pages = self.flash.capacity().checked_div(FLASH_PAGE_SIZE).unwrap_or(0);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Number of full-screen pictures the chip holds.
    pub fn picture_count(&self) -> u32 {
        self.page_count().checked_div(PICTURE_PAGES).unwrap_or(0)
    }

    /// First page of picture `index`.
    pub const fn picture_page(index: u32) -> u32 {
        index.saturating_mul(PICTURE_PAGES)
    }

    /// Release the wrapped flash driver.
    pub fn release(self) -> F {
        self.flash
    }
}

impl<F: ReadNorFlash> PageSource for NorFlashPages<F> {
    type Error = F::Error;

    const PAGE_SIZE: usize = FLASH_PAGE_SIZE;

    fn read_page(&mut self, buf: &mut [u8], page: u32, offset: usize) -> Result<(), Self::Error> {
        let page_base = page.saturating_mul(FLASH_PAGE_SIZE as u32);
        let address = page_base.saturating_add(u32::try_from(offset).unwrap_or(u32::MAX));
        self.flash.read(address, buf)
    }
}
