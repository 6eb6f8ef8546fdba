//! Board constants
//!
//! Panel geometry and flash layout shared by the driver, the mocks and the
//! application loop. Everything else refers to these rather than repeating
//! the numbers.

/// Native panel width in pixels (portrait).
pub const PANEL_WIDTH: u16 = 240;

/// Native panel height in pixels (portrait).
pub const PANEL_HEIGHT: u16 = 320;

/// Bytes per RGB565 pixel.
pub const BYTES_PER_PIXEL: usize = 2;

/// NOR flash program/read page size in bytes.
pub const FLASH_PAGE_SIZE: usize = 256;

/// Pages occupied by one full-screen RGB565 picture.
pub const PICTURE_PAGES: u32 = picture_pages();

#[allow(clippy::arithmetic_side_effects)] // small constant operands
const fn picture_pages() -> u32 {
    let bytes = PANEL_WIDTH as usize * PANEL_HEIGHT as usize * BYTES_PER_PIXEL;
    (bytes / FLASH_PAGE_SIZE) as u32
}
