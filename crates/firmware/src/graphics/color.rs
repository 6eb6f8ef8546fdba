//! RGB565 color packing and named colors.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::IntoStorage;

/// Pack 8-bit R, G, B into RGB565.
#[allow(clippy::arithmetic_side_effects)] // masked before shifting
pub const fn color565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Raw RGB565 word of an `embedded-graphics` color.
pub fn from_rgb565(color: Rgb565) -> u16 {
    color.into_storage()
}

/// 0, 0, 0
pub const BLACK: u16 = 0x0000;
/// 0, 0, 128
pub const NAVY: u16 = 0x000F;
/// 0, 128, 0
pub const DARKGREEN: u16 = 0x03E0;
/// 0, 128, 128
pub const DARKCYAN: u16 = 0x03EF;
/// 128, 0, 0
pub const MAROON: u16 = 0x7800;
/// 128, 0, 128
pub const PURPLE: u16 = 0x780F;
/// 128, 128, 0
pub const OLIVE: u16 = 0x7BE0;
/// 192, 192, 192
pub const LIGHTGREY: u16 = 0xC618;
/// 128, 128, 128
pub const DARKGREY: u16 = 0x7BEF;
/// 0, 0, 255
pub const BLUE: u16 = 0x001F;
/// 0, 255, 0
pub const GREEN: u16 = 0x07E0;
/// 0, 255, 255
pub const CYAN: u16 = 0x07FF;
/// 255, 0, 0
pub const RED: u16 = 0xF800;
/// 255, 0, 255
pub const MAGENTA: u16 = 0xF81F;
/// 255, 255, 0
pub const YELLOW: u16 = 0xFFE0;
/// 255, 255, 255
pub const WHITE: u16 = 0xFFFF;
/// 255, 165, 0
pub const ORANGE: u16 = 0xFD20;
/// 173, 255, 47
pub const GREENYELLOW: u16 = 0xAFE5;
/// 255, 128, 192
pub const PINK: u16 = 0xFC18;
