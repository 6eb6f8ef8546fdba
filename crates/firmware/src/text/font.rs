//! Bitmap fonts
//!
//! Glyphs are stored row by row, MSB-first, `height / 8` bytes per row, one
//! glyph after another starting at [`FIRST_CODE`]. A set bit is foreground.
//!
//! Both bundled fonts are built at compile time from the `font8x8` basic
//! Latin table (which is LSB-first, so every byte is bit-reversed).
//! [`FONT_16`] is the same set scaled 2× in both directions.

use font8x8::legacy::BASIC_LEGACY;

/// Character code of the first glyph in every table.
pub const FIRST_CODE: u8 = 0x20;

/// Printable ASCII, `' '` to `'~'`.
const GLYPH_COUNT: usize = 95;

/// Fixed-size bitmap font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphTable {
    /// Cell width in pixels.
    pub width: u16,
    /// Cell height in pixels.
    pub height: u16,
    /// Glyph bytes, see the module docs for the layout.
    pub table: &'static [u8],
}

impl GlyphTable {
    /// Bytes per glyph row.
    pub const fn bytes_per_row(&self) -> u16 {
        self.height / 8
    }

    /// Whether `code` has a glyph in this table.
    pub fn contains(&self, code: u8) -> bool {
        self.glyph_byte(code, 0, 0).is_some()
    }

    /// Byte `group` of row `row` of the glyph for `code`.
    pub fn glyph_byte(&self, code: u8, row: u16, group: u16) -> Option<u8> {
        let index = u32::from(code.checked_sub(FIRST_CODE)?);
        let groups = u32::from(self.bytes_per_row());
        let glyph_len = u32::from(self.height).checked_mul(groups)?;
        let offset = index
            .checked_mul(glyph_len)?
            .checked_add(u32::from(row).checked_mul(groups)?)?
            .checked_add(u32::from(group))?;
        self.table.get(usize::try_from(offset).ok()?).copied()
    }
}

// Loop indices stay below GLYPH_COUNT * 32 and BASIC_LEGACY's 128 entries.
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
const fn build_8x8() -> [u8; GLYPH_COUNT * 8] {
    let mut out = [0u8; GLYPH_COUNT * 8];
    let mut glyph = 0;
    while glyph < GLYPH_COUNT {
        let source = BASIC_LEGACY[FIRST_CODE as usize + glyph];
        let mut row = 0;
        while row < 8 {
            out[glyph * 8 + row] = source[row].reverse_bits();
            row += 1;
        }
        glyph += 1;
    }
    out
}

/// Spread each bit of `byte` over two adjacent bits.
#[allow(clippy::arithmetic_side_effects)]
const fn double_bits(byte: u8) -> u16 {
    let mut out = 0u16;
    let mut bit = 0;
    while bit < 8 {
        if byte & (1 << bit) != 0 {
            out |= 0b11 << (bit * 2);
        }
        bit += 1;
    }
    out
}

#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
const fn build_16x16() -> [u8; GLYPH_COUNT * 32] {
    let small = build_8x8();
    let mut out = [0u8; GLYPH_COUNT * 32];
    let mut glyph = 0;
    while glyph < GLYPH_COUNT {
        let mut row = 0;
        while row < 8 {
            let [hi, lo] = double_bits(small[glyph * 8 + row]).to_be_bytes();
            let base = glyph * 32 + row * 4;
            out[base] = hi;
            out[base + 1] = lo;
            out[base + 2] = hi;
            out[base + 3] = lo;
            row += 1;
        }
        glyph += 1;
    }
    out
}

static FONT_8X8_DATA: [u8; GLYPH_COUNT * 8] = build_8x8();
static FONT_16X16_DATA: [u8; GLYPH_COUNT * 32] = build_16x16();

/// 8×8 pixel font.
pub static FONT_8: GlyphTable = GlyphTable {
    width: 8,
    height: 8,
    table: &FONT_8X8_DATA,
};

/// 16×16 pixel font.
pub static FONT_16: GlyphTable = GlyphTable {
    width: 16,
    height: 16,
    table: &FONT_16X16_DATA,
};
