//! Text renderer
//!
//! Bitmap glyphs drawn pixel by pixel through the rasterizer, plus a
//! terminal-like cursor with newline, tab and wrap handling.
//!
//! # Cursor rules
//!
//! | Char | Effect |
//! |------|--------|
//! | `\n` | x = 0, y += font height |
//! | `\r` | ignored |
//! | `\t` | x += 4 × font width |
//! | other | draw at cursor, x += font width; wrap to the next line if x > width − font width |
//!
//! After every character the cursor returns to the top once y runs off the
//! bottom. Characters outside printable ASCII render as `?`.

use core::fmt::{self, Write as _};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::String;

use platform::LcdBus;

use crate::display::Ili9341;
use crate::graphics::color;

pub mod font;

use font::{GlyphTable, FONT_16};

/// Capacity of the formatting buffer used by [`Ili9341::print`].
pub const PRINT_BUFFER_LEN: usize = 256;

/// Columns a tab advances by, in font widths.
const TAB_WIDTH: u16 = 4;

/// Font, colors and wrap flag used by the print path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextContext {
    /// Glyph color.
    pub foreground: u16,
    /// Cell color; equal to `foreground` means transparent.
    pub background: u16,
    /// Current font.
    pub font: &'static GlyphTable,
    /// Wrap at the right edge.
    pub wrap: bool,
}

impl Default for TextContext {
    fn default() -> Self {
        Self {
            foreground: color::YELLOW,
            background: color::BLACK,
            font: &FONT_16,
            wrap: true,
        }
    }
}

/// Text cursor in logical pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CursorPosition {
    /// Column of the next glyph's left edge.
    pub x: u16,
    /// Row of the next glyph's top edge.
    pub y: u16,
}

/// Formatting sink that keeps what fits and drops the rest.
struct TruncatingBuffer {
    text: String<PRINT_BUFFER_LEN>,
    truncated: bool,
}

impl TruncatingBuffer {
    fn new() -> Self {
        Self {
            text: String::new(),
            truncated: false,
        }
    }
}

impl fmt::Write for TruncatingBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        for c in s.chars() {
            if self.text.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

impl<BUS, BL, DELAY> Ili9341<BUS, BL, DELAY>
where
    BUS: LcdBus,
    BL: OutputPin,
    DELAY: DelayNs,
{
    /// Draw one glyph cell with its top-left corner at `(x, y)`.
    ///
    /// Set bits take `fg`. Clear bits take `bg`, or are skipped when
    /// `bg == fg`. Codes the current font has no glyph for draw nothing.
    pub fn draw_char(&mut self, x: i16, y: i16, code: u8, fg: u16, bg: u16) {
        let font = self.text.font;
        let (x, y) = (i32::from(x), i32::from(y));
        let (width, height) = (i32::from(font.width), i32::from(font.height));
        let visible = x < i32::from(self.props.width)
            && y < i32::from(self.props.height)
            && x.saturating_add(width) >= 0
            && y.saturating_add(height) >= 0;
        if !visible || !font.contains(code) {
            return;
        }

        for row in 0..font.height {
            for group in 0..font.bytes_per_row() {
                let bits = font.glyph_byte(code, row, group).unwrap_or(0);
                let left = x.saturating_add(i32::from(group).saturating_mul(8));
                let top = y.saturating_add(i32::from(row));
                for (bit, column) in (0..8u8).zip(left..) {
                    if bits & (0x80 >> bit) != 0 {
                        self.plot(column, top, fg);
                    } else if bg != fg {
                        self.plot(column, top, bg);
                    }
                }
            }
        }
    }

    /// Format `args` into a [`PRINT_BUFFER_LEN`]-byte buffer and render it
    /// at the cursor with the current text style.
    ///
    /// Output longer than the buffer is cut at the last character that
    /// fits. An argument whose `Display` impl fails ends the text there;
    /// what was formatted before it is still rendered. Returns the number
    /// of bytes rendered.
    pub fn print(&mut self, args: fmt::Arguments<'_>) -> usize {
        let mut buffer = TruncatingBuffer::new();
        if buffer.write_fmt(args).is_err() {
            debug!("ILI9341: print formatting failed after {} bytes", buffer.text.len());
        }
        if buffer.truncated {
            warn!("ILI9341: print output truncated to {} bytes", buffer.text.len());
        }
        self.render(&buffer.text);
        buffer.text.len()
    }

    /// [`Self::print`] for a plain string.
    pub fn print_str(&mut self, s: &str) -> usize {
        self.print(format_args!("{s}"))
    }

    fn render(&mut self, s: &str) {
        for c in s.chars() {
            self.put_char(c);
        }
    }

    fn put_char(&mut self, c: char) {
        let font = self.text.font;
        let line_feed = |cursor: CursorPosition| CursorPosition {
            x: 0,
            y: cursor.y.saturating_add(font.height),
        };

        match c {
            '\n' => self.cursor = line_feed(self.cursor),
            '\r' => {}
            '\t' => {
                let step = font.width.saturating_mul(TAB_WIDTH);
                self.cursor.x = self.cursor.x.saturating_add(step);
            }
            _ => {
                let code = if c.is_ascii() { c as u8 } else { b'?' };
                let x = i16::try_from(self.cursor.x).unwrap_or(i16::MAX);
                let y = i16::try_from(self.cursor.y).unwrap_or(i16::MAX);
                let TextContext {
                    foreground,
                    background,
                    wrap,
                    ..
                } = self.text;
                self.draw_char(x, y, code, foreground, background);

                self.cursor.x = self.cursor.x.saturating_add(font.width);
                if wrap && self.cursor.x > self.props.width.saturating_sub(font.width) {
                    self.cursor = line_feed(self.cursor);
                }
            }
        }

        if self.cursor.y >= self.props.height {
            self.cursor.y = 0;
        }
    }

    /// Select the font used by the print path.
    pub fn set_text_font(&mut self, font: &'static GlyphTable) {
        self.text.font = font;
    }

    /// Font used by the print path.
    pub fn text_font(&self) -> &'static GlyphTable {
        self.text.font
    }

    /// Alias of [`Self::text_font`], next to the other geometry getters.
    pub fn font(&self) -> &'static GlyphTable {
        self.text.font
    }

    /// Glyph and cell colors for the print path.
    pub fn set_text_color(&mut self, fg: u16, bg: u16) {
        self.text.foreground = fg;
        self.text.background = bg;
    }

    /// Enable or disable wrapping at the right edge.
    pub fn set_text_wrap(&mut self, wrap: bool) {
        self.text.wrap = wrap;
    }

    /// Current font, colors and wrap flag.
    pub fn text_context(&self) -> TextContext {
        self.text
    }

    /// Where the next glyph goes.
    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }
}

impl<BUS, BL, DELAY> fmt::Write for Ili9341<BUS, BL, DELAY>
where
    BUS: LcdBus,
    BL: OutputPin,
    DELAY: DelayNs,
{
    /// Unbounded: renders `s` as it comes, no buffer involved.
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.render(s);
        Ok(())
    }
}
