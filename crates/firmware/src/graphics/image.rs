//! Image blits
//!
//! Two sources of raw RGB565 pixels:
//!
//! - [`ImageBuffer`]: rows of little-endian words in RAM or program flash.
//! - A [`PageSource`]: full-screen pictures in external NOR flash, streamed
//!   one page at a time into the open addressing window.
//!
//! Neither path decodes anything; words go to the panel as stored.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use platform::{LcdBus, PageSource};

use crate::display::{DisplayError, Ili9341};

/// Words converted per transport call.
const WORDS_PER_CHUNK: usize = 64;

/// Largest flash page the blit path handles.
const MAX_PAGE_SIZE: usize = 256;

/// Raw pixel rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBuffer<'a> {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Row stride in bytes.
    pub bytes_per_line: u16,
    /// Only 16 (RGB565) is drawable.
    pub bits_per_pixel: u8,
    /// `height * bytes_per_line` bytes, rows top to bottom.
    pub data: &'a [u8],
}

impl<'a> ImageBuffer<'a> {
    /// Tightly packed RGB565 image.
    pub fn rgb565(width: u16, height: u16, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            bytes_per_line: width.saturating_mul(2),
            bits_per_pixel: 16,
            data,
        }
    }

    fn row(&self, row: u16) -> Option<&'a [u8]> {
        let stride = usize::from(self.bytes_per_line);
        let start = usize::from(row).checked_mul(stride)?;
        self.data.get(start..start.checked_add(stride)?)
    }
}

/// Decode little-endian words from `bytes` and stream them, chunk by chunk.
fn stream_le_words<F>(bytes: &[u8], mut write: F) -> Result<(), DisplayError>
where
    F: FnMut(&[u16]) -> Result<(), DisplayError>,
{
    let mut words = [0u16; WORDS_PER_CHUNK];
    for chunk in bytes.chunks(WORDS_PER_CHUNK.saturating_mul(2)) {
        let mut len = 0;
        for ((slot, pair), filled) in words.iter_mut().zip(chunk.chunks_exact(2)).zip(1..) {
            if let [lo, hi] = *pair {
                *slot = u16::from_le_bytes([lo, hi]);
            }
            len = filled;
        }
        if let Some(filled) = words.get(..len) {
            write(filled)?;
        }
    }
    Ok(())
}

impl<BUS, BL, DELAY> Ili9341<BUS, BL, DELAY>
where
    BUS: LcdBus,
    BL: OutputPin,
    DELAY: DelayNs,
{
    /// Draw `image` with its top-left corner at `(x, y)`.
    ///
    /// Nothing is drawn unless the whole image fits on the canvas, its
    /// format is RGB565, and `data` holds every row. Each row opens a window
    /// from `(x, y + row)` to the bottom-right corner of the canvas and
    /// streams `bytes_per_line / 2` words into it.
    pub fn draw_image(&mut self, x: i16, y: i16, image: &ImageBuffer<'_>) {
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            debug!("ILI9341: image at ({}, {}) off canvas", x, y);
            return;
        };
        let (width, height) = (u32::from(self.props.width), u32::from(self.props.height));
        let right = u32::from(x).saturating_add(u32::from(image.width));
        let bottom = u32::from(y).saturating_add(u32::from(image.height));
        let fits = u32::from(x) < width
            && u32::from(y) < height
            && right <= width
            && bottom <= height;
        if !fits {
            debug!("ILI9341: image {}x{} at ({}, {}) off canvas", image.width, image.height, x, y);
            return;
        }
        if image.bits_per_pixel != 16 {
            debug!("ILI9341: {} bpp images unsupported", image.bits_per_pixel);
            return;
        }
        let needed = usize::from(image.height).saturating_mul(usize::from(image.bytes_per_line));
        if image.data.len() < needed {
            debug!("ILI9341: image data short ({} < {} bytes)", image.data.len(), needed);
            return;
        }

        let (canvas_right, canvas_bottom) = self.bottom_right();
        let result = (0..image.height).try_for_each(|row| {
            let Some(bytes) = image.row(row) else {
                return Ok(());
            };
            self.set_window(x, y.saturating_add(row), canvas_right, canvas_bottom)?;
            stream_le_words(bytes, |words| self.write_words(words))
        });
        self.latch(result);
    }

    /// Stream `page_count` pages starting at `first_page` into the current
    /// addressing window.
    ///
    /// Pages hold little-endian RGB565 words. The caller opens the window
    /// (see [`Self::set_window`]); a read failure stops the blit with
    /// [`DisplayError::Flash`].
    pub fn blit_from_flash<S: PageSource>(
        &mut self,
        source: &mut S,
        first_page: u32,
        page_count: u32,
    ) -> Result<(), DisplayError> {
        let mut page = [0u8; MAX_PAGE_SIZE];
        let page = page
            .get_mut(..S::PAGE_SIZE)
            .ok_or(DisplayError::Flash)?;

        for index in 0..page_count {
            let number = first_page.checked_add(index).ok_or(DisplayError::Flash)?;
            source.read_page(page, number, 0).map_err(|_| {
                warn!("ILI9341: flash read failed at page {}", number);
                DisplayError::Flash
            })?;
            stream_le_words(page, |words| self.write_words(words))?;
        }
        trace!("ILI9341: blitted {} flash pages from {}", page_count, first_page);
        Ok(())
    }

    /// Fill the whole canvas with the picture stored from `first_page` on.
    ///
    /// Opens a full-canvas window in the current orientation and reads
    /// `width * height * 2` bytes worth of pages.
    pub fn draw_flash_picture<S: PageSource>(
        &mut self,
        source: &mut S,
        first_page: u32,
    ) -> Result<(), DisplayError> {
        let (right, bottom) = self.bottom_right();
        self.set_window(0, 0, right, bottom)?;

        let bytes = u32::from(self.props.width)
            .saturating_mul(u32::from(self.props.height))
            .saturating_mul(2);
        let page_size = u32::try_from(S::PAGE_SIZE).map_err(|_| DisplayError::Flash)?;
        let pages = bytes.div_ceil(page_size.max(1));
        self.blit_from_flash(source, first_page, pages)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::{colors, DisplayConfig};

    use platform::mocks::{MockDelay, MockFlash, MockLcdBus, MockPin};
    use platform::NorFlashPages;

    type TestDriver = Ili9341<MockLcdBus, MockPin, MockDelay>;

    fn driver() -> TestDriver {
        Ili9341::new(
            MockLcdBus::new(),
            MockPin::default(),
            MockDelay::default(),
            DisplayConfig::default(),
        )
    }

    fn le_bytes(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn test_stream_le_words_chunks() {
        let bytes = le_bytes(&[0x1234; WORDS_PER_CHUNK + 3]);
        let mut calls = Vec::new();
        stream_le_words(&bytes, |words| {
            calls.push(words.len());
            assert!(words.iter().all(|&w| w == 0x1234));
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, [WORDS_PER_CHUNK, 3]);
    }

    #[test]
    fn test_draw_image_rows() {
        let mut lcd = driver();
        let data = le_bytes(&[colors::RED, colors::GREEN, colors::BLUE, colors::WHITE]);
        lcd.draw_image(10, 20, &ImageBuffer::rgb565(2, 2, &data));

        assert_eq!(lcd.bus().command_count(0x2C), 2);
        assert_eq!(lcd.bus().window(), (10, 21, 239, 319));
        assert_eq!(lcd.bus().pixel(10, 20), colors::RED);
        assert_eq!(lcd.bus().pixel(11, 20), colors::GREEN);
        assert_eq!(lcd.bus().pixel(10, 21), colors::BLUE);
        assert_eq!(lcd.bus().pixel(11, 21), colors::WHITE);
        assert_eq!(lcd.fault(), None);
    }

    #[test]
    fn test_draw_image_rejections() {
        let data = le_bytes(&[colors::RED; 4]);
        let mut lcd = driver();

        lcd.draw_image(239, 0, &ImageBuffer::rgb565(2, 2, &data));
        lcd.draw_image(0, 319, &ImageBuffer::rgb565(2, 2, &data));
        lcd.draw_image(0, 0, &ImageBuffer::rgb565(2, 3, &data));
        let indexed = ImageBuffer {
            bits_per_pixel: 8,
            ..ImageBuffer::rgb565(2, 2, &data)
        };
        lcd.draw_image(0, 0, &indexed);
        lcd.draw_image(-1, 0, &ImageBuffer::rgb565(2, 2, &data));

        assert!(lcd.bus().ops().is_empty());
    }

    #[test]
    fn test_image_touching_bottom_right_is_drawn() {
        let data = le_bytes(&[colors::PINK; 4]);
        let mut lcd = driver();
        lcd.draw_image(238, 318, &ImageBuffer::rgb565(2, 2, &data));
        assert_eq!(lcd.bus().pixel(239, 319), colors::PINK);
    }

    #[test]
    fn test_blit_from_flash_streams_pages() {
        let words: Vec<u16> = (0..256).collect();
        let mut flash = NorFlashPages::new(MockFlash::new(le_bytes(&words)));
        let mut lcd = driver();
        lcd.set_window(0, 0, 15, 15).unwrap();
        lcd.blit_from_flash(&mut flash, 0, 2).unwrap();

        assert_eq!(lcd.bus().data_words(), words);
        assert_eq!(lcd.bus().pixel(0, 0), 0);
        assert_eq!(lcd.bus().pixel(15, 15), 255);
    }

    #[test]
    fn test_blit_read_error_maps_to_flash() {
        let mut flash = NorFlashPages::new(MockFlash::new(vec![0; 256]));
        let mut lcd = driver();
        assert_eq!(lcd.blit_from_flash(&mut flash, 0, 2), Err(DisplayError::Flash));
        assert_eq!(lcd.bus().data_words().len(), 128);
    }

    #[test]
    fn test_flash_picture_fills_canvas() {
        let picture = le_bytes(&vec![colors::ORANGE; 240 * 320]);
        let mut flash = NorFlashPages::new(MockFlash::new(picture));
        let mut lcd = driver();
        lcd.draw_flash_picture(&mut flash, 0).unwrap();

        assert_eq!(lcd.bus().window(), (0, 0, 239, 319));
        assert_eq!(lcd.bus().data_words().len(), 240 * 320);
        assert_eq!(lcd.bus().pixel(239, 319), colors::ORANGE);
        assert_eq!(flash.release().reads(), 600);
    }
}
