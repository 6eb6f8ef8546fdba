//! `embedded-graphics` integration.
//!
//! Lets text styles, primitives and images from the `embedded-graphics`
//! ecosystem render straight onto the panel. Pixels go through the same
//! clipping as [`Ili9341::draw_pixel`]; solid fills become one window each.
//! A call reports the latched fault, if any, once it has finished.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Dimensions, DrawTarget, OriginDimensions, Pixel, Size};
use embedded_graphics::primitives::Rectangle;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use platform::LcdBus;

use super::color::from_rgb565;
use crate::display::{DisplayError, Ili9341};

impl<BUS, BL, DELAY> Ili9341<BUS, BL, DELAY>
where
    BUS: LcdBus,
    BL: OutputPin,
    DELAY: DelayNs,
{
    fn fault_status(&self) -> Result<(), DisplayError> {
        self.fault().map_or(Ok(()), Err)
    }
}

impl<BUS, BL, DELAY> DrawTarget for Ili9341<BUS, BL, DELAY>
where
    BUS: LcdBus,
    BL: OutputPin,
    DELAY: DelayNs,
{
    type Color = Rgb565;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.plot(point.x, point.y, from_rgb565(color));
        }
        self.fault_status()
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        // Both corners lie inside the canvas after the intersection.
        let (x0, y0) = (area.top_left.x as u16, area.top_left.y as u16);
        let (x1, y1) = (bottom_right.x as u16, bottom_right.y as u16);
        let result = self.fill_window(x0, y0, x1, y1, from_rgb565(color));
        self.latch(result);
        self.fault_status()
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(from_rgb565(color));
        self.fault_status()
    }
}

impl<BUS, BL, DELAY> OriginDimensions for Ili9341<BUS, BL, DELAY> {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{colors, DisplayConfig, Orientation};

    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use embedded_graphics::mono_font::MonoTextStyle;
    use embedded_graphics::prelude::{Point, Primitive, RgbColor};
    use embedded_graphics::primitives::PrimitiveStyle;
    use embedded_graphics::text::Text;
    use embedded_graphics::Drawable;
    use platform::mocks::{MockDelay, MockLcdBus, MockPin};

    type TestDriver = Ili9341<MockLcdBus, MockPin, MockDelay>;

    fn driver() -> TestDriver {
        Ili9341::new(
            MockLcdBus::new(),
            MockPin::default(),
            MockDelay::default(),
            DisplayConfig::default(),
        )
    }

    #[test]
    fn test_size_follows_orientation() {
        let mut lcd = driver();
        assert_eq!(lcd.size(), Size::new(240, 320));
        lcd.set_orientation(Orientation::LandscapeMirror).unwrap();
        assert_eq!(lcd.size(), Size::new(320, 240));
    }

    #[test]
    fn test_fill_solid_is_one_clipped_window() {
        let mut lcd = driver();
        Rectangle::new(Point::new(-5, 300), Size::new(20, 40))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut lcd)
            .unwrap();
        assert_eq!(lcd.bus().command_count(0x2C), 1);
        assert_eq!(lcd.bus().window(), (0, 300, 14, 319));
        assert_eq!(lcd.bus().pixel(14, 319), colors::RED);
    }

    #[test]
    fn test_fill_solid_off_canvas_is_silent() {
        let mut lcd = driver();
        lcd.fill_solid(&Rectangle::new(Point::new(400, 0), Size::new(5, 5)), Rgb565::RED)
            .unwrap();
        assert!(lcd.bus().ops().is_empty());
    }

    #[test]
    fn test_text_renders_through_pixels() {
        let mut lcd = driver();
        Text::new("Hi", Point::new(2, 10), MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE))
            .draw(&mut lcd)
            .unwrap();
        assert!(lcd.bus().data_words().iter().all(|&w| w == colors::WHITE));
        assert!(!lcd.bus().data_words().is_empty());
    }

    #[test]
    fn test_clear_fills_screen() {
        let mut lcd = driver();
        lcd.clear(Rgb565::BLUE).unwrap();
        assert_eq!(lcd.bus().pixel(239, 319), colors::BLUE);
    }

    #[test]
    fn test_latched_fault_is_reported() {
        let mut bus = MockLcdBus::new();
        bus.fail_after(0);
        let mut lcd =
            Ili9341::new(bus, MockPin::default(), MockDelay::default(), DisplayConfig::default());
        assert_eq!(lcd.clear(Rgb565::BLACK), Err(DisplayError::Bus));
    }
}
