//! Rasterizer
//!
//! 2-D primitives on top of the protocol engine. Every primitive reduces to
//! "program the smallest window, stream one word per pixel": single pixels
//! get a 1×1 window, horizontal and vertical runs a 1-pixel-thick window.
//!
//! Coordinates are `i16` at the API and widened to `i32` inside, so no
//! intermediate (`x + w - 1`, `y0 + y + 1 + delta`, triangle accumulators)
//! can overflow. Clipping happens before any bus traffic:
//!
//! - single pixels off the canvas are dropped,
//! - [`Ili9341::draw_hline`]/[`Ili9341::draw_vline`] clamp every coordinate
//!   onto the canvas,
//! - every other shape emits runs through the span clip: a run whose fixed
//!   coordinate is off the canvas is dropped, the rest is cut to the canvas.

// All raster arithmetic is on i32 values derived from i16 inputs and u16
// canvas sizes; sums of a handful of such values cannot overflow i32.
#![allow(clippy::arithmetic_side_effects)]

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use platform::LcdBus;

use crate::display::Ili9341;

pub mod color;
pub mod image;
pub mod target;

/// Quadrant bits for [`Ili9341::draw_circle_quadrant`].
pub mod quadrant {
    /// (−x, −y): upper left.
    pub const UPPER_LEFT: u8 = 0x1;
    /// (+x, −y): upper right.
    pub const UPPER_RIGHT: u8 = 0x2;
    /// (+x, +y): lower right.
    pub const LOWER_RIGHT: u8 = 0x4;
    /// (−x, +y): lower left.
    pub const LOWER_LEFT: u8 = 0x8;
}

/// Half bits for [`Ili9341::fill_circle_quadrant`].
pub mod half {
    /// Right half (+x).
    pub const RIGHT: u8 = 0x1;
    /// Left half (−x).
    pub const LEFT: u8 = 0x2;
}

/// Midpoint circle stepper.
///
/// Yields `(x, y)` for each step of the first octant, starting after the
/// axis points, while `x < y`.
struct Octant {
    f: i32,
    ddf_x: i32,
    ddf_y: i32,
    x: i32,
    y: i32,
}

impl Octant {
    fn new(r: i32) -> Self {
        Self {
            f: 1 - r,
            ddf_x: 1,
            ddf_y: -2 * r,
            x: 0,
            y: r,
        }
    }
}

impl Iterator for Octant {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.x >= self.y {
            return None;
        }
        if self.f >= 0 {
            self.y -= 1;
            self.ddf_y += 2;
            self.f += self.ddf_y;
        }
        self.x += 1;
        self.ddf_x += 2;
        self.f += self.ddf_x;
        Some((self.x, self.y))
    }
}

impl<BUS, BL, DELAY> Ili9341<BUS, BL, DELAY>
where
    BUS: LcdBus,
    BL: OutputPin,
    DELAY: DelayNs,
{
    // -----------------------------------------------------------------------
    // Clipping
    // -----------------------------------------------------------------------

    fn on_canvas(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        let x = u16::try_from(x).ok().filter(|&x| x < self.props.width)?;
        let y = u16::try_from(y).ok().filter(|&y| y < self.props.height)?;
        Some((x, y))
    }

    fn clamp_x(&self, x: i32) -> u16 {
        x.clamp(0, i32::from(self.props.width.saturating_sub(1))) as u16
    }

    fn clamp_y(&self, y: i32) -> u16 {
        y.clamp(0, i32::from(self.props.height.saturating_sub(1))) as u16
    }

    // -----------------------------------------------------------------------
    // i32 cores
    // -----------------------------------------------------------------------

    pub(crate) fn plot(&mut self, x: i32, y: i32, color: u16) {
        let Some((x, y)) = self.on_canvas(x, y) else {
            return;
        };
        let result = self.fill_window(x, y, x, y, color);
        self.latch(result);
    }

    fn hline(&mut self, x0: i32, x1: i32, y: i32, color: u16) {
        let (x0, x1) = if x1 < x0 { (x1, x0) } else { (x0, x1) };
        let (x0, x1, y) = (self.clamp_x(x0), self.clamp_x(x1), self.clamp_y(y));
        let result = self.fill_window(x0, y, x1, y, color);
        self.latch(result);
    }

    fn vline(&mut self, x: i32, y0: i32, y1: i32, color: u16) {
        let (y0, y1) = if y1 < y0 { (y1, y0) } else { (y0, y1) };
        let (x, y0, y1) = (self.clamp_x(x), self.clamp_y(y0), self.clamp_y(y1));
        let result = self.fill_window(x, y0, x, y1, color);
        self.latch(result);
    }

    /// Horizontal run limited to its on-canvas part; nothing if none.
    fn hspan(&mut self, x0: i32, x1: i32, y: i32, color: u16) {
        let (lo, hi) = (x0.min(x1), x0.max(x1));
        let (w, h) = (i32::from(self.props.width), i32::from(self.props.height));
        if y < 0 || y >= h || hi < 0 || lo >= w {
            return;
        }
        self.hline(lo, hi, y, color);
    }

    /// Vertical run limited to its on-canvas part; nothing if none.
    fn vspan(&mut self, x: i32, y0: i32, y1: i32, color: u16) {
        let (lo, hi) = (y0.min(y1), y0.max(y1));
        let (w, h) = (i32::from(self.props.width), i32::from(self.props.height));
        if x < 0 || x >= w || hi < 0 || lo >= h {
            return;
        }
        self.vline(x, lo, hi, color);
    }

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u16) {
        if y0 == y1 {
            self.hspan(x0, x1, y0, color);
            return;
        }
        if x0 == x1 {
            self.vspan(x0, y0, y1, color);
            return;
        }

        let (mut x0, mut y0, mut x1, mut y1) = (x0, y0, x1, y1);
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            core::mem::swap(&mut x0, &mut y0);
            core::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            core::mem::swap(&mut x0, &mut x1);
            core::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let ystep = if y0 < y1 { 1 } else { -1 };
        let mut err = dx / 2;
        let mut y = y0;

        for x in x0..=x1 {
            if steep {
                self.plot(y, x, color);
            } else {
                self.plot(x, y, color);
            }
            err -= dy;
            if err < 0 {
                y += ystep;
                err += dx;
            }
        }
    }

    fn circle_quadrant(&mut self, x0: i32, y0: i32, r: i32, mask: u8, color: u16) {
        for (x, y) in Octant::new(r) {
            if mask & quadrant::LOWER_RIGHT != 0 {
                self.plot(x0 + x, y0 + y, color);
                self.plot(x0 + y, y0 + x, color);
            }
            if mask & quadrant::UPPER_RIGHT != 0 {
                self.plot(x0 + x, y0 - y, color);
                self.plot(x0 + y, y0 - x, color);
            }
            if mask & quadrant::LOWER_LEFT != 0 {
                self.plot(x0 - y, y0 + x, color);
                self.plot(x0 - x, y0 + y, color);
            }
            if mask & quadrant::UPPER_LEFT != 0 {
                self.plot(x0 - y, y0 - x, color);
                self.plot(x0 - x, y0 - y, color);
            }
        }
    }

    fn fill_circle_half(&mut self, x0: i32, y0: i32, r: i32, mask: u8, delta: i32, color: u16) {
        for (x, y) in Octant::new(r) {
            if mask & half::RIGHT != 0 {
                self.vspan(x0 + x, y0 - y, y0 + y + 1 + delta, color);
                self.vspan(x0 + y, y0 - x, y0 + x + 1 + delta, color);
            }
            if mask & half::LEFT != 0 {
                self.vspan(x0 - x, y0 - y, y0 + y + 1 + delta, color);
                self.vspan(x0 - y, y0 - x, y0 + x + 1 + delta, color);
            }
        }
    }

    fn fill_rect_i32(&mut self, x: i32, y: i32, w: i32, h: i32, color: u16) {
        let (width, height) = (i32::from(self.props.width), i32::from(self.props.height));
        if x >= width || y >= height || x + w < 0 || y + h < 0 {
            return;
        }
        let w = if x + w - 1 >= width { width - x } else { w };
        let h = if y + h - 1 >= height { height - y } else { h };
        for row in y.max(0)..=y + h {
            self.hspan(x, x + w, row, color);
        }
    }

    // -----------------------------------------------------------------------
    // Public primitives
    // -----------------------------------------------------------------------

    /// One pixel. Off-canvas coordinates are dropped without bus traffic.
    pub fn draw_pixel(&mut self, x: i16, y: i16, color: u16) {
        self.plot(x.into(), y.into(), color);
    }

    /// Horizontal line from `x0` to `x1` inclusive, either order.
    ///
    /// Every coordinate is clamped onto the canvas.
    pub fn draw_hline(&mut self, x0: i16, x1: i16, y: i16, color: u16) {
        self.hline(x0.into(), x1.into(), y.into(), color);
    }

    /// Vertical line from `y0` to `y1` inclusive, either order.
    ///
    /// Every coordinate is clamped onto the canvas.
    pub fn draw_vline(&mut self, x: i16, y0: i16, y1: i16, color: u16) {
        self.vline(x.into(), y0.into(), y1.into(), color);
    }

    /// Bresenham line. Axis-aligned lines go out as one burst.
    pub fn draw_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, color: u16) {
        self.line(x0.into(), y0.into(), x1.into(), y1.into(), color);
    }

    /// Rectangle outline with top-left `(x, y)`.
    pub fn draw_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: u16) {
        let (x, y, w, h) = (i32::from(x), i32::from(y), i32::from(w), i32::from(h));
        self.hspan(x, x + w - 1, y, color);
        self.hspan(x, x + w - 1, y + h - 1, color);
        self.vspan(x, y, y + h - 1, color);
        self.vspan(x + w - 1, y, y + h - 1, color);
    }

    /// Rectangle outline with corners of radius `r`.
    pub fn draw_round_rect(&mut self, x: i16, y: i16, w: i16, h: i16, r: i16, color: u16) {
        let (x, y, w, h, r) = (
            i32::from(x),
            i32::from(y),
            i32::from(w),
            i32::from(h),
            i32::from(r),
        );
        self.hspan(x + r, x + w - r, y, color);
        self.hspan(x + r, x + w - r, y + h - 1, color);
        self.vspan(x, y + r, y + h - r, color);
        self.vspan(x + w - 1, y + r, y + h - r, color);

        self.circle_quadrant(x + r, y + r, r, quadrant::UPPER_LEFT, color);
        self.circle_quadrant(x + w - r - 1, y + r, r, quadrant::UPPER_RIGHT, color);
        self.circle_quadrant(x + w - r - 1, y + h - r - 1, r, quadrant::LOWER_RIGHT, color);
        self.circle_quadrant(x + r, y + h - r - 1, r, quadrant::LOWER_LEFT, color);
    }

    /// Circle outline. Negative radii draw nothing.
    pub fn draw_circle(&mut self, x0: i16, y0: i16, r: i16, color: u16) {
        if r < 0 {
            return;
        }
        let (x0, y0, r) = (i32::from(x0), i32::from(y0), i32::from(r));
        self.plot(x0, y0 + r, color);
        self.plot(x0, y0 - r, color);
        self.plot(x0 + r, y0, color);
        self.plot(x0 - r, y0, color);

        for (x, y) in Octant::new(r) {
            self.plot(x0 + x, y0 + y, color);
            self.plot(x0 - x, y0 + y, color);
            self.plot(x0 + x, y0 - y, color);
            self.plot(x0 - x, y0 - y, color);
            self.plot(x0 + y, y0 + x, color);
            self.plot(x0 - y, y0 + x, color);
            self.plot(x0 + y, y0 - x, color);
            self.plot(x0 - y, y0 - x, color);
        }
    }

    /// Quarter arcs of a circle selected by `mask` (see [`quadrant`]).
    pub fn draw_circle_quadrant(&mut self, x0: i16, y0: i16, r: i16, mask: u8, color: u16) {
        self.circle_quadrant(x0.into(), y0.into(), r.into(), mask, color);
    }

    /// Filled circle. Negative radii draw nothing.
    pub fn fill_circle(&mut self, x0: i16, y0: i16, r: i16, color: u16) {
        if r < 0 {
            return;
        }
        let (x0, y0, r) = (i32::from(x0), i32::from(y0), i32::from(r));
        self.vspan(x0, y0 - r, y0 + r + 1, color);
        self.fill_circle_half(x0, y0, r, half::RIGHT | half::LEFT, 0, color);
    }

    /// Filled circle halves selected by `mask` (see [`half`]), stretched
    /// vertically by `delta` pixels.
    pub fn fill_circle_quadrant(
        &mut self,
        x0: i16,
        y0: i16,
        r: i16,
        mask: u8,
        delta: i16,
        color: u16,
    ) {
        self.fill_circle_half(x0.into(), y0.into(), r.into(), mask, delta.into(), color);
    }

    /// Filled rectangle with top-left `(x, y)`.
    ///
    /// Rows `y..=y + h` are each drawn from `x` to `x + w` inclusive, after
    /// shrinking `w`/`h` to the canvas. Rows and columns off the canvas are
    /// dropped, so a rectangle wholly beside the canvas draws nothing.
    pub fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, color: u16) {
        self.fill_rect_i32(x.into(), y.into(), w.into(), h.into(), color);
    }

    /// Filled rectangle with corners of radius `r`.
    pub fn fill_round_rect(&mut self, x: i16, y: i16, w: i16, h: i16, r: i16, color: u16) {
        let (x, y, w, h, r) = (
            i32::from(x),
            i32::from(y),
            i32::from(w),
            i32::from(h),
            i32::from(r),
        );
        self.fill_rect_i32(x + r, y, w - 2 * r, h, color);
        let delta = h - 2 * r - 1;
        self.fill_circle_half(x + w - r - 1, y + r, r, half::RIGHT, delta, color);
        self.fill_circle_half(x + r, y + r, r, half::LEFT, delta, color);
    }

    /// Triangle outline.
    pub fn draw_triangle(
        &mut self,
        x0: i16,
        y0: i16,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        color: u16,
    ) {
        self.draw_line(x0, y0, x1, y1, color);
        self.draw_line(x1, y1, x2, y2, color);
        self.draw_line(x2, y2, x0, y0, color);
    }

    /// Filled triangle, one horizontal span per scanline.
    pub fn fill_triangle(
        &mut self,
        x0: i16,
        y0: i16,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        color: u16,
    ) {
        let mut v0 = (i32::from(x0), i32::from(y0));
        let mut v1 = (i32::from(x1), i32::from(y1));
        let mut v2 = (i32::from(x2), i32::from(y2));

        // Sort by y: v0.1 <= v1.1 <= v2.1
        if v0.1 > v1.1 {
            core::mem::swap(&mut v0, &mut v1);
        }
        if v1.1 > v2.1 {
            core::mem::swap(&mut v2, &mut v1);
        }
        if v0.1 > v1.1 {
            core::mem::swap(&mut v0, &mut v1);
        }
        let ((x0, y0), (x1, y1), (x2, y2)) = (v0, v1, v2);

        if y0 == y2 {
            let a = x0.min(x1).min(x2);
            let b = x0.max(x1).max(x2);
            self.hspan(a, b + 1, y0, color);
            return;
        }

        let (dx01, dy01) = (x1 - x0, y1 - y0);
        let (dx02, dy02) = (x2 - x0, y2 - y0);
        let (dx12, dy12) = (x2 - x1, y2 - y1);
        let mut sa: i32 = 0;
        let mut sb: i32 = 0;

        // Upper part: edges 0-1 and 0-2. Includes scanline y1 only when the
        // lower part is flat (y1 == y2).
        let last = if y1 == y2 { y1 } else { y1 - 1 };
        let mut y = y0;
        while y <= last {
            let mut a = x0 + sa / dy01;
            let mut b = x0 + sb / dy02;
            sa += dx01;
            sb += dx02;
            if a > b {
                core::mem::swap(&mut a, &mut b);
            }
            self.hspan(a, b + 1, y, color);
            y += 1;
        }

        // Lower part: edges 1-2 and 0-2.
        sa = dx12 * (y - y1);
        sb = dx02 * (y - y0);
        while y <= y2 {
            let mut a = x1 + sa / dy12;
            let mut b = x0 + sb / dy02;
            sa += dx12;
            sb += dx02;
            if a > b {
                core::mem::swap(&mut a, &mut b);
            }
            self.hspan(a, b + 1, y, color);
            y += 1;
        }
    }

    /// Fill the whole logical canvas.
    pub fn fill_screen(&mut self, color: u16) {
        let (right, bottom) = self.bottom_right();
        let result = self.fill_window(0, 0, right, bottom, color);
        self.latch(result);
    }

    /// Eight horizontal bands, top to bottom: black, yellow, magenta, red,
    /// cyan, green, blue, white.
    pub fn test_pattern(&mut self) {
        const BANDS: [u16; 7] = [
            color::WHITE,
            color::BLUE,
            color::GREEN,
            color::CYAN,
            color::RED,
            color::MAGENTA,
            color::YELLOW,
        ];
        let (right, bottom) = self.bottom_right();
        let width = u32::from(self.props.width);
        let height = i32::from(self.props.height);
        let strip = height / 8;

        let result = self.set_window(0, 0, right, bottom).and_then(|()| {
            for y in 0..height {
                // Band k (from the bottom) covers y > height - 1 - strip * (k + 1).
                let band = BANDS
                    .iter()
                    .zip(1..)
                    .find(|(_, k)| y > height - 1 - strip * k)
                    .map_or(color::BLACK, |(&c, _)| c);
                self.write_repeated(band, width)?;
            }
            Ok(())
        });
        self.latch(result);
    }
}
