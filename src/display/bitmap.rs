use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Color8
// ============================================================================

/// One-byte ARGB pixel, two bits per channel: `a<<6 | r<<4 | g<<2 | b`.
///
/// The byte layout is part of the display contract. The darken sweep
/// counts the alpha bits down before it erodes color, so the alpha channel
/// doubles as a per-pixel decay budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color8(u8);

impl Color8 {
    pub const CLEAR: Color8 = Color8(0x00);
    pub const BLACK: Color8 = Color8(0xC0);
    pub const WHITE: Color8 = Color8(0xFF);
    pub const YELLOW: Color8 = Color8(0xFC);
    pub const BLUE: Color8 = Color8(0xC3);
    pub const DUKE_BLUE: Color8 = Color8(0xC2);
    pub const OXFORD_BLUE: Color8 = Color8(0xC1);
    pub const DARK_GREEN: Color8 = Color8(0xC4);
    pub const IMPERIAL_PURPLE: Color8 = Color8(0xD1);

    #[inline]
    pub const fn from_argb(argb: u8) -> Self {
        Self(argb)
    }

    /// Build from 2-bit channel values (upper bits ignored)
    #[inline]
    pub const fn from_channels(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a & 3) << 6) | ((r & 3) << 4) | ((g & 3) << 2) | (b & 3))
    }

    /// Opaque color quantized from 8-bit channels
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_channels(3, r >> 6, g >> 6, b >> 6)
    }

    #[inline]
    pub const fn argb(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 >> 6
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 4) & 3
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 2) & 3
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0 & 3
    }

    /// Expand to 8-bit RGB for hosts with a wider pixel format (0, 85, 170, 255)
    #[inline]
    pub const fn to_rgb888(self) -> (u8, u8, u8) {
        (self.r() * 85, self.g() * 85, self.b() * 85)
    }
}

// ============================================================================
// Bitmap
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapError {
    /// Bounds rectangle has no area
    EmptyBounds,
    /// Bounds start left of or above the buffer
    NegativeOrigin,
    /// Bounds are wider than one row
    StrideTooNarrow { stride: usize, right: usize },
    /// Slice ends before the last row of the bounds
    TooShort { needed: usize, actual: usize },
}

impl fmt::Display for BitmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBounds => write!(f, "bitmap bounds are empty"),
            Self::NegativeOrigin => write!(f, "bitmap bounds start at a negative coordinate"),
            Self::StrideTooNarrow { stride, right } => write!(
                f,
                "row stride {} is narrower than the bounds (right edge {})",
                stride, right
            ),
            Self::TooShort { needed, actual } => write!(
                f,
                "bitmap needs {} bytes but the buffer holds {}",
                needed, actual
            ),
        }
    }
}

impl std::error::Error for BitmapError {}

/// View over a caller-owned 8-bit ARGB framebuffer.
///
/// Pixel `(x, y)` lives at `data[y * stride + x]`. Rows may carry padding
/// past the bounds; every write is checked against the bounds rectangle and
/// anything outside it is dropped, so padding and neighbouring rows are
/// never touched.
pub struct Bitmap<'a> {
    data: &'a mut [u8],
    stride: usize,
    bounds: Rect,
}

impl<'a> Bitmap<'a> {
    pub fn new(data: &'a mut [u8], stride: usize, bounds: Rect) -> Result<Self, BitmapError> {
        if bounds.is_empty() {
            return Err(BitmapError::EmptyBounds);
        }
        if bounds.left() < 0 || bounds.top() < 0 {
            return Err(BitmapError::NegativeOrigin);
        }
        let right = bounds.right() as usize;
        if right > stride {
            return Err(BitmapError::StrideTooNarrow { stride, right });
        }
        let needed = stride * bounds.bottom() as usize;
        if data.len() < needed {
            return Err(BitmapError::TooShort {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            stride,
            bounds,
        })
    }

    /// Unpadded buffer of `width * height` bytes
    pub fn with_size(data: &'a mut [u8], width: i32, height: i32) -> Result<Self, BitmapError> {
        Self::new(data, width.max(0) as usize, Rect::with_size(width, height))
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Byte offset for a point inside the bounds
    #[inline]
    fn offset(&self, p: Point) -> Option<usize> {
        if self.bounds.contains(p) {
            Some(p.y as usize * self.stride + p.x as usize)
        } else {
            None
        }
    }

    /// Read a pixel. Returns None if out of bounds.
    #[inline]
    pub fn pixel(&self, p: Point) -> Option<Color8> {
        self.offset(p).map(|idx| Color8::from_argb(self.data[idx]))
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn draw_pixel(&mut self, p: Point, color: Color8) {
        if let Some(idx) = self.offset(p) {
            self.data[idx] = color.argb();
        }
    }

    /// Rewrite a pixel in place. Returns false if out of bounds.
    #[inline]
    pub fn map_pixel(&mut self, p: Point, f: impl FnOnce(Color8) -> Color8) -> bool {
        match self.offset(p) {
            Some(idx) => {
                self.data[idx] = f(Color8::from_argb(self.data[idx])).argb();
                true
            },
            None => false,
        }
    }

    /// Square stamp of `size` pixels per side anchored so that odd sizes are
    /// centred on `p` and even sizes extend right/down
    fn stamp(&mut self, p: Point, size: i32, color: Color8) {
        let lo = -(size - 1) / 2;
        let hi = size / 2;
        for dy in lo..=hi {
            for dx in lo..=hi {
                self.draw_pixel(Point::new(p.x + dx, p.y + dy), color);
            }
        }
    }

    /// 2x2 particle marker with `p` as its top-left pixel
    pub fn draw_marker(&mut self, p: Point, color: Color8) {
        self.stamp(p, 2, color);
    }

    /// Fill the bounds rectangle
    pub fn fill(&mut self, color: Color8) {
        let (left, right) = (self.bounds.left() as usize, self.bounds.right() as usize);
        for y in self.bounds.top()..self.bounds.bottom() {
            let row = y as usize * self.stride;
            self.data[row + left..row + right].fill(color.argb());
        }
    }

    /// Demote every fully opaque pixel to alpha 2, so fresh strokes spend
    /// one sweep of alpha before their colour starts to erode
    pub fn soften_opaque(&mut self) {
        for y in self.bounds.top()..self.bounds.bottom() {
            for x in self.bounds.left()..self.bounds.right() {
                self.map_pixel(Point::new(x, y), |c| {
                    if c.a() == 3 {
                        Color8::from_channels(2, c.r(), c.g(), c.b())
                    } else {
                        c
                    }
                });
            }
        }
    }

    /// Draw a line using Bresenham's algorithm, each step stamped as a
    /// `stroke_width` square. Clipped to the bounds grown by the stroke, so
    /// far off-screen segments cost nothing.
    pub fn draw_line(&mut self, from: Point, to: Point, color: Color8, stroke_width: i32) {
        let stroke = stroke_width.max(1);
        let Some((from, to)) = self.clip_line(from, to, stroke) else {
            return;
        };

        let dx = (to.x - from.x).abs();
        let dy = -((to.y - from.y).abs());
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;
        let mut p = from;

        loop {
            self.stamp(p, stroke, color);
            if p == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                p.x += sx;
            }
            if e2 <= dx {
                err += dx;
                p.y += sy;
            }
        }
    }

    /// Cohen-Sutherland clipping against the bounds grown by `margin`.
    /// Returns None when the segment lies entirely outside.
    fn clip_line(&self, mut p0: Point, mut p1: Point, margin: i32) -> Option<(Point, Point)> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Converges in at most 4 passes for valid input
        const MAX_ITERATIONS: u32 = 16;

        let min_x = self.bounds.left() - margin;
        let min_y = self.bounds.top() - margin;
        let max_x = self.bounds.right() - 1 + margin;
        let max_y = self.bounds.bottom() - 1 + margin;

        let outcode = |p: Point| -> u8 {
            let mut code = INSIDE;
            if p.x < min_x {
                code |= LEFT;
            } else if p.x > max_x {
                code |= RIGHT;
            }
            if p.y < min_y {
                code |= TOP;
            } else if p.y > max_y {
                code |= BOTTOM;
            }
            code
        };

        let mut code0 = outcode(p0);
        let mut code1 = outcode(p1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                return Some((p0, p1));
            }
            if (code0 & code1) != 0 {
                return None;
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            let dx = p1.x - p0.x;
            let dy = p1.y - p0.y;

            let clipped = if (code_out & BOTTOM) != 0 {
                Point::new(p0.x + dx * (max_y - p0.y) / dy, max_y)
            } else if (code_out & TOP) != 0 {
                Point::new(p0.x + dx * (min_y - p0.y) / dy, min_y)
            } else if (code_out & RIGHT) != 0 {
                Point::new(max_x, p0.y + dy * (max_x - p0.x) / dx)
            } else {
                Point::new(min_x, p0.y + dy * (min_x - p0.x) / dx)
            };

            if code_out == code0 {
                p0 = clipped;
                code0 = outcode(p0);
            } else {
                p1 = clipped;
                code1 = outcode(p1);
            }
        }

        None
    }

    /// Raw bytes, including row padding
    pub fn as_bytes(&self) -> &[u8] {
        self.data
    }
}
