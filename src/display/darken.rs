//! Trail decay
//!
//! Each sweep touches one diagonal quarter of the pixels, `(x + y) % 4`
//! matching the current phase, so a full decay step is spread over four
//! sweeps without visible banding.

use super::bitmap::{Bitmap, Color8};
use crate::geometry::Point;

/// Number of sweeps before every pixel has been aged once
pub const SWEEP_PHASES: u8 = 4;

/// Age a pixel by one step. Alpha is spent first; after that green, red and
/// blue are eroded in that priority so the brightest channel fades last.
#[inline]
pub fn age(c: Color8) -> Color8 {
    let (a, r, g, b) = (c.a(), c.r(), c.g(), c.b());
    if a > 0 {
        Color8::from_channels(a - 1, r, g, b)
    } else if g >= r && g > 0 {
        Color8::from_channels(a, r, g - 1, b)
    } else if r >= b && r > 0 {
        Color8::from_channels(a, r - 1, g, b)
    } else if b > 0 {
        Color8::from_channels(a, r, g, b - 1)
    } else {
        c
    }
}

#[derive(Debug, Clone, Default)]
pub struct DarkenSweep {
    phase: u8,
}

impl DarkenSweep {
    pub fn new() -> Self {
        Self { phase: 0 }
    }

    /// Phase used by the most recent sweep
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Advance the phase, then age every pixel on that diagonal.
    /// Returns the number of pixels touched.
    pub fn apply(&mut self, bitmap: &mut Bitmap<'_>) -> usize {
        self.phase = (self.phase + 1) % SWEEP_PHASES;
        let phase = self.phase as i32;
        let bounds = bitmap.bounds();
        let mut touched = 0;

        for y in bounds.top()..bounds.bottom() {
            // First column on this row whose (x + y) lands on the phase
            let skip = (phase - bounds.left() - y).rem_euclid(SWEEP_PHASES as i32);
            let mut x = bounds.left() + skip;
            while x < bounds.right() {
                if bitmap.map_pixel(Point::new(x, y), age) {
                    touched += 1;
                }
                x += SWEEP_PHASES as i32;
            }
        }

        touched
    }
}
