use super::{Effect, FrameEvent};
use crate::config::ConfigError;
use crate::display::{Bitmap, Color8};
use crate::fixed::Fixed;
use crate::geometry::Point;
use crate::random::RandomSource;
use log::debug;
use serde::{Deserialize, Serialize};

/// Points traced per frame before yielding
pub const DEFAULT_SEGMENTS_PER_FRAME: usize = 10;
pub const DEFAULT_STROKE_WIDTH: i32 = 3;
/// Largest accepted |radius| or |pen offset|. Keeps `t * q / r` inside the
/// `Fixed` range for every angle up to the `R·π` limit.
pub const MAX_PATTERN_RADIUS: i32 = 500;

/// Hypotrochoid parameters: a circle of `inner_radius` rolling inside one of
/// `outer_radius`, pen held `pen_offset` from the rolling centre. A negative
/// inner radius rolls outside instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub outer_radius: i32,
    pub inner_radius: i32,
    pub pen_offset: i32,
}

impl Pattern {
    pub const fn new(outer_radius: i32, inner_radius: i32, pen_offset: i32) -> Self {
        Self {
            outer_radius,
            inner_radius,
            pen_offset,
        }
    }

    /// Curve point for angle `t`, relative to the centre
    ///
    /// `inner_radius` must be non-zero.
    pub fn point_at(&self, t: Fixed) -> Point {
        let q = Fixed::from_int(self.outer_radius.saturating_sub(self.inner_radius));
        let r = Fixed::from_int(self.inner_radius);
        let d = Fixed::from_int(self.pen_offset);
        let lobe = t * q / r;

        Point::new(
            (q * t.sin()).to_int() - (d * lobe.sin()).to_int(),
            (q * t.cos()).to_int() + (d * lobe.cos()).to_int(),
        )
    }

    /// Angle at which a trace gives up waiting for the loop to close
    pub fn angle_limit(&self) -> Fixed {
        Fixed::from_int(self.outer_radius) * Fixed::PI
    }
}

pub const DEFAULT_PATTERNS: [Pattern; 7] = [
    Pattern::new(65, 15, 24),  // big lobes
    Pattern::new(95, 55, 12),  // ball
    Pattern::new(65, -15, 24), // spills off the edge
    Pattern::new(95, 55, 42),  // wide spiral
    Pattern::new(15, 55, 45),  // tight ball
    Pattern::new(25, 55, 25),  // lopsided ball
    Pattern::new(35, 55, 35),
];

/// Check a pattern table: non-empty, no zero inner radius, every value
/// within `MAX_PATTERN_RADIUS`
pub fn validate_patterns(patterns: &[Pattern]) -> Result<(), ConfigError> {
    if patterns.is_empty() {
        return Err(ConfigError::NoPatterns);
    }
    for (index, p) in patterns.iter().enumerate() {
        if p.inner_radius == 0 {
            return Err(ConfigError::ZeroInnerRadius { index });
        }
        let in_range = |v: i32| v.checked_abs().is_some_and(|v| v <= MAX_PATTERN_RADIUS);
        if !(in_range(p.outer_radius) && in_range(p.inner_radius) && in_range(p.pen_offset)) {
            return Err(ConfigError::PatternOutOfRange { index });
        }
    }
    Ok(())
}

/// Angle advance per traced point: π / 2e⁴
pub fn angle_step() -> Fixed {
    Fixed::PI / (Fixed::TWO * Fixed::from_int(4).exp())
}

/// Next stroke color: step the packed byte, keep it opaque
#[inline]
fn next_stroke_color(c: Color8) -> Color8 {
    Color8::from_argb(c.argb().wrapping_add(1) | 0xC0)
}

/// Incremental spirograph, a few segments per frame
pub struct Spirograph {
    patterns: Vec<Pattern>,
    pattern_index: usize,
    angle: Fixed,
    step: Fixed,
    last: Option<Point>,
    first: Option<Point>,
    /// Trace has moved off its first point
    departed: bool,
    color: Color8,
    segments_per_frame: usize,
    stroke_width: i32,
}

impl Spirograph {
    pub fn new(patterns: Vec<Pattern>) -> Result<Self, ConfigError> {
        validate_patterns(&patterns)?;

        Ok(Self {
            patterns,
            pattern_index: 0,
            angle: Fixed::ZERO,
            step: angle_step(),
            last: None,
            first: None,
            departed: false,
            color: Color8::WHITE,
            segments_per_frame: DEFAULT_SEGMENTS_PER_FRAME,
            stroke_width: DEFAULT_STROKE_WIDTH,
        })
    }

    pub fn with_segments_per_frame(mut self, segments: usize) -> Self {
        self.segments_per_frame = segments.max(1);
        self
    }

    pub fn with_stroke_width(mut self, width: i32) -> Self {
        self.stroke_width = width.max(1);
        self
    }

    /// Trace up to `segments_per_frame` points of the active pattern
    pub fn step(&mut self, bitmap: &mut Bitmap<'_>) -> FrameEvent {
        let pattern = self.patterns[self.pattern_index];
        let limit = pattern.angle_limit();
        let center = bitmap.bounds().center();

        for _ in 0..self.segments_per_frame {
            if self.angle >= limit {
                return self.complete_cycle();
            }
            self.angle += self.step;
            let point = pattern.point_at(self.angle);

            if let Some(first) = self.first {
                if point != first {
                    self.departed = true;
                } else if self.departed {
                    return self.complete_cycle();
                }
            }

            match self.last {
                Some(last) => {
                    bitmap.draw_line(center + last, center + point, self.color, self.stroke_width);
                },
                None => self.first = Some(point),
            }
            self.last = Some(point);
        }

        self.color = next_stroke_color(self.color);
        if self.angle >= limit {
            return self.complete_cycle();
        }
        FrameEvent::Continue
    }

    fn complete_cycle(&mut self) -> FrameEvent {
        self.angle = Fixed::ZERO;
        self.last = None;
        self.first = None;
        self.departed = false;
        self.pattern_index = (self.pattern_index + 1) % self.patterns.len();
        debug!(
            "spirograph loop closed, next pattern {} {:?}",
            self.pattern_index, self.patterns[self.pattern_index]
        );
        FrameEvent::CycleComplete
    }

    pub fn pattern_index(&self) -> usize {
        self.pattern_index
    }

    pub fn pattern(&self) -> Pattern {
        self.patterns[self.pattern_index]
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn angle(&self) -> Fixed {
        self.angle
    }

    pub fn color(&self) -> Color8 {
        self.color
    }
}

impl Effect for Spirograph {
    fn frame(&mut self, bitmap: &mut Bitmap<'_>, _rng: &mut dyn RandomSource) -> FrameEvent {
        self.step(bitmap)
    }

    fn name(&self) -> &str {
        "Spirograph"
    }
}
