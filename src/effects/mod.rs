mod fireworks;
mod spirograph;

pub use fireworks::{
    Firework, FireworkPhysics, FireworkShow, Phase, DEFAULT_DARKEN_INTERVAL, DEFAULT_FIREWORKS,
    FUSE_COLOR, PARTICLES_PER_FIREWORK,
};
pub use spirograph::{
    angle_step, validate_patterns, Pattern, Spirograph, DEFAULT_PATTERNS,
    DEFAULT_SEGMENTS_PER_FRAME, DEFAULT_STROKE_WIDTH, MAX_PATTERN_RADIUS,
};

use crate::display::Bitmap;
use crate::random::RandomSource;

/// What happened during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Animation still running
    Continue,
    /// A full cycle finished; the caller may change the background
    CycleComplete,
}

/// Trait for the face animations
pub trait Effect {
    /// Advance one frame and paint into the bitmap.
    /// Must not block; called once per host timer tick.
    fn frame(&mut self, bitmap: &mut Bitmap<'_>, rng: &mut dyn RandomSource) -> FrameEvent;

    /// Effect name for logs
    fn name(&self) -> &str;
}
