//! Fixed-point fireworks and spirograph watch face
//!
//! The face paints into a caller-owned 8-bit ARGB framebuffer
//! ([`display::Bitmap`]) once per host timer tick. All simulation runs in
//! [`fixed::Fixed`] arithmetic; randomness and timing are injected through
//! [`random::RandomSource`] and [`host::Host`].

pub mod config;
pub mod display;
pub mod effects;
pub mod face;
pub mod fixed;
pub mod geometry;
pub mod host;
pub mod particles;
pub mod random;

pub use config::{ConfigError, FaceConfig, Mode};
pub use display::{Bitmap, BitmapError, Color8};
pub use face::Face;
pub use fixed::Fixed;
pub use host::{FrameClock, Host};
pub use random::{RandomSource, ScriptedRandom};
