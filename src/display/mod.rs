mod bitmap;
mod darken;
#[cfg(feature = "simulator")]
mod window;

pub use bitmap::{Bitmap, BitmapError, Color8};
pub use darken::{age, DarkenSweep, SWEEP_PHASES};
#[cfg(feature = "simulator")]
pub use window::{Display, InputEvent, RenderTarget};

/// Reference panel size (pixels)
pub const DEFAULT_WIDTH: i32 = 144;
pub const DEFAULT_HEIGHT: i32 = 168;
