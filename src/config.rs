//! Face configuration
//!
//! Stored as JSON. Every field has a default, so a file only needs the
//! values it changes.

use crate::display::{Color8, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::effects::{
    validate_patterns, FireworkPhysics, Pattern, DEFAULT_DARKEN_INTERVAL, DEFAULT_FIREWORKS,
    DEFAULT_PATTERNS, DEFAULT_SEGMENTS_PER_FRAME, DEFAULT_STROKE_WIDTH, MAX_PATTERN_RADIUS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 50;

/// Background colors picked from when a spirograph loop completes
pub const DEFAULT_BACKGROUNDS: [Color8; 6] = [
    Color8::BLACK,
    Color8::BLUE,
    Color8::DUKE_BLUE,
    Color8::OXFORD_BLUE,
    Color8::DARK_GREEN,
    Color8::IMPERIAL_PURPLE,
];

/// Which animation the face runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Fireworks,
    Spirograph,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Fireworks => Self::Spirograph,
            Self::Spirograph => Self::Fireworks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Too narrow for the launch margins, or no rows
    InvalidDimensions { width: i32, height: i32 },
    NoFireworks,
    /// A firework physics value that would break the launch/burst/fade cycle
    InvalidPhysics { field: &'static str },
    ZeroLaunchDelay,
    ZeroDarkenInterval,
    NoPatterns,
    ZeroInnerRadius { index: usize },
    /// A radius or pen offset beyond `MAX_PATTERN_RADIUS`
    PatternOutOfRange { index: usize },
    ZeroSegmentBudget,
    ZeroStrokeWidth,
    NoBackgrounds,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => write!(
                f,
                "{}x{} is too small (width must exceed 20, height must be positive)",
                width, height
            ),
            Self::NoFireworks => write!(f, "firework_count must be at least 1"),
            Self::InvalidPhysics { field } => write!(f, "physics.{} is out of range", field),
            Self::ZeroLaunchDelay => write!(f, "launch_delay_max must be at least 1"),
            Self::ZeroDarkenInterval => write!(f, "darken_interval must be at least 1"),
            Self::NoPatterns => write!(f, "spirograph pattern table is empty"),
            Self::ZeroInnerRadius { index } => {
                write!(f, "spirograph pattern {} has a zero inner radius", index)
            },
            Self::PatternOutOfRange { index } => write!(
                f,
                "spirograph pattern {} has a radius or offset beyond {}",
                index, MAX_PATTERN_RADIUS
            ),
            Self::ZeroSegmentBudget => write!(f, "segments_per_frame must be at least 1"),
            Self::ZeroStrokeWidth => write!(f, "stroke_width must be at least 1"),
            Self::NoBackgrounds => write!(f, "background palette is empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    pub mode: Mode,
    pub width: i32,
    pub height: i32,
    pub firework_count: usize,
    pub physics: FireworkPhysics,
    /// Frames between trail darken sweeps
    pub darken_interval: u32,
    /// Host timer period
    pub frame_interval_ms: u64,
    pub segments_per_frame: usize,
    pub stroke_width: i32,
    pub patterns: Vec<Pattern>,
    pub backgrounds: Vec<Color8>,
    /// Fixed seed for reproducible runs; the host picks one when absent
    pub seed: Option<u64>,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Fireworks,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            firework_count: DEFAULT_FIREWORKS,
            physics: FireworkPhysics::default(),
            darken_interval: DEFAULT_DARKEN_INTERVAL,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            segments_per_frame: DEFAULT_SEGMENTS_PER_FRAME,
            stroke_width: DEFAULT_STROKE_WIDTH,
            patterns: DEFAULT_PATTERNS.to_vec(),
            backgrounds: DEFAULT_BACKGROUNDS.to_vec(),
            seed: None,
        }
    }
}

impl FaceConfig {
    /// Check every contract the face relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 20 || self.height <= 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.firework_count == 0 {
            return Err(ConfigError::NoFireworks);
        }
        self.physics.validate()?;
        if self.darken_interval == 0 {
            return Err(ConfigError::ZeroDarkenInterval);
        }
        validate_patterns(&self.patterns)?;
        if self.segments_per_frame == 0 {
            return Err(ConfigError::ZeroSegmentBudget);
        }
        if self.stroke_width <= 0 {
            return Err(ConfigError::ZeroStrokeWidth);
        }
        if self.backgrounds.is_empty() {
            return Err(ConfigError::NoBackgrounds);
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Bytes needed for an unpadded framebuffer
    pub fn buffer_len(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }
}
