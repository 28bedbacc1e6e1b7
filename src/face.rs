//! Watch face driver
//!
//! Owns both animations and the random source, and exposes the two entry
//! points a host calls: [`Face::initialize`] once, then
//! [`Face::advance_and_render`] (or [`Face::on_frame`]) on every timer tick.

use crate::config::{ConfigError, FaceConfig, Mode};
use crate::display::Bitmap;
use crate::effects::{Effect, FireworkShow, FrameEvent, Spirograph};
use crate::host::Host;
use crate::random::RandomSource;
use log::info;

pub struct Face<R: RandomSource> {
    config: FaceConfig,
    mode: Mode,
    rng: R,
    fireworks: FireworkShow,
    spirograph: Spirograph,
    /// Set after init, reset and mode changes; handled on the next frame
    entering: bool,
    frames: u64,
}

impl<R: RandomSource> Face<R> {
    /// Validate the configuration and launch every firework
    pub fn initialize(config: FaceConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let (fireworks, spirograph) = build_effects(&config, &mut rng)?;

        info!(
            "face initialized: {}x{}, {:?} mode, {} fireworks, {} patterns",
            config.width,
            config.height,
            config.mode,
            config.firework_count,
            config.patterns.len()
        );

        Ok(Self {
            mode: config.mode,
            config,
            rng,
            fireworks,
            spirograph,
            entering: true,
            frames: 0,
        })
    }

    /// One frame of the active animation, painted into `bitmap`
    pub fn advance_and_render(&mut self, bitmap: &mut Bitmap<'_>) -> FrameEvent {
        if std::mem::take(&mut self.entering) {
            match self.mode {
                // Let the trail sweep erode whatever is already on screen
                Mode::Fireworks => bitmap.soften_opaque(),
                Mode::Spirograph => bitmap.fill(self.config.backgrounds[0]),
            }
        }

        let event = match self.mode {
            Mode::Fireworks => self.fireworks.frame(bitmap, &mut self.rng),
            Mode::Spirograph => self.spirograph.frame(bitmap, &mut self.rng),
        };

        if event == FrameEvent::CycleComplete {
            let backgrounds = &self.config.backgrounds;
            let pick = self.rng.below(backgrounds.len() as u32) as usize;
            bitmap.fill(backgrounds[pick]);
        }

        self.frames += 1;
        event
    }

    /// Host timer callback: render, request a redraw, re-arm the timer
    pub fn on_frame(&mut self, bitmap: &mut Bitmap<'_>, host: &mut impl Host) -> FrameEvent {
        let event = self.advance_and_render(bitmap);
        host.mark_dirty();
        host.schedule_frame(self.config.frame_interval());
        event
    }

    /// Start over from the configuration, keeping the random stream
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        let (fireworks, spirograph) = build_effects(&self.config, &mut self.rng)?;
        self.fireworks = fireworks;
        self.spirograph = spirograph;
        self.entering = true;
        self.frames = 0;
        info!("face reset, {:?} mode", self.mode);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        info!("switching to {:?}", mode);
        self.mode = mode;
        self.entering = true;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &FaceConfig {
        &self.config
    }

    pub fn fireworks(&self) -> &FireworkShow {
        &self.fireworks
    }

    pub fn spirograph(&self) -> &Spirograph {
        &self.spirograph
    }

    /// Frames rendered since the last init or reset
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Name of the active animation
    pub fn effect_name(&self) -> &str {
        match self.mode {
            Mode::Fireworks => self.fireworks.name(),
            Mode::Spirograph => self.spirograph.name(),
        }
    }
}

fn build_effects<R: RandomSource + ?Sized>(
    config: &FaceConfig,
    rng: &mut R,
) -> Result<(FireworkShow, Spirograph), ConfigError> {
    let fireworks = FireworkShow::initialize(
        config.width,
        config.height,
        config.firework_count,
        config.physics,
        rng,
    )?
    .with_darken_interval(config.darken_interval);

    let spirograph = Spirograph::new(config.patterns.clone())?
        .with_segments_per_frame(config.segments_per_frame)
        .with_stroke_width(config.stroke_width);

    Ok((fireworks, spirograph))
}
