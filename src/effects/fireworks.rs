use super::{Effect, FrameEvent};
use crate::config::ConfigError;
use crate::display::{Bitmap, Color8, DarkenSweep};
use crate::fixed::Fixed;
use crate::particles::{burst, Particle};
use crate::random::RandomSource;
use log::trace;
use serde::{Deserialize, Serialize};

pub const PARTICLES_PER_FIREWORK: usize = 32;
pub const DEFAULT_FIREWORKS: usize = 6;
/// Frames between darken sweeps
pub const DEFAULT_DARKEN_INTERVAL: u32 = 5;

/// Launch columns stay this far from either screen edge; shells start this
/// far below the bottom edge
const LAUNCH_MARGIN: i32 = 10;
const COLOR_FLOOR: u8 = 85;
const COLOR_RANGE: u32 = 170;
/// Still-climbing shells are drawn as a lit fuse
pub const FUSE_COLOR: Color8 = Color8::YELLOW;

/// Tunables for the shell simulation, all per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworkPhysics {
    /// Added to vertical speed every launched frame
    pub gravity: Fixed,
    /// Vertical launch speed before the random boost (negative is up)
    pub launch_speed: Fixed,
    /// Extra upward speed drawn from `[0, launch_boost)`
    pub launch_boost: Fixed,
    /// Horizontal launch speed drawn from `[-drift, drift)`
    pub drift: Fixed,
    /// Horizontal speed multiplier after the explosion
    pub drag: Fixed,
    /// Alpha lost per exploded frame
    pub fade_step: Fixed,
    /// Explosion speed drawn from `[-burst_speed, burst_speed)` on each axis
    pub burst_speed: Fixed,
    /// Launch delay drawn from `[0, launch_delay_max)` frames
    pub launch_delay_max: u32,
}

impl Default for FireworkPhysics {
    fn default() -> Self {
        Self {
            gravity: Fixed::from_raw(80),
            launch_speed: Fixed::from_raw(-2500),
            launch_boost: Fixed::from_int(3),
            drift: Fixed::from_int(2),
            drag: Fixed::from_raw(990),
            fade_step: Fixed::from_raw(10),
            burst_speed: Fixed::from_int(4),
            launch_delay_max: 400,
        }
    }
}

impl FireworkPhysics {
    /// Reject values that would stop a shell from ever peaking, fading out
    /// or staying within `[0, 1]` alpha
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str| -> Result<(), ConfigError> {
            Err(ConfigError::InvalidPhysics { field })
        };
        if self.gravity <= Fixed::ZERO {
            return invalid("gravity");
        }
        if self.launch_speed >= Fixed::ZERO {
            return invalid("launch_speed");
        }
        if self.launch_boost.is_negative() {
            return invalid("launch_boost");
        }
        if self.drift.is_negative() {
            return invalid("drift");
        }
        if self.drag.is_negative() || self.drag > Fixed::ONE {
            return invalid("drag");
        }
        if self.fade_step <= Fixed::ZERO {
            return invalid("fade_step");
        }
        if self.burst_speed <= Fixed::ZERO {
            return invalid("burst_speed");
        }
        if self.launch_delay_max == 0 {
            return Err(ConfigError::ZeroLaunchDelay);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting on the launch countdown
    Pending,
    /// Climbing, all particles together
    Ascending,
    /// Burst and fading
    Exploded,
}

/// One shell: a fixed set of particles sharing color, alpha and lifecycle
#[derive(Debug, Clone)]
pub struct Firework {
    particles: [Particle; PARTICLES_PER_FIREWORK],
    frames_until_launch: i32,
    has_exploded: bool,
    color: (u8, u8, u8),
    alpha: Fixed,
}

impl Firework {
    const fn idle() -> Self {
        Self {
            particles: [Particle::new(Fixed::ZERO, Fixed::ZERO, Fixed::ZERO, Fixed::ZERO);
                PARTICLES_PER_FIREWORK],
            frames_until_launch: 0,
            has_exploded: false,
            color: (0, 0, 0),
            alpha: Fixed::ZERO,
        }
    }

    /// Fresh launch below the screen with new random timing, speed and color.
    /// Random draws happen in a fixed order: column, horizontal speed,
    /// vertical boost, red, green, blue, launch delay.
    /// A screen no wider than the launch margins launches from column 10.
    pub fn spawn<R: RandomSource + ?Sized>(
        &mut self,
        width: i32,
        height: i32,
        physics: &FireworkPhysics,
        rng: &mut R,
    ) {
        let span = (width - 2 * LAUNCH_MARGIN).max(1);
        let column = LAUNCH_MARGIN + rng.below(span as u32) as i32;
        let x = Fixed::from_int(column);
        let y = Fixed::from_int(height + LAUNCH_MARGIN);
        let x_speed = rng.fixed_symmetric(physics.drift);
        let y_speed = physics.launch_speed - rng.fixed_below(physics.launch_boost);

        self.particles = [Particle::new(x, y, x_speed, y_speed); PARTICLES_PER_FIREWORK];

        let mut channel = || COLOR_FLOOR + rng.below(COLOR_RANGE) as u8;
        self.color = (channel(), channel(), channel());
        self.alpha = Fixed::ONE;
        self.frames_until_launch = rng.below(physics.launch_delay_max) as i32;
        self.has_exploded = false;
    }

    /// One frame of the shell's state machine
    pub fn advance<R: RandomSource + ?Sized>(
        &mut self,
        width: i32,
        height: i32,
        physics: &FireworkPhysics,
        rng: &mut R,
    ) {
        match self.phase() {
            Phase::Pending => self.frames_until_launch -= 1,
            Phase::Ascending => {
                for p in &mut self.particles {
                    p.integrate();
                    p.accelerate(physics.gravity);
                }

                // Top of the arc: particle 0 speaks for the whole shell
                if !self.particles[0].y_speed.is_negative() {
                    burst(&mut self.particles, physics.burst_speed, rng);
                    self.has_exploded = true;
                    trace!(
                        "firework burst at ({}, {})",
                        self.particles[0].x,
                        self.particles[0].y
                    );
                }
            },
            Phase::Exploded => {
                for p in &mut self.particles {
                    p.dampen(physics.drag);
                    p.integrate();
                    p.accelerate(physics.gravity);
                }

                self.alpha = (self.alpha - physics.fade_step).max(Fixed::ZERO);
                if self.alpha == Fixed::ZERO {
                    self.spawn(width, height, physics, rng);
                    trace!("firework faded, relaunching in {} frames", self.frames_until_launch);
                }
            },
        }
    }

    pub fn phase(&self) -> Phase {
        if self.has_exploded {
            Phase::Exploded
        } else if self.frames_until_launch > 0 {
            Phase::Pending
        } else {
            Phase::Ascending
        }
    }

    /// Stored color scaled by alpha once exploded, the fuse color before
    pub fn display_color(&self) -> Color8 {
        if !self.has_exploded {
            return FUSE_COLOR;
        }
        let fade = |c: u8| (Fixed::from_int(c as i32) * self.alpha).to_int().clamp(0, 255) as u8;
        Color8::from_rgb(fade(self.color.0), fade(self.color.1), fade(self.color.2))
    }

    /// Paint a 2x2 marker per particle
    pub fn render(&self, bitmap: &mut Bitmap<'_>) {
        let color = self.display_color();
        for p in &self.particles {
            bitmap.draw_marker(p.screen_position(), color);
        }
    }

    pub fn particles(&self) -> &[Particle; PARTICLES_PER_FIREWORK] {
        &self.particles
    }

    pub fn frames_until_launch(&self) -> i32 {
        self.frames_until_launch
    }

    pub fn has_exploded(&self) -> bool {
        self.has_exploded
    }

    pub fn color(&self) -> (u8, u8, u8) {
        self.color
    }

    pub fn alpha(&self) -> Fixed {
        self.alpha
    }
}

/// The whole display: a fixed pool of shells plus the trail decay
pub struct FireworkShow {
    fireworks: Vec<Firework>,
    width: i32,
    height: i32,
    physics: FireworkPhysics,
    darken: DarkenSweep,
    darken_interval: u32,
    darken_count: u32,
}

impl FireworkShow {
    /// Build the pool and launch every shell. The pool never grows or
    /// shrinks afterwards.
    pub fn initialize<R: RandomSource + ?Sized>(
        width: i32,
        height: i32,
        count: usize,
        physics: FireworkPhysics,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        if width <= 2 * LAUNCH_MARGIN || height <= 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        if count == 0 {
            return Err(ConfigError::NoFireworks);
        }
        physics.validate()?;

        let mut fireworks = vec![Firework::idle(); count];
        for firework in &mut fireworks {
            firework.spawn(width, height, &physics, rng);
        }

        Ok(Self {
            fireworks,
            width,
            height,
            physics,
            darken: DarkenSweep::new(),
            darken_interval: DEFAULT_DARKEN_INTERVAL,
            darken_count: 0,
        })
    }

    /// Sweep trails every `interval` frames (minimum 1)
    pub fn with_darken_interval(mut self, interval: u32) -> Self {
        self.darken_interval = interval.max(1);
        self
    }

    /// Advance every shell by one frame
    pub fn advance<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        for firework in &mut self.fireworks {
            firework.advance(self.width, self.height, &self.physics, rng);
        }
    }

    /// Paint every shell at its current position
    pub fn render(&self, bitmap: &mut Bitmap<'_>) {
        for firework in &self.fireworks {
            firework.render(bitmap);
        }
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn physics(&self) -> &FireworkPhysics {
        &self.physics
    }

    pub fn darken_sweep(&self) -> &DarkenSweep {
        &self.darken
    }
}

impl Effect for FireworkShow {
    fn frame(&mut self, bitmap: &mut Bitmap<'_>, rng: &mut dyn RandomSource) -> FrameEvent {
        if self.darken_count >= self.darken_interval - 1 {
            self.darken_count = 0;
            self.darken.apply(bitmap);
        } else {
            self.darken_count += 1;
        }

        self.render(bitmap);
        self.advance(rng);
        FrameEvent::Continue
    }

    fn name(&self) -> &str {
        "Fireworks"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const W: i32 = 144;
    const H: i32 = 168;

    /// Column 10 + 62, no drift, no boost, colors 85 + (10, 20, 30), no delay
    fn launch_script() -> Vec<u32> {
        vec![62, 2000, 0, 10, 20, 30, 0]
    }

    #[test]
    fn test_spawn_state() {
        let physics = FireworkPhysics::default();
        let mut rng = ScriptedRandom::new([62, 2000, 1500, 10, 20, 30, 123]);
        let mut fw = Firework::idle();
        fw.spawn(W, H, &physics, &mut rng);

        assert_eq!(rng.draws(), 7);
        assert_eq!(fw.color(), (95, 105, 115));
        assert_eq!(fw.alpha(), Fixed::ONE);
        assert_eq!(fw.frames_until_launch(), 123);
        assert!(!fw.has_exploded());
        assert_eq!(fw.phase(), Phase::Pending);
        for p in fw.particles() {
            assert_eq!(p.x, Fixed::from_int(72));
            assert_eq!(p.y, Fixed::from_int(H + 10));
            assert_eq!(p.x_speed, Fixed::ZERO);
            assert_eq!(p.y_speed, Fixed::from_int(-4));
        }
    }

    #[test]
    fn test_spawn_ranges_hold_for_seeded_source() {
        let physics = FireworkPhysics::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let mut fw = Firework::idle();
        for _ in 0..500 {
            fw.spawn(W, H, &physics, &mut rng);
            let p = fw.particles()[0];
            assert!(p.x >= Fixed::from_int(10) && p.x < Fixed::from_int(W - 10));
            assert!(p.x_speed >= Fixed::from_int(-2) && p.x_speed < Fixed::from_int(2));
            assert!(p.y_speed <= Fixed::from_f64(-2.5) && p.y_speed > Fixed::from_f64(-5.5));
            let (r, g, b) = fw.color();
            for c in [r, g, b] {
                assert!((85..255).contains(&c));
            }
            assert!((0..400).contains(&fw.frames_until_launch()));
        }
    }

    #[test]
    fn test_pending_does_not_move() {
        let physics = FireworkPhysics::default();
        let mut rng = ScriptedRandom::new([5, 1000, 700, 0, 0, 0, 3]);
        let mut fw = Firework::idle();
        fw.spawn(W, H, &physics, &mut rng);
        let start = *fw.particles();

        for remaining in (0..3).rev() {
            fw.advance(W, H, &physics, &mut rng);
            assert_eq!(fw.particles(), &start);
            assert_eq!(fw.frames_until_launch(), remaining);
        }
        assert_eq!(fw.phase(), Phase::Ascending);
    }

    #[test]
    fn test_launched_particles_move_by_stored_velocity() {
        let physics = FireworkPhysics::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut fw = Firework::idle();
        fw.spawn(W, H, &physics, &mut rng);
        fw.frames_until_launch = 0;

        for _ in 0..400 {
            let before = *fw.particles();
            let phase = fw.phase();
            fw.advance(W, H, &physics, &mut rng);
            if fw.alpha() == Fixed::ONE && phase == Phase::Exploded {
                // Respawned this frame
                continue;
            }
            if phase == Phase::Pending {
                assert_eq!(fw.particles(), &before);
                continue;
            }
            for (old, new) in before.iter().zip(fw.particles()) {
                let x_speed = match phase {
                    Phase::Exploded => old.x_speed * physics.drag,
                    _ => old.x_speed,
                };
                assert_eq!(new.x, old.x + x_speed);
                assert_eq!(new.y, old.y + old.y_speed);
            }
        }
    }

    #[test]
    fn test_explodes_after_ascent_time() {
        let physics = FireworkPhysics::default();
        let mut rng = ScriptedRandom::new(launch_script());
        let mut show = FireworkShow::initialize(W, H, 1, physics, &mut rng).unwrap();
        assert_eq!(show.fireworks()[0].phase(), Phase::Ascending);

        // -2.5 + n * 0.08 >= 0 first holds at n = 32
        let ascent = 32;
        let mut flips = 0;
        let mut exploded_at = None;
        let mut was_exploded = false;
        for frame in 1..=120 {
            show.advance(&mut rng);
            let exploded = show.fireworks()[0].has_exploded();
            if exploded && !was_exploded {
                flips += 1;
                exploded_at.get_or_insert(frame);
            }
            was_exploded = exploded;
        }
        assert_eq!(exploded_at, Some(ascent));
        assert_eq!(flips, 1);
    }

    #[test]
    fn test_alpha_fades_monotonically_then_resets() {
        let physics = FireworkPhysics::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut fw = Firework::idle();
        fw.spawn(W, H, &physics, &mut rng);
        fw.frames_until_launch = 0;

        let mut respawns = 0;
        let mut last_alpha = fw.alpha();
        for _ in 0..2000 {
            let was_exploded = fw.has_exploded();
            fw.advance(W, H, &physics, &mut rng);
            if was_exploded {
                if fw.has_exploded() {
                    assert!(fw.alpha() <= last_alpha);
                    assert!(fw.alpha() > Fixed::ZERO);
                } else {
                    assert_eq!(fw.alpha(), Fixed::ONE);
                    respawns += 1;
                }
            }
            last_alpha = fw.alpha();
        }
        assert!(respawns >= 2);
    }

    #[test]
    fn test_exploded_lifetime_is_one_hundred_frames() {
        let physics = FireworkPhysics::default();
        let mut rng = ScriptedRandom::new(launch_script());
        let mut fw = Firework::idle();
        fw.spawn(W, H, &physics, &mut rng);
        while !fw.has_exploded() {
            fw.advance(W, H, &physics, &mut rng);
        }
        let mut frames = 0;
        while fw.has_exploded() {
            fw.advance(W, H, &physics, &mut rng);
            frames += 1;
        }
        assert_eq!(frames, 100);
    }

    #[test]
    fn test_display_color() {
        let physics = FireworkPhysics::default();
        let mut rng = ScriptedRandom::new([0, 0, 0, 170, 85, 0, 0]);
        let mut fw = Firework::idle();
        fw.spawn(W, H, &physics, &mut rng);
        assert_eq!(fw.color(), (85, 170, 85));
        assert_eq!(fw.display_color(), FUSE_COLOR);

        fw.has_exploded = true;
        assert_eq!(fw.display_color(), Color8::from_rgb(85, 170, 85));
        fw.alpha = Fixed::from_ratio(1, 2);
        // 42, 85, 42
        assert_eq!(fw.display_color(), Color8::from_channels(3, 0, 1, 0));
        fw.alpha = Fixed::ZERO;
        assert_eq!(fw.display_color(), Color8::BLACK);
    }

    #[test]
    fn test_initialize_rejects_bad_setup() {
        let physics = FireworkPhysics::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            FireworkShow::initialize(20, 100, 4, physics, &mut rng).err(),
            Some(ConfigError::InvalidDimensions {
                width: 20,
                height: 100
            })
        );
        assert_eq!(
            FireworkShow::initialize(W, 0, 4, physics, &mut rng).err(),
            Some(ConfigError::InvalidDimensions { width: W, height: 0 })
        );
        assert_eq!(
            FireworkShow::initialize(W, H, 0, physics, &mut rng).err(),
            Some(ConfigError::NoFireworks)
        );
        let no_delay = FireworkPhysics {
            launch_delay_max: 0,
            ..physics
        };
        assert_eq!(
            FireworkShow::initialize(W, H, 4, no_delay, &mut rng).err(),
            Some(ConfigError::ZeroLaunchDelay)
        );
    }

    #[test]
    fn test_initialize_rejects_bad_physics() {
        let physics = FireworkPhysics::default();
        let cases = [
            (
                FireworkPhysics {
                    fade_step: Fixed::from_f64(-0.01),
                    ..physics
                },
                "fade_step",
            ),
            (
                FireworkPhysics {
                    fade_step: Fixed::ZERO,
                    ..physics
                },
                "fade_step",
            ),
            (
                FireworkPhysics {
                    gravity: Fixed::ZERO,
                    ..physics
                },
                "gravity",
            ),
            (
                FireworkPhysics {
                    launch_speed: Fixed::ONE,
                    ..physics
                },
                "launch_speed",
            ),
            (
                FireworkPhysics {
                    drift: Fixed::from_int(-1),
                    ..physics
                },
                "drift",
            ),
            (
                FireworkPhysics {
                    drag: Fixed::from_f64(1.5),
                    ..physics
                },
                "drag",
            ),
            (
                FireworkPhysics {
                    burst_speed: Fixed::ZERO,
                    ..physics
                },
                "burst_speed",
            ),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        for (bad, field) in cases {
            assert_eq!(
                FireworkShow::initialize(W, H, 4, bad, &mut rng).err(),
                Some(ConfigError::InvalidPhysics { field })
            );
        }
    }

    #[test]
    fn test_accepted_physics_keep_alpha_bounded() {
        // Slowest accepted fade and lightest accepted gravity still cycle
        let physics = FireworkPhysics {
            gravity: Fixed::from_raw(1),
            fade_step: Fixed::from_raw(1),
            drag: Fixed::ONE,
            ..FireworkPhysics::default()
        };
        assert_eq!(physics.validate(), Ok(()));
        let mut rng = StdRng::seed_from_u64(21);
        let mut fw = Firework::idle();
        fw.spawn(W, H, &physics, &mut rng);
        fw.frames_until_launch = 0;

        let mut exploded = false;
        for _ in 0..6000 {
            fw.advance(W, H, &physics, &mut rng);
            assert!(fw.alpha() >= Fixed::ZERO && fw.alpha() <= Fixed::ONE);
            exploded |= fw.has_exploded();
        }
        assert!(exploded);
    }

    #[test]
    fn test_spawn_on_narrow_screen_uses_first_column() {
        let physics = FireworkPhysics::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut fw = Firework::idle();
        for width in [0, 10, 20, 21] {
            fw.spawn(width, H, &physics, &mut rng);
            assert_eq!(fw.particles()[0].x, Fixed::from_int(LAUNCH_MARGIN));
        }
    }

    #[test]
    fn test_reinitialize_starts_fresh() {
        let physics = FireworkPhysics::default();
        let mut rng = StdRng::seed_from_u64(8);
        let mut show = FireworkShow::initialize(W, H, 4, physics, &mut rng).unwrap();
        for _ in 0..300 {
            show.advance(&mut rng);
        }
        let mut replay = StdRng::seed_from_u64(8);
        let fresh = FireworkShow::initialize(W, H, 4, physics, &mut replay).unwrap();
        assert_eq!(fresh.fireworks().len(), 4);
        for fw in fresh.fireworks() {
            assert_eq!(fw.alpha(), Fixed::ONE);
            assert!(!fw.has_exploded());
            assert_eq!(fw.particles()[0].y, Fixed::from_int(H + 10));
        }
    }

    #[test]
    fn test_frame_darkens_every_interval() {
        let physics = FireworkPhysics::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut show = FireworkShow::initialize(W, H, 2, physics, &mut rng)
            .unwrap()
            .with_darken_interval(5);
        let mut data = vec![Color8::BLACK.argb(); (W * H) as usize];
        let mut bitmap = Bitmap::with_size(&mut data, W, H).unwrap();

        let mut phases = Vec::new();
        for _ in 0..10 {
            show.frame(&mut bitmap, &mut rng);
            phases.push(show.darken_sweep().phase());
        }
        assert_eq!(phases, vec![0, 0, 0, 0, 1, 1, 1, 1, 1, 2]);
    }
}
