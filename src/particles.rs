//! Fixed-point particles
//!
//! Point masses integrated once per frame with explicit Euler steps:
//! position moves by the current velocity, then forces adjust velocity for
//! the next frame.

use crate::fixed::Fixed;
use crate::geometry::Point;
use crate::random::RandomSource;

/// A single particle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Particle {
    pub x: Fixed,
    pub y: Fixed,
    pub x_speed: Fixed,
    pub y_speed: Fixed,
}

impl Particle {
    pub const fn new(x: Fixed, y: Fixed, x_speed: Fixed, y_speed: Fixed) -> Self {
        Self {
            x,
            y,
            x_speed,
            y_speed,
        }
    }

    /// Move by one frame of velocity
    #[inline]
    pub fn integrate(&mut self) {
        self.x += self.x_speed;
        self.y += self.y_speed;
    }

    /// Add a downward acceleration to vertical speed
    #[inline]
    pub fn accelerate(&mut self, gravity: Fixed) {
        self.y_speed += gravity;
    }

    /// Scale horizontal speed (air drag)
    #[inline]
    pub fn dampen(&mut self, factor: Fixed) {
        self.x_speed = self.x_speed * factor;
    }

    /// Nearest pixel
    #[inline]
    pub fn screen_position(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

/// Give every particle an independent random velocity in `[-speed, speed)`
/// on both axes. Positions are left alone.
pub fn burst<R: RandomSource + ?Sized>(particles: &mut [Particle], speed: Fixed, rng: &mut R) {
    for p in particles {
        p.x_speed = rng.fixed_symmetric(speed);
        p.y_speed = rng.fixed_symmetric(speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn test_integrate_then_accelerate() {
        let mut p = Particle::new(
            Fixed::from_int(10),
            Fixed::from_int(20),
            Fixed::from_f64(1.5),
            Fixed::from_f64(-2.5),
        );
        p.integrate();
        p.accelerate(Fixed::from_f64(0.08));
        assert_eq!(p.x, Fixed::from_f64(11.5));
        assert_eq!(p.y, Fixed::from_f64(17.5));
        assert_eq!(p.y_speed, Fixed::from_f64(-2.42));
    }

    #[test]
    fn test_dampen() {
        let mut p = Particle::new(Fixed::ZERO, Fixed::ZERO, Fixed::from_int(4), Fixed::ONE);
        p.dampen(Fixed::from_ratio(99, 100));
        assert_eq!(p.x_speed, Fixed::from_f64(3.96));
        assert_eq!(p.y_speed, Fixed::ONE);
    }

    #[test]
    fn test_screen_position_rounds() {
        let p = Particle::new(Fixed::from_f64(3.5), Fixed::from_f64(-0.4), Fixed::ZERO, Fixed::ZERO);
        assert_eq!(p.screen_position(), Point::new(4, 0));
    }

    #[test]
    fn test_burst_independent_velocities() {
        let mut particles = [Particle::default(); 3];
        let mut rng = ScriptedRandom::new([0, 7999, 4000, 4001, 1, 2]);
        burst(&mut particles, Fixed::from_int(4), &mut rng);
        assert_eq!(particles[0].x_speed, Fixed::from_int(-4));
        assert_eq!(particles[0].y_speed, Fixed::from_raw(3999));
        assert_eq!(particles[1].x_speed, Fixed::ZERO);
        assert_eq!(particles[1].y_speed, Fixed::from_raw(1));
        assert_eq!(particles[2].x_speed, Fixed::from_raw(-3999));
        assert_eq!(rng.draws(), 6);
    }
}
