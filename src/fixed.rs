//! Fixed-point arithmetic
//!
//! Real values are stored as an `i32` count of thousandths (three decimal
//! digits of fraction). Every operation saturates at [`Fixed::MIN`] /
//! [`Fixed::MAX`] instead of wrapping. Products and quotients are computed in
//! `i64` and truncated toward zero: multiplication descales after the
//! product, division rescales the dividend before dividing, so small products
//! such as `0.01 * 0.5` keep their value instead of collapsing to zero.
//!
//! Trig and `exp` work internally in millionths and round back to
//! thousandths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Raw units per 1.0
pub const SCALE: i32 = 1000;

// Internal precision for trig/exp (millionths)
const MICRO: i64 = 1_000_000;
const PI_MICRO: i64 = 3_141_593;
const HALF_PI_MICRO: i64 = 1_570_796;
const TWO_PI_MICRO: i64 = 6_283_185;
const E_MICRO: i64 = 2_718_282;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "f64", into = "f64")]
pub struct Fixed(i32);

/// Narrow an `i64` raw value, clamping to the representable range
#[inline]
const fn saturate(raw: i64) -> Fixed {
    if raw > i32::MAX as i64 {
        Fixed::MAX
    } else if raw < i32::MIN as i64 {
        Fixed::MIN
    } else {
        Fixed(raw as i32)
    }
}

/// Convert millionths back to thousandths, rounding half away from zero
#[inline]
const fn from_micro(micro: i64) -> Fixed {
    let rounded = if micro >= 0 {
        (micro + 500) / 1000
    } else {
        (micro - 500) / 1000
    };
    saturate(rounded)
}

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(SCALE);
    pub const TWO: Fixed = Fixed(2 * SCALE);
    pub const PI: Fixed = Fixed(3142);
    pub const HALF_PI: Fixed = Fixed(1571);
    pub const TWO_PI: Fixed = Fixed(6283);
    pub const E: Fixed = Fixed(2718);
    pub const MIN: Fixed = Fixed(i32::MIN);
    pub const MAX: Fixed = Fixed(i32::MAX);

    /// Wrap a raw thousandths count
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whole number, saturating outside roughly +/-2.1 million
    #[inline]
    pub const fn from_int(n: i32) -> Self {
        saturate(n as i64 * SCALE as i64)
    }

    /// Ratio of two integers, e.g. `from_ratio(99, 100)` for 0.99
    ///
    /// `den` must be non-zero.
    pub fn from_ratio(num: i32, den: i32) -> Self {
        Self::from_int(num) / Self::from_int(den)
    }

    /// Integer part, rounded toward negative infinity
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0.div_euclid(SCALE)
    }

    /// Nearest integer, halves rounded away from zero
    #[inline]
    pub const fn round(self) -> i32 {
        let raw = self.0 as i64;
        let rounded = if raw >= 0 {
            (raw + (SCALE as i64 / 2)) / SCALE as i64
        } else {
            (raw - (SCALE as i64 / 2)) / SCALE as i64
        };
        rounded as i32
    }

    /// Conversion for configuration files and tests; not used by the simulation
    pub fn from_f64(value: f64) -> Self {
        // `as` saturates for out-of-range floats and maps NaN to zero
        saturate((value * SCALE as f64).round() as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Quotient, or `None` when `rhs` is zero
    #[inline]
    pub const fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.0 == 0 {
            return None;
        }
        Some(saturate(self.0 as i64 * SCALE as i64 / rhs.0 as i64))
    }

    /// Sine of an angle in radians
    pub fn sin(self) -> Self {
        from_micro(sin_micro(self.0 as i64 * 1000))
    }

    /// Cosine of an angle in radians
    pub fn cos(self) -> Self {
        from_micro(sin_micro(self.0 as i64 * 1000 + HALF_PI_MICRO))
    }

    /// `e` raised to this power, saturating at [`Fixed::MAX`]
    pub fn exp(self) -> Self {
        if self.0 < 0 {
            let positive = self.saturating_neg_value().exp();
            if positive == Self::MAX {
                return Self::ZERO;
            }
            return Self::ONE.checked_div(positive).unwrap_or(Self::ZERO);
        }

        let whole = self.0 / SCALE;
        let frac = (self.0 % SCALE) as i64 * 1000;

        // Saturation threshold in millionths
        let limit = i32::MAX as i64 * 1000;
        let mut result = MICRO;
        for _ in 0..whole {
            result = result * E_MICRO / MICRO;
            if result > limit {
                return Self::MAX;
            }
        }

        // Taylor series for the fractional part, frac < 1
        let mut term = MICRO;
        let mut sum = MICRO;
        for k in 1..=10 {
            term = term * frac / MICRO / k;
            if term == 0 {
                break;
            }
            sum += term;
        }

        from_micro(result * sum / MICRO)
    }

    #[inline]
    const fn saturating_neg_value(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

/// Sine with angle and result in millionths
fn sin_micro(angle: i64) -> i64 {
    let mut x = angle.rem_euclid(TWO_PI_MICRO);
    let negate = x >= PI_MICRO;
    if negate {
        x -= PI_MICRO;
    }
    if x > HALF_PI_MICRO {
        x = PI_MICRO - x;
    }

    // x * (1 - x²/6 * (1 - x²/20 * (1 - x²/42 * (1 - x²/72)))) on [0, π/2]
    let x2 = x * x / MICRO;
    let mut t = MICRO - x2 / 72;
    t = MICRO - x2 * t / MICRO / 42;
    t = MICRO - x2 * t / MICRO / 20;
    t = MICRO - x2 * t / MICRO / 6;
    let s = x * t / MICRO;

    if negate {
        -s
    } else {
        s
    }
}

impl Add for Fixed {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Fixed {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.saturating_neg_value()
    }
}

impl Mul for Fixed {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        saturate(self.0 as i64 * rhs.0 as i64 / SCALE as i64)
    }
}

impl Div for Fixed {
    type Output = Self;

    /// # Panics
    /// Panics when `rhs` is zero. Use [`Fixed::checked_div`] when the divisor
    /// is not known to be non-zero.
    #[inline]
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(rhs) {
            Some(quotient) => quotient,
            None => panic!("fixed-point division by zero"),
        }
    }
}

impl From<i32> for Fixed {
    fn from(n: i32) -> Self {
        Self::from_int(n)
    }
}

impl From<f64> for Fixed {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<Fixed> for f64 {
    fn from(value: Fixed) -> Self {
        value.to_f64()
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.0 as i64;
        let sign = if raw < 0 { "-" } else { "" };
        let magnitude = raw.abs();
        write!(
            f,
            "{}{}.{:03}",
            sign,
            magnitude / SCALE as i64,
            magnitude % SCALE as i64
        )
    }
}
