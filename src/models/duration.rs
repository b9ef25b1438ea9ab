//! Rational note durations
//!
//! A duration is a power-of-two base value, a number of augmentation dots
//! and an exact scaling factor (tuplets, grace groups). Nothing here ever
//! rounds: lengths and factors are `Rational32` throughout.

use num_rational::{Rational32, Rational64};

/// Exact rational used for lengths, start times and scaling factors
pub type Rational = Rational32;

/// Largest power of two used as a numerator or denominator term
const MAX_SHIFT: u32 = 30;

/// `a * b`, or `None` when the product does not fit a `Rational`
pub fn checked_product(a: Rational, b: Rational) -> Option<Rational> {
    narrow(Rational64::new(
        i64::from(*a.numer()) * i64::from(*b.numer()),
        i64::from(*a.denom()) * i64::from(*b.denom()),
    ))
}

/// `a / b`, or `None` when `b` is zero or the quotient does not fit
pub fn checked_quotient(a: Rational, b: Rational) -> Option<Rational> {
    if *b.numer() == 0 {
        return None;
    }
    narrow(Rational64::new(
        i64::from(*a.numer()) * i64::from(*b.denom()),
        i64::from(*a.denom()) * i64::from(*b.numer()),
    ))
}

fn narrow(wide: Rational64) -> Option<Rational> {
    let numer = i32::try_from(*wide.numer()).ok()?;
    let denom = i32::try_from(*wide.denom()).ok()?;
    Some(Rational::new_raw(numer, denom))
}

/// Musical duration representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    /// Logarithmic duration (0=whole, 1=half, 2=quarter, ...; -1=breve, -2=longa)
    pub log: i32,

    /// Number of augmentation dots
    pub dots: u32,

    /// Scaling factor (e.g., 2/3 for a triplet member)
    pub factor: Rational,
}

impl Default for Duration {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Duration {
    /// Create an unscaled duration
    pub fn new(log: i32, dots: u32) -> Self {
        Self {
            log,
            dots,
            factor: Rational::from_integer(1),
        }
    }

    /// Same duration with a different scaling factor
    pub fn with_factor(mut self, factor: Rational) -> Self {
        self.factor = factor;
        self
    }

    /// Multiplier contributed by `dots` augmentation dots: (2^(d+1) - 1) / 2^d
    ///
    /// Past 29 dots the multiplier is indistinguishable from its limit 2.
    pub fn dot_multiplier(dots: u32) -> Rational {
        if dots >= MAX_SHIFT {
            log::warn!("{} augmentation dots out of range, using the limit 2", dots);
            return Rational::from_integer(2);
        }
        Rational::new((1 << (dots + 1)) - 1, 1 << dots)
    }

    /// Length of the undotted, unscaled base value as a fraction of a whole note
    pub fn base_length(&self) -> Rational {
        let mut shift = self.log.unsigned_abs();
        if shift > MAX_SHIFT {
            log::warn!("duration log {} out of range, clamped to {}", self.log, MAX_SHIFT);
            shift = MAX_SHIFT;
        }
        let magnitude = 1 << shift;
        if self.log < 0 {
            Rational::from_integer(magnitude)
        } else {
            Rational::new(1, magnitude)
        }
    }

    /// Sounding length as a fraction of a whole note
    ///
    /// A length that does not fit a `Rational` counts as zero.
    pub fn length(&self) -> Rational {
        checked_product(self.base_length(), Self::dot_multiplier(self.dots))
            .and_then(|length| checked_product(length, self.factor))
            .unwrap_or_else(|| {
                log::warn!("length of {:?} overflows, counted as zero", self);
                Rational::from_integer(0)
            })
    }

    /// LilyPond duration token using the duration's own factor
    pub fn ly_expression(&self) -> String {
        self.ly_expression_with(self.factor)
    }

    /// LilyPond duration token using an explicit factor
    ///
    /// The printer passes `factor / context_factor` here so that written
    /// values inside a tuplet scope lose the scope's ratio.
    pub fn ly_expression_with(&self, factor: Rational) -> String {
        let mut token = if self.log < 0 {
            match self.log {
                -1 => "\\breve".to_string(),
                -2 => "\\longa".to_string(),
                -3 => "\\maxima".to_string(),
                _ => "1".to_string(),
            }
        } else {
            match 1u128.checked_shl(self.log.unsigned_abs()) {
                Some(value) => value.to_string(),
                None => {
                    log::warn!("duration log {} has no LilyPond token, printed as 1", self.log);
                    "1".to_string()
                }
            }
        };

        token.push_str(&".".repeat(self.dots as usize));

        if factor != Rational::from_integer(1) {
            if *factor.denom() != 1 {
                token.push_str(&format!("*{}/{}", factor.numer(), factor.denom()));
            } else {
                token.push_str(&format!("*{}", factor.numer()));
            }
        }

        token
    }
}
