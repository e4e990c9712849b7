use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use num_cmp::NumCmp;

/// A JSON number.
///
/// Integers are kept exact; everything else is an `f64`. Comparison between variants is
/// mathematical, so `1`, `1.0` and `-0.0 + 1` are all equal.
#[derive(Debug, Copy, Clone)]
pub enum Number {
    PositiveInteger(u64),
    NegativeInteger(i64),
    Float(f64),
}

macro_rules! dispatch {
    ($lhs:expr, $rhs:expr, $method:ident) => {
        match ($lhs, $rhs) {
            (Number::PositiveInteger(a), Number::PositiveInteger(b)) => NumCmp::$method(a, b),
            (Number::PositiveInteger(a), Number::NegativeInteger(b)) => NumCmp::$method(a, b),
            (Number::PositiveInteger(a), Number::Float(b)) => NumCmp::$method(a, b),
            (Number::NegativeInteger(a), Number::PositiveInteger(b)) => NumCmp::$method(a, b),
            (Number::NegativeInteger(a), Number::NegativeInteger(b)) => NumCmp::$method(a, b),
            (Number::NegativeInteger(a), Number::Float(b)) => NumCmp::$method(a, b),
            (Number::Float(a), Number::PositiveInteger(b)) => NumCmp::$method(a, b),
            (Number::Float(a), Number::NegativeInteger(b)) => NumCmp::$method(a, b),
            (Number::Float(a), Number::Float(b)) => NumCmp::$method(a, b),
        }
    };
}

impl Number {
    /// Build a number from a float, normalizing integral values into integer variants.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_f64(value: f64) -> Number {
        if value.fract() == 0.0 && value.is_finite() {
            if value >= 0.0 && value < u64::MAX as f64 {
                return Number::PositiveInteger(value as u64);
            }
            if value < 0.0 && value >= i64::MIN as f64 {
                return Number::NegativeInteger(value as i64);
            }
        }
        Number::Float(value)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::PositiveInteger(u) => u as f64,
            Number::NegativeInteger(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::PositiveInteger(u) => Some(u),
            Number::NegativeInteger(i) => u64::try_from(i).ok(),
            Number::Float(f) => {
                if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 {
                    Some(f as u64)
                } else {
                    None
                }
            }
        }
    }

    /// Whether the number has no fractional part. `1.0` is an integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        match *self {
            Number::PositiveInteger(_) | Number::NegativeInteger(_) => true,
            Number::Float(f) => f.is_finite() && f.fract() == 0.0,
        }
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        match *self {
            Number::PositiveInteger(_) => false,
            Number::NegativeInteger(i) => i < 0,
            Number::Float(f) => f < 0.0,
        }
    }

    #[must_use]
    pub fn num_cmp(&self, other: &Number) -> Option<Ordering> {
        dispatch!(*self, *other, num_cmp)
    }

    #[must_use]
    pub fn lt(&self, other: &Number) -> bool {
        dispatch!(*self, *other, num_lt)
    }

    #[must_use]
    pub fn le(&self, other: &Number) -> bool {
        dispatch!(*self, *other, num_le)
    }

    #[must_use]
    pub fn gt(&self, other: &Number) -> bool {
        dispatch!(*self, *other, num_gt)
    }

    #[must_use]
    pub fn ge(&self, other: &Number) -> bool {
        dispatch!(*self, *other, num_ge)
    }

    /// Integral value widened to `i128`, if the number is integral and fits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn as_i128(&self) -> Option<i128> {
        match *self {
            Number::PositiveInteger(u) => Some(i128::from(u)),
            Number::NegativeInteger(i) => Some(i128::from(i)),
            Number::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i128::MAX as f64 {
                    Some(f as i128)
                } else {
                    None
                }
            }
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        dispatch!(*self, *other, num_eq)
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, h: &mut H) {
        // Must agree with the cross-variant `PartialEq`.
        if let Some(integral) = self.as_i128() {
            0u8.hash(h);
            integral.hash(h);
        } else {
            1u8.hash(h);
            self.as_f64().to_bits().hash(h);
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::PositiveInteger(u) => write!(f, "{u}"),
            Number::NegativeInteger(i) => write!(f, "{i}"),
            Number::Float(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
        }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::PositiveInteger(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        match u64::try_from(value) {
            Ok(u) => Number::PositiveInteger(u),
            Err(_) => Number::NegativeInteger(value),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number::PositiveInteger(value as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::Number;
    use std::hash::{BuildHasher, BuildHasherDefault};
    use std::collections::hash_map::DefaultHasher;
    use test_case::test_case;

    fn hash(n: &Number) -> u64 {
        BuildHasherDefault::<DefaultHasher>::default().hash_one(n)
    }

    #[test_case(Number::PositiveInteger(1), Number::Float(1.0); "positive and float")]
    #[test_case(Number::NegativeInteger(-3), Number::Float(-3.0); "negative and float")]
    #[test_case(Number::Float(0.0), Number::Float(-0.0); "signed zero")]
    #[test_case(Number::from(5_i64), Number::PositiveInteger(5); "non-negative i64")]
    fn equal_across_variants(left: Number, right: Number) {
        assert_eq!(left, right);
        assert_eq!(hash(&left), hash(&right));
    }

    #[test]
    fn ordering() {
        assert!(Number::NegativeInteger(-1).lt(&Number::PositiveInteger(0)));
        assert!(Number::Float(2.5).gt(&Number::PositiveInteger(2)));
        assert!(Number::PositiveInteger(u64::MAX).gt(&Number::Float(1e19)));
        assert!(Number::Float(3.0).le(&Number::PositiveInteger(3)));
    }

    #[test_case(Number::Float(1.0), true)]
    #[test_case(Number::Float(1.5), false)]
    #[test_case(Number::NegativeInteger(-7), true)]
    fn integers(number: Number, expected: bool) {
        assert_eq!(number.is_integer(), expected);
    }

    #[test]
    fn display() {
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(0.5).to_string(), "0.5");
        assert_eq!(Number::NegativeInteger(-2).to_string(), "-2");
    }
}
