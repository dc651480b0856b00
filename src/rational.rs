//! Exact rationals over `num::BigRational`, extended with a signed infinity.
//!
//! Finite values never overflow and are always reduced, so structural equality is numeric
//! equality. `Rational::INFINITY` is a separate value, not a large finite one. It is what
//! the minimum-ratio test writes for rows that never limit the entering column.
//!
//! Arithmetic with infinities saturates: `inf + x = inf`, `x / inf = 0` and
//! `inf * x = ±inf` for finite `x != 0`. The indeterminate forms `inf + (-inf)`,
//! `0 * inf` and `inf / inf` panic whatever the operand order.

use num::bigint::BigInt;
use num::rational::{BigRational, Ratio};
use num::{One, Signed, ToPrimitive, Zero};

use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::LppError;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Value {
    NegInfinity,
    Finite(BigRational),
    Infinity,
}

/// An exact rational number, or `±inf`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rational(Value);

impl Rational {
    pub const INFINITY: Rational = Rational(Value::Infinity);
    pub const NEG_INFINITY: Rational = Rational(Value::NegInfinity);

    /// Builds `numer / denom` in lowest terms.
    ///
    /// Panics when `denom` is zero.
    pub fn new(numer: i64, denom: i64) -> Self {
        assert!(denom != 0, "rational with a zero denominator");
        Self::finite(BigRational::new(numer.into(), denom.into()))
    }

    pub fn from_integer(value: i64) -> Self {
        Self::finite(BigRational::from_integer(value.into()))
    }

    fn finite(value: BigRational) -> Self {
        Self(Value::Finite(value))
    }

    fn infinity(negative: bool) -> Self {
        if negative {
            Self::NEG_INFINITY
        } else {
            Self::INFINITY
        }
    }

    /// The underlying ratio, `None` for `±inf`.
    pub fn as_ratio(&self) -> Option<&BigRational> {
        match &self.0 {
            Value::Finite(r) => Some(r),
            _ => None,
        }
    }

    pub fn numer(&self) -> Option<&BigInt> {
        self.as_ratio().map(Ratio::numer)
    }

    pub fn denom(&self) -> Option<&BigInt> {
        self.as_ratio().map(Ratio::denom)
    }

    pub fn is_infinite(&self) -> bool {
        self.as_ratio().is_none()
    }

    pub fn is_integer(&self) -> bool {
        self.as_ratio().map_or(false, Ratio::is_integer)
    }

    pub fn is_positive(&self) -> bool {
        match &self.0 {
            Value::Finite(r) => r.is_positive(),
            Value::Infinity => true,
            Value::NegInfinity => false,
        }
    }

    pub fn is_negative(&self) -> bool {
        match &self.0 {
            Value::Finite(r) => r.is_negative(),
            Value::Infinity => false,
            Value::NegInfinity => true,
        }
    }

    pub fn abs(&self) -> Self {
        match &self.0 {
            Value::Finite(r) => Self::finite(r.abs()),
            _ => Self::INFINITY,
        }
    }

    pub fn signum(&self) -> Self {
        if self.is_positive() {
            Self::one()
        } else if self.is_negative() {
            -Self::one()
        } else {
            Self::zero()
        }
    }

    /// `1 / self`; the reciprocal of `±inf` is zero.
    pub fn recip(&self) -> Self {
        match &self.0 {
            Value::Finite(r) => {
                assert!(!r.is_zero(), "division of 1 by zero");
                Self::finite(r.recip())
            }
            _ => Self::zero(),
        }
    }

    /// Raises to a rational power.
    ///
    /// Integer exponents are computed exactly. Fractional exponents go through `f64` and
    /// are converted back, so they are only exact when the result is a terminating decimal.
    pub fn pow(&self, exponent: &Rational) -> Self {
        if exponent.is_infinite() {
            return exponent.clone();
        }
        if let Some(e) = exponent.to_i64().and_then(|e| i32::try_from(e).ok()) {
            return match &self.0 {
                Value::Finite(r) => {
                    assert!(!(r.is_zero() && e < 0), "division of 1 by zero");
                    Self::finite(r.pow(e))
                }
                _ if e == 0 => Self::one(),
                _ if e < 0 => Self::zero(),
                _ => Self::infinity(self.is_negative() && e % 2 != 0),
            };
        }
        if self.is_infinite() {
            return self.clone();
        }
        let value = self.as_f64().powf(exponent.as_f64());
        Rational::try_from(value).unwrap_or_else(|_| panic!("{}^{} has no rational value", self, exponent))
    }

    fn as_f64(&self) -> f64 {
        match &self.0 {
            Value::Finite(r) => match (r.numer().to_f64(), r.denom().to_f64()) {
                (Some(n), Some(d)) => n / d,
                _ => f64::NAN,
            },
            Value::Infinity => f64::INFINITY,
            Value::NegInfinity => f64::NEG_INFINITY,
        }
    }

    fn add_ref(&self, rhs: &Rational) -> Rational {
        match (&self.0, &rhs.0) {
            (Value::Finite(a), Value::Finite(b)) => Self::finite(a + b),
            (Value::Infinity, Value::NegInfinity) | (Value::NegInfinity, Value::Infinity) => {
                panic!("indeterminate sum {} + {}", self, rhs)
            }
            (Value::Finite(_), _) => rhs.clone(),
            _ => self.clone(),
        }
    }

    fn sub_ref(&self, rhs: &Rational) -> Rational {
        self.add_ref(&-rhs)
    }

    fn mul_ref(&self, rhs: &Rational) -> Rational {
        match (&self.0, &rhs.0) {
            (Value::Finite(a), Value::Finite(b)) => Self::finite(a * b),
            _ if self.is_zero() || rhs.is_zero() => panic!("indeterminate product {} * {}", self, rhs),
            _ => Self::infinity(self.is_negative() != rhs.is_negative()),
        }
    }

    fn div_ref(&self, rhs: &Rational) -> Rational {
        assert!(!rhs.is_zero(), "division of {} by zero", self);
        match (&self.0, &rhs.0) {
            (Value::Finite(a), Value::Finite(b)) => Self::finite(a / b),
            (Value::Finite(_), _) => Self::zero(),
            (_, Value::Finite(_)) => Self::infinity(self.is_negative() != rhs.is_negative()),
            _ => panic!("indeterminate quotient {} / {}", self, rhs),
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Self::finite(BigRational::zero())
    }

    fn is_zero(&self) -> bool {
        self.as_ratio().map_or(false, Zero::is_zero)
    }
}

impl One for Rational {
    fn one() -> Self {
        Self::finite(BigRational::one())
    }
}

impl ToPrimitive for Rational {
    fn to_i64(&self) -> Option<i64> {
        self.as_ratio()
            .filter(|r| r.is_integer())
            .and_then(|r| r.numer().to_i64())
    }

    fn to_u64(&self) -> Option<u64> {
        self.as_ratio()
            .filter(|r| r.is_integer())
            .and_then(|r| r.numer().to_u64())
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.as_f64())
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<i32> for Rational {
    fn from(value: i32) -> Self {
        Self::from_integer(value.into())
    }
}

impl From<BigInt> for Rational {
    fn from(value: BigInt) -> Self {
        Self::finite(BigRational::from_integer(value))
    }
}

impl From<BigRational> for Rational {
    fn from(value: BigRational) -> Self {
        Self::finite(value)
    }
}

impl From<Ratio<i64>> for Rational {
    fn from(value: Ratio<i64>) -> Self {
        Self::new(*value.numer(), *value.denom())
    }
}

/// `[-]digits[.digits]` read exactly.
fn parse_decimal(text: &str) -> Option<Rational> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let numer: BigInt = format!("{}{}", whole, fraction).parse().ok()?;
    let denom = num::pow(BigInt::from(10), fraction.len());
    let value = BigRational::new(numer, denom);
    Some(Rational::finite(if negative { -value } else { value }))
}

/// Exact conversion of the float's shortest decimal form.
impl TryFrom<f64> for Rational {
    type Error = LppError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(LppError::InexactFloat(value));
        }
        parse_decimal(&value.to_string()).ok_or(LppError::InexactFloat(value))
    }
}

impl FromStr for Rational {
    type Err = LppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || LppError::ParseRational(s.to_string());
        match text {
            "inf" | "+inf" => return Ok(Self::INFINITY),
            "-inf" => return Ok(Self::NEG_INFINITY),
            _ => {}
        }
        if let Some((numer, denom)) = text.split_once('/') {
            let numer = numer.trim().parse::<BigInt>().map_err(|_| invalid())?;
            let denom = denom.trim().parse::<BigInt>().map_err(|_| invalid())?;
            if denom.is_zero() {
                return Err(invalid());
            }
            return Ok(Self::finite(BigRational::new(numer, denom)));
        }
        parse_decimal(text).ok_or_else(invalid)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match &self.0 {
            Value::Infinity => "inf".to_string(),
            Value::NegInfinity => "-inf".to_string(),
            Value::Finite(r) if r.is_integer() => r.numer().to_string(),
            Value::Finite(r) => format!("{}/{}", r.numer(), r.denom()),
        };
        f.pad(&text)
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        -&self
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        match &self.0 {
            Value::Finite(r) => Rational::finite(-r),
            Value::Infinity => Rational::NEG_INFINITY,
            Value::NegInfinity => Rational::INFINITY,
        }
    }
}

//R op R, R op &R, &R op R, &R op &R
macro_rules! rational_binop_impl(
    ($($Trait: ident, $method: ident, $by_ref: ident);* $(;)*) => {$(
        impl $Trait<&Rational> for &Rational {
            type Output = Rational;

            fn $method(self, rhs: &Rational) -> Self::Output {
                self.$by_ref(rhs)
            }
        }

        impl $Trait<Rational> for &Rational {
            type Output = Rational;

            fn $method(self, rhs: Rational) -> Self::Output {
                self.$by_ref(&rhs)
            }
        }

        impl $Trait<&Rational> for Rational {
            type Output = Rational;

            fn $method(self, rhs: &Rational) -> Self::Output {
                self.$by_ref(rhs)
            }
        }

        impl $Trait for Rational {
            type Output = Rational;

            fn $method(self, rhs: Rational) -> Self::Output {
                self.$by_ref(&rhs)
            }
        }
    )*}
);

rational_binop_impl!(
    Add, add, add_ref;
    Sub, sub, sub_ref;
    Mul, mul, mul_ref;
    Div, div, div_ref;
);

macro_rules! rational_assign_impl(
    ($($Trait: ident, $method: ident, $by_ref: ident);* $(;)*) => {$(
        impl $Trait<&Rational> for Rational {
            fn $method(&mut self, rhs: &Rational) {
                *self = self.$by_ref(rhs);
            }
        }

        impl $Trait for Rational {
            fn $method(&mut self, rhs: Rational) {
                *self = self.$by_ref(&rhs);
            }
        }
    )*}
);

rational_assign_impl!(
    AddAssign, add_assign, add_ref;
    SubAssign, sub_assign, sub_ref;
    MulAssign, mul_assign, mul_ref;
    DivAssign, div_assign, div_ref;
);

impl Sum for Rational {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, v| acc + v)
    }
}

impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, v| acc + v)
    }
}

impl Product for Rational {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::one(), |acc, v| acc * v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Integer;
    use proptest::prelude::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    #[test]
    fn test_reduced_form() {
        let v = r(6, -8);
        assert_eq!(v.numer(), Some(&BigInt::from(-3)));
        assert_eq!(v.denom(), Some(&BigInt::from(4)));
        assert_eq!(r(0, -5), Rational::zero());
        assert_eq!(r(0, -5).denom(), Some(&BigInt::from(1)));
        assert_eq!(Rational::INFINITY.numer(), None);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(r(1, 2) + r(1, 3), r(5, 6));
        assert_eq!(r(1, 2) - r(3, 4), r(-1, 4));
        assert_eq!(r(2, 3) * r(9, 4), r(3, 2));
        assert_eq!(r(2, 3) / r(4, 9), r(3, 2));
        assert_eq!(&r(2, 3) / &r(4, 9), r(3, 2));
        assert_eq!(-r(2, 3), r(-2, 3));
        assert_eq!(r(-7, 3).abs(), r(7, 3));
        let mut v = r(1, 2);
        v *= &r(4, 1);
        v -= r(1, 1);
        assert_eq!(v, r(1, 1));
    }

    #[test]
    fn test_products_beyond_i64_stay_exact() {
        let big = r(4_000_000_000, 1);
        let square = &big * &big;
        assert_eq!(square, "16000000000000000000".parse::<Rational>().unwrap());
        assert_eq!(square.to_i64(), None);
        assert_eq!((&square / &big) - big, Rational::zero());
        assert_eq!(
            r(1, 4_000_000_001) * r(1, 4_000_000_003),
            "1/16000000016000000003".parse::<Rational>().unwrap()
        );
    }

    #[test]
    fn test_ordering() {
        assert!(r(1, 3) < r(1, 2));
        assert!(r(-1, 2) < r(-1, 3));
        assert!(Rational::NEG_INFINITY < r(-1_000_000, 1));
        assert_eq!(r(1, 3).max(r(2, 7)), r(1, 3));
    }

    #[test]
    fn test_infinity_is_not_a_finite_value() {
        let max = Rational::from(i64::MAX);
        assert!(!max.is_infinite());
        assert_ne!(max, Rational::INFINITY);
        assert!(max < Rational::INFINITY);
        let beyond = &max + &Rational::one();
        assert!(!beyond.is_infinite());
        assert!(beyond > max);
        assert!(-beyond > Rational::NEG_INFINITY);
    }

    #[test]
    fn test_infinity_saturates() {
        let inf = Rational::INFINITY;
        let neg = Rational::NEG_INFINITY;
        assert_eq!(&inf + &r(3, 1), inf);
        assert_eq!(&r(3, 1) + &inf, inf);
        assert_eq!(&inf + &inf, inf);
        assert_eq!(&neg + &r(3, 1), neg);
        assert_eq!(&r(3, 1) - &inf, neg);
        assert_eq!(&inf * &r(-2, 1), neg);
        assert_eq!(&neg * &r(-2, 1), inf);
        assert_eq!(&r(5, 1) / &inf, Rational::zero());
        assert_eq!(&inf / &r(-5, 1), neg);
        assert_eq!(-inf.clone(), neg);
        assert!(inf.is_infinite());
        assert!(!r(5, 1).is_infinite());
    }

    #[test]
    #[should_panic(expected = "indeterminate sum")]
    fn test_infinity_plus_negative_infinity_panics() {
        let _ = Rational::INFINITY + Rational::NEG_INFINITY;
    }

    #[test]
    #[should_panic(expected = "indeterminate sum")]
    fn test_negative_infinity_plus_infinity_panics() {
        let _ = Rational::NEG_INFINITY + Rational::INFINITY;
    }

    #[test]
    #[should_panic(expected = "indeterminate product")]
    fn test_zero_times_infinity_panics() {
        let _ = Rational::zero() * Rational::INFINITY;
    }

    #[test]
    fn test_display() {
        assert_eq!(r(3, 1).to_string(), "3");
        assert_eq!(r(-3, 4).to_string(), "-3/4");
        assert_eq!(Rational::INFINITY.to_string(), "inf");
        assert_eq!(Rational::NEG_INFINITY.to_string(), "-inf");
        assert_eq!(format!("{:>5}", r(1, 2)), "  1/2");
        assert_eq!(format!("{:?}", r(1, 2)), "1/2");
    }

    #[test]
    fn test_pow() {
        assert_eq!(r(2, 3).pow(&r(3, 1)), r(8, 27));
        assert_eq!(r(2, 3).pow(&r(-2, 1)), r(9, 4));
        assert_eq!(r(9, 4).pow(&r(1, 2)), r(3, 2));
        assert_eq!(r(5, 1).pow(&Rational::zero()), Rational::one());
        assert_eq!(Rational::NEG_INFINITY.pow(&r(3, 1)), Rational::NEG_INFINITY);
        assert_eq!(Rational::INFINITY.pow(&r(-1, 1)), Rational::zero());
    }

    #[test]
    fn test_from_float() {
        assert_eq!(Rational::try_from(0.125).unwrap(), r(1, 8));
        assert_eq!(Rational::try_from(-2.5).unwrap(), r(-5, 2));
        assert_eq!(Rational::try_from(0.3).unwrap(), r(3, 10));
        assert_eq!(Rational::try_from(7.0).unwrap(), r(7, 1));
        assert_eq!(
            Rational::try_from(1e-30).unwrap(),
            Rational::one() / Rational::from(num::pow(BigInt::from(10), 30))
        );
        assert!(Rational::try_from(f64::NAN).is_err());
        assert!(Rational::try_from(f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("3/-6".parse::<Rational>().unwrap(), r(-1, 2));
        assert_eq!(" 42 ".parse::<Rational>().unwrap(), r(42, 1));
        assert_eq!("0.75".parse::<Rational>().unwrap(), r(3, 4));
        assert_eq!("-.5".parse::<Rational>().unwrap(), r(-1, 2));
        assert_eq!("-inf".parse::<Rational>().unwrap(), Rational::NEG_INFINITY);
        assert!("1/0".parse::<Rational>().is_err());
        assert!("x".parse::<Rational>().is_err());
        assert!("1e5".parse::<Rational>().is_err());
        assert!(".".parse::<Rational>().is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Rational::from(Ratio::new(10, -4)), r(-5, 2));
        assert_eq!(r(6, 4).as_ratio(), Some(&BigRational::new(3.into(), 2.into())));
        assert_eq!(Rational::INFINITY.as_ratio(), None);
        assert_eq!(r(5, 2).to_f64(), Some(2.5));
        assert_eq!(Rational::NEG_INFINITY.to_f64(), Some(f64::NEG_INFINITY));
        assert_eq!(r(5, 2).to_i64(), None);
        assert_eq!(r(-6, 2).to_i64(), Some(-3));
        assert_eq!(vec![r(1, 2), r(1, 3), r(1, 6)].into_iter().sum::<Rational>(), Rational::one());
        assert_eq!(vec![r(1, 2), r(2, 3)].into_iter().product::<Rational>(), r(1, 3));
    }

    #[test]
    #[should_panic(expected = "zero denominator")]
    fn test_zero_denominator_panics() {
        let _ = r(1, 0);
    }

    #[test]
    #[should_panic(expected = "by zero")]
    fn test_division_by_zero_panics() {
        let _ = r(1, 2) / Rational::zero();
    }

    proptest! {
        #[test]
        fn prop_division_round_trips(an in any::<i64>(), ad in 1i64..i64::MAX,
                                     bn in any::<i64>(), bd in 1i64..i64::MAX) {
            prop_assume!(bn != 0);
            let a = r(an, ad);
            let b = r(bn, bd);
            prop_assert_eq!((&a / &b) * &b, a);
        }

        #[test]
        fn prop_denominator_positive_and_minimal(n in any::<i64>(), d in any::<i64>()) {
            prop_assume!(d != 0);
            let v = r(n, d);
            let ratio = v.as_ratio().unwrap();
            prop_assert!(ratio.denom().is_positive());
            prop_assert!(ratio.numer().gcd(ratio.denom()).is_one());
        }
    }
}
