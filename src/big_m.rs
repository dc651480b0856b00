//! Costs carrying a symbolic big-M penalty.

use crate::linear_expr::write_scaled;
use crate::rational::Rational;
use crate::var::ReservedSymbol;
use num::Zero;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// `plain + penalty·M` for an arbitrarily large `M`.
///
/// Values order by `penalty` first and only fall back to `plain` on a tie, which is how
/// any sufficiently large `M` would order them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BigM {
    plain: Rational,
    penalty: Rational,
}

impl BigM {
    pub fn new(plain: Rational, penalty: Rational) -> Self {
        Self { plain, penalty }
    }

    pub fn plain(value: Rational) -> Self {
        Self::new(value, Rational::zero())
    }

    /// `-M`, the cost of an artificial variable.
    pub fn neg_m() -> Self {
        Self::new(Rational::zero(), -Rational::from(1))
    }

    pub fn plain_part(&self) -> &Rational {
        &self.plain
    }

    pub fn penalty(&self) -> &Rational {
        &self.penalty
    }

    pub fn has_penalty(&self) -> bool {
        !self.penalty.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.penalty.is_negative() || (self.penalty.is_zero() && self.plain.is_negative())
    }

    /// Divides by a plain value.
    pub fn div(&self, rhs: &Rational) -> Self {
        Self::new(&self.plain / rhs, &self.penalty / rhs)
    }
}

impl Zero for BigM {
    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        self.plain.is_zero() && self.penalty.is_zero()
    }
}

impl From<Rational> for BigM {
    fn from(value: Rational) -> Self {
        Self::plain(value)
    }
}

impl Ord for BigM {
    fn cmp(&self, other: &Self) -> Ordering {
        self.penalty
            .cmp(&other.penalty)
            .then_with(|| self.plain.cmp(&other.plain))
    }
}

impl PartialOrd for BigM {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add<&BigM> for BigM {
    type Output = Self;

    fn add(self, rhs: &BigM) -> Self::Output {
        Self::new(self.plain + &rhs.plain, self.penalty + &rhs.penalty)
    }
}

impl Add for BigM {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self + &rhs
    }
}

impl AddAssign<&BigM> for BigM {
    fn add_assign(&mut self, rhs: &BigM) {
        self.plain += &rhs.plain;
        self.penalty += &rhs.penalty;
    }
}

impl Sub<&BigM> for BigM {
    type Output = Self;

    fn sub(self, rhs: &BigM) -> Self::Output {
        Self::new(self.plain - &rhs.plain, self.penalty - &rhs.penalty)
    }
}

impl Sub for BigM {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self - &rhs
    }
}

impl Neg for BigM {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.plain, -self.penalty)
    }
}

impl Mul<&Rational> for &BigM {
    type Output = BigM;

    fn mul(self, rhs: &Rational) -> Self::Output {
        BigM::new(&self.plain * rhs, &self.penalty * rhs)
    }
}

impl Mul<Rational> for BigM {
    type Output = Self;

    fn mul(self, rhs: Rational) -> Self::Output {
        &self * &rhs
    }
}

impl fmt::Display for BigM {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.has_penalty() {
            return f.pad(&self.plain.to_string());
        }
        let mut text = M(&self.penalty).to_string();
        if !self.plain.is_zero() {
            let sign = if self.plain.is_negative() { '-' } else { '+' };
            text.push_str(&format!(" {} {}", sign, self.plain.abs()));
        }
        f.pad(&text)
    }
}

struct M<'a>(&'a Rational);

impl fmt::Display for M<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_scaled(f, self.0, ReservedSymbol::Penalty.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(plain: i64, penalty: i64) -> BigM {
        BigM::new(Rational::from(plain), Rational::from(penalty))
    }

    #[test]
    fn test_penalty_dominates_ordering() {
        assert!(m(1_000_000, -1) < m(-5, 0));
        assert!(m(-3, 0) < m(2, 0));
        assert!(m(0, 1) > m(99, 0));
        let min = [m(4, 0), m(-2, -1), m(7, -1)].into_iter().min().unwrap();
        assert_eq!(min, m(-2, -1));
    }

    #[test]
    fn test_arithmetic() {
        let cost = BigM::neg_m() * Rational::from(3) + m(2, 0);
        assert_eq!(cost, m(2, -3));
        assert_eq!(cost - m(2, -3), BigM::zero());
        assert_eq!(m(4, -2).div(&Rational::from(2)), m(2, -1));
        assert!(BigM::neg_m().is_negative());
    }

    #[test]
    fn test_display() {
        assert_eq!(m(3, 0).to_string(), "3");
        assert_eq!(m(3, -2).to_string(), "-2M + 3");
        assert_eq!(m(-3, 1).to_string(), "M - 3");
        assert_eq!(BigM::neg_m().to_string(), "-M");
        assert_eq!(BigM::new(Rational::zero(), Rational::new(1, 2)).to_string(), "M/2");
    }
}
