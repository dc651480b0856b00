use crate::rational::Rational;
use crate::var::Symbol;
use num::{One, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Writes `coefficient·name` the way expressions print it: `x`, `-x`, `3x`, `x/3`, `2x/3`.
pub(crate) fn write_scaled(f: &mut fmt::Formatter, coefficient: &Rational, name: &str) -> fmt::Result {
    let (Some(numer), Some(denom)) = (coefficient.numer(), coefficient.denom()) else {
        return write!(f, "{}{}", coefficient, name);
    };
    match numer.to_i64() {
        Some(1) => write!(f, "{}", name)?,
        Some(-1) => write!(f, "-{}", name)?,
        _ => write!(f, "{}{}", numer, name)?,
    }
    if !denom.is_one() {
        write!(f, "/{}", denom)?;
    }
    Ok(())
}

/// A monomial `coefficient · symbol^exponent`, or a constant when `symbol` is `None`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Term {
    coefficient: Rational,
    symbol: Option<Symbol>,
    exponent: Rational,
}

impl Term {
    pub fn new(coefficient: Rational, symbol: &Symbol) -> Self {
        Self {
            coefficient,
            symbol: Some(symbol.clone()),
            exponent: Rational::one(),
        }
    }

    pub fn constant(value: Rational) -> Self {
        Self {
            coefficient: value,
            symbol: None,
            exponent: Rational::one(),
        }
    }

    pub fn coefficient(&self) -> &Rational {
        &self.coefficient
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn exponent(&self) -> &Rational {
        &self.exponent
    }

    pub fn is_constant(&self) -> bool {
        self.symbol.is_none()
    }

    /// Linear in `symbol`: the symbol with exponent one.
    pub fn is_linear_in(&self, symbol: &Symbol) -> bool {
        self.exponent.is_one() && self.symbol.as_ref() == Some(symbol)
    }

    /// The term with coefficient one, i.e. the key like terms merge on.
    pub fn basis(&self) -> Term {
        Term {
            coefficient: Rational::one(),
            symbol: self.symbol.clone(),
            exponent: self.exponent.clone(),
        }
    }

    pub fn pow(self, exponent: Rational) -> Self {
        match self.symbol {
            Some(symbol) => Self {
                coefficient: self.coefficient.pow(&exponent),
                symbol: Some(symbol),
                exponent: self.exponent * exponent,
            },
            None => Self::constant(self.coefficient.pow(&exponent)),
        }
    }

    fn key(&self) -> (bool, Option<&Symbol>, &Rational) {
        (self.symbol.is_none(), self.symbol.as_ref(), &self.exponent)
    }

    fn scaled(mut self, factor: &Rational) -> Self {
        self.coefficient *= factor;
        self
    }
}

/// Symbol terms order by name and exponent; constants sort last.
impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key()
            .cmp(&other.key())
            .then_with(|| self.coefficient.cmp(&other.coefficient))
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.symbol {
            None => write!(f, "{}", self.coefficient),
            Some(symbol) if self.exponent.is_one() => write_scaled(f, &self.coefficient, symbol.name()),
            Some(symbol) => {
                let name = format!("({}^{})", symbol, self.exponent);
                write_scaled(f, &self.coefficient, &name)
            }
        }
    }
}

/// A sum of terms. Terms are kept sorted, like terms merged and zero terms dropped, so two
/// expressions are equal exactly when they are the same polynomial.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LinearExpression {
    terms: Vec<Term>,
}

impl LinearExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_terms<I: IntoIterator<Item = Term>>(terms: I) -> Self {
        let mut expr = Self::new();
        terms.into_iter().for_each(|t| expr.insert(t));
        expr
    }

    /// Adds `term`, merging it into a like term if one exists.
    pub fn insert(&mut self, term: Term) {
        match self.terms.binary_search_by(|t| t.key().cmp(&term.key())) {
            Ok(ix) => {
                self.terms[ix].coefficient += term.coefficient;
                if self.terms[ix].coefficient.is_zero() {
                    self.terms.remove(ix);
                }
            }
            Err(ix) => {
                if !term.coefficient.is_zero() {
                    self.terms.insert(ix, term);
                }
            }
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(Term::is_constant)
    }

    /// The constant term, zero if there is none.
    pub fn constant(&self) -> Rational {
        match self.terms.last() {
            Some(t) if t.is_constant() => t.coefficient.clone(),
            _ => Rational::zero(),
        }
    }

    /// Value of a constant expression.
    ///
    /// Panics if the expression still contains a symbol.
    pub fn value(&self) -> Rational {
        assert!(self.is_constant(), "value of non-constant expression {}", self);
        self.constant()
    }

    /// Coefficient of the linear term in `symbol`, zero if absent.
    pub fn coefficient(&self, symbol: &Symbol) -> Rational {
        self.terms
            .iter()
            .find(|t| t.is_linear_in(symbol))
            .map(|t| t.coefficient.clone())
            .unwrap_or_else(Rational::zero)
    }

    /// Coefficient of `symbol` if the expression has that term, otherwise the value of the
    /// expression, which must then be constant.
    pub fn extract_coefficient_of(&self, symbol: &Symbol) -> Rational {
        match self.terms.iter().find(|t| t.is_linear_in(symbol)) {
            Some(t) => t.coefficient.clone(),
            None => self.value(),
        }
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.terms.iter().any(|t| t.symbol.as_ref() == Some(symbol))
    }

    /// Distinct symbols in order.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = Vec::new();
        for symbol in self.terms.iter().filter_map(Term::symbol) {
            if symbols.last() != Some(symbol) {
                symbols.push(symbol.clone());
            }
        }
        symbols
    }

    /// True when every term is constant or has exponent one.
    pub fn is_linear(&self) -> bool {
        self.terms.iter().all(|t| t.is_constant() || t.exponent.is_one())
    }

    pub fn without_constant(&self) -> Self {
        Self {
            terms: self.terms.iter().filter(|t| !t.is_constant()).cloned().collect(),
        }
    }

    /// Evaluates the expression with every symbol replaced by its value.
    ///
    /// Panics if a symbol has no value.
    pub fn eval(&self, values: &BTreeMap<Symbol, Rational>) -> Rational {
        self.terms
            .iter()
            .map(|t| match &t.symbol {
                None => t.coefficient.clone(),
                Some(symbol) => &t.coefficient * values[symbol].pow(&t.exponent),
            })
            .sum()
    }

    /// Substitutes `expr` for the linear term in `symbol`. Returns whether it was present.
    pub fn replace_symbol(&mut self, symbol: &Symbol, expr: &LinearExpression) -> bool {
        match self.terms.iter().position(|t| t.is_linear_in(symbol)) {
            Some(ix) => {
                let term = self.terms.remove(ix);
                for t in expr.terms.iter() {
                    self.insert(t.clone().scaled(&term.coefficient));
                }
                true
            }
            None => false,
        }
    }

    pub fn scaled(&self, factor: Rational) -> Self {
        let mut expr = self.clone();
        expr *= factor;
        expr
    }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", term)?;
            } else if term.coefficient.is_negative() {
                write!(f, " - {}", term.clone().scaled(&-Rational::one()))?;
            } else {
                write!(f, " + {}", term)?;
            }
        }
        Ok(())
    }
}

impl From<&Symbol> for LinearExpression {
    fn from(symbol: &Symbol) -> Self {
        Self {
            terms: vec![Term::new(Rational::one(), symbol)],
        }
    }
}

impl From<Term> for LinearExpression {
    fn from(term: Term) -> Self {
        Self::from_terms([term])
    }
}

impl From<Rational> for LinearExpression {
    fn from(value: Rational) -> Self {
        Self::from_terms([Term::constant(value)])
    }
}

impl From<i64> for LinearExpression {
    fn from(value: i64) -> Self {
        Self::from(Rational::from(value))
    }
}

//-LE
impl Neg for LinearExpression {
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        self.terms.iter_mut().for_each(|t| t.coefficient = -&t.coefficient);
        self
    }
}

//-S
impl Neg for &Symbol {
    type Output = LinearExpression;

    fn neg(self) -> Self::Output {
        LinearExpression::from_terms([Term::new(-Rational::one(), self)])
    }
}

//LE += LE
impl AddAssign for LinearExpression {
    fn add_assign(&mut self, rhs: Self) {
        rhs.terms.into_iter().for_each(|t| self.insert(t));
    }
}

//LE -= LE
impl SubAssign for LinearExpression {
    fn sub_assign(&mut self, rhs: Self) {
        *self += -rhs;
    }
}

//LE += S
impl AddAssign<&Symbol> for LinearExpression {
    fn add_assign(&mut self, rhs: &Symbol) {
        self.insert(Term::new(Rational::one(), rhs));
    }
}

//LE -= S
impl SubAssign<&Symbol> for LinearExpression {
    fn sub_assign(&mut self, rhs: &Symbol) {
        self.insert(Term::new(-Rational::one(), rhs));
    }
}

//LE *= C
impl MulAssign<Rational> for LinearExpression {
    fn mul_assign(&mut self, rhs: Rational) {
        if rhs.is_zero() {
            self.terms.clear();
            return;
        }
        self.terms.iter_mut().for_each(|t| t.coefficient *= &rhs);
    }
}

//LE /= C
impl DivAssign<Rational> for LinearExpression {
    fn div_assign(&mut self, rhs: Rational) {
        self.terms.iter_mut().for_each(|t| t.coefficient /= &rhs);
    }
}

//LE + LE, LE - LE, LE + S, LE - S
macro_rules! expr_binop_impl(
    ($($Rhs: ty, $Trait: ident, $method: ident, $assign: ident);* $(;)*) => {$(
        impl $Trait<$Rhs> for LinearExpression {
            type Output = LinearExpression;

            fn $method(mut self, rhs: $Rhs) -> Self::Output {
                self.$assign(rhs);
                self
            }
        }
    )*}
);

expr_binop_impl!(
    LinearExpression, Add, add, add_assign;
    LinearExpression, Sub, sub, sub_assign;
    &Symbol, Add, add, add_assign;
    &Symbol, Sub, sub, sub_assign;
);

//S + S, S - S, S + LE, S - LE
macro_rules! symbol_binop_impl(
    ($($Rhs: ty, $Trait: ident, $method: ident);* $(;)*) => {$(
        impl $Trait<$Rhs> for &Symbol {
            type Output = LinearExpression;

            fn $method(self, rhs: $Rhs) -> Self::Output {
                LinearExpression::from(self).$method(rhs)
            }
        }
    )*}
);

symbol_binop_impl!(
    &Symbol, Add, add;
    &Symbol, Sub, sub;
    LinearExpression, Add, add;
    LinearExpression, Sub, sub;
);

//LE ± C, C ± LE, S ± C, C ± S, LE * C, C * LE, S * C, C * S, LE / C
macro_rules! scalar_ops_impl(
    ($($T: ty), *$(, )*) => {$(
        impl Add<$T> for LinearExpression {
            type Output = LinearExpression;

            fn add(mut self, rhs: $T) -> Self::Output {
                self.insert(Term::constant(Rational::from(rhs)));
                self
            }
        }

        impl Sub<$T> for LinearExpression {
            type Output = LinearExpression;

            fn sub(mut self, rhs: $T) -> Self::Output {
                self.insert(Term::constant(-Rational::from(rhs)));
                self
            }
        }

        impl Add<LinearExpression> for $T {
            type Output = LinearExpression;

            fn add(self, rhs: LinearExpression) -> Self::Output {
                rhs + self
            }
        }

        impl Sub<LinearExpression> for $T {
            type Output = LinearExpression;

            fn sub(self, rhs: LinearExpression) -> Self::Output {
                -rhs + self
            }
        }

        impl Add<$T> for &Symbol {
            type Output = LinearExpression;

            fn add(self, rhs: $T) -> Self::Output {
                LinearExpression::from(self) + rhs
            }
        }

        impl Sub<$T> for &Symbol {
            type Output = LinearExpression;

            fn sub(self, rhs: $T) -> Self::Output {
                LinearExpression::from(self) - rhs
            }
        }

        impl Add<&Symbol> for $T {
            type Output = LinearExpression;

            fn add(self, rhs: &Symbol) -> Self::Output {
                LinearExpression::from(rhs) + self
            }
        }

        impl Sub<&Symbol> for $T {
            type Output = LinearExpression;

            fn sub(self, rhs: &Symbol) -> Self::Output {
                -rhs + self
            }
        }

        impl Mul<$T> for LinearExpression {
            type Output = LinearExpression;

            fn mul(mut self, rhs: $T) -> Self::Output {
                self *= Rational::from(rhs);
                self
            }
        }

        impl Mul<LinearExpression> for $T {
            type Output = LinearExpression;

            fn mul(self, rhs: LinearExpression) -> Self::Output {
                rhs * self
            }
        }

        impl Mul<$T> for &Symbol {
            type Output = LinearExpression;

            fn mul(self, rhs: $T) -> Self::Output {
                LinearExpression::from_terms([Term::new(Rational::from(rhs), self)])
            }
        }

        impl Mul<&Symbol> for $T {
            type Output = LinearExpression;

            fn mul(self, rhs: &Symbol) -> Self::Output {
                rhs * self
            }
        }

        impl Div<$T> for LinearExpression {
            type Output = LinearExpression;

            fn div(mut self, rhs: $T) -> Self::Output {
                self /= Rational::from(rhs);
                self
            }
        }
    )*}
);

scalar_ops_impl!(i64, Rational);

impl Sum for LinearExpression {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(), |acc, e| acc + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::new(name).unwrap()
    }

    #[test]
    fn test_like_terms_merge_and_cancel() {
        let x = sym("x");
        let y = sym("y");
        let expr = 3 * &x + 2 * &y - &x + 4 - 2 * &y;
        assert_eq!(expr.terms().len(), 2);
        assert_eq!(expr.coefficient(&x), Rational::from(2));
        assert_eq!(expr.coefficient(&y), Rational::zero());
        assert!(!expr.contains(&y));
        assert_eq!(expr.constant(), Rational::from(4));
    }

    #[test]
    fn test_constants_sort_last() {
        let x = sym("x");
        let a = sym("a");
        let expr = 5 + &x + &a;
        assert_eq!(expr.symbols(), vec![a.clone(), x.clone()]);
        assert!(expr.terms().last().unwrap().is_constant());
        assert_eq!(expr.to_string(), "a + x + 5");
    }

    #[test]
    fn test_display() {
        let x = sym("x");
        let y = sym("y");
        assert_eq!((3 * &x - 2 * &y - 4).to_string(), "3x - 2y - 4");
        assert_eq!((-&x + &y).to_string(), "-x + y");
        assert_eq!((&x * Rational::new(2, 3) - &y).to_string(), "2x/3 - y");
        assert_eq!(LinearExpression::new().to_string(), "0");
        let squared = LinearExpression::from(Term::new(Rational::from(2), &x).pow(Rational::from(2)));
        assert_eq!(squared.to_string(), "4(x^2)");
    }

    #[test]
    fn test_value_of_constant() {
        let x = sym("x");
        let expr = &x - &x + 7;
        assert!(expr.is_constant());
        assert_eq!(expr.value(), Rational::from(7));
        assert_eq!((2 * &x).extract_coefficient_of(&x), Rational::from(2));
        assert_eq!(LinearExpression::from(5).extract_coefficient_of(&x), Rational::from(5));
    }

    #[test]
    #[should_panic(expected = "non-constant")]
    fn test_value_of_non_constant_panics() {
        let x = sym("x");
        let _ = (&x + 1).value();
    }

    #[test]
    fn test_replace_symbol() {
        let x = sym("x");
        let y = sym("y");
        let xp = x.derived("p");
        let xn = x.derived("n");
        let mut expr = 3 * &x + &y;
        assert!(expr.replace_symbol(&x, &(&xp - &xn)));
        assert_eq!(expr, 3 * &xp - 3 * &xn + &y);
        assert!(!expr.replace_symbol(&x, &LinearExpression::from(1)));
    }

    #[test]
    fn test_eval() {
        let x = sym("x");
        let y = sym("y");
        let values = BTreeMap::from([(x.clone(), Rational::from(3)), (y.clone(), Rational::new(1, 2))]);
        assert_eq!((3 * &x + 2 * &y - 1).eval(&values), Rational::from(9));
    }

    #[test]
    fn test_scaling() {
        let x = sym("x");
        let expr = (2 * &x + 4) * Rational::new(-1, 2);
        assert_eq!(expr, -&x - 2);
        assert!((expr * 0).is_zero());
    }
}
