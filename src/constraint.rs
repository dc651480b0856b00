use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, DivAssign, MulAssign};

use num::{One, Zero};

use crate::linear_expr::LinearExpression;
use crate::rational::Rational;
use crate::var::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comp {
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
    Eq, // ==
}

impl Comp {
    /// The operator after both sides are swapped or multiplied by a negative value.
    pub fn inverted(self) -> Self {
        match self {
            Comp::Lt => Comp::Gt,
            Comp::Le => Comp::Ge,
            Comp::Gt => Comp::Lt,
            Comp::Ge => Comp::Le,
            Comp::Eq => Comp::Eq,
        }
    }

    /// `<` and `>` are treated as `≤` and `≥` once a problem is standardised.
    pub fn non_strict(self) -> Self {
        match self {
            Comp::Lt => Comp::Le,
            Comp::Gt => Comp::Ge,
            c => c,
        }
    }

    pub fn holds(self, lhs: &Rational, rhs: &Rational) -> bool {
        match self {
            Comp::Lt => lhs < rhs,
            Comp::Le => lhs <= rhs,
            Comp::Gt => lhs > rhs,
            Comp::Ge => lhs >= rhs,
            Comp::Eq => lhs == rhs,
        }
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Comp::Lt => write!(f, "<"),
            Comp::Le => write!(f, "\u{2264}"),
            Comp::Gt => write!(f, ">"),
            Comp::Ge => write!(f, "\u{2265}"),
            Comp::Eq => write!(f, "="),
        }
    }
}

/// `lhs comp rhs`. An equation is the `=` case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub(crate) lhs: LinearExpression,
    pub(crate) comp: Comp,
    pub(crate) rhs: LinearExpression,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.comp, self.rhs)
    }
}

impl Constraint {
    pub fn new<T: Into<LinearExpression>, U: Into<LinearExpression>>(
        lhs: T,
        comp: Comp,
        rhs: U,
    ) -> Self {
        Self {
            lhs: lhs.into(),
            comp,
            rhs: rhs.into(),
        }
    }

    pub fn le<T: Into<LinearExpression>, U: Into<LinearExpression>>(lhs: T, rhs: U) -> Self {
        Self::new(lhs, Comp::Le, rhs)
    }

    pub fn ge<T: Into<LinearExpression>, U: Into<LinearExpression>>(lhs: T, rhs: U) -> Self {
        Self::new(lhs, Comp::Ge, rhs)
    }

    pub fn equals<T: Into<LinearExpression>, U: Into<LinearExpression>>(lhs: T, rhs: U) -> Self {
        Self::new(lhs, Comp::Eq, rhs)
    }

    /// The restriction `symbol ≥ 0`.
    pub fn non_negative(symbol: &Symbol) -> Self {
        Self::ge(symbol, Rational::zero())
    }

    /// The restriction marking `symbol` as free in sign: a bound at the infinity sentinel.
    pub fn unrestricted(symbol: &Symbol) -> Self {
        Self::new(symbol, Comp::Lt, Rational::INFINITY)
    }

    pub fn lhs(&self) -> &LinearExpression {
        &self.lhs
    }

    pub fn rhs(&self) -> &LinearExpression {
        &self.rhs
    }

    pub fn comp(&self) -> Comp {
        self.comp
    }

    pub fn is_equation(&self) -> bool {
        self.comp == Comp::Eq
    }

    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.lhs
            .symbols()
            .into_iter()
            .chain(self.rhs.symbols())
            .collect()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.lhs.contains(symbol) || self.rhs.contains(symbol)
    }

    /// Value of the right-hand side.
    ///
    /// Panics if it is not constant.
    pub fn rhs_value(&self) -> Rational {
        self.rhs.value()
    }

    /// The symbol this restricts when the constraint has the shape `x op bound`.
    pub fn restricted_symbol(&self) -> Option<&Symbol> {
        match self.lhs.terms() {
            [term] if term.coefficient().is_one() && term.exponent().is_one() => term.symbol(),
            _ => None,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.rhs.is_constant() && self.rhs.constant().is_infinite()
    }

    pub fn is_non_negativity(&self) -> bool {
        matches!(self.comp, Comp::Ge | Comp::Gt)
            && self.rhs.is_zero()
            && self.restricted_symbol().is_some()
    }

    /// Sides exchanged, operator inverted.
    pub fn swapped(&self) -> Self {
        Self {
            lhs: self.rhs.clone(),
            comp: self.comp.inverted(),
            rhs: self.lhs.clone(),
        }
    }

    pub fn scaled(&self, factor: Rational) -> Self {
        let mut cons = self.clone();
        cons *= factor;
        cons
    }

    pub fn negated(&self) -> Self {
        self.scaled(-Rational::one())
    }

    /// Every symbol term on the left, the constant alone on the right.
    pub fn normalized(&self) -> Self {
        let moved = self.lhs.clone() - self.rhs.clone();
        let constant = moved.constant();
        Self {
            lhs: moved.without_constant(),
            comp: self.comp,
            rhs: LinearExpression::from(-constant),
        }
    }

    pub fn is_satisfied_by(&self, values: &BTreeMap<Symbol, Rational>) -> bool {
        self.comp.holds(&self.lhs.eval(values), &self.rhs.eval(values))
    }

    pub fn replace_symbol(&mut self, symbol: &Symbol, expr: &LinearExpression) {
        self.lhs.replace_symbol(symbol, expr);
        self.rhs.replace_symbol(symbol, expr);
    }
}

impl MulAssign<Rational> for Constraint {
    fn mul_assign(&mut self, rhs: Rational) {
        if rhs.is_negative() {
            self.comp = self.comp.inverted();
        }
        self.lhs *= rhs.clone();
        self.rhs *= rhs;
    }
}

impl DivAssign<Rational> for Constraint {
    fn div_assign(&mut self, rhs: Rational) {
        if rhs.is_negative() {
            self.comp = self.comp.inverted();
        }
        self.lhs /= rhs.clone();
        self.rhs /= rhs;
    }
}

/// Adds the same expression to both sides.
impl Add<LinearExpression> for Constraint {
    type Output = Constraint;

    fn add(mut self, rhs: LinearExpression) -> Self::Output {
        self.lhs += rhs.clone();
        self.rhs += rhs;
        self
    }
}

/// A named closed range, as reported by sensitivity analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub name: String,
    pub lower: Rational,
    pub upper: Rational,
}

impl Interval {
    pub fn new<T: ToString>(name: T, lower: Rational, upper: Rational) -> Self {
        Self {
            name: name.to_string(),
            lower,
            upper,
        }
    }

    pub fn contains(&self, value: &Rational) -> bool {
        &self.lower <= value && value <= &self.upper
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} \u{2264} {} \u{2264} {}", self.lower, self.name, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::new(name).unwrap()
    }

    #[test]
    fn test_negative_scaling_inverts_operator() {
        let x = sym("x");
        let cons = Constraint::le(2 * &x, 4);
        let neg = cons.negated();
        assert_eq!(neg.comp(), Comp::Ge);
        assert_eq!(neg.lhs(), &(-2 * &x));
        assert_eq!(neg.rhs_value(), Rational::from(-4));

        let mut halved = cons.clone();
        halved /= Rational::from(-2);
        assert_eq!(halved, Constraint::ge(-&x, -2));
        assert_eq!(cons.scaled(Rational::from(3)).comp(), Comp::Le);
    }

    #[test]
    fn test_swapped() {
        let x = sym("x");
        let cons = Constraint::new(&x, Comp::Lt, 3);
        let swapped = cons.swapped();
        assert_eq!(swapped.comp(), Comp::Gt);
        assert_eq!(swapped.lhs(), &LinearExpression::from(3));
        assert_eq!(swapped.swapped(), cons);
    }

    #[test]
    fn test_normalized_moves_symbols_left() {
        let x = sym("x");
        let y = sym("y");
        let cons = Constraint::le(&x + 3, 2 * &y - 5);
        let norm = cons.normalized();
        assert_eq!(norm.lhs(), &(&x - 2 * &y));
        assert_eq!(norm.rhs_value(), Rational::from(-8));
        assert_eq!(norm.to_string(), "x - 2y \u{2264} -8");
    }

    #[test]
    fn test_add_to_both_sides() {
        let x = sym("x");
        let y = sym("y");
        let cons = Constraint::equals(&x, 1) + LinearExpression::from(&y);
        assert_eq!(cons, Constraint::equals(&x + &y, &y + 1));
    }

    #[test]
    fn test_is_satisfied_by() {
        let x = sym("x");
        let y = sym("y");
        let values = BTreeMap::from([(x.clone(), Rational::from(3)), (y.clone(), Rational::from(1))]);
        assert!(Constraint::le(&x + &y, 4).is_satisfied_by(&values));
        assert!(!Constraint::new(&x + &y, Comp::Lt, 4).is_satisfied_by(&values));
        assert!(Constraint::equals(&x - &y, 2).is_satisfied_by(&values));
    }

    #[test]
    fn test_restrictions() {
        let x = sym("x");
        let free = Constraint::unrestricted(&x);
        assert!(free.is_unrestricted());
        assert_eq!(free.restricted_symbol(), Some(&x));
        assert_eq!(free.to_string(), "x < inf");
        let pos = Constraint::non_negative(&x);
        assert!(pos.is_non_negativity());
        assert!(!pos.is_unrestricted());
        assert!(!Constraint::ge(2 * &x, 0).is_non_negativity());
    }

    #[test]
    fn test_interval() {
        let range = Interval::new("Cx", Rational::from(2), Rational::INFINITY);
        assert!(range.contains(&Rational::from(3)));
        assert!(!range.contains(&Rational::from(1)));
        assert_eq!(range.to_string(), "2 \u{2264} Cx \u{2264} inf");
    }
}
