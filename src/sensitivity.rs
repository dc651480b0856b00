//! Post-optimal ranging of objective coefficients and right-hand sides.

use num::Zero;

use std::fmt;

use crate::constraint::Interval;
use crate::error::SolveError;
use crate::model::OptDir;
use crate::rational::Rational;
use crate::solver::Status;
use crate::tableau::Tableau;
use crate::var::Symbol;

/// Ranges over which the optimal basis stays optimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sensitivity {
    /// One `C<name>` interval per decision variable.
    pub costs: Vec<Interval>,
    /// One `B<row>` interval per row of the standardised problem.
    pub rhs: Vec<Interval>,
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for range in self.costs.iter().chain(&self.rhs) {
            writeln!(f, "{}", range)?;
        }
        Ok(())
    }
}

impl Tableau {
    /// Cost and right-hand-side ranges at the optimum, optimising first if needed.
    pub fn sensitivity(&mut self) -> Result<Sensitivity, SolveError> {
        Ok(Sensitivity {
            costs: self.variation_in_c()?,
            rhs: self.variation_in_b()?,
        })
    }

    fn ensure_optimal(&mut self) -> Result<(), SolveError> {
        if self.status == Status::Unoptimized {
            self.optimize_simplex();
        }
        match self.status.error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Range of each decision variable's objective coefficient.
    ///
    /// An unrestricted variable is reported once, under its own name, although the table
    /// holds it as two columns whose costs move together.
    pub fn variation_in_c(&mut self) -> Result<Vec<Interval>, SolveError> {
        self.ensure_optimal()?;
        let mut ranges = Vec::new();
        for (j, symbol) in self.symbols.iter().enumerate() {
            if !symbol.is_decision() || self.retired.contains(symbol) {
                continue;
            }
            let (name, (lower, upper)) = match self.substitution_of(symbol) {
                None => (symbol.name(), self.cost_range(j, None)),
                Some(sub) => {
                    let live = |s: &Symbol| self.column_index(s).filter(|_| !self.retired.contains(s));
                    let range = match (live(&sub.positive), live(&sub.negative)) {
                        (Some(p), Some(n)) if p == j => self.split_cost_range(p, n),
                        (Some(_), Some(_)) | (None, None) => continue,
                        (Some(p), None) => self.cost_range(p, None),
                        (None, Some(n)) => {
                            let (lower, upper) = self.cost_range(n, None);
                            (-upper, -lower)
                        }
                    };
                    (sub.original.name(), range)
                }
            };
            let (lower, upper) = match self.direction {
                OptDir::Max => (lower, upper),
                OptDir::Min => (-upper, -lower),
            };
            ranges.push(Interval::new(format!("C{}", name), lower, upper));
        }
        Ok(ranges)
    }

    /// Range of column `j`'s own cost, in the table's maximisation terms.
    ///
    /// A basic column at row `r` may move by `-(Zj - Cj) / a(k, r)` over the non-basic
    /// columns `k`: the largest such value over `a > 0` bounds the decrease, the smallest
    /// over `a < 0` bounds the increase. A non-basic column may rise up to its own
    /// `Zj - Cj`. Column `skip` is left out of the scan.
    fn cost_range(&self, j: usize, skip: Option<usize>) -> (Rational, Rational) {
        let cost = self.costs[j].plain_part();
        let Some(row) = self.basis_row(&self.symbols[j]) else {
            return (Rational::NEG_INFINITY, cost + self.reduced_costs[j].plain_part());
        };
        let mut lower = Rational::NEG_INFINITY;
        let mut upper = Rational::INFINITY;
        for k in 0..self.symbols.len() {
            let a = &self.matrix[(row, k)];
            let reduced = &self.reduced_costs[k];
            if a.is_zero() || reduced.has_penalty() || Some(k) == skip || self.is_basic(&self.symbols[k]) {
                continue;
            }
            let ratio = -(reduced.plain_part() / a);
            if a.is_positive() {
                lower = lower.max(ratio);
            } else {
                upper = upper.min(ratio);
            }
        }
        (cost + &lower, cost + &upper)
    }

    /// Range of the cost `c` of `x = x_p - x_n`, where `x_p` costs `c` and `x_n` costs `-c`.
    ///
    /// The columns are negatives of each other, so the reduced cost of the idle half does
    /// not move with `c` while the other half is basic. With both halves idle the two
    /// reduced costs pin `c` from both sides.
    fn split_cost_range(&self, positive: usize, negative: usize) -> (Rational, Rational) {
        if self.is_basic(&self.symbols[negative]) {
            let (lower, upper) = self.cost_range(negative, Some(positive));
            return (-upper, -lower);
        }
        if self.is_basic(&self.symbols[positive]) {
            return self.cost_range(positive, Some(negative));
        }
        let (_, upper) = self.cost_range(positive, None);
        let (_, negated_lower) = self.cost_range(negative, None);
        (-negated_lower, upper)
    }

    /// Range of each row's right-hand side, from the columns of the basis inverse.
    pub fn variation_in_b(&mut self) -> Result<Vec<Interval>, SolveError> {
        self.ensure_optimal()?;
        let mut ranges = Vec::with_capacity(self.rows());
        for i in 0..self.rows() {
            let mut lower = Rational::NEG_INFINITY;
            let mut upper = Rational::INFINITY;
            for (k, d) in self.basis_inverse.column(i).into_iter().enumerate() {
                if d.is_positive() {
                    lower = lower.max(-(&self.rhs[k] / &d));
                } else if d.is_negative() {
                    upper = upper.min(-(&self.rhs[k] / &d));
                }
            }
            let b = &self.original_rhs[i];
            let (lower, upper) = (b + &lower, b + &upper);
            let (lower, upper) = if self.row_signs[i].is_negative() {
                (-upper, -lower)
            } else {
                (lower, upper)
            };
            ranges.push(Interval::new(format!("B{}", i + 1), lower, upper));
        }
        Ok(ranges)
    }
}
