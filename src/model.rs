use std::collections::BTreeSet;
use std::fmt;

use num::One;
use tabular::{Row, Table};

use crate::constraint::{Comp, Constraint};
use crate::error::{LppError, SolveError};
use crate::linear_expr::LinearExpression;
use crate::rational::Rational;
use crate::solver::{Solution, Solver};
use crate::var::Symbol;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OptDir {
    Max,
    Min,
}

impl OptDir {
    pub fn flipped(self) -> Self {
        match self {
            OptDir::Max => OptDir::Min,
            OptDir::Min => OptDir::Max,
        }
    }
}

impl fmt::Display for OptDir {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptDir::Max => write!(f, "Max"),
            OptDir::Min => write!(f, "Min"),
        }
    }
}

/// An unrestricted variable replaced by the difference of two non-negative ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    pub original: Symbol,
    pub positive: Symbol,
    pub negative: Symbol,
}

impl Substitution {
    fn new(original: &Symbol) -> Self {
        Self {
            original: original.clone(),
            positive: original.derived("p"),
            negative: original.derived("n"),
        }
    }

    fn expr(&self) -> LinearExpression {
        &self.positive - &self.negative
    }
}

/// How a standardised problem relates to the problem it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Standardization {
    pub(crate) direction: OptDir,
    pub(crate) substitutions: Vec<Substitution>,
    /// `-1` for rows standardisation multiplied by `-1`.
    pub(crate) row_signs: Vec<Rational>,
}

/// A linear programming problem.
///
/// Problems are never mutated once built: `standardize`, `canonicalize` and `dual` all
/// return new problems.
#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    pub(crate) direction: OptDir,
    pub(crate) objective: LinearExpression,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) restrictions: Vec<Constraint>,
    pub(crate) origin: Option<Standardization>,
}

impl Problem {
    /// Builds a problem. Every restriction must be `x ≥ 0` or [`Constraint::unrestricted`];
    /// symbols without a restriction are taken to be non-negative.
    pub fn new(
        direction: OptDir,
        objective: LinearExpression,
        constraints: Vec<Constraint>,
        restrictions: Vec<Constraint>,
    ) -> Result<Self, LppError> {
        for restriction in &restrictions {
            let supported = restriction.restricted_symbol().is_some()
                && (restriction.is_unrestricted() || restriction.is_non_negativity());
            if !supported {
                return Err(LppError::UnsupportedRestriction(restriction.to_string()));
            }
        }
        Ok(Self {
            direction,
            objective,
            constraints,
            restrictions,
            origin: None,
        })
    }

    pub fn direction(&self) -> OptDir {
        self.direction
    }

    pub fn objective(&self) -> &LinearExpression {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn restrictions(&self) -> &[Constraint] {
        &self.restrictions
    }

    pub fn is_standard(&self) -> bool {
        self.origin.is_some()
    }

    /// Direction of the problem this was standardised from.
    pub fn original_direction(&self) -> OptDir {
        self.origin
            .as_ref()
            .map(|o| o.direction)
            .unwrap_or(self.direction)
    }

    /// Symbols of the objective and the constraints, in order.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols: BTreeSet<Symbol> = self.objective.symbols().into_iter().collect();
        for cons in &self.constraints {
            symbols.extend(cons.symbols());
        }
        symbols
    }

    pub fn is_unrestricted(&self, symbol: &Symbol) -> bool {
        self.restrictions
            .iter()
            .any(|r| r.is_unrestricted() && r.restricted_symbol() == Some(symbol))
    }

    fn unrestricted_symbols(&self) -> Vec<Symbol> {
        self.symbols()
            .into_iter()
            .filter(|s| self.is_unrestricted(s))
            .collect()
    }

    /// Standard form for the Big-M Simplex: a maximisation whose constraints are equations
    /// with non-negative right-hand sides.
    ///
    /// A minimisation objective is negated. Rows with a negative right-hand side are
    /// multiplied by `-1`, then every inequality gets a slack `s{i}` with coefficient `+1`
    /// for `≤` and `-1` for `≥`. Unrestricted variables are split into `x_p - x_n`.
    pub fn standardize(&self) -> Problem {
        self.standard_form(false)
    }

    /// Standard form for the dual Simplex: equalities are split, every `≥` row is multiplied
    /// by `-1` and every row gets a `+1` slack. Right-hand sides may stay negative.
    pub fn standardize_for_dual(&self) -> Problem {
        self.standard_form(true)
    }

    fn standard_form(&self, for_dual: bool) -> Problem {
        if self.is_standard() {
            return self.clone();
        }
        let mut objective = self.objective.clone();
        let mut constraints = self.constraints.clone();
        let mut substitutions = Vec::new();
        for symbol in self.unrestricted_symbols() {
            let sub = Substitution::new(&symbol);
            let expr = sub.expr();
            objective.replace_symbol(&symbol, &expr);
            constraints
                .iter_mut()
                .for_each(|c| c.replace_symbol(&symbol, &expr));
            substitutions.push(sub);
        }
        if self.direction == OptDir::Min {
            objective = -objective;
        }

        let mut rows = Vec::new();
        let mut row_signs = Vec::new();
        let mut slack_count = 0;
        for cons in constraints.iter().map(Constraint::normalized) {
            let comp = cons.comp.non_strict();
            let pieces = if for_dual && comp == Comp::Eq {
                vec![
                    Constraint { comp: Comp::Le, ..cons.clone() },
                    Constraint { comp: Comp::Ge, ..cons },
                ]
            } else {
                vec![Constraint { comp, ..cons }]
            };
            for mut row in pieces {
                let flip = if for_dual {
                    row.comp == Comp::Ge
                } else {
                    row.rhs_value().is_negative()
                };
                let sign = if flip {
                    row = row.negated();
                    -Rational::one()
                } else {
                    Rational::one()
                };
                if row.comp != Comp::Eq {
                    slack_count += 1;
                    let slack = Symbol::slack(slack_count);
                    if row.comp == Comp::Ge {
                        row.lhs -= &slack;
                    } else {
                        row.lhs += &slack;
                    }
                }
                row.comp = Comp::Eq;
                rows.push(row);
                row_signs.push(sign);
            }
        }

        let mut standard = Problem {
            direction: OptDir::Max,
            objective,
            constraints: rows,
            restrictions: Vec::new(),
            origin: Some(Standardization {
                direction: self.direction,
                substitutions,
                row_signs,
            }),
        };
        standard.restrictions = standard
            .symbols()
            .iter()
            .map(Constraint::non_negative)
            .collect();
        standard
    }

    /// Canonical form: equalities become a `≤`/`≥` pair, then every row is turned to `≤`
    /// for a maximisation or `≥` for a minimisation.
    pub fn canonicalize(&self) -> Problem {
        let target = self.canonical_comp();
        let mut constraints = Vec::new();
        for cons in self.constraints.iter().map(Constraint::normalized) {
            let comp = cons.comp.non_strict();
            let pieces = if comp == Comp::Eq {
                vec![
                    Constraint { comp: Comp::Le, ..cons.clone() },
                    Constraint { comp: Comp::Ge, ..cons },
                ]
            } else {
                vec![Constraint { comp, ..cons }]
            };
            constraints.extend(pieces.into_iter().map(|row| {
                if row.comp == target {
                    row
                } else {
                    row.negated()
                }
            }));
        }
        Problem {
            constraints,
            origin: None,
            ..self.clone()
        }
    }

    fn canonical_comp(&self) -> Comp {
        match self.direction {
            OptDir::Max => Comp::Le,
            OptDir::Min => Comp::Ge,
        }
    }

    /// The dual problem, with one variable `{prefix}{i}` per constraint.
    pub fn dual(&self, prefix: &str) -> Result<Problem, LppError> {
        if prefix.is_empty() {
            return Err(LppError::EmptyName);
        }
        let target = self.canonical_comp();
        let rows: Vec<Constraint> = self
            .constraints
            .iter()
            .map(|cons| {
                let cons = cons.normalized();
                let row = Constraint {
                    comp: cons.comp.non_strict(),
                    ..cons
                };
                if row.is_equation() || row.comp == target {
                    row
                } else {
                    row.negated()
                }
            })
            .collect();
        let duals = (1..=rows.len())
            .map(|i| Symbol::indexed(prefix, i))
            .collect::<Result<Vec<_>, _>>()?;

        let objective = rows
            .iter()
            .zip(&duals)
            .map(|(row, w)| row.rhs_value() * w)
            .sum::<LinearExpression>()
            + self.objective.constant();
        let comp = match self.direction {
            OptDir::Max => Comp::Ge,
            OptDir::Min => Comp::Le,
        };
        let constraints = self
            .symbols()
            .iter()
            .map(|x| {
                let lhs: LinearExpression = rows
                    .iter()
                    .zip(&duals)
                    .map(|(row, w)| row.lhs.coefficient(x) * w)
                    .sum();
                let comp = if self.is_unrestricted(x) { Comp::Eq } else { comp };
                Constraint::new(lhs, comp, self.objective.coefficient(x))
            })
            .collect();
        let restrictions = rows
            .iter()
            .zip(&duals)
            .map(|(row, w)| {
                if row.is_equation() {
                    Constraint::unrestricted(w)
                } else {
                    Constraint::non_negative(w)
                }
            })
            .collect();
        Problem::new(self.direction.flipped(), objective, constraints, restrictions)
    }

    /// Solves with the primal Simplex.
    pub fn optimize(&self) -> Result<Solution, SolveError> {
        Solver::new().solve(self)
    }

    /// Every optimal vertex reachable by pivoting on zero reduced costs.
    pub fn solutions(&self) -> Result<Vec<Solution>, SolveError> {
        Solver::new().solutions(self)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        //label, lhs, comp, rhs
        let mut table = Table::new("{:<}  {:>} {:^} {:<}");
        table.add_row(
            Row::new()
                .with_cell(self.direction)
                .with_cell("Z")
                .with_cell("=")
                .with_cell(&self.objective),
        );
        for (i, cons) in self.constraints.iter().enumerate() {
            let label = if i == 0 { "subject to" } else { "" };
            table.add_row(
                Row::new()
                    .with_cell(label)
                    .with_cell(&cons.lhs)
                    .with_cell(cons.comp)
                    .with_cell(&cons.rhs),
            );
        }
        for restriction in &self.restrictions {
            let row = Row::new().with_cell("").with_cell(&restriction.lhs);
            let row = if restriction.is_unrestricted() {
                row.with_cell("").with_cell("unrestricted")
            } else {
                row.with_cell(restriction.comp).with_cell(&restriction.rhs)
            };
            table.add_row(row);
        }
        write!(f, "{}", table)
    }
}
