//! The computational table the Simplex variants pivot on.
//!
//! Columns are keyed by [`Symbol`]; the right-hand side is a separate vector and the basis
//! holds one symbol per row. Every basic column is a unit column at all times outside a
//! pivot.

use log::{debug, log_enabled, trace, Level};
use num::{One, Zero};
use rustc_hash::FxHashSet;

use std::collections::BTreeMap;
use std::fmt;

use crate::big_m::BigM;
use crate::error::{LppError, SolveError};
use crate::matrix::DenseMatrix;
use crate::model::{OptDir, Problem, Substitution};
use crate::print_table::{Align, PrintTable};
use crate::rational::Rational;
use crate::solver::{Solution, Status};
use crate::var::Symbol;

#[derive(Clone, Debug)]
pub struct Tableau {
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) costs: Vec<BigM>,
    pub(crate) matrix: DenseMatrix<Rational>,
    pub(crate) rhs: Vec<Rational>,
    pub(crate) basis: Vec<Symbol>,
    pub(crate) reduced_costs: Vec<BigM>,
    pub(crate) min_ratios: Vec<Rational>,
    pub(crate) status: Status,
    /// Row operations applied so far, i.e. the inverse of the current basis matrix.
    pub(crate) basis_inverse: DenseMatrix<Rational>,
    pub(crate) original_rhs: Vec<Rational>,
    pub(crate) row_signs: Vec<Rational>,
    pub(crate) direction: OptDir,
    pub(crate) substitutions: Vec<Substitution>,
    pub(crate) constant: Rational,
    /// Removed while basic; deleted as soon as they leave the basis.
    pub(crate) retired: FxHashSet<Symbol>,
    /// Columns already entered while enumerating alternate optima.
    pub(crate) explored: FxHashSet<Symbol>,
    trace: Option<Vec<String>>,
}

impl Tableau {
    /// Builds the initial table of a standardised problem. Rows without a unit column get an
    /// artificial variable `A{j}` costing `-M`.
    ///
    /// Panics if the problem is not in standard form.
    pub fn new(problem: &Problem) -> Self {
        let Some(origin) = problem.origin.clone() else {
            panic!("tableau built from a problem that is not standardised");
        };
        for cons in &problem.constraints {
            assert!(cons.is_equation(), "Non equality constraint {}", cons);
            assert!(cons.rhs.is_constant(), "Variable(s) on rhs of constraint {}", cons);
            assert!(cons.lhs.constant().is_zero(), "Constant on lhs of constraint {}", cons);
        }

        let mut symbols: Vec<Symbol> = problem.symbols().into_iter().collect();
        let mut costs: Vec<BigM> = symbols
            .iter()
            .map(|s| BigM::plain(problem.objective.coefficient(s)))
            .collect();
        let m = problem.constraints.len();
        let rhs: Vec<Rational> = problem.constraints.iter().map(|c| c.rhs_value()).collect();
        let mut columns: Vec<Vec<Rational>> = symbols
            .iter()
            .map(|s| {
                problem
                    .constraints
                    .iter()
                    .map(|c| c.lhs.coefficient(s))
                    .collect()
            })
            .collect();

        //find basic vars
        let mut basis = Vec::with_capacity(m);
        let mut artificials = 0;
        for i in 0..m {
            let unit = columns.iter().position(|col| is_unit(col, i));
            match unit {
                Some(j) => basis.push(symbols[j].clone()),
                None => {
                    artificials += 1;
                    let artificial = Symbol::artificial(artificials);
                    debug!("row {} has no unit column, adding {}", i + 1, artificial);
                    columns.push((0..m).map(|r| unit_entry(r, i)).collect());
                    costs.push(BigM::neg_m());
                    basis.push(artificial.clone());
                    symbols.push(artificial);
                }
            }
        }

        let matrix = DenseMatrix::from_fn(m, symbols.len(), |i, j| columns[j][i].clone());
        let mut tableau = Self {
            symbols,
            costs,
            matrix,
            original_rhs: rhs.clone(),
            rhs,
            basis,
            reduced_costs: Vec::new(),
            min_ratios: Vec::new(),
            status: Status::Unoptimized,
            basis_inverse: DenseMatrix::identity(m),
            row_signs: origin.row_signs,
            direction: origin.direction,
            substitutions: origin.substitutions,
            constant: problem.objective.constant(),
            retired: FxHashSet::default(),
            explored: FxHashSet::default(),
            trace: None,
        };
        tableau.update_reduced_costs();
        tableau
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn basis(&self) -> &[Symbol] {
        &self.basis
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn rhs(&self) -> &[Rational] {
        &self.rhs
    }

    pub fn rows(&self) -> usize {
        self.basis.len()
    }

    /// Direction of the problem the table was built for.
    pub fn direction(&self) -> OptDir {
        self.direction
    }

    /// `Zj - Cj` per column, as of the last iteration.
    pub fn reduced_costs(&self) -> &[BigM] {
        &self.reduced_costs
    }

    /// Minimum-ratio column of the last primal iteration. Empty after a dual iteration.
    pub fn min_ratios(&self) -> &[Rational] {
        &self.min_ratios
    }

    pub fn column_index(&self, symbol: &Symbol) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Panics if `symbol` is not a column.
    pub(crate) fn column(&self, symbol: &Symbol) -> usize {
        self.column_index(symbol)
            .unwrap_or_else(|| panic!("symbol {} is not a column of the tableau", symbol))
    }

    pub fn cost(&self, symbol: &Symbol) -> &BigM {
        &self.costs[self.column(symbol)]
    }

    pub fn reduced_cost(&self, symbol: &Symbol) -> &BigM {
        &self.reduced_costs[self.column(symbol)]
    }

    pub fn coefficient(&self, symbol: &Symbol, row: usize) -> &Rational {
        &self.matrix[(row, self.column(symbol))]
    }

    pub fn is_basic(&self, symbol: &Symbol) -> bool {
        self.basis.contains(symbol)
    }

    pub(crate) fn basis_row(&self, symbol: &Symbol) -> Option<usize> {
        self.basis.iter().position(|s| s == symbol)
    }

    /// The split of the unrestricted variable `symbol` is one half of.
    pub(crate) fn substitution_of(&self, symbol: &Symbol) -> Option<&Substitution> {
        self.substitutions
            .iter()
            .find(|sub| &sub.positive == symbol || &sub.negative == symbol)
    }

    /// The other half of a split variable.
    pub(crate) fn twin(&self, symbol: &Symbol) -> Option<&Symbol> {
        self.substitution_of(symbol).map(|sub| {
            if &sub.positive == symbol {
                &sub.negative
            } else {
                &sub.positive
            }
        })
    }

    /// An artificial, or a removed variable, still holds a row.
    pub(crate) fn has_artificial_basis(&self) -> bool {
        self.basis
            .iter()
            .any(|s| s.is_artificial() || self.retired.contains(s))
    }

    /// Objective value of the current basis in standard (maximisation) terms.
    pub fn objective_value(&self) -> BigM {
        self.basis
            .iter()
            .zip(&self.rhs)
            .fold(BigM::plain(self.constant.clone()), |acc, (s, b)| acc + self.cost(s) * b)
    }

    pub(crate) fn update_reduced_costs(&mut self) {
        let basic_costs: Vec<BigM> = self.basis.iter().map(|s| self.cost(s).clone()).collect();
        self.reduced_costs = (0..self.symbols.len())
            .map(|j| {
                let zj = basic_costs
                    .iter()
                    .enumerate()
                    .fold(BigM::zero(), |acc, (i, c)| acc + c * &self.matrix[(i, j)]);
                zj - &self.costs[j]
            })
            .collect();
    }

    /// Keep a rendering of every intermediate table in [`Tableau::trace`].
    pub fn record_trace(&mut self, enabled: bool) {
        self.trace = if enabled { Some(Vec::new()) } else { None };
    }

    pub fn trace(&self) -> &[String] {
        self.trace.as_deref().unwrap_or(&[])
    }

    pub(crate) fn snapshot(&mut self) {
        if self.trace.is_none() && !log_enabled!(Level::Trace) {
            return;
        }
        let rendered = self.to_string();
        trace!("\n{}", rendered);
        if let Some(trace) = self.trace.as_mut() {
            trace.push(rendered);
        }
    }

    /// Gauss-Jordan step around `(row, col)`; `col` enters the basis at `row`.
    ///
    /// Rows other than the pivot row are updated in the cross-multiplied form
    /// `(a·p - b·c) / p`. An artificial or removed variable leaving the basis is deleted.
    pub(crate) fn pivot(&mut self, row: usize, col: usize) {
        let pivot = self.matrix[(row, col)].clone();
        assert!(!pivot.is_zero(), "pivot on a zero element at ({}, {})", row, col);
        let n = self.symbols.len();
        let m = self.rows();

        for r in (0..m).filter(|&r| r != row) {
            let c = self.matrix[(r, col)].clone();
            if c.is_zero() {
                continue;
            }
            for j in 0..n {
                self.matrix[(r, j)] = cross(&self.matrix[(r, j)], &self.matrix[(row, j)], &pivot, &c);
            }
            for j in 0..m {
                self.basis_inverse[(r, j)] =
                    cross(&self.basis_inverse[(r, j)], &self.basis_inverse[(row, j)], &pivot, &c);
            }
            self.rhs[r] = cross(&self.rhs[r], &self.rhs[row], &pivot, &c);
        }
        self.matrix.scale_row(row, &pivot);
        self.basis_inverse.scale_row(row, &pivot);
        self.rhs[row] = &self.rhs[row] / &pivot;

        let entering = self.symbols[col].clone();
        let leaving = std::mem::replace(&mut self.basis[row], entering.clone());
        debug!(
            "pivot on {} at row {} (element {}): {} enters, {} leaves",
            entering,
            row + 1,
            pivot,
            entering,
            leaving
        );
        if leaving.is_artificial() || self.retired.remove(&leaving) {
            debug!("deleting column {}", leaving);
            self.delete_column(self.column(&leaving));
        }
    }

    fn delete_column(&mut self, j: usize) {
        let symbol = self.symbols.remove(j);
        self.costs.remove(j);
        self.matrix = self.matrix.without_column(j);
        if j < self.reduced_costs.len() {
            self.reduced_costs.remove(j);
        }
        self.explored.remove(&symbol);
    }

    /// Adds a column for `symbol` with objective coefficient `cost` and constraint
    /// coefficients `column` (one per row, in the orientation the rows were written in).
    /// The table must be optimised again afterwards.
    pub fn add_variable(&mut self, symbol: Symbol, cost: Rational, column: &[Rational]) -> Result<(), LppError> {
        if column.len() != self.rows() {
            return Err(LppError::ColumnLength {
                expected: self.rows(),
                found: column.len(),
            });
        }
        if self.column_index(&symbol).is_some() {
            return Err(LppError::DuplicateSymbol(symbol.name().to_string()));
        }
        let oriented: Vec<Rational> = column
            .iter()
            .zip(&self.row_signs)
            .map(|(a, sign)| a * sign)
            .collect();
        let current = self.basis_inverse.mul_vec(&oriented);
        let cost = match self.direction {
            OptDir::Max => cost,
            OptDir::Min => -cost,
        };
        debug!("adding column {} with cost {}", symbol, cost);
        self.matrix = self.matrix.with_column(&current);
        self.symbols.push(symbol);
        self.costs.push(BigM::plain(cost));
        self.reset();
        Ok(())
    }

    /// Removes `symbol` from the problem. A basic variable is penalised with `-M` and
    /// deleted once it leaves the basis. The table must be optimised again afterwards.
    pub fn remove_variable(&mut self, symbol: &Symbol) -> Result<(), LppError> {
        let Some(j) = self.column_index(symbol) else {
            return Err(LppError::UnknownSymbol(symbol.name().to_string()));
        };
        if self.is_basic(symbol) {
            debug!("retiring basic column {}", symbol);
            self.costs[j] = BigM::neg_m();
            self.retired.insert(symbol.clone());
        } else {
            debug!("deleting column {}", symbol);
            self.delete_column(j);
        }
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.status = Status::Unoptimized;
        self.explored.clear();
        self.min_ratios.clear();
        self.update_reduced_costs();
    }

    /// The solution at the current basis.
    ///
    /// Panics if the table has not been optimised.
    pub fn solution(&self) -> Result<Solution, SolveError> {
        if let Some(err) = self.status.error() {
            return Err(err);
        }
        assert!(self.status.is_optimal(), "solution requested from an unoptimized tableau");

        let mut values: BTreeMap<Symbol, Rational> = self
            .symbols
            .iter()
            .filter(|s| s.is_decision() && !self.retired.contains(*s))
            .map(|s| {
                let value = self
                    .basis_row(s)
                    .map(|row| self.rhs[row].clone())
                    .unwrap_or_else(Rational::zero);
                (s.clone(), value)
            })
            .collect();
        for sub in &self.substitutions {
            let positive = values.remove(&sub.positive).unwrap_or_else(Rational::zero);
            let negative = values.remove(&sub.negative).unwrap_or_else(Rational::zero);
            values.insert(sub.original.clone(), positive - negative);
        }

        let z = self.objective_value().plain_part().clone();
        let z = match self.direction {
            OptDir::Max => z,
            OptDir::Min => -z,
        };
        Ok(Solution::new(values, z))
    }
}

fn is_unit(column: &[Rational], row: usize) -> bool {
    column
        .iter()
        .enumerate()
        .all(|(r, v)| *v == unit_entry(r, row))
}

fn unit_entry(r: usize, row: usize) -> Rational {
    if r == row {
        Rational::one()
    } else {
        Rational::zero()
    }
}

/// `(a·p - b·c) / p`: entry `a` of a row whose pivot-column entry is `c`, against entry
/// `b` of the pivot row with pivot `p`.
fn cross(a: &Rational, b: &Rational, p: &Rational, c: &Rational) -> Rational {
    (a * p - b * c) / p
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let n = self.symbols.len();
        let mut rows: Vec<Vec<String>> = Vec::with_capacity(self.rows() + 3);

        let mut cost_row = vec![String::new(), String::new(), "Cj".to_string()];
        cost_row.extend(self.costs.iter().map(|c| c.to_string()));
        cost_row.push(String::new());
        rows.push(cost_row);

        let mut header = vec!["BV".to_string(), "C".to_string(), "B".to_string()];
        header.extend(self.symbols.iter().map(|s| s.to_string()));
        header.push("MR".to_string());
        rows.push(header);

        for (i, symbol) in self.basis.iter().enumerate() {
            let mut row = vec![symbol.to_string(), self.cost(symbol).to_string(), self.rhs[i].to_string()];
            row.extend((0..n).map(|j| self.matrix[(i, j)].to_string()));
            row.push(match self.min_ratios.get(i) {
                Some(r) if r.is_infinite() => "-ve".to_string(),
                Some(r) => r.to_string(),
                None => String::new(),
            });
            rows.push(row);
        }

        let mut z_row = vec!["Z".to_string(), String::new(), self.objective_value().to_string()];
        z_row.extend((0..n).map(|j| {
            self.reduced_costs
                .get(j)
                .map(|z| z.to_string())
                .unwrap_or_default()
        }));
        z_row.push("Zj-Cj".to_string());
        rows.push(z_row);

        let last_basis_row = self.rows() + 1;
        let table = PrintTable::from_rows(rows)
            .with_rule_after(0)
            .with_rule_after(1)
            .with_rule_after(last_basis_row)
            .with_alignment(0, Align::Left);
        write!(f, "{}", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::linear_expr::LinearExpression;

    fn sym(name: &str) -> Symbol {
        Symbol::new(name).unwrap()
    }

    fn production() -> Problem {
        let x = sym("x");
        let y = sym("y");
        Problem::new(
            OptDir::Max,
            3 * &x + 2 * &y,
            vec![Constraint::le(&x + &y, 4), Constraint::le(&x - &y, 2)],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_slacks_form_initial_basis() {
        let tableau = Tableau::new(&production().standardize());
        assert_eq!(tableau.basis(), &[Symbol::slack(1), Symbol::slack(2)]);
        let names: Vec<&str> = tableau.symbols().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["s1", "s2", "x", "y"]);
        assert_eq!(tableau.rhs(), &[Rational::from(4), Rational::from(2)]);
        assert_eq!(tableau.reduced_cost(&sym("x")), &BigM::plain(Rational::from(-3)));
        assert_eq!(tableau.status(), Status::Unoptimized);
    }

    #[test]
    fn test_artificials_added_for_missing_unit_columns() {
        let x = sym("x");
        let y = sym("y");
        let problem = Problem::new(
            OptDir::Max,
            &x + &y,
            vec![Constraint::equals(&x + &y, 2), Constraint::ge(&x - &y, 1)],
            vec![],
        )
        .unwrap();
        let tableau = Tableau::new(&problem.standardize());
        assert_eq!(tableau.basis(), &[Symbol::artificial(1), Symbol::artificial(2)]);
        assert_eq!(tableau.cost(&Symbol::artificial(1)), &BigM::neg_m());
        // Zj - Cj of x is -M·2 - 1
        assert_eq!(
            tableau.reduced_cost(&x),
            &BigM::new(Rational::from(-1), Rational::from(-2))
        );
    }

    #[test]
    #[should_panic(expected = "not standardised")]
    fn test_general_problem_rejected() {
        let _ = Tableau::new(&production());
    }

    #[test]
    fn test_pivot_keeps_unit_basis_columns() {
        let mut tableau = Tableau::new(&production().standardize());
        let x = sym("x");
        tableau.pivot(1, tableau.column(&x));
        assert_eq!(tableau.basis(), &[Symbol::slack(1), x.clone()]);
        assert_eq!(tableau.rhs(), &[Rational::from(2), Rational::from(2)]);
        assert_eq!(tableau.coefficient(&x, 0), &Rational::zero());
        assert_eq!(tableau.coefficient(&x, 1), &Rational::one());
        assert_eq!(tableau.coefficient(&sym("y"), 0), &Rational::from(2));
        // B⁻¹ records the row operation: r0 -= r1
        assert_eq!(tableau.basis_inverse.row(0), vec![Rational::one(), -Rational::one()]);
    }

    #[test]
    fn test_artificial_column_deleted_when_leaving() {
        let x = sym("x");
        let problem = Problem::new(
            OptDir::Max,
            LinearExpression::from(&x),
            vec![Constraint::equals(2 * &x, 4)],
            vec![],
        )
        .unwrap();
        let mut tableau = Tableau::new(&problem.standardize());
        assert_eq!(tableau.symbols().len(), 2);
        tableau.pivot(0, tableau.column(&x));
        assert_eq!(tableau.symbols(), &[x.clone()]);
        assert_eq!(tableau.rhs(), &[Rational::from(2)]);
    }

    #[test]
    fn test_add_and_remove_variable_errors() {
        let mut tableau = Tableau::new(&production().standardize());
        assert_eq!(
            tableau.add_variable(sym("z"), Rational::one(), &[Rational::one()]),
            Err(LppError::ColumnLength { expected: 2, found: 1 })
        );
        assert_eq!(
            tableau.add_variable(sym("x"), Rational::one(), &[Rational::one(), Rational::one()]),
            Err(LppError::DuplicateSymbol("x".to_string()))
        );
        assert_eq!(
            tableau.remove_variable(&sym("w")),
            Err(LppError::UnknownSymbol("w".to_string()))
        );
        assert!(tableau.remove_variable(&sym("y")).is_ok());
        assert!(tableau.column_index(&sym("y")).is_none());
        assert!(tableau.remove_variable(&Symbol::slack(1)).is_ok());
        assert!(tableau.retired.contains(&Symbol::slack(1)));
    }

    #[test]
    fn test_display_layout() {
        let tableau = Tableau::new(&production().standardize());
        let text = tableau.to_string();
        let lines: Vec<&str> = text.lines().collect();
        // top, cost row, rule, header, rule, 2 basis rows, rule, Zj-Cj row, bottom
        assert_eq!(lines.len(), 10);
        assert!(lines[1].contains("Cj"));
        assert!(lines[3].contains("BV") && lines[3].contains("MR"));
        assert!(lines[8].contains("Zj-Cj"));
        assert!(lines[8].contains("-3"));
    }

    #[test]
    fn test_trace_recording() {
        let mut tableau = Tableau::new(&production().standardize());
        assert!(tableau.trace().is_empty());
        tableau.record_trace(true);
        tableau.snapshot();
        assert_eq!(tableau.trace().len(), 1);
        assert_eq!(tableau.trace()[0], tableau.to_string());
    }
}
