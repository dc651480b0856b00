//! Basic solutions of a system of linear equations.

use itertools::Itertools;
use log::debug;
use num::Zero;

use std::collections::BTreeMap;
use std::fmt;

use crate::constraint::Constraint;
use crate::error::LppError;
use crate::matrix::DenseMatrix;
use crate::rational::Rational;
use crate::var::Symbol;

/// One basic solution: the values of the chosen basic symbols, every other symbol being 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicSolution {
    values: BTreeMap<Symbol, Rational>,
}

impl BasicSolution {
    pub fn value(&self, symbol: &Symbol) -> Option<Rational> {
        self.values.get(symbol).cloned()
    }

    pub fn values(&self) -> &BTreeMap<Symbol, Rational> {
        &self.values
    }

    pub fn basic(&self) -> impl Iterator<Item = &Symbol> {
        self.values.keys()
    }

    /// No basic variable is negative.
    pub fn is_feasible(&self) -> bool {
        self.values.values().all(|v| !v.is_negative())
    }

    pub fn is_degenerate(&self) -> bool {
        self.values.values().any(Zero::is_zero)
    }
}

impl fmt::Display for BasicSolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let values: Vec<String> = self
            .values
            .iter()
            .map(|(s, v)| format!("{} = {}", s, v))
            .collect();
        write!(f, "{}", values.join(", "))
    }
}

/// Every basic solution of `equations`.
///
/// With `m` equations over `n` symbols, each choice of `min(m, n)` symbols (or of equations,
/// when there are more equations than symbols) whose square subsystem is non-singular gives
/// one solution. Singular choices are skipped.
pub fn basic_feasible_solutions(equations: &[Constraint]) -> Result<Vec<BasicSolution>, LppError> {
    if let Some(cons) = equations.iter().find(|c| !c.is_equation()) {
        return Err(LppError::NotAnEquation(cons.to_string()));
    }
    let rows: Vec<Constraint> = equations.iter().map(Constraint::normalized).collect();
    let symbols: Vec<Symbol> = rows
        .iter()
        .flat_map(Constraint::symbols)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    let m = rows.len();
    let n = symbols.len();
    let matrix = DenseMatrix::from_fn(m, n, |i, j| rows[i].lhs().coefficient(&symbols[j]));
    let rhs: Vec<Rational> = rows.iter().map(Constraint::rhs_value).collect();

    let k = m.min(n);
    let mut solutions = Vec::new();
    if m <= n {
        let all_rows: Vec<usize> = (0..m).collect();
        for cols in (0..n).combinations(k) {
            let Ok(inverse) = matrix.select(&all_rows, &cols).inverse() else {
                debug!("columns {:?} are linearly dependent", cols);
                continue;
            };
            let values = inverse.mul_vec(&rhs);
            solutions.push(BasicSolution {
                values: cols.iter().map(|&j| symbols[j].clone()).zip(values).collect(),
            });
        }
    } else {
        let all_cols: Vec<usize> = (0..n).collect();
        for chosen in (0..m).combinations(k) {
            let Ok(inverse) = matrix.select(&chosen, &all_cols).inverse() else {
                debug!("rows {:?} are linearly dependent", chosen);
                continue;
            };
            let sub_rhs: Vec<Rational> = chosen.iter().map(|&i| rhs[i].clone()).collect();
            let values: BTreeMap<Symbol, Rational> =
                symbols.iter().cloned().zip(inverse.mul_vec(&sub_rhs)).collect();
            // the remaining equations must hold as well
            if !rows.iter().all(|row| row.is_satisfied_by(&values)) {
                debug!("rows {:?} give a point off the other equations", chosen);
                continue;
            }
            let solution = BasicSolution { values };
            if !solutions.contains(&solution) {
                solutions.push(solution);
            }
        }
    }
    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::new(name).unwrap()
    }

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    #[test]
    fn test_two_equations_three_symbols() {
        let (x1, x2, x3) = (sym("x1"), sym("x2"), sym("x3"));
        let equations = vec![
            Constraint::equals(&x1 + 2 * &x2 + &x3, 4),
            Constraint::equals(2 * &x1 + &x2 + 5 * &x3, 5),
        ];
        let solutions = basic_feasible_solutions(&equations).unwrap();
        assert_eq!(solutions.len(), 3);

        assert_eq!(solutions[0].value(&x1), Some(r(2, 1)));
        assert_eq!(solutions[0].value(&x2), Some(r(1, 1)));
        assert_eq!(solutions[0].value(&x3), None);
        assert!(solutions[0].is_feasible());

        assert_eq!(solutions[1].value(&x1), Some(r(5, 1)));
        assert_eq!(solutions[1].value(&x3), Some(r(-1, 1)));
        assert!(!solutions[1].is_feasible());

        assert_eq!(solutions[2].value(&x2), Some(r(5, 3)));
        assert_eq!(solutions[2].value(&x3), Some(r(2, 3)));
        assert_eq!(solutions[2].to_string(), "x2 = 5/3, x3 = 2/3");

        for solution in &solutions {
            let mut point = solution.values().clone();
            for s in [&x1, &x2, &x3] {
                point.entry(s.clone()).or_insert_with(|| r(0, 1));
            }
            assert!(equations.iter().all(|e| e.is_satisfied_by(&point)));
        }
    }

    #[test]
    fn test_singular_choice_skipped() {
        let (x, y, z) = (sym("x"), sym("y"), sym("z"));
        // x and y only ever appear as x + y
        let equations = vec![
            Constraint::equals(&x + &y + &z, 3),
            Constraint::equals(2 * &x + 2 * &y - &z, 0),
        ];
        let solutions = basic_feasible_solutions(&equations).unwrap();
        assert_eq!(solutions.len(), 2);
        assert!(solutions.iter().all(|s| s.value(&z) == Some(r(2, 1))));
    }

    #[test]
    fn test_degenerate_solution() {
        let (x, y) = (sym("x"), sym("y"));
        let equations = vec![Constraint::equals(&x + &y, 0)];
        let solutions = basic_feasible_solutions(&equations).unwrap();
        assert_eq!(solutions.len(), 2);
        assert!(solutions.iter().all(|s| s.is_degenerate() && s.is_feasible()));
    }

    #[test]
    fn test_overdetermined_system() {
        let (x, y) = (sym("x"), sym("y"));
        let equations = vec![
            Constraint::equals(&x + &y, 2),
            Constraint::equals(&x - &y, 0),
            Constraint::equals(2 * &x, 2),
        ];
        let solutions = basic_feasible_solutions(&equations).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].value(&x), Some(r(1, 1)));
        assert_eq!(solutions[0].value(&y), Some(r(1, 1)));
    }

    #[test]
    fn test_inequality_rejected() {
        let x = sym("x");
        let result = basic_feasible_solutions(&[Constraint::le(&x, 1)]);
        assert!(matches!(result, Err(LppError::NotAnEquation(_))));
    }
}
