use std::collections::BTreeMap;
use std::fmt;

use crate::error::SolveError;
use crate::model::Problem;
use crate::rational::Rational;
use crate::sensitivity::Sensitivity;
use crate::tableau::Tableau;
use crate::var::{ReservedSymbol, Symbol};

/// Where a tableau is in its iteration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Unoptimized,
    Optimized,
    Infeasible,
    Unbounded,
    /// Optimal, with at least one non-basic column at zero reduced cost.
    Alternate,
}

impl Status {
    /// States a further call to an optimiser leaves untouched.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Optimized | Status::Infeasible | Status::Unbounded)
    }

    pub fn is_optimal(self) -> bool {
        matches!(self, Status::Optimized | Status::Alternate)
    }

    /// The diagnostic for a status that carries no solution.
    pub fn error(self) -> Option<SolveError> {
        match self {
            Status::Infeasible => Some(SolveError::Infeasible),
            Status::Unbounded => Some(SolveError::Unbounded),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Status::Unoptimized => "unoptimized",
            Status::Optimized => "optimized",
            Status::Infeasible => "infeasible",
            Status::Unbounded => "unbounded",
            Status::Alternate => "alternate optimum",
        };
        f.pad(text)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// Big-M primal Simplex on the standard form.
    #[default]
    Simplex,
    /// Dual Simplex on the canonical form, finishing with primal pivots when needed.
    Dual,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Method::Simplex => write!(f, "simplex"),
            Method::Dual => write!(f, "dual simplex"),
        }
    }
}

/// Values of the decision variables at an optimum, and the objective value `Z`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    values: BTreeMap<Symbol, Rational>,
    objective: Rational,
}

impl Solution {
    pub fn new(values: BTreeMap<Symbol, Rational>, objective: Rational) -> Self {
        Self { values, objective }
    }

    pub fn value(&self, symbol: &Symbol) -> Option<Rational> {
        self.values.get(symbol).cloned()
    }

    /// Value of the decision variable called `name`.
    pub fn value_of(&self, name: &str) -> Option<Rational> {
        self.values
            .iter()
            .find(|(s, _)| s.name() == name)
            .map(|(_, v)| v.clone())
    }

    pub fn objective(&self) -> Rational {
        self.objective.clone()
    }

    pub fn values(&self) -> &BTreeMap<Symbol, Rational> {
        &self.values
    }

    /// Name-keyed map including the objective under `Z`.
    pub fn to_map(&self) -> BTreeMap<String, Rational> {
        let mut map: BTreeMap<String, Rational> = self
            .values
            .iter()
            .map(|(s, v)| (s.name().to_string(), v.clone()))
            .collect();
        map.insert(ReservedSymbol::Objective.name().to_string(), self.objective.clone());
        map
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (symbol, value) in &self.values {
            write!(f, "{} = {}, ", symbol, value)?;
        }
        write!(f, "{} = {}", ReservedSymbol::Objective, self.objective)
    }
}

/// Solver configuration.
///
/// ```ignore
/// let solution = Solver::new().with_method(Method::Dual).solve(&problem)?;
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Solver {
    method: Method,
    trace: bool,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Keep a rendering of every intermediate tableau.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The initial tableau of `problem` in the form the configured method expects.
    pub fn tableau(&self, problem: &Problem) -> Tableau {
        let standard = match (self.method, problem.is_standard()) {
            (_, true) => problem.clone(),
            (Method::Simplex, false) => problem.standardize(),
            (Method::Dual, false) => problem.canonicalize().standardize_for_dual(),
        };
        let mut tableau = Tableau::new(&standard);
        tableau.record_trace(self.trace);
        tableau
    }

    pub fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        let mut tableau = self.tableau(problem);
        tableau.optimize(self.method);
        tableau.solution()
    }

    pub fn solutions(&self, problem: &Problem) -> Result<Vec<Solution>, SolveError> {
        self.tableau(problem).solutions(self.method)
    }

    pub fn sensitivity(&self, problem: &Problem) -> Result<Sensitivity, SolveError> {
        let mut tableau = self.tableau(problem);
        tableau.optimize(self.method);
        tableau.sensitivity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::new(name).unwrap()
    }

    #[test]
    fn test_solution_display_and_map() {
        let solution = Solution::new(
            BTreeMap::from([(sym("x"), Rational::from(3)), (sym("y"), Rational::new(1, 2))]),
            Rational::from(11),
        );
        assert_eq!(solution.to_string(), "x = 3, y = 1/2, Z = 11");
        assert_eq!(solution.value_of("y"), Some(Rational::new(1, 2)));
        assert_eq!(solution.value(&sym("z")), None);
        let map = solution.to_map();
        assert_eq!(map["Z"], Rational::from(11));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_status() {
        assert!(Status::Optimized.is_terminal());
        assert!(!Status::Alternate.is_terminal());
        assert!(Status::Alternate.is_optimal());
        assert_eq!(Status::Unbounded.error(), Some(SolveError::Unbounded));
        assert_eq!(Status::Optimized.error(), None);
    }

    #[test]
    fn test_builder() {
        let solver = Solver::new().with_method(Method::Dual).with_trace(true);
        assert_eq!(solver.method(), Method::Dual);
        assert_eq!(Solver::new().method(), Method::Simplex);
    }
}
