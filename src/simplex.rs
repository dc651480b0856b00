use log::debug;
use num::Zero;

use crate::big_m::BigM;
use crate::error::SolveError;
use crate::rational::Rational;
use crate::solver::{Method, Solution, Status};
use crate::tableau::Tableau;

/// Outcome of one dual iteration.
enum DualStep {
    Continue,
    /// Primal feasible but not yet optimal: finish with primal pivots.
    Primal,
}

impl Tableau {
    /// Runs the Big-M primal Simplex until the status is terminal or an alternate optimum.
    ///
    /// Called on an alternate optimum, it first pivots in the next unexplored column with
    /// zero reduced cost. Called on a terminal status, it changes nothing.
    pub fn optimize_simplex(&mut self) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }
        if self.status == Status::Alternate {
            self.alternate_step();
        }
        while self.status == Status::Unoptimized {
            self.simplex_step();
        }
        self.status
    }

    /// Runs the dual Simplex. Once every right-hand side is non-negative any remaining
    /// negative reduced costs are cleared with primal pivots.
    pub fn optimize_dual_simplex(&mut self) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }
        if self.status == Status::Alternate {
            return self.optimize_simplex();
        }
        while self.status == Status::Unoptimized {
            if let DualStep::Primal = self.dual_step() {
                debug!("primal feasible, continuing with the primal simplex");
                return self.optimize_simplex();
            }
        }
        self.status
    }

    pub fn optimize(&mut self, method: Method) -> Status {
        match method {
            Method::Simplex => self.optimize_simplex(),
            Method::Dual => self.optimize_dual_simplex(),
        }
    }

    /// Every optimal vertex found by walking zero reduced-cost columns, stopping at the
    /// first repeated solution.
    pub fn solutions(&mut self, method: Method) -> Result<Vec<Solution>, SolveError> {
        let mut found: Vec<Solution> = Vec::new();
        loop {
            let status = if found.is_empty() {
                self.optimize(method)
            } else {
                self.optimize_simplex()
            };
            match status {
                Status::Optimized | Status::Alternate => {
                    let solution = self.solution()?;
                    if found.contains(&solution) {
                        return Ok(found);
                    }
                    found.push(solution);
                    if status == Status::Optimized {
                        return Ok(found);
                    }
                }
                // an unbounded edge of the optimal face ends the walk
                Status::Unbounded if !found.is_empty() => return Ok(found),
                _ => return self.solution().map(|s| vec![s]),
            }
        }
    }

    /// Optimality test over the current reduced costs; sets and returns the final status
    /// when no column improves the objective.
    fn check_optimal(&mut self) -> bool {
        if self.reduced_costs.iter().any(BigM::is_negative) {
            return false;
        }
        self.status = if self.has_artificial_basis() {
            Status::Infeasible
        } else if self.alternate_columns().next().is_some() {
            Status::Alternate
        } else {
            Status::Optimized
        };
        debug!("status {} with Z = {}", self.status, self.objective_value());
        self.min_ratios.clear();
        self.snapshot();
        true
    }

    /// Non-basic columns with a zero reduced cost. The idle half of a split variable whose
    /// other half is basic does not count: entering it leaves the point where it is.
    fn alternate_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.symbols.len()).filter(move |&j| {
            let symbol = &self.symbols[j];
            self.reduced_costs[j].is_zero()
                && !self.is_basic(symbol)
                && !self.twin(symbol).map_or(false, |t| self.is_basic(t))
        })
    }

    fn simplex_step(&mut self) {
        self.update_reduced_costs();
        if self.check_optimal() {
            return;
        }
        let entering = self.entering_column();
        self.enter(entering);
    }

    /// Pivots in the first zero reduced-cost column that has not been basic at any optimum
    /// visited so far.
    fn alternate_step(&mut self) {
        self.update_reduced_costs();
        self.explored.extend(self.basis.iter().cloned());
        let next = self
            .alternate_columns()
            .find(|&j| !self.explored.contains(&self.symbols[j]));
        self.status = Status::Unoptimized;
        match next {
            Some(entering) => {
                self.explored.insert(self.symbols[entering].clone());
                debug!("exploring alternate optimum through {}", self.symbols[entering]);
                self.enter(entering);
            }
            None => debug!("no unexplored alternate column left"),
        }
    }

    /// Column with the least `Zj - Cj`, the first one on ties.
    fn entering_column(&self) -> usize {
        (0..self.symbols.len())
            .min_by(|&a, &b| self.reduced_costs[a].cmp(&self.reduced_costs[b]))
            .unwrap_or_else(|| panic!("tableau has no columns"))
    }

    /// Minimum-ratio test and pivot for `entering`.
    fn enter(&mut self, entering: usize) {
        self.min_ratios = (0..self.rows())
            .map(|i| {
                let a = &self.matrix[(i, entering)];
                if a.is_positive() {
                    &self.rhs[i] / a
                } else {
                    Rational::INFINITY
                }
            })
            .collect();
        self.snapshot();
        match self.leaving_row(entering) {
            Some(row) => self.pivot(row, entering),
            None => {
                debug!("no limiting row for {}", self.symbols[entering]);
                self.status = Status::Unbounded;
            }
        }
    }

    /// Row with the minimum ratio. Ties are broken, when no artificial is basic, by the
    /// ratios `a(basis[k], row) / a(entering, row)` for k = 0, 1, .. in turn.
    fn leaving_row(&self, entering: usize) -> Option<usize> {
        let min = self.min_ratios.iter().min()?.clone();
        if min.is_infinite() {
            return None;
        }
        let mut tied: Vec<usize> = (0..self.rows()).filter(|&i| self.min_ratios[i] == min).collect();
        if tied.len() == 1 || self.has_artificial_basis() {
            return tied.first().copied();
        }
        debug!("degenerate tie between rows {:?}", tied);
        for k in 0..self.rows() {
            let col = self.column(&self.basis[k]);
            let ratios: Vec<(usize, Rational)> = tied
                .iter()
                .map(|&r| (r, &self.matrix[(r, col)] / &self.matrix[(r, entering)]))
                .collect();
            let min = ratios.iter().map(|(_, v)| v).min()?.clone();
            tied = ratios
                .into_iter()
                .filter(|(_, v)| *v == min)
                .map(|(r, _)| r)
                .collect();
            if tied.len() == 1 {
                return tied.first().copied();
            }
        }
        None
    }

    fn dual_step(&mut self) -> DualStep {
        self.update_reduced_costs();
        self.min_ratios.clear();
        let leaving = (0..self.rows()).min_by(|&a, &b| self.rhs[a].cmp(&self.rhs[b]));
        let leaving = match leaving {
            Some(row) if self.rhs[row].is_negative() => row,
            _ => {
                return if self.check_optimal() {
                    DualStep::Continue
                } else {
                    DualStep::Primal
                };
            }
        };

        // maximise (Zj - Cj) / a over the negative entries of the leaving row
        let mut entering: Option<(usize, BigM)> = None;
        for j in 0..self.symbols.len() {
            let a = &self.matrix[(leaving, j)];
            if !a.is_negative() {
                continue;
            }
            let ratio = self.reduced_costs[j].div(a);
            if entering.as_ref().map_or(true, |(_, best)| ratio > *best) {
                entering = Some((j, ratio));
            }
        }
        self.snapshot();
        match entering {
            Some((col, _)) => self.pivot(leaving, col),
            None => {
                debug!("row {} has no negative entry", leaving + 1);
                self.status = Status::Infeasible;
            }
        }
        DualStep::Continue
    }
}
