//! Exact-rational linear programming: Big-M primal Simplex, dual Simplex, alternate optima,
//! sensitivity ranging, dual problems and basic solutions of linear systems.

pub mod bfs;
pub mod big_m;
pub mod constraint;
pub mod error;
pub mod linear_expr;
pub mod matrix;
pub mod model;
pub mod print_table;
pub mod rational;
pub mod sensitivity;
pub mod simplex;
pub mod solver;
pub mod tableau;
pub mod var;

pub use bfs::{basic_feasible_solutions, BasicSolution};
pub use big_m::BigM;
pub use constraint::{Comp, Constraint, Interval};
pub use error::{LppError, SolveError};
pub use linear_expr::{LinearExpression, Term};
pub use model::{OptDir, Problem};
pub use rational::Rational;
pub use sensitivity::Sensitivity;
pub use solver::{Method, Solution, Solver, Status};
pub use tableau::Tableau;
pub use var::{ReservedSymbol, Symbol, SymbolKind};
