use thiserror::Error;

/// Errors raised while building problems, expressions or matrices from caller input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LppError {
    #[error("symbol name must not be empty")]
    EmptyName,

    #[error("`{0}` is a reserved symbol name")]
    ReservedName(String),

    #[error("cannot parse `{0}` as a rational number")]
    ParseRational(String),

    #[error("{0} has no exact rational representation")]
    InexactFloat(f64),

    #[error("matrix rows must all have {expected} columns, row {row} has {found}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("matrix is singular")]
    SingularMatrix,

    #[error("unsupported restriction `{0}`, expected `x ≥ 0` or an unrestricted marker")]
    UnsupportedRestriction(String),

    #[error("`{0}` is not an equation")]
    NotAnEquation(String),

    #[error("expected {expected} coefficients, got {found}")]
    ColumnLength { expected: usize, found: usize },

    #[error("symbol `{0}` is not a column of the tableau")]
    UnknownSymbol(String),

    #[error("symbol `{0}` is already a column of the tableau")]
    DuplicateSymbol(String),
}

/// Terminal outcomes of an optimisation that carry no solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("No feasible solution")]
    Infeasible,

    #[error("Unbounded Solution")]
    Unbounded,
}
