use std::fmt;

use crate::error::LppError;

/// Role a symbol plays in a problem. Slack and artificial symbols are only ever created
/// by standardisation and tableau construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    Decision,
    Slack,
    Artificial,
}

impl Default for SymbolKind {
    fn default() -> Self {
        SymbolKind::Decision
    }
}

/// Names the solver keeps for itself: the right-hand-side column, the big-M penalty and
/// the objective value in a solution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReservedSymbol {
    Rhs,
    Penalty,
    Objective,
}

impl ReservedSymbol {
    pub const ALL: [ReservedSymbol; 3] = [
        ReservedSymbol::Rhs,
        ReservedSymbol::Penalty,
        ReservedSymbol::Objective,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReservedSymbol::Rhs => "B",
            ReservedSymbol::Penalty => "M",
            ReservedSymbol::Objective => "Z",
        }
    }

    pub fn is_reserved(name: &str) -> bool {
        Self::ALL.iter().any(|r| r.name() == name)
    }
}

impl fmt::Display for ReservedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A variable name. Tableau columns, cost entries and solution values are keyed by it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    /// A user decision variable. Reserved names (`B`, `M`, `Z`) are rejected.
    pub fn new<T: ToString>(name: T) -> Result<Self, LppError> {
        let name = name.to_string();
        if name.is_empty() {
            return Err(LppError::EmptyName);
        }
        if ReservedSymbol::is_reserved(&name) {
            return Err(LppError::ReservedName(name));
        }
        Ok(Self {
            name,
            kind: SymbolKind::Decision,
        })
    }

    /// `{prefix}{index}`, e.g. the dual variables `w1, w2, ..`.
    pub fn indexed(prefix: &str, index: usize) -> Result<Self, LppError> {
        Self::new(format!("{}{}", prefix, index))
    }

    pub(crate) fn slack(index: usize) -> Self {
        Self {
            name: format!("s{}", index),
            kind: SymbolKind::Slack,
        }
    }

    pub(crate) fn artificial(index: usize) -> Self {
        Self {
            name: format!("A{}", index),
            kind: SymbolKind::Artificial,
        }
    }

    /// Decision symbol derived from this one, e.g. `x_p` for the positive part of `x`.
    pub(crate) fn derived(&self, suffix: &str) -> Self {
        Self {
            name: format!("{}_{}", self.name, suffix),
            kind: SymbolKind::Decision,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_decision(&self) -> bool {
        self.kind == SymbolKind::Decision
    }

    pub fn is_slack(&self) -> bool {
        self.kind == SymbolKind::Slack
    }

    pub fn is_artificial(&self) -> bool {
        self.kind == SymbolKind::Artificial
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.name)
    }
}
