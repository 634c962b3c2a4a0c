//! Condition operators.
//!
//! Any type can act as the operator of a [`Condition`](crate::condition::Condition) by
//! implementing [`Operator`]. The crate ships [`ComparisonOperator`] for the usual
//! relational symbols and [`SymbolOperator`] for free-form symbols met while
//! transcoding.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// Capability required from a condition operator.
pub trait Operator: fmt::Debug + Send + Sync {
    /// Text placed between keyword and expression.
    fn symbol(&self) -> String;

    /// Family the operator belongs to (e.g. `"comparison"`).
    fn context(&self) -> String;
}

/// Returns true when both operators render the same symbol within the same context.
pub fn same_operator(a: &dyn Operator, b: &dyn Operator) -> bool {
    a.symbol() == b.symbol() && a.context() == b.context()
}

/// Relational comparison operators.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComparisonOperator {
    /// Equal (`=`)
    Eq,
    /// Not equal (`!=`)
    Ne,
    /// Less than (`<`)
    Lt,
    /// Greater than (`>`)
    Gt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than or equal (`>=`)
    Ge,
}

impl ComparisonOperator {
    pub const CONTEXT: &'static str = "comparison";

    /// Creates a [`ComparisonOperator`] from its symbol.
    pub fn from_symbol(s: &str) -> Option<Self> {
        ComparisonOperator::iter().find(|op| op.to_str() == s)
    }

    /// Returns the symbol of the [`ComparisonOperator`].
    pub fn to_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Ge => ">=",
        }
    }
}

impl Operator for ComparisonOperator {
    fn symbol(&self) -> String {
        self.to_str().to_string()
    }

    fn context(&self) -> String {
        Self::CONTEXT.to_string()
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Free-form operator carrying only its symbol.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SymbolOperator(pub String);

impl SymbolOperator {
    pub const CONTEXT: &'static str = "symbol";

    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }
}

impl Operator for SymbolOperator {
    fn symbol(&self) -> String {
        self.0.clone()
    }

    fn context(&self) -> String {
        Self::CONTEXT.to_string()
    }
}

/// Resolve a symbol to a [`ComparisonOperator`] when possible, else wrap it verbatim.
pub(crate) fn operator_from_symbol(symbol: &str) -> std::sync::Arc<dyn Operator> {
    match ComparisonOperator::from_symbol(symbol) {
        Some(op) => std::sync::Arc::new(op),
        None => std::sync::Arc::new(SymbolOperator::new(symbol)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_symbols_round_trip() {
        for op in ComparisonOperator::iter() {
            assert_eq!(ComparisonOperator::from_symbol(op.to_str()), Some(op));
            assert_eq!(op.context(), "comparison");
        }
        assert_eq!(ComparisonOperator::from_symbol("~="), None);
    }

    #[test]
    fn symbol_operators_differ_from_comparisons_by_context() {
        let eq = ComparisonOperator::Eq;
        let raw = SymbolOperator::new("=");
        assert_eq!(eq.symbol(), raw.symbol());
        assert!(!same_operator(&eq, &raw));
        assert!(same_operator(&raw, &SymbolOperator::new("=")));
    }

    #[test]
    fn unknown_symbols_fall_back_to_symbol_operator() {
        assert_eq!(operator_from_symbol(">=").context(), "comparison");
        let op = operator_from_symbol("~=");
        assert_eq!(op.symbol(), "~=");
        assert_eq!(op.context(), "symbol");
    }
}
