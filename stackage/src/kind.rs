//! Stack kinds.
//!
//! The kind of a [`Stack`](crate::stack::Stack) decides how its elements are joined when
//! rendered: `AND`, `OR` and `NOT` inject their operator word between elements, `LIST`
//! joins with a delimiter, and `BASIC` is never rendered at all.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumIter, IntoEnumIterator};

use crate::utils::error::StkError;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, EnumIs, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kind {
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Boolean negation.
    Not,
    /// Plain delimited list.
    List,
    /// Unrendered storage container.
    #[default]
    Basic,
}

impl Kind {
    /// Creates a [`Kind`] from its tag (`"AND"`, `"OR"`, `"NOT"`, `"LIST"`, `"BASIC"`).
    pub fn from_str(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Returns the tag of the [`Kind`].
    pub fn to_str(&self) -> &'static str {
        match self {
            Kind::And => "AND",
            Kind::Or => "OR",
            Kind::Not => "NOT",
            Kind::List => "LIST",
            Kind::Basic => "BASIC",
        }
    }

    /// Operator word injected by the renderer, lower-cased when `fold` is set.
    pub fn word(&self, fold: bool) -> &'static str {
        match (self, fold) {
            (Kind::And, true) => "and",
            (Kind::Or, true) => "or",
            (Kind::Not, true) => "not",
            (Kind::List, true) => "list",
            (Kind::Basic, true) => "basic",
            (kind, false) => kind.to_str(),
        }
    }

    /// Returns true for the kinds that join elements with an operator.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Kind::And | Kind::Or | Kind::Not)
    }
}

/// Strict parse: unknown tags are an error rather than `None`.
impl std::str::FromStr for Kind {
    type Err = StkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::iter()
            .find(|kind| kind.to_str() == s)
            .ok_or_else(|| StkError::InvalidKind(s.to_string()))
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}
