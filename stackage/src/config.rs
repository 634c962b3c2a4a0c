//! Configuration records.
//!
//! Each stack and condition owns exactly one record. It lives beside the elements and is
//! never counted among them.
use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    auxiliary::Auxiliary,
    ext::log::LogConfig,
    kind::Kind,
    policy::{ConditionPolicies, StackPolicies},
    utils::error::StkError,
};

bitflags! {
    /// Behavioral and presentation toggles of a stack or condition.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Flags: u16 {
        /// Wrap the rendering in parentheses.
        const PAREN = 1 << 0;

        /// Render operator words in lower case.
        const FOLD = 1 << 1;

        /// Do not pad operator tokens with spaces.
        const NO_PAD = 1 << 2;

        /// Emit the operator token once, as a prefix, instead of between elements.
        const LEAD_ONCE = 1 << 3;

        /// Resolve negative indices from the end of the stack.
        const NEG_INDEX = 1 << 4;

        /// Clamp out-of-range positive indices to the last element.
        const FWD_INDEX = 1 << 5;

        /// Refuse every mutation.
        const READ_ONLY = 1 << 6;

        /// Refuse stack-typed values.
        const NO_NEST = 1 << 7;

        /// Pop from the front instead of the back. Cannot be unset.
        const FIFO = 1 << 8;

        /// Flags BASIC stacks refuse.
        const PRESENTATION = Self::PAREN.bits() | Self::FOLD.bits() | Self::LEAD_ONCE.bits();
    }
}

/// One layer of text wrapped around a rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Encapsulation {
    pub open: String,
    pub close: String,
}

impl Encapsulation {
    /// Same text on both sides, e.g. `'`.
    pub fn symmetric(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            open: text.clone(),
            close: text,
        }
    }

    /// Distinct opening and closing text, e.g. `[` and `]`.
    pub fn pair(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn wrap(&self, text: &str) -> String {
        format!("{}{}{}", self.open, text, self.close)
    }
}

impl From<&str> for Encapsulation {
    fn from(value: &str) -> Self {
        Encapsulation::symmetric(value)
    }
}

impl From<(&str, &str)> for Encapsulation {
    fn from((open, close): (&str, &str)) -> Self {
        Encapsulation::pair(open, close)
    }
}

/// Apply every layer to `text`, innermost (index 0) first.
pub fn encapsulate(text: &str, layers: &[Encapsulation]) -> String {
    layers
        .iter()
        .fold(text.to_string(), |acc, layer| layer.wrap(&acc))
}

/// Fields shared by stack and condition records.
#[derive(Debug, Clone)]
pub struct CommonConfig {
    pub flags: Flags,
    pub encap: Vec<Encapsulation>,
    pub auxiliary: Option<Auxiliary>,
    pub err: Option<StkError>,
    pub id: String,
    pub category: String,
    pub log: LogConfig,
}

impl CommonConfig {
    pub fn new() -> Self {
        Self {
            flags: Flags::empty(),
            encap: Vec::new(),
            auxiliary: None,
            err: None,
            id: String::new(),
            category: String::new(),
            log: LogConfig::from_defaults(),
        }
    }

    /// The auxiliary store, allocated on first access.
    pub fn auxiliary(&mut self) -> Auxiliary {
        self.auxiliary.get_or_insert_with(Auxiliary::new).clone()
    }
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration record of a stack.
#[derive(Debug, Clone)]
pub struct StackConfig {
    pub kind: Kind,
    /// Maximum number of elements; 0 means unbounded.
    pub capacity: usize,
    pub symbol: Option<String>,
    pub delimiter: Option<String>,
    pub common: CommonConfig,
    pub policies: StackPolicies,
}

impl StackConfig {
    pub fn new(kind: Kind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            symbol: None,
            delimiter: None,
            common: CommonConfig::new(),
            policies: StackPolicies::default(),
        }
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        self.common.flags
    }

    #[inline]
    pub fn has(&self, flag: Flags) -> bool {
        self.common.flags.contains(flag)
    }
}

/// Configuration record of a condition.
#[derive(Debug, Clone, Default)]
pub struct ConditionConfig {
    pub common: CommonConfig,
    pub policies: ConditionPolicies,
}

impl ConditionConfig {
    #[inline]
    pub fn has(&self, flag: Flags) -> bool {
        self.common.flags.contains(flag)
    }
}
