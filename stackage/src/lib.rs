//! Stackage: hierarchical expression stacks.
//!
//! A [`Stack`](stack::Stack) is an ordered container whose [`Kind`](kind::Kind) decides how
//! it renders: `AND`, `OR` and `NOT` join their elements with an operator word, `LIST`
//! joins them with a delimiter, and `BASIC` is plain storage. Elements are
//! [`Value`](value::Value)s: primitives, nested stacks, [`Condition`](condition::Condition)s
//! (`keyword operator expression` statements), collections, callables or any user type
//! with a string rendering.
//!
//! Around the data model the crate provides:
//!  - mutation with capacity, ordering (LIFO/FIFO), read-only and opt-in locking semantics;
//!  - recursive rendering with parentheses, case folding, padding and encapsulation;
//!  - index-path traversal and a depth-first [`walk`](walker::walk);
//!  - structural equality ([`is_equal`](equality::is_equal));
//!  - transcoding to and from a neutral nested-list form ([`encoding`]).
//!
//! Every instance reports leveled events through the sink of [`ext::log`].
//!
//! Example
//! ```
//! use stackage::prelude::*;
//!
//! let names = Stack::list();
//! names.set_delimiter(",").push(["x", "y"]);
//! assert_eq!(names.to_string(), "x,y");
//!
//! let any = Stack::or();
//! any.set_paren(true).push([
//!     Condition::new("age", ComparisonOperator::Ge, 21),
//!     Condition::new("vip", ComparisonOperator::Eq, true),
//! ]);
//!
//! let filter = Stack::and();
//! filter.push([Value::from("active"), Value::from(&any)]);
//! assert_eq!(filter.to_string(), "active AND (age >= 21 OR vip = true)");
//! assert_eq!(filter.traverse(&[1, 0]).map(|v| v.to_string()).as_deref(), Some("age >= 21"));
//! ```
extern crate self as stackage;

/// Wrapper types standing in for stacks and conditions.
pub mod alias;
/// Free-form per-instance storage.
pub mod auxiliary;
/// Keyword/operator/expression statements.
pub mod condition;
/// Configuration records, flags and encapsulation.
pub mod config;
/// Neutral nested-list transcoding.
pub mod encoding;
/// Structural equality.
pub mod equality;
/// Collaborators at the edge of the core (logging).
pub mod ext;
/// Stack kinds.
pub mod kind;
/// Condition operators.
pub mod operator;
/// Caller-supplied closures.
pub mod policy;
/// The stack engine.
pub mod stack;
/// Errors and text helpers.
pub mod utils;
/// Element values.
pub mod value;
/// Traversal and walking.
pub mod walker;

#[cfg(feature = "derive")]
pub use stackage_derive::{AsCondition, AsStack};

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::alias::{AsCondition, AsStack};
    pub use crate::condition::Condition;
    pub use crate::config::{Encapsulation, Flags};
    pub use crate::equality::is_equal;
    pub use crate::ext::log::{LogLevels, LogSink, Severity};
    pub use crate::kind::Kind;
    pub use crate::operator::{ComparisonOperator, Operator, SymbolOperator};
    pub use crate::stack::Stack;
    pub use crate::utils::error::{StkError, StkResult};
    pub use crate::value::{Callable, Handle, Opaque, Record, Signature, Value, ValueKind};
    pub use crate::walker::{WalkControl, WalkEntry, walk};

    #[cfg(feature = "derive")]
    pub use stackage_derive::{AsCondition, AsStack};
}
