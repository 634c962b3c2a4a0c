//! User-defined wrappers standing in for a stack or a condition.
//!
//! A newtype implementing [`AsStack`] (or [`AsCondition`]) and [`Opaque`](crate::value::Opaque)
//! can be pushed as a value and is unwrapped by rendering, traversal, equality and
//! transcoding. With the `derive` feature, `#[derive(AsStack)]` / `#[derive(AsCondition)]`
//! generate all of it.
//!
//! ```
//! use stackage::prelude::*;
//!
//! #[derive(Debug, AsStack)]
//! struct Filters(Stack);
//!
//! let filters = Filters(Stack::or());
//! filters.stack().push(["a", "b"]);
//!
//! let outer = Stack::and();
//! outer.push([Value::from("x"), Value::from(filters)]);
//! assert_eq!(outer.to_string(), "x AND a OR b");
//! assert_eq!(outer.traverse(&[1, 0]).and_then(|v| v.as_str().map(String::from)).as_deref(), Some("a"));
//! ```
use crate::{condition::Condition, stack::Stack};

/// Access to the stack a wrapper stands for.
pub trait AsStack {
    fn stack(&self) -> &Stack;
}

/// Access to the condition a wrapper stands for.
pub trait AsCondition {
    fn condition(&self) -> &Condition;
}

impl AsStack for Stack {
    fn stack(&self) -> &Stack {
        self
    }
}

impl AsCondition for Condition {
    fn condition(&self) -> &Condition {
        self
    }
}
