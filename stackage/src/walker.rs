//! Iterative traversal over stacks and conditions.
//!
//! - [`Stack::traverse`] follows an index path down to a single element.
//! - [`walk`] visits every element in pre-order, depth first, with its index path; the
//!   visitor steers the walk through [`WalkControl`].
//!
//! Both use an explicit stack rather than recursion, so arbitrarily deep trees are fine.
//!
//! Example: collect every leaf string
//! ```
//! use stackage::prelude::*;
//! use stackage::walker::{walk, WalkControl};
//!
//! let inner = Stack::or();
//! inner.push(["b", "c"]);
//! let outer = Stack::and();
//! outer.push([Value::from("a"), Value::from(&inner)]);
//!
//! let mut leaves = Vec::new();
//! walk(&outer, |entry| {
//!     if let Some(s) = entry.value.as_str() {
//!         leaves.push(s.to_string());
//!     }
//!     WalkControl::Continue
//! });
//! assert_eq!(leaves, ["a", "b", "c"]);
//! ```
use smallvec::SmallVec;

use crate::{
    ext::log::{LogLevels, stk_event},
    stack::Stack,
    value::Value,
};

/// Index path of a visited element.
pub type WalkPath = SmallVec<[usize; 8]>;

/// Decision returned by a [`walk`] visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkControl {
    /// Keep going, descending into the current element if it is a container.
    Continue,
    /// Do not descend into the current element.
    Skip,
    /// Abort the walk.
    Stop,
}

/// Element handed to a [`walk`] visitor.
#[derive(Debug)]
pub struct WalkEntry<'a> {
    /// Indices from the root down to this element.
    pub path: &'a [usize],
    /// Nesting depth; direct children of the root are at depth 0.
    pub depth: usize,
    pub value: &'a Value,
}

/// Stack that descending into `value` leads to: the value itself or a condition's stack
/// expression.
fn container_of(value: &Value) -> Option<Stack> {
    match value.as_stack() {
        Some(stack) => Some(stack),
        None => value.as_condition()?.expression().as_stack(),
    }
}

impl Stack {
    /// Follow `path` from this stack and return the element it designates.
    ///
    /// Each index is resolved under the index flags of the stack it applies to. Stacks and
    /// conditions with stack expressions are descended into while indices remain; any
    /// failure, and an empty path, yields `None`.
    pub fn traverse(&self, path: &[isize]) -> Option<Value> {
        let mut current = self.clone();
        let mut path = path;

        loop {
            let (head, rest) = path.split_first()?;
            let value = current.index(*head);
            stk_event!(
                current,
                LogLevels::TRAVERSAL,
                Trace,
                "traverse",
                "index {head} -> {}",
                if value.is_some() { "found" } else { "missing" }
            );

            let value = value?;
            if rest.is_empty() {
                return Some(value);
            }

            current = container_of(&value)?;
            path = rest;
        }
    }
}

/// Visit every element under `root`, pre-order and depth first.
///
/// Returns false when the visitor stopped the walk.
pub fn walk(root: &Stack, mut visitor: impl FnMut(WalkEntry<'_>) -> WalkControl) -> bool {
    // (container, next index to visit, path to container)
    let mut stack: Vec<(Vec<Value>, usize, WalkPath)> = vec![(root.elements(), 0, WalkPath::new())];

    while let Some((elements, next, base)) = stack.last_mut() {
        let Some(value) = elements.get(*next).cloned() else {
            stack.pop();
            continue;
        };

        let index = *next;
        *next += 1;

        let mut path = base.clone();
        path.push(index);
        let depth = path.len() - 1;

        match visitor(WalkEntry {
            path: &path,
            depth,
            value: &value,
        }) {
            WalkControl::Stop => return false,
            WalkControl::Skip => {}
            WalkControl::Continue => {
                if let Some(child) = container_of(&value) {
                    stack.push((child.elements(), 0, path));
                }
            }
        }
    }

    true
}

/// Returns true when `value` is, or transitively contains, the instance at `addr`.
pub(crate) fn reaches(value: &Value, addr: usize) -> bool {
    let mut pending: SmallVec<[Value; 8]> = SmallVec::new();
    pending.push(value.clone());
    let mut seen: Vec<usize> = Vec::new();

    while let Some(value) = pending.pop() {
        if let Some(stack) = value.as_stack() {
            if stack.addr() == addr {
                return true;
            }
            if seen.contains(&stack.addr()) {
                continue;
            }
            seen.push(stack.addr());
            pending.extend(stack.elements());
        } else if let Some(condition) = value.as_condition() {
            if condition.addr() == addr {
                return true;
            }
            if seen.contains(&condition.addr()) {
                continue;
            }
            seen.push(condition.addr());
            pending.push(condition.expression());
        } else {
            match value.resolve() {
                Value::List(items) => pending.extend(items.iter().cloned()),
                Value::Map(map) => pending.extend(map.values().cloned()),
                Value::Record(record) => {
                    pending.extend(record.fields.iter().map(|(_, field)| field.clone()))
                }
                Value::Opaque(opaque) => pending.extend(opaque.neutral()),
                _ => {}
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Stack {
        let inner = Stack::or();
        inner.push(["b", "c"]);
        let outer = Stack::and();
        outer.push([Value::from("a"), Value::from(&inner), Value::from("d")]);
        outer
    }

    #[test]
    fn paths_and_depths() {
        let mut seen = Vec::new();
        walk(&tree(), |entry| {
            seen.push((entry.path.to_vec(), entry.depth));
            WalkControl::Continue
        });
        assert_eq!(
            seen,
            vec![
                (vec![0], 0),
                (vec![1], 0),
                (vec![1, 0], 1),
                (vec![1, 1], 1),
                (vec![2], 0),
            ]
        );
    }

    #[test]
    fn skip_and_stop() {
        let mut count = 0;
        walk(&tree(), |entry| {
            count += 1;
            if entry.value.is_stack() {
                WalkControl::Skip
            } else {
                WalkControl::Continue
            }
        });
        assert_eq!(count, 3);

        let mut count = 0;
        let finished = walk(&tree(), |_| {
            count += 1;
            WalkControl::Stop
        });
        assert!(!finished);
        assert_eq!(count, 1);
    }

    #[test]
    fn reachability() {
        let outer = tree();
        let inner = outer.index(1).and_then(|v| v.as_stack()).expect("nested stack");
        assert!(reaches(&Value::from(&outer), inner.addr()));
        assert!(!reaches(&Value::from(&inner), outer.addr()));
        assert!(!reaches(&Value::from("a"), outer.addr()));
    }
}
