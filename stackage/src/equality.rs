//! Structural equality across arbitrary value shapes.
//!
//! [`is_equal`] returns `Ok(())` when both values are equal and a descriptive error
//! otherwise. A custom equality policy on either side (left first) replaces the
//! algorithm entirely.
//!
//! ```
//! use stackage::prelude::*;
//!
//! let a = Stack::and();
//! a.push(["x", "y"]);
//! let b = Stack::and();
//! b.push(["x", "y"]);
//! assert!(a.is_equal(&b).is_ok());
//!
//! b.push(["z"]);
//! assert!(matches!(a.is_equal(&b), Err(StkError::LengthMismatch { left: 2, right: 3 })));
//! ```
use std::any::Any;

use crate::{
    condition::Condition,
    operator::same_operator,
    policy::EqualityPolicy,
    stack::Stack,
    utils::error::{StkError, StkResult},
    value::{Opaque, Value},
};

/// Stack or condition a value stands for, after unwrapping references and aliases.
fn unwrap_alias(value: &Value) -> Value {
    let value = value.resolve();
    match value {
        Value::Opaque(opaque) => {
            if let Some(stack) = opaque.as_stack() {
                Value::Stack(stack)
            } else if let Some(condition) = opaque.as_condition() {
                Value::Condition(condition)
            } else {
                value.clone()
            }
        }
        _ => value.clone(),
    }
}

fn equality_policy(value: &Value) -> Option<EqualityPolicy> {
    match value {
        Value::Stack(stack) => stack.policies().equality,
        Value::Condition(condition) => condition.policies().equality,
        _ => None,
    }
}

/// Compare two values structurally.
pub fn is_equal(a: &Value, b: &Value) -> StkResult<()> {
    let a = unwrap_alias(a);
    let b = unwrap_alias(b);

    if let Some(policy) = equality_policy(&a).or_else(|| equality_policy(&b)) {
        return policy(&a, &b);
    }

    match (&a, &b) {
        (Value::Nil, Value::Nil) => Ok(()),
        (Value::Bool(x), Value::Bool(y)) => same(x == y, &a, &b),
        (Value::Int(x), Value::Int(y)) => same(x == y, &a, &b),
        (Value::UInt(x), Value::UInt(y)) => same(x == y, &a, &b),
        (Value::Float(x), Value::Float(y)) => same(x == y || (x.is_nan() && y.is_nan()), &a, &b),
        (Value::Str(x), Value::Str(y)) => same(x == y, &a, &b),
        (Value::Stack(x), Value::Stack(y)) => stacks_equal(x, y),
        (Value::Condition(x), Value::Condition(y)) => conditions_equal(x, y),
        (Value::List(x), Value::List(y)) => {
            if x.len() != y.len() {
                return Err(StkError::LengthMismatch {
                    left: x.len(),
                    right: y.len(),
                });
            }
            x.iter().zip(y).try_for_each(|(x, y)| is_equal(x, y))
        }
        (Value::Map(x), Value::Map(y)) => {
            if x.len() != y.len() {
                return Err(StkError::LengthMismatch {
                    left: x.len(),
                    right: y.len(),
                });
            }
            for (key, left) in x {
                let right = y
                    .get(key)
                    .ok_or_else(|| StkError::mismatch(format!("key `{key}` missing on the right")))?;
                is_equal(left, right)?;
            }
            Ok(())
        }
        (Value::Record(x), Value::Record(y)) => {
            if x.name != y.name {
                return Err(StkError::kinds(&x.name, &y.name));
            }
            if x.fields.len() != y.fields.len() {
                return Err(StkError::LengthMismatch {
                    left: x.fields.len(),
                    right: y.fields.len(),
                });
            }
            for ((left_name, left), (right_name, right)) in x.fields.iter().zip(&y.fields) {
                if left_name != right_name {
                    return Err(StkError::FieldMismatch {
                        record: x.name.clone(),
                        left: left_name.clone(),
                        right: right_name.clone(),
                    });
                }
                is_equal(left, right)?;
            }
            Ok(())
        }
        (Value::Func(x), Value::Func(y)) => {
            if x.same_fn(y) || x.signature() == y.signature() {
                Ok(())
            } else {
                Err(StkError::mismatch(format!("callable signatures differ: {a} != {b}")))
            }
        }
        (Value::Handle(x), Value::Handle(y)) => same(x.addr() == y.addr(), &a, &b),
        (Value::Opaque(x), Value::Opaque(y)) => opaque_equal(x.as_ref(), y.as_ref()),
        _ => Err(StkError::kinds(a.kind(), b.kind())),
    }
}

fn same(equal: bool, a: &Value, b: &Value) -> StkResult<()> {
    if equal {
        Ok(())
    } else {
        Err(StkError::mismatch(format!("`{a}` != `{b}`")))
    }
}

fn opaque_equal(x: &dyn Opaque, y: &dyn Opaque) -> StkResult<()> {
    if std::ptr::addr_eq(x as *const dyn Opaque, y as *const dyn Opaque) {
        return Ok(());
    }

    if let (Some(left), Some(right)) = (x.neutral(), y.neutral()) {
        return is_equal(&left, &right);
    }

    if Any::type_id(x.as_any()) != Any::type_id(y.as_any()) {
        return Err(StkError::kinds(format!("{x:?}"), format!("{y:?}")));
    }

    let (left, right) = (x.to_string(), y.to_string());
    if left == right {
        Ok(())
    } else {
        Err(StkError::mismatch(format!("`{left}` != `{right}`")))
    }
}

fn stacks_equal(x: &Stack, y: &Stack) -> StkResult<()> {
    if x.ptr_eq(y) {
        return Ok(());
    }
    if !x.is_init() || !y.is_init() {
        return if x.is_init() == y.is_init() {
            Ok(())
        } else {
            Err(StkError::Uninitialized)
        };
    }

    if x.kind() != y.kind() {
        return Err(StkError::kinds(x.kind(), y.kind()));
    }
    if x.flags() != y.flags() {
        return Err(StkError::mismatch(format!(
            "flags differ: {:?} != {:?}",
            x.flags(),
            y.flags()
        )));
    }
    if x.cap() != y.cap() {
        return Err(StkError::mismatch(format!("capacity differs: {} != {}", x.cap(), y.cap())));
    }
    if x.symbol() != y.symbol() {
        return Err(StkError::mismatch("operator symbols differ"));
    }
    if x.delimiter() != y.delimiter() {
        return Err(StkError::mismatch("delimiters differ"));
    }
    if x.encap() != y.encap() {
        return Err(StkError::mismatch("encapsulation differs"));
    }
    if x.category() != y.category() {
        return Err(StkError::mismatch(format!(
            "categories differ: `{}` != `{}`",
            x.category(),
            y.category()
        )));
    }

    let (left, right) = (x.elements(), y.elements());
    if left.len() != right.len() {
        return Err(StkError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    left.iter().zip(&right).try_for_each(|(l, r)| is_equal(l, r))
}

fn conditions_equal(x: &Condition, y: &Condition) -> StkResult<()> {
    if x.ptr_eq(y) {
        return Ok(());
    }
    if !x.is_init() || !y.is_init() {
        return if x.is_init() == y.is_init() {
            Ok(())
        } else {
            Err(StkError::Uninitialized)
        };
    }

    if x.keyword() != y.keyword() {
        return Err(StkError::mismatch(format!(
            "keywords differ: `{}` != `{}`",
            x.keyword(),
            y.keyword()
        )));
    }
    let operators_match = match (x.operator(), y.operator()) {
        (Some(a), Some(b)) => same_operator(a.as_ref(), b.as_ref()),
        (None, None) => true,
        _ => false,
    };
    if !operators_match {
        return Err(StkError::mismatch("operators differ"));
    }
    if x.flags() != y.flags() {
        return Err(StkError::mismatch(format!(
            "flags differ: {:?} != {:?}",
            x.flags(),
            y.flags()
        )));
    }
    if x.encap() != y.encap() {
        return Err(StkError::mismatch("encapsulation differs"));
    }

    is_equal(&x.expression(), &y.expression())
}

impl Stack {
    /// Compare with `other` structurally. See [`is_equal`].
    pub fn is_equal(&self, other: &Stack) -> StkResult<()> {
        is_equal(&Value::Stack(self.clone()), &Value::Stack(other.clone()))
    }
}

impl Condition {
    /// Compare with `other` structurally. See [`is_equal`].
    pub fn is_equal(&self, other: &Condition) -> StkResult<()> {
        is_equal(
            &Value::Condition(self.clone()),
            &Value::Condition(other.clone()),
        )
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        is_equal(self, other).is_ok()
    }
}

impl PartialEq for Stack {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other).is_ok()
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other).is_ok()
    }
}
