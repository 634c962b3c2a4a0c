//! Transcoding between stacks and their neutral nested-list form.
//!
//! The neutral form of a stack is a list whose first entry is its kind tag (`"AND"`,
//! `"OR"`, `"NOT"`, `"LIST"` or `"BASIC"`) followed by its elements. Nested stacks become
//! nested lists; conditions become `["CONDITION", keyword, symbol, expression]`.
//!
//! ```
//! use stackage::prelude::*;
//!
//! let stack = Stack::or();
//! stack.push([Value::from("a"), Value::from(Condition::new("n", ComparisonOperator::Lt, 3))]);
//!
//! let neutral = stack.unmarshal().unwrap();
//! assert_eq!(neutral[0].as_str(), Some("OR"));
//!
//! let rebuilt = Stack::from_neutral(&neutral).unwrap();
//! assert_eq!(rebuilt.to_string(), "a OR n < 3");
//! ```
use crate::{
    condition::Condition,
    config::Flags,
    ext::log::{LogLevels, stk_event},
    kind::Kind,
    operator::operator_from_symbol,
    stack::Stack,
    utils::error::{StkError, StkResult},
    value::Value,
};

/// Tag leading the neutral form of a condition.
pub const CONDITION_TAG: &str = "CONDITION";

/// Neutral form of a single element.
fn neutral_of(value: &Value) -> StkResult<Value> {
    let value = value.resolve();
    if let Some(stack) = value.as_stack() {
        return Ok(Value::List(stack.unmarshal()?));
    }
    if let Some(condition) = value.as_condition() {
        return neutral_condition(&condition);
    }
    match value {
        Value::Opaque(opaque) => Ok(opaque.neutral().unwrap_or_else(|| value.clone())),
        other => Ok(other.clone()),
    }
}

fn neutral_condition(condition: &Condition) -> StkResult<Value> {
    if !condition.is_init() {
        return Err(StkError::Uninitialized);
    }

    let symbol = condition
        .operator()
        .map(|op| op.symbol())
        .unwrap_or_default();
    let expression = condition.expression();
    let expression = match expression.as_stack() {
        Some(stack) => Value::List(stack.unmarshal()?),
        None => expression.resolve().clone(),
    };

    Ok(Value::List(vec![
        Value::from(CONDITION_TAG),
        Value::from(condition.keyword()),
        Value::from(symbol),
        expression,
    ]))
}

/// Element rebuilt from its neutral form.
fn value_from_neutral(value: &Value) -> StkResult<Value> {
    match value.resolve() {
        Value::List(items) => {
            if items.first().and_then(Value::as_str) == Some(CONDITION_TAG) {
                condition_from_neutral(items).map(Value::Condition)
            } else {
                Stack::from_neutral(items).map(Value::Stack)
            }
        }
        other => Ok(other.clone()),
    }
}

fn condition_from_neutral(items: &[Value]) -> StkResult<Condition> {
    let [_, keyword, symbol, expression] = items else {
        return Err(StkError::Marshal(format!(
            "condition expects 4 entries, found {}",
            items.len()
        )));
    };

    let keyword = keyword
        .as_str()
        .ok_or_else(|| StkError::Marshal(format!("condition keyword must be a string, found {}", keyword.kind())))?;
    let symbol = symbol
        .as_str()
        .ok_or_else(|| StkError::Marshal(format!("condition operator must be a string, found {}", symbol.kind())))?;
    let expression = match expression.resolve() {
        Value::List(items) => Value::Stack(Stack::from_neutral(items)?),
        other => other.clone(),
    };

    let condition = Condition::from_parts(keyword, operator_from_symbol(symbol), expression);
    match condition.err() {
        Some(err) => Err(StkError::Marshal(err.to_string())),
        None => Ok(condition),
    }
}

impl Stack {
    /// Neutral form of this stack, or the output of its unmarshal policy.
    pub fn unmarshal(&self) -> StkResult<Vec<Value>> {
        if !self.is_init() {
            return Err(StkError::Uninitialized);
        }
        if let Some(policy) = self.policies().unmarshal {
            return policy(self);
        }

        stk_event!(self, LogLevels::TRANSCODE, Debug, "unmarshal", "unmarshal {} elements", self.len());
        let mut out = vec![Value::from(self.kind().to_str())];
        for element in self.elements() {
            out.push(neutral_of(&element)?);
        }
        Ok(out)
    }

    /// Load a neutral form into this stack, replacing its kind and elements.
    ///
    /// A leading kind tag selects the kind; without one the stack becomes BASIC and every
    /// entry is an element. Every element is admitted before the stack changes: a refusal
    /// is returned and the stack keeps its previous contents. Elements beyond the capacity
    /// are dropped, and a BASIC result loses its presentation settings.
    pub fn marshal(&self, neutral: &[Value]) -> StkResult<()> {
        if !self.is_init() {
            return Err(StkError::Uninitialized);
        }
        if self.is_read_only() {
            return Err(StkError::ReadOnly("marshal"));
        }
        if let Some(policy) = self.policies().marshal {
            return policy(self, neutral);
        }

        let (kind, entries) = match neutral.first().and_then(Value::as_str).and_then(Kind::from_str) {
            Some(kind) => (kind, &neutral[1..]),
            None => (Kind::Basic, neutral),
        };
        stk_event!(self, LogLevels::TRANSCODE, Debug, "marshal", "marshal {} entries as {kind}", entries.len());

        let values = entries
            .iter()
            .map(value_from_neutral)
            .collect::<StkResult<Vec<_>>>()?;

        let Some(gate) = self.gate("marshal") else {
            return Err(StkError::ReadOnly("marshal"));
        };
        values
            .iter()
            .filter(|value| !value.is_nil())
            .try_for_each(|value| self.admit(value, &gate))?;

        let _guard = self.lock();
        self.write(|s| {
            s.config.kind = kind;
            if kind.is_basic() {
                s.config.common.flags.remove(Flags::PRESENTATION);
                s.config.common.encap.clear();
                s.config.symbol = None;
                s.config.delimiter = None;
            }

            let room = match s.config.capacity {
                0 => usize::MAX,
                capacity => capacity,
            };
            s.elements.clear();
            s.elements
                .extend(values.into_iter().filter(|value| !value.is_nil()).take(room));
        });
        Ok(())
    }

    /// Build a new stack from a neutral form.
    pub fn from_neutral(neutral: &[Value]) -> StkResult<Stack> {
        let stack = Stack::basic();
        stack.marshal(neutral)?;
        Ok(stack)
    }
}
