//! Caller-supplied closures consulted by stacks and conditions.
//!
//! Every policy is shared (`Arc`) so that configuration records can be cloned out of the
//! instance lock before the closure runs.
use std::{cmp::Ordering, sync::Arc};

use crate::{stack::Stack, utils::error::StkResult, value::Value};

/// Decides whether a value may enter a stack (or become a condition's expression).
pub type PushPolicy = Arc<dyn Fn(&Value) -> StkResult<()> + Send + Sync>;

/// Replaces the default validity check of `T`.
pub type ValidityPolicy<T> = Arc<dyn Fn(&T) -> StkResult<()> + Send + Sync>;

/// Replaces the default rendering of a stack; receives the raw elements.
pub type StackPresentationPolicy = Arc<dyn Fn(&[Value]) -> String + Send + Sync>;

/// Replaces the default rendering of `T`.
pub type PresentationPolicy<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Evaluates `T` against caller inputs.
pub type Evaluator<T> = Arc<dyn Fn(&T, &[Value]) -> StkResult<Value> + Send + Sync>;

/// Replaces the structural equality algorithm.
pub type EqualityPolicy = Arc<dyn Fn(&Value, &Value) -> StkResult<()> + Send + Sync>;

/// Total order used by [`Stack::sort`].
pub type OrderingPolicy = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Loads a neutral form into an existing stack.
pub type MarshalPolicy = Arc<dyn Fn(&Stack, &[Value]) -> StkResult<()> + Send + Sync>;

/// Produces the neutral form of a stack.
pub type UnmarshalPolicy = Arc<dyn Fn(&Stack) -> StkResult<Vec<Value>> + Send + Sync>;

/// Policy closures owned by one stack.
#[derive(Clone, Default)]
pub struct StackPolicies {
    pub push: Option<PushPolicy>,
    pub validity: Option<ValidityPolicy<Stack>>,
    pub presentation: Option<StackPresentationPolicy>,
    pub evaluator: Option<Evaluator<Stack>>,
    pub marshal: Option<MarshalPolicy>,
    pub unmarshal: Option<UnmarshalPolicy>,
    pub equality: Option<EqualityPolicy>,
    pub ordering: Option<OrderingPolicy>,
}

/// Policy closures owned by one condition.
#[derive(Clone, Default)]
pub struct ConditionPolicies {
    pub push: Option<PushPolicy>,
    pub validity: Option<ValidityPolicy<crate::condition::Condition>>,
    pub presentation: Option<PresentationPolicy<crate::condition::Condition>>,
    pub evaluator: Option<Evaluator<crate::condition::Condition>>,
    pub equality: Option<EqualityPolicy>,
}

fn present<T>(policy: &Option<T>) -> &'static str {
    if policy.is_some() { "set" } else { "unset" }
}

impl std::fmt::Debug for StackPolicies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackPolicies")
            .field("push", &present(&self.push))
            .field("validity", &present(&self.validity))
            .field("presentation", &present(&self.presentation))
            .field("evaluator", &present(&self.evaluator))
            .field("marshal", &present(&self.marshal))
            .field("unmarshal", &present(&self.unmarshal))
            .field("equality", &present(&self.equality))
            .field("ordering", &present(&self.ordering))
            .finish()
    }
}

impl std::fmt::Debug for ConditionPolicies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionPolicies")
            .field("push", &present(&self.push))
            .field("validity", &present(&self.validity))
            .field("presentation", &present(&self.presentation))
            .field("evaluator", &present(&self.evaluator))
            .field("equality", &present(&self.equality))
            .finish()
    }
}
