//! Evaluative statements.
//!
//! A [`Condition`] binds a keyword, an [`Operator`] and a single expression value, and
//! renders as `keyword op expression`. The expression may be a primitive, a non-empty
//! string, a value with a string rendering, or a whole [`Stack`](crate::stack::Stack), in which case the
//! condition participates in traversal and length logic like a container.
//!
//! ```
//! use stackage::prelude::*;
//!
//! let cond = Condition::new("age", ComparisonOperator::Ge, 21);
//! assert_eq!(cond.to_string(), "age >= 21");
//! cond.set_encap(["'"]).set_expression("x");
//! assert_eq!(cond.to_string(), "age >= 'x'");
//! ```
use std::{fmt, sync::Arc};

use parking_lot::RwLock;

use crate::{
    auxiliary::Auxiliary,
    config::{ConditionConfig, Encapsulation, Flags, encapsulate},
    ext::log::{LogConfig, LogLevels, LogSink, stk_event},
    operator::Operator,
    policy::ConditionPolicies,
    stack::resolve_id,
    utils::{
        error::{StkError, StkResult},
        text::normalize_whitespace,
    },
    value::Value,
    walker,
};

pub(crate) const INVALID_CONDITION: &str = "<invalid_condition>";

pub(crate) struct ConditionState {
    pub(crate) config: ConditionConfig,
    pub(crate) keyword: String,
    pub(crate) operator: Option<Arc<dyn Operator>>,
    pub(crate) expression: Value,
}

/// Shared handle over a keyword/operator/expression triple.
#[derive(Clone, Default)]
pub struct Condition(Option<Arc<RwLock<ConditionState>>>);

/// Returns true for the expression shapes a condition accepts.
fn expression_permitted(value: &Value) -> bool {
    match value.resolve() {
        Value::Str(s) => !s.is_empty(),
        Value::Stack(_) | Value::Opaque(_) => true,
        other => other.is_primitive(),
    }
}

impl Condition {
    /// Initialized condition with no keyword, operator or expression.
    pub fn init() -> Self {
        let condition = Self(Some(Arc::new(RwLock::new(ConditionState {
            config: ConditionConfig::default(),
            keyword: String::new(),
            operator: None,
            expression: Value::Nil,
        }))));
        stk_event!(condition, LogLevels::STATE, Debug, "init", "new condition");
        condition
    }

    pub fn new(
        keyword: impl Into<String>,
        operator: impl Operator + 'static,
        expression: impl Into<Value>,
    ) -> Self {
        Self::from_parts(keyword, Arc::new(operator), expression)
    }

    /// Like [`Condition::new`] with an already shared operator.
    pub fn from_parts(
        keyword: impl Into<String>,
        operator: Arc<dyn Operator>,
        expression: impl Into<Value>,
    ) -> Self {
        let condition = Self::init();
        condition
            .set_keyword(keyword)
            .set_operator_shared(operator)
            .set_expression(expression);
        condition
    }

    #[inline]
    pub(crate) fn read<R>(&self, f: impl FnOnce(&ConditionState) -> R) -> Option<R> {
        self.0.as_ref().map(|inner| f(&inner.read_recursive()))
    }

    #[inline]
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut ConditionState) -> R) -> Option<R> {
        self.0.as_ref().map(|inner| f(&mut inner.write()))
    }

    pub(crate) fn logger(&self, category: LogLevels) -> Option<(LogConfig, String)> {
        self.read(|s| {
            let common = &s.config.common;
            common
                .log
                .enabled(category)
                .then(|| (common.log.clone(), common.id.clone()))
        })
        .flatten()
    }

    pub(crate) fn record(&self, err: StkError) {
        stk_event!(self, LogLevels::ERRORS, Error, "error", "{err}");
        self.write(|s| s.config.common.err = Some(err));
    }

    pub(crate) fn policies(&self) -> ConditionPolicies {
        self.read(|s| s.config.policies.clone()).unwrap_or_default()
    }

    fn configure(&self, tag: &'static str, f: impl FnOnce(&mut ConditionState)) -> &Self {
        if self.write(f).is_some() {
            stk_event!(self, LogLevels::STATE, Debug, tag, "configuration updated");
        }
        self
    }

    pub fn is_init(&self) -> bool {
        self.0.is_some()
    }

    pub fn ptr_eq(&self, other: &Condition) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Address of the shared instance (0 when uninitialized).
    pub fn addr(&self) -> usize {
        self.0
            .as_ref()
            .map_or(0, |inner| Arc::as_ptr(inner) as *const () as usize)
    }

    /// Release this handle. Other handles keep the instance alive until dropped.
    pub fn free(&mut self) {
        stk_event!(self, LogLevels::STATE, Debug, "free", "releasing handle");
        self.0 = None;
    }

    pub fn keyword(&self) -> String {
        self.read(|s| s.keyword.clone()).unwrap_or_default()
    }

    pub fn operator(&self) -> Option<Arc<dyn Operator>> {
        self.read(|s| s.operator.clone()).flatten()
    }

    /// The expression, [`Value::Nil`] when unset.
    pub fn expression(&self) -> Value {
        self.read(|s| s.expression.clone()).unwrap_or_default()
    }

    /// 0 without an expression, the nested length for stack expressions, else 1.
    pub fn len(&self) -> usize {
        let expression = self.expression();
        if expression.is_nil() {
            return 0;
        }
        match expression.as_stack() {
            Some(stack) => stack.len(),
            None => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flags(&self) -> Flags {
        self.read(|s| s.config.common.flags).unwrap_or_default()
    }

    pub fn is_paren(&self) -> bool {
        self.flags().contains(Flags::PAREN)
    }

    pub fn is_padded(&self) -> bool {
        !self.flags().contains(Flags::NO_PAD)
    }

    pub fn encap(&self) -> Vec<Encapsulation> {
        self.read(|s| s.config.common.encap.clone()).unwrap_or_default()
    }

    pub fn id(&self) -> String {
        self.read(|s| s.config.common.id.clone()).unwrap_or_default()
    }

    pub fn category(&self) -> String {
        self.read(|s| s.config.common.category.clone()).unwrap_or_default()
    }

    pub fn err(&self) -> Option<StkError> {
        self.read(|s| s.config.common.err.clone()).flatten()
    }

    pub fn auxiliary(&self) -> Option<Auxiliary> {
        self.write(|s| s.config.common.auxiliary())
    }

    pub fn set_keyword(&self, keyword: impl Into<String>) -> &Self {
        let keyword = keyword.into();
        self.configure("set_keyword", |s| s.keyword = keyword)
    }

    pub fn set_operator(&self, operator: impl Operator + 'static) -> &Self {
        self.set_operator_shared(Arc::new(operator))
    }

    pub fn set_operator_shared(&self, operator: Arc<dyn Operator>) -> &Self {
        self.configure("set_operator", |s| s.operator = Some(operator))
    }

    /// Set the expression, subject to the permitted shapes and the push policy.
    pub fn set_expression(&self, expression: impl Into<Value>) -> &Self {
        if !self.is_init() {
            return self;
        }

        let expression = expression.into();
        if !expression_permitted(&expression) {
            self.record(StkError::InvalidExpression(expression.resolve().kind()));
            return self;
        }
        if walker::reaches(&expression, self.addr()) {
            self.record(StkError::SelfNesting);
            return self;
        }
        if let Some(policy) = self.policies().push {
            if let Err(err) = policy(&expression) {
                self.record(err);
                return self;
            }
        }

        self.configure("set_expression", |s| s.expression = expression)
    }

    pub fn set_paren(&self, on: bool) -> &Self {
        self.configure("set_paren", |s| s.config.common.flags.set(Flags::PAREN, on))
    }

    pub fn set_no_pad(&self, on: bool) -> &Self {
        self.configure("set_no_pad", |s| s.config.common.flags.set(Flags::NO_PAD, on))
    }

    /// Replace the encapsulation layers (innermost first) applied to non-stack expressions.
    pub fn set_encap<I, E>(&self, layers: I) -> &Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Encapsulation>,
    {
        let layers: Vec<Encapsulation> = layers.into_iter().map(Into::into).collect();
        self.configure("set_encap", |s| s.config.common.encap = layers)
    }

    /// Set the identifier. `"_random"` draws a random one, `"_addr"` uses the instance address.
    pub fn set_id(&self, id: impl Into<String>) -> &Self {
        let id = resolve_id(id.into(), self.addr());
        self.configure("set_id", |s| s.config.common.id = id)
    }

    pub fn set_category(&self, category: impl Into<String>) -> &Self {
        let category = category.into();
        self.configure("set_category", |s| s.config.common.category = category)
    }

    pub fn set_err(&self, err: impl Into<Option<StkError>>) -> &Self {
        let err = err.into();
        self.write(|s| s.config.common.err = err);
        self
    }

    pub fn set_logger(&self, sink: Arc<dyn LogSink>) -> &Self {
        self.configure("set_logger", |s| s.config.common.log.set_sink(sink))
    }

    pub fn set_log_levels(&self, levels: LogLevels) -> &Self {
        self.configure("set_log_levels", |s| s.config.common.log.set_levels(levels))
    }

    pub fn set_push_policy(
        &self,
        policy: impl Fn(&Value) -> StkResult<()> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_push_policy", |s| {
            s.config.policies.push = Some(Arc::new(policy))
        })
    }

    pub fn set_validity_policy(
        &self,
        policy: impl Fn(&Condition) -> StkResult<()> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_validity_policy", |s| {
            s.config.policies.validity = Some(Arc::new(policy))
        })
    }

    pub fn set_presentation_policy(
        &self,
        policy: impl Fn(&Condition) -> String + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_presentation_policy", |s| {
            s.config.policies.presentation = Some(Arc::new(policy))
        })
    }

    pub fn set_evaluator(
        &self,
        evaluator: impl Fn(&Condition, &[Value]) -> StkResult<Value> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_evaluator", |s| {
            s.config.policies.evaluator = Some(Arc::new(evaluator))
        })
    }

    pub fn set_equality_policy(
        &self,
        policy: impl Fn(&Value, &Value) -> StkResult<()> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_equality_policy", |s| {
            s.config.policies.equality = Some(Arc::new(policy))
        })
    }

    /// Run the evaluator against the condition and `inputs`.
    pub fn evaluate(&self, inputs: &[Value]) -> StkResult<Value> {
        if !self.is_init() {
            return Err(StkError::Uninitialized);
        }
        match self.policies().evaluator {
            Some(evaluator) => evaluator(self, inputs),
            None => Err(StkError::NoEvaluator),
        }
    }

    /// Run the validity policy, or the default checks when none is set.
    pub fn valid(&self) -> StkResult<()> {
        let Some(policy) = self.read(|s| s.config.policies.validity.clone()) else {
            return Err(StkError::Uninitialized);
        };
        if let Some(policy) = policy {
            return policy(self);
        }

        self.read(|s| {
            if s.keyword.is_empty() {
                Err(StkError::Invalid("keyword is empty".into()))
            } else if s.operator.is_none() {
                Err(StkError::Invalid("operator is unset".into()))
            } else if s.expression.is_nil() {
                Err(StkError::Invalid("expression is unset".into()))
            } else {
                Ok(())
            }
        })
        .unwrap_or(Err(StkError::Uninitialized))
    }

    pub fn render(&self) -> String {
        if !self.is_init() {
            return String::new();
        }
        if self.valid().is_err() {
            return INVALID_CONDITION.to_string();
        }
        if let Some(presentation) = self.policies().presentation {
            return presentation(self);
        }

        let Some((keyword, symbol, expression, flags, encap)) = self.read(|s| {
            (
                s.keyword.clone(),
                s.operator.as_ref().map(|op| op.symbol()).unwrap_or_default(),
                s.expression.clone(),
                s.config.common.flags,
                s.config.common.encap.clone(),
            )
        }) else {
            return String::new();
        };

        let text = match expression.as_stack() {
            Some(stack) => stack.render(),
            None => encapsulate(&expression.to_string(), &encap),
        };

        let body = if flags.contains(Flags::NO_PAD) {
            format!("{keyword}{symbol}{text}")
        } else {
            format!("{keyword} {symbol} {text}")
        };

        if flags.contains(Flags::PAREN) {
            normalize_whitespace(&format!("({body})"))
        } else {
            normalize_whitespace(&body)
        }
    }

    /// Follow `path` into a stack-typed expression.
    pub fn traverse(&self, path: &[isize]) -> Option<Value> {
        self.expression().as_stack()?.traverse(path)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.read(|s| (s.keyword.clone(), s.operator.clone(), s.expression.clone())) {
            Some((keyword, operator, expression)) => f
                .debug_struct("Condition")
                .field("keyword", &keyword)
                .field("operator", &operator)
                .field("expression", &expression)
                .finish(),
            None => f.write_str("Condition(<uninitialized>)"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{operator::ComparisonOperator, stack::Stack};

    #[test]
    fn renders_triple() {
        let cond = Condition::new("name", ComparisonOperator::Eq, "alice");
        assert_eq!(cond.render(), "name = alice");
        cond.set_no_pad(true).set_paren(true);
        assert_eq!(cond.render(), "(name=alice)");
    }

    #[test]
    fn refuses_unsupported_expressions() {
        let cond = Condition::new("k", ComparisonOperator::Eq, "");
        assert_eq!(cond.err(), Some(StkError::InvalidExpression(crate::value::ValueKind::Str)));
        assert_eq!(cond.render(), INVALID_CONDITION);
        assert_eq!(cond.len(), 0);

        cond.set_expression(vec![1, 2]);
        assert!(cond.expression().is_nil());
    }

    #[test]
    fn length_follows_expression() {
        let stack = Stack::list();
        stack.push([1, 2, 3]);
        let cond = Condition::new("in", ComparisonOperator::Eq, &stack);
        assert_eq!(cond.len(), 3);
        assert_eq!(Condition::new("x", ComparisonOperator::Lt, 4).len(), 1);
    }

    #[test]
    fn evaluator_receives_condition() {
        let cond = Condition::new("x", ComparisonOperator::Gt, 4);
        assert_eq!(cond.evaluate(&[]), Err(StkError::NoEvaluator));

        cond.set_evaluator(|cond, inputs| {
            let threshold = cond.expression().as_i64().unwrap_or_default();
            let input = inputs.first().and_then(Value::as_i64).unwrap_or_default();
            Ok(Value::from(input > threshold))
        });
        assert_eq!(cond.evaluate(&[Value::from(7)]).ok().and_then(|v| v.as_bool()), Some(true));
    }
}
