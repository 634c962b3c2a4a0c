use strum::EnumIs;
use thiserror::Error;

use crate::value::ValueKind;

/// Errors produced by stacks, conditions, the equality engine and the transcoder.
///
/// Mutating operations never return these directly: they record the most recent one on
/// the instance (see [`crate::stack::Stack::err`]) and leave the instance unchanged.
/// Equality and transcoding return them to the immediate caller.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum StkError {
    /// The handle was never constructed or has been freed.
    #[error(
        "Instance is not initialized. Construct it through a named constructor (e.g. `Stack::and`) before use."
    )]
    Uninitialized,

    /// A kind tag could not be resolved.
    #[error("Unknown stack kind `{0}`. Expected one of AND, OR, NOT, LIST or BASIC.")]
    InvalidKind(String),

    /// A mutation that must report its outcome was attempted on a read-only instance.
    #[error("Instance is read-only; `{0}` was refused.")]
    ReadOnly(&'static str),

    /// BASIC stacks accept no presentation or operator configuration.
    #[error("BASIC stacks cannot be configured with `{0}`.")]
    BasicNotConfigurable(&'static str),

    /// A stack-typed value was pushed into a stack with nesting disabled.
    #[error("Nesting is disabled on this stack; a value of kind `{0}` was refused.")]
    NestingDisabled(ValueKind),

    /// The value would make the instance contain itself.
    #[error("An instance cannot contain itself, directly or through nested values.")]
    SelfNesting,

    /// A push policy declined a value.
    #[error("Policy rejected the value: {0}")]
    PolicyRejected(String),

    /// A validity check failed.
    #[error("Validity check failed: {0}")]
    Invalid(String),

    /// A condition expression of an unsupported shape was refused.
    #[error(
        "Expression of kind `{0}` is not permitted. Expected a non-empty string, a primitive, a stack or a value with a string rendering."
    )]
    InvalidExpression(ValueKind),

    /// [`crate::condition::Condition::evaluate`] was called without an evaluator.
    #[error("No evaluator configured for this condition.")]
    NoEvaluator,

    /// Two values of fundamentally different shapes were compared.
    #[error("Kind mismatch: `{left}` cannot be compared to `{right}`.")]
    KindMismatch { left: String, right: String },

    /// Two ordered collections differ in length.
    #[error("Length mismatch: {left} != {right}.")]
    LengthMismatch { left: usize, right: usize },

    /// Two records do not share the same field set.
    #[error("Field mismatch in `{record}`: `{left}` != `{right}`.")]
    FieldMismatch {
        record: String,
        left: String,
        right: String,
    },

    /// Two values of the same shape hold different contents.
    #[error("Value mismatch: {0}")]
    ValueMismatch(String),

    /// A neutral form could not be transcoded.
    #[error("Unable to transcode neutral form: {0}")]
    Marshal(String),

    /// Caller-defined error, typically produced by a policy closure.
    #[error("{0}")]
    Custom(String),
}

impl StkError {
    /// Shorthand for [`StkError::PolicyRejected`].
    pub fn policy(reason: impl Into<String>) -> Self {
        StkError::PolicyRejected(reason.into())
    }

    /// Shorthand for [`StkError::Custom`].
    pub fn custom(reason: impl Into<String>) -> Self {
        StkError::Custom(reason.into())
    }

    pub(crate) fn mismatch(detail: impl Into<String>) -> Self {
        StkError::ValueMismatch(detail.into())
    }

    pub(crate) fn kinds(left: impl ToString, right: impl ToString) -> Self {
        StkError::KindMismatch {
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

pub type StkResult<T> = Result<T, StkError>;
