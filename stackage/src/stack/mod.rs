//! Ordered containers.
//!
//! A [`Stack`] is a shared handle over an ordered element vector and its configuration
//! record. The engine is split by concern:
//! - `mutate`: push, pop, insert, remove, replace, reverse, reset, sort and transfer.
//! - `index`: raw, negative and forward-clamped index resolution.
//! - `render`: validity checks and string assembly.
//!
//! Clones share the instance; [`Stack::default`] is an uninitialized handle on which every
//! mutation is a no-op.
//!
//! ```
//! use stackage::prelude::*;
//!
//! let stack = Stack::and();
//! stack.set_paren(true).push(["a", "b", "c"]);
//! assert_eq!(stack.to_string(), "(a AND b AND c)");
//! assert_eq!(stack.pop().and_then(|v| v.as_str().map(str::to_string)).as_deref(), Some("c"));
//! ```
mod index;
mod mutate;
mod render;

use std::{fmt, sync::Arc};

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::{
    auxiliary::Auxiliary,
    config::{Encapsulation, Flags, StackConfig},
    ext::log::{LogConfig, LogLevels, LogSink, stk_event},
    kind::Kind,
    policy::StackPolicies,
    utils::error::{StkError, StkResult},
    value::Value,
};

pub(crate) struct StackState {
    pub(crate) config: StackConfig,
    pub(crate) elements: Vec<Value>,
}

pub(crate) struct StackInner {
    state: RwLock<StackState>,
    /// Opt-in, non-recursive mutation lock.
    mutex: OnceCell<Mutex<()>>,
}

/// Shared handle over an ordered container of [`Value`]s.
#[derive(Clone, Default)]
pub struct Stack(Option<Arc<StackInner>>);

macro_rules! constructors {
    ($($name:ident, $with_capacity:ident => $kind:ident;)+) => {
        $(
            #[doc = concat!("New unbounded `", stringify!($kind), "` stack.")]
            pub fn $name() -> Self {
                Self::new(Kind::$kind)
            }

            #[doc = concat!("New `", stringify!($kind), "` stack holding at most `capacity` elements (0 = unbounded).")]
            pub fn $with_capacity(capacity: usize) -> Self {
                Self::with_capacity(Kind::$kind, capacity)
            }
        )+
    };
}

impl Stack {
    pub fn new(kind: Kind) -> Self {
        Self::with_capacity(kind, 0)
    }

    pub fn with_capacity(kind: Kind, capacity: usize) -> Self {
        let elements = if capacity > 0 {
            Vec::with_capacity(capacity)
        } else {
            Vec::new()
        };

        let stack = Self(Some(Arc::new(StackInner {
            state: RwLock::new(StackState {
                config: StackConfig::new(kind, capacity),
                elements,
            }),
            mutex: OnceCell::new(),
        })));

        stk_event!(stack, LogLevels::STATE, Debug, "init", "new {kind} stack (capacity {capacity})");
        stack
    }

    constructors! {
        and, and_with_capacity => And;
        or, or_with_capacity => Or;
        not, not_with_capacity => Not;
        list, list_with_capacity => List;
        basic, basic_with_capacity => Basic;
    }

    // ---------------------------------------------------------------------------------
    // Internal access
    // ---------------------------------------------------------------------------------

    #[inline]
    pub(crate) fn read<R>(&self, f: impl FnOnce(&StackState) -> R) -> Option<R> {
        self.0.as_ref().map(|inner| f(&inner.state.read_recursive()))
    }

    #[inline]
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut StackState) -> R) -> Option<R> {
        self.0.as_ref().map(|inner| f(&mut inner.state.write()))
    }

    /// Acquire the opt-in mutex, if this instance has one.
    pub(crate) fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        let mutex = self.0.as_ref()?.mutex.get()?;
        stk_event!(self, LogLevels::LOCKS, Trace, "lock", "acquiring mutex");
        Some(mutex.lock())
    }

    /// Log configuration and source id, when `category` is selected.
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

    /// Record `err` as the last error of this instance.
    pub(crate) fn record(&self, err: StkError) {
        stk_event!(self, LogLevels::ERRORS, Error, "error", "{err}");
        self.write(|s| s.config.common.err = Some(err));
    }

    pub(crate) fn policies(&self) -> StackPolicies {
        self.read(|s| s.config.policies.clone()).unwrap_or_default()
    }

    fn configure(&self, tag: &'static str, f: impl FnOnce(&mut StackConfig)) -> &Self {
        if self.write(|s| f(&mut s.config)).is_some() {
            stk_event!(self, LogLevels::STATE, Debug, tag, "configuration updated");
        }
        self
    }

    /// Like [`Stack::configure`], refused on BASIC stacks.
    fn configure_styled(&self, tag: &'static str, f: impl FnOnce(&mut StackConfig)) -> &Self {
        if self.kind().is_basic() {
            if self.is_init() {
                self.record(StkError::BasicNotConfigurable(tag));
            }
            return self;
        }
        self.configure(tag, f)
    }

    fn toggle(&self, tag: &'static str, flag: Flags, on: bool) -> &Self {
        if Flags::PRESENTATION.intersects(flag) {
            self.configure_styled(tag, |config| config.common.flags.set(flag, on))
        } else {
            self.configure(tag, |config| config.common.flags.set(flag, on))
        }
    }

    // ---------------------------------------------------------------------------------
    // Identity and lifecycle
    // ---------------------------------------------------------------------------------

    pub fn is_init(&self) -> bool {
        self.0.is_some()
    }

    /// Returns true when both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Stack) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Address of the shared instance (0 when uninitialized).
    pub fn addr(&self) -> usize {
        self.0.as_ref().map_or(0, |inner| Arc::as_ptr(inner) as usize)
    }

    /// Release this handle. Other handles keep the instance alive until dropped.
    pub fn free(&mut self) {
        stk_event!(self, LogLevels::STATE, Debug, "free", "releasing handle");
        self.0 = None;
    }

    // ---------------------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------------------

    /// Kind of the stack; uninitialized handles report [`Kind::Basic`].
    pub fn kind(&self) -> Kind {
        self.read(|s| s.config.kind).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.read(|s| s.elements.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity; 0 means unbounded.
    pub fn cap(&self) -> usize {
        self.read(|s| s.config.capacity).unwrap_or(0)
    }

    /// Remaining room, or `None` when unbounded.
    pub fn avail(&self) -> Option<usize> {
        self.read(|s| {
            (s.config.capacity > 0).then(|| s.config.capacity.saturating_sub(s.elements.len()))
        })
        .unwrap_or(Some(0))
    }

    /// Snapshot of the elements.
    pub fn elements(&self) -> Vec<Value> {
        self.read(|s| s.elements.clone()).unwrap_or_default()
    }

    pub fn flags(&self) -> Flags {
        self.read(|s| s.config.flags()).unwrap_or_default()
    }

    fn has(&self, flag: Flags) -> bool {
        self.flags().contains(flag)
    }

    pub fn is_fifo(&self) -> bool {
        self.has(Flags::FIFO)
    }

    pub fn is_paren(&self) -> bool {
        self.has(Flags::PAREN)
    }

    pub fn is_padded(&self) -> bool {
        !self.has(Flags::NO_PAD)
    }

    pub fn is_folded(&self) -> bool {
        self.has(Flags::FOLD)
    }

    pub fn is_lead_once(&self) -> bool {
        self.has(Flags::LEAD_ONCE)
    }

    pub fn is_read_only(&self) -> bool {
        self.has(Flags::READ_ONLY)
    }

    pub fn can_nest(&self) -> bool {
        !self.has(Flags::NO_NEST)
    }

    pub fn is_neg_index(&self) -> bool {
        self.has(Flags::NEG_INDEX)
    }

    pub fn is_fwd_index(&self) -> bool {
        self.has(Flags::FWD_INDEX)
    }

    pub fn has_mutex(&self) -> bool {
        self.0.as_ref().is_some_and(|inner| inner.mutex.get().is_some())
    }

    /// Custom operator symbol.
    pub fn symbol(&self) -> Option<String> {
        self.read(|s| s.config.symbol.clone()).flatten()
    }

    /// Custom LIST delimiter.
    pub fn delimiter(&self) -> Option<String> {
        self.read(|s| s.config.delimiter.clone()).flatten()
    }

    /// Encapsulation layers, innermost first.
    pub fn encap(&self) -> Vec<Encapsulation> {
        self.read(|s| s.config.common.encap.clone()).unwrap_or_default()
    }

    pub fn id(&self) -> String {
        self.read(|s| s.config.common.id.clone()).unwrap_or_default()
    }

    pub fn category(&self) -> String {
        self.read(|s| s.config.common.category.clone()).unwrap_or_default()
    }

    /// Last error recorded by a mutation or setter.
    pub fn err(&self) -> Option<StkError> {
        self.read(|s| s.config.common.err.clone()).flatten()
    }

    /// The auxiliary store, allocated on first access.
    pub fn auxiliary(&self) -> Option<Auxiliary> {
        self.write(|s| s.config.common.auxiliary())
    }

    pub fn log_levels(&self) -> LogLevels {
        self.read(|s| s.config.common.log.levels()).unwrap_or_default()
    }

    // ---------------------------------------------------------------------------------
    // Setters
    // ---------------------------------------------------------------------------------

    pub fn set_paren(&self, on: bool) -> &Self {
        self.toggle("set_paren", Flags::PAREN, on)
    }

    pub fn set_fold(&self, on: bool) -> &Self {
        self.toggle("set_fold", Flags::FOLD, on)
    }

    pub fn set_no_pad(&self, on: bool) -> &Self {
        self.toggle("set_no_pad", Flags::NO_PAD, on)
    }

    pub fn set_lead_once(&self, on: bool) -> &Self {
        self.toggle("set_lead_once", Flags::LEAD_ONCE, on)
    }

    pub fn set_neg_index(&self, on: bool) -> &Self {
        self.toggle("set_neg_index", Flags::NEG_INDEX, on)
    }

    pub fn set_fwd_index(&self, on: bool) -> &Self {
        self.toggle("set_fwd_index", Flags::FWD_INDEX, on)
    }

    pub fn set_read_only(&self, on: bool) -> &Self {
        self.toggle("set_read_only", Flags::READ_ONLY, on)
    }

    pub fn set_no_nest(&self, on: bool) -> &Self {
        self.toggle("set_no_nest", Flags::NO_NEST, on)
    }

    /// Switch to first-in-first-out popping. `false` is ignored: FIFO cannot be undone.
    pub fn set_fifo(&self, on: bool) -> &Self {
        if !on {
            return self;
        }
        self.toggle("set_fifo", Flags::FIFO, true)
    }

    pub fn set_symbol(&self, symbol: impl Into<String>) -> &Self {
        let symbol = symbol.into();
        self.configure_styled("set_symbol", |config| config.symbol = Some(symbol))
    }

    pub fn set_delimiter(&self, delimiter: impl Into<String>) -> &Self {
        let delimiter = delimiter.into();
        self.configure_styled("set_delimiter", |config| {
            config.delimiter = Some(delimiter)
        })
    }

    /// Replace the encapsulation layers (innermost first) applied to opaque elements.
    pub fn set_encap<I, E>(&self, layers: I) -> &Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Encapsulation>,
    {
        let layers: Vec<Encapsulation> = layers.into_iter().map(Into::into).collect();
        self.configure_styled("set_encap", |config| config.common.encap = layers)
    }

    /// Set the identifier. `"_random"` draws a random one, `"_addr"` uses the instance address.
    pub fn set_id(&self, id: impl Into<String>) -> &Self {
        let id = resolve_id(id.into(), self.addr());
        self.configure("set_id", |config| config.common.id = id)
    }

    pub fn set_category(&self, category: impl Into<String>) -> &Self {
        let category = category.into();
        self.configure("set_category", |config| config.common.category = category)
    }

    /// Overwrite (or clear, with `None`) the last error.
    pub fn set_err(&self, err: impl Into<Option<StkError>>) -> &Self {
        let err = err.into();
        self.write(|s| s.config.common.err = err);
        self
    }

    /// Equip the instance with a mutation mutex. Idempotent.
    pub fn set_mutex(&self) -> &Self {
        if let Some(inner) = &self.0 {
            inner.mutex.get_or_init(|| Mutex::new(()));
            stk_event!(self, LogLevels::STATE, Debug, "set_mutex", "mutex enabled");
        }
        self
    }

    pub fn set_logger(&self, sink: Arc<dyn LogSink>) -> &Self {
        self.configure("set_logger", |config| config.common.log.set_sink(sink))
    }

    pub fn set_log_levels(&self, levels: LogLevels) -> &Self {
        self.configure("set_log_levels", |config| config.common.log.set_levels(levels))
    }

    pub fn set_push_policy(
        &self,
        policy: impl Fn(&Value) -> StkResult<()> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_push_policy", |config| {
            config.policies.push = Some(Arc::new(policy))
        })
    }

    pub fn set_validity_policy(
        &self,
        policy: impl Fn(&Stack) -> StkResult<()> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_validity_policy", |config| {
            config.policies.validity = Some(Arc::new(policy))
        })
    }

    pub fn set_presentation_policy(
        &self,
        policy: impl Fn(&[Value]) -> String + Send + Sync + 'static,
    ) -> &Self {
        self.configure_styled("set_presentation_policy", |config| {
            config.policies.presentation = Some(Arc::new(policy))
        })
    }

    pub fn set_evaluator(
        &self,
        evaluator: impl Fn(&Stack, &[Value]) -> StkResult<Value> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_evaluator", |config| {
            config.policies.evaluator = Some(Arc::new(evaluator))
        })
    }

    pub fn set_marshal_policy(
        &self,
        policy: impl Fn(&Stack, &[Value]) -> StkResult<()> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_marshal_policy", |config| {
            config.policies.marshal = Some(Arc::new(policy))
        })
    }

    pub fn set_unmarshal_policy(
        &self,
        policy: impl Fn(&Stack) -> StkResult<Vec<Value>> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_unmarshal_policy", |config| {
            config.policies.unmarshal = Some(Arc::new(policy))
        })
    }

    pub fn set_equality_policy(
        &self,
        policy: impl Fn(&Value, &Value) -> StkResult<()> + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_equality_policy", |config| {
            config.policies.equality = Some(Arc::new(policy))
        })
    }

    pub fn set_ordering_policy(
        &self,
        policy: impl Fn(&Value, &Value) -> std::cmp::Ordering + Send + Sync + 'static,
    ) -> &Self {
        self.configure("set_ordering_policy", |config| {
            config.policies.ordering = Some(Arc::new(policy))
        })
    }

    /// Run the evaluator against `inputs`.
    pub fn evaluate(&self, inputs: &[Value]) -> StkResult<Value> {
        if !self.is_init() {
            return Err(StkError::Uninitialized);
        }
        match self.policies().evaluator {
            Some(evaluator) => evaluator(self, inputs),
            None => Err(StkError::NoEvaluator),
        }
    }
}

pub(crate) fn resolve_id(id: String, addr: usize) -> String {
    match id.as_str() {
        "_random" => uuid::Uuid::new_v4().simple().to_string(),
        "_addr" => format!("{addr:#x}"),
        _ => id,
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.read(|s| (s.config.kind, s.config.common.id.clone(), s.elements.clone())) {
            Some((kind, id, elements)) => f
                .debug_struct("Stack")
                .field("kind", &kind)
                .field("id", &id)
                .field("elements", &elements)
                .finish(),
            None => f.write_str("Stack(<uninitialized>)"),
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
