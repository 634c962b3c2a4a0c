use crate::{
    config::Flags,
    ext::log::{LogLevels, Severity, stk_event},
    policy::PushPolicy,
    utils::error::{StkError, StkResult},
    value::Value,
    walker,
};

use super::{Stack, index::{resolve_index, resolve_strict}};

/// Admission state read once, before any policy runs.
pub(crate) struct Gate {
    push: Option<PushPolicy>,
    no_nest: bool,
    /// Free slots, `None` when unbounded.
    room: Option<usize>,
}

impl Stack {
    /// Returns true when the instance exists and accepts mutations.
    fn writable(&self, tag: &'static str) -> bool {
        match self.read(|s| s.config.has(Flags::READ_ONLY)) {
            Some(false) => {
                stk_event!(self, LogLevels::CALLS, Trace, tag, "called (len {})", self.len());
                true
            }
            Some(true) => {
                stk_event!(self, LogLevels::POLICY, Debug, tag, "refused: read-only");
                false
            }
            None => false,
        }
    }

    pub(crate) fn gate(&self, tag: &'static str) -> Option<Gate> {
        if !self.writable(tag) {
            return None;
        }
        self.read(|s| Gate {
            push: s.config.policies.push.clone(),
            no_nest: s.config.has(Flags::NO_NEST),
            room: (s.config.capacity > 0)
                .then(|| s.config.capacity.saturating_sub(s.elements.len())),
        })
    }

    fn capacity_reached(&self, tag: &'static str) {
        if let Some((log, source)) = self.logger(LogLevels::POLICY) {
            log.emit_with(
                LogLevels::POLICY,
                Severity::Debug,
                tag,
                &source,
                module_path!(),
                || "capacity reached".into(),
                || vec![("capacity", self.cap().to_string())],
            );
        }
    }

    /// Decide whether `value` may be stored in this stack.
    pub(crate) fn admit(&self, value: &Value, gate: &Gate) -> StkResult<()> {
        if walker::reaches(value, self.addr()) {
            return Err(StkError::SelfNesting);
        }
        match &gate.push {
            Some(policy) => policy(value),
            None if gate.no_nest && value.as_stack().is_some() => {
                Err(StkError::NestingDisabled(value.kind()))
            }
            None => Ok(()),
        }
    }

    /// Append values in order.
    ///
    /// `Nil` values are skipped, refused values record an error and are skipped, and
    /// pushing stops silently once the capacity is reached.
    pub fn push<I, V>(&self, values: I) -> &Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let Some(gate) = self.gate("push") else {
            return self;
        };

        let mut accepted = Vec::new();
        for value in values {
            if gate.room.is_some_and(|room| accepted.len() >= room) {
                self.capacity_reached("push");
                break;
            }

            let value = value.into();
            if value.is_nil() {
                continue;
            }

            match self.admit(&value, &gate) {
                Ok(()) => accepted.push(value),
                Err(err) => self.record(err),
            }
        }

        if accepted.is_empty() {
            return self;
        }

        let _guard = self.lock();
        self.write(|s| {
            let room = match s.config.capacity {
                0 => usize::MAX,
                capacity => capacity.saturating_sub(s.elements.len()),
            };
            s.elements.extend(accepted.into_iter().take(room));
        });
        self
    }

    /// Remove one element: the last in LIFO mode, the first in FIFO mode.
    pub fn pop(&self) -> Option<Value> {
        if !self.writable("pop") {
            return None;
        }

        let _guard = self.lock();
        self.write(|s| {
            if s.elements.is_empty() {
                None
            } else if s.config.has(Flags::FIFO) {
                Some(s.elements.remove(0))
            } else {
                s.elements.pop()
            }
        })
        .flatten()
    }

    /// Insert `value` before the element at `left` (clamped to `0..=len`).
    pub fn insert(&self, value: impl Into<Value>, left: isize) -> bool {
        let value = value.into();
        if value.is_nil() {
            return false;
        }

        let Some(gate) = self.gate("insert") else {
            return false;
        };
        if gate.room == Some(0) {
            self.capacity_reached("insert");
            return false;
        }
        if let Err(err) = self.admit(&value, &gate) {
            self.record(err);
            return false;
        }

        let _guard = self.lock();
        self.write(|s| {
            if s.config.capacity > 0 && s.elements.len() >= s.config.capacity {
                return false;
            }
            let at = usize::try_from(left).unwrap_or(0).min(s.elements.len());
            s.elements.insert(at, value);
            true
        })
        .unwrap_or(false)
    }

    /// Remove and return the element at `index`, shifting later elements left.
    pub fn remove(&self, index: isize) -> Option<Value> {
        if !self.writable("remove") {
            return None;
        }

        let _guard = self.lock();
        self.write(|s| {
            let at = resolve_index(index, s.elements.len(), s.config.flags())?;
            Some(s.elements.remove(at))
        })
        .flatten()
    }

    /// Overwrite the element at `index`. Forward clamping does not apply.
    pub fn replace(&self, value: impl Into<Value>, index: isize) -> bool {
        let value = value.into();
        if value.is_nil() {
            return false;
        }

        let Some(gate) = self.gate("replace") else {
            return false;
        };
        if let Err(err) = self.admit(&value, &gate) {
            self.record(err);
            return false;
        }

        let _guard = self.lock();
        self.write(|s| match resolve_strict(index, s.elements.len(), s.config.flags()) {
            Some(at) => {
                s.elements[at] = value;
                true
            }
            None => false,
        })
        .unwrap_or(false)
    }

    pub fn reverse(&self) -> &Self {
        if self.writable("reverse") {
            let _guard = self.lock();
            self.write(|s| s.elements.reverse());
        }
        self
    }

    /// Drop every element and the last error; configuration is kept.
    pub fn reset(&self) -> &Self {
        if self.writable("reset") {
            let _guard = self.lock();
            self.write(|s| {
                s.elements.clear();
                s.config.common.err = None;
            });
        }
        self
    }

    /// Stable sort by the ordering policy, or by rendered text when none is set.
    pub fn sort(&self) -> &Self {
        if !self.writable("sort") {
            return self;
        }

        let _guard = self.lock();
        let ordering = self.policies().ordering;
        let mut elements = self.elements();
        match ordering {
            Some(ordering) => elements.sort_by(|a, b| ordering(a, b)),
            None => elements.sort_by_cached_key(|value| value.to_string()),
        }
        self.write(|s| s.elements = elements);
        self
    }

    /// Push clones of every element into `dest`. Returns true when all of them landed.
    pub fn transfer(&self, dest: &Stack) -> bool {
        if !self.is_init() || !dest.is_init() {
            return false;
        }

        let elements = self.elements();
        let before = dest.len();
        dest.push(elements.iter().cloned());
        dest.len() == before + elements.len()
    }
}
