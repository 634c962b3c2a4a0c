use crate::{config::Flags, value::Value};

use super::Stack;

/// Map a caller index onto `0..len` under the stack's index flags.
///
/// Negative indices count from the end and wrap (`-1` is the last element) when
/// [`Flags::NEG_INDEX`] is set; positive indices past the end clamp to the last element
/// when [`Flags::FWD_INDEX`] is set. Everything else is not found.
pub(crate) fn resolve_index(index: isize, len: usize, flags: Flags) -> Option<usize> {
    if len == 0 {
        return None;
    }

    if index >= 0 {
        let index = index as usize;
        if index < len {
            Some(index)
        } else if flags.contains(Flags::FWD_INDEX) {
            Some(len - 1)
        } else {
            None
        }
    } else if flags.contains(Flags::NEG_INDEX) {
        Some(index.rem_euclid(len as isize) as usize)
    } else {
        None
    }
}

/// [`resolve_index`] without forward clamping.
pub(crate) fn resolve_strict(index: isize, len: usize, flags: Flags) -> Option<usize> {
    resolve_index(index, len, flags - Flags::FWD_INDEX)
}

impl Stack {
    /// Element at `index`, resolved under this stack's index flags.
    pub fn index(&self, index: isize) -> Option<Value> {
        self.read(|s| {
            resolve_index(index, s.elements.len(), s.config.flags())
                .map(|i| s.elements[i].clone())
        })
        .flatten()
    }

    /// First element, regardless of ordering mode.
    pub fn first(&self) -> Option<Value> {
        self.read(|s| s.elements.first().cloned()).flatten()
    }

    /// Last element, regardless of ordering mode.
    pub fn last(&self) -> Option<Value> {
        self.read(|s| s.elements.last().cloned()).flatten()
    }
}
