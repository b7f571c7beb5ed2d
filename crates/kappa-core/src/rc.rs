//! The sharing discipline used to decide between in-place mutation and
//! copy-on-write.
//!
//! Counters are `Rc` strong counts on backing buffers. They may overcount
//! (a pinned handle, a slice still alive) but never undercount, so the only
//! failure mode is an unnecessary copy.

use std::rc::Rc;

use crate::array::{Array, Flags};
use crate::value::Value;

impl Array {
    /// Count of one and not pinned: in-place mutation is legal.
    pub fn is_uniquely_owned(&self) -> bool {
        self.is_unique()
    }

    /// Pin this handle so its next mutation clones, whatever the count says.
    pub fn mark_shared(&mut self) {
        self.set_flags(self.flags().union(Flags::IMMUTABLE));
    }

    /// The same array if uniquely owned (advisory flags reset), otherwise a
    /// fresh private copy.
    pub fn reuse_or_clone(mut self) -> Array {
        self.make_unique();
        self
    }

    /// Pin this array and, when its buffer is not shared with anyone else,
    /// every value nested in it. Shared buffers need no recursion: cloning
    /// the container already leaves its elements with a count above one.
    pub fn freeze(&mut self) {
        if let Array::Generic(t) = self {
            if let Some(items) = t.get_mut_if_unique() {
                for v in items {
                    v.freeze();
                }
            }
        }
        self.mark_shared();
    }
}

/// Share `value` into `container`: the returned handle bumps the existing
/// counter instead of copying, and a pinned container passes its pin down.
pub fn adopt_shared_ownership(container: &Array, value: &Value) -> Value {
    let mut value = value.clone();
    if container.flags().contains(Flags::IMMUTABLE) {
        value.freeze();
    }
    value
}

impl Value {
    /// See [`Array::freeze`]. Used for literal constants.
    pub fn freeze(&mut self) {
        match self {
            Value::Array(a) => a.freeze(),
            Value::Dict(d) => {
                if let Some(d) = Rc::get_mut(d) {
                    d.freeze();
                }
            }
            _ => {}
        }
    }

    /// Whether mutating this value's payload in place would be invisible
    /// to every other owner. Atoms are trivially unique.
    pub fn is_uniquely_owned(&self) -> bool {
        match self {
            Value::Array(a) => a.is_uniquely_owned(),
            Value::Dict(d) => {
                Rc::strong_count(d) == 1
                    && d.keys().is_uniquely_owned()
                    && d.values().is_uniquely_owned()
            }
            _ => true,
        }
    }
}
