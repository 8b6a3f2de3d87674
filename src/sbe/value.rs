//! Slots, accessors and materialized rows
//!
//! Slot-based stages exchange values through numbered slots. A stage that
//! produces a slot owns an accessor for it; consumers read the current
//! value through `SlotAccessor` after each `get_next` and must not keep the
//! reference past the producer's next `get_next`.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::document::{hash_value, values_equal, Value};

/// Identifier of a value slot
pub type SlotId = u32;

/// Ordered list of slots
pub type SlotVector = Vec<SlotId>;

/// Render slots as `[s1, s2]`
pub fn format_slots(slots: &[SlotId]) -> String {
    let names: Vec<String> = slots.iter().map(|s| format!("s{}", s)).collect();
    format!("[{}]", names.join(", "))
}

/// Read access to the current value of one slot
pub trait SlotAccessor {
    fn get_view_of_value(&self) -> &Value;

    /// Owned copy of the current value
    fn copy_value(&self) -> Value {
        self.get_view_of_value().clone()
    }
}

/// Accessor that owns the value it exposes
#[derive(Debug, Clone, Default)]
pub struct OwnedValueAccessor {
    value: Value,
}

impl OwnedValueAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the exposed value
    pub fn reset(&mut self, value: Value) {
        self.value = value;
    }
}

impl SlotAccessor for OwnedValueAccessor {
    fn get_view_of_value(&self) -> &Value {
        &self.value
    }
}

/// Owned, fixed-arity snapshot of selected slot values
///
/// Equality and hashing follow the canonical value order, so two rows built
/// from different stages with equal contents are the same key.
#[derive(Debug, Clone)]
pub struct MaterializedRow {
    values: Vec<Value>,
}

impl MaterializedRow {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Copy the current values out of `accessors`, in order
    pub fn from_accessors<'a, I>(accessors: I) -> Self
    where
        I: IntoIterator<Item = &'a dyn SlotAccessor>,
    {
        Self {
            values: accessors.into_iter().map(|a| a.copy_value()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_view_of_value(&self, idx: usize) -> &Value {
        &self.values[idx]
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl PartialEq for MaterializedRow {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(l, r)| values_equal(l, r))
    }
}

impl Eq for MaterializedRow {}

impl Hash for MaterializedRow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.len().hash(state);
        for value in &self.values {
            hash_value(value, state);
        }
    }
}

impl fmt::Display for MaterializedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
