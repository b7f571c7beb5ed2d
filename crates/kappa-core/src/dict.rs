use hashbrown::HashMap;

use crate::array::{Array, ArrayKind};
use crate::canonical::canonicalize;
use crate::error::KappaError;
use crate::value::Value;

/// An ordered dictionary: parallel key and value arrays of equal length.
///
/// Keys need not be sorted or unique; lookups return the first match and
/// switch to binary search when the keys are flagged ascending.
#[derive(Debug, Clone)]
pub struct Dict {
    keys: Array,
    values: Array,
}

impl Dict {
    pub fn new(keys: Array, values: Array) -> Result<Self, KappaError> {
        if keys.len() != values.len() {
            return Err(KappaError::length(
                "dict keys vs values",
                keys.len(),
                values.len(),
            ));
        }
        Ok(Dict { keys, values })
    }

    pub fn empty() -> Self {
        Dict {
            keys: Array::empty(ArrayKind::Generic),
            values: Array::empty(ArrayKind::Generic),
        }
    }

    pub fn keys(&self) -> &Array {
        &self.keys
    }

    pub fn values(&self) -> &Array {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The values array, for index-addressed updates. Its length must not
    /// change through this reference.
    pub fn values_mut(&mut self) -> &mut Array {
        &mut self.values
    }

    pub fn find(&self, key: &Value) -> Option<usize> {
        self.keys.find(key)
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.find(key).and_then(|i| self.values.at(i))
    }

    /// Resolve a batch of keys to positions. From `hash_min` keys on, a hash
    /// index over this dict's keys replaces per-key scans.
    pub fn find_all(&self, keys: &Array, hash_min: usize) -> Vec<Option<usize>> {
        if keys.len() < hash_min {
            return keys.values().map(|k| self.find(&k)).collect();
        }
        let mut index: HashMap<Value, usize> = HashMap::with_capacity(self.len());
        for (i, k) in self.keys.values().enumerate() {
            index.entry(k).or_insert(i);
        }
        keys.values().map(|k| index.get(&k).copied()).collect()
    }

    /// Append `key`, padding the values with a type-appropriate zero.
    /// Returns the new key's position.
    pub fn insert_key(&mut self, key: Value) -> usize {
        tracing::debug!(key = %key, len = self.len(), "dict key append");
        let pos = self.len();
        self.keys.push_widening(key);
        self.keys = canonicalize(std::mem::take(&mut self.keys));
        let zero = self.values.zero();
        self.values.push_widening(zero);
        pos
    }

    /// Append parallel key and value arrays.
    pub fn extend(&mut self, keys: &Array, values: &Array) -> Result<(), KappaError> {
        if keys.len() != values.len() {
            return Err(KappaError::length(
                "dict keys vs values",
                keys.len(),
                values.len(),
            ));
        }
        self.keys = self.keys.concat(keys);
        self.values = self.values.concat(values);
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.keys.freeze();
        self.values.freeze();
    }
}
