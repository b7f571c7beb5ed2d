//! Key-addressed updates on dictionaries, and the arithmetic merge of two
//! dictionaries.

use kappa_core::{AmendConfig, Array, Dict, Result, Value};

use crate::flat::{amend_shape, checked_operand};
use crate::shape::Shape;

/// Keys of `y` resolved against a dictionary without changing it. Keys not
/// yet present get the positions they will take once appended.
pub(crate) struct KeyPlan {
    shape: Shape,
    missing: Vec<Value>,
}

impl KeyPlan {
    /// The wildcard means every key, an array means one key per element,
    /// and anything else is a single key. An array that is itself a key of
    /// a list of keys counts as that single key.
    pub(crate) fn resolve(d: &Dict, y: &Value, cfg: &AmendConfig) -> KeyPlan {
        let mut missing = Vec::new();
        let shape = match y {
            Value::Nil => Shape::Vector((0..d.len()).collect()),
            Value::Array(keys) => {
                let whole = match d.keys() {
                    Array::Generic(_) => d.find(y),
                    _ => None,
                };
                match whole {
                    Some(p) => Shape::Scalar(p),
                    None => {
                        let found = d.find_all(keys, cfg.hash_find_min);
                        let positions = keys
                            .values()
                            .zip(found)
                            .map(|(k, pos)| {
                                pos.unwrap_or_else(|| pending(d, &mut missing, k))
                            })
                            .collect();
                        Shape::Vector(positions)
                    }
                }
            }
            key => Shape::Scalar(match d.find(key) {
                Some(p) => p,
                None => pending(d, &mut missing, key.clone()),
            }),
        };
        KeyPlan { shape, missing }
    }

    pub(crate) fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Append the missing keys, values padded with a zero.
    pub(crate) fn commit(self, d: &mut Dict) -> Shape {
        for k in self.missing {
            d.insert_key(k);
        }
        self.shape
    }
}

/// Position a missing key will take; repeated keys are appended once.
fn pending(d: &Dict, missing: &mut Vec<Value>, k: Value) -> usize {
    let at = missing.iter().position(|m| *m == k).unwrap_or_else(|| {
        missing.push(k);
        missing.len() - 1
    });
    d.len() + at
}

/// Keys are appended only once the update is known to be applicable, so a
/// rejected call leaves `d` unchanged.
pub(crate) fn amend_dict(
    d: &mut Dict,
    y: &Value,
    f: &Value,
    z: Option<&Value>,
    cfg: &AmendConfig,
) -> Result<()> {
    let plan = KeyPlan::resolve(d, y, cfg);
    checked_operand(f, z, plan.shape())?;
    let shape = plan.commit(d);
    amend_shape(d.values_mut(), &shape, f, z, cfg)
}

/// `left f right` for dictionaries: keys on both sides combine at their
/// left position with `f`; keys only on the right are appended with their
/// right values.
pub fn merge(left: &Dict, right: &Dict, f: &Value, cfg: &AmendConfig) -> Result<Dict> {
    let found = left.find_all(right.keys(), cfg.hash_find_min);
    let mut at_left = Vec::new();
    let mut from_right = Vec::new();
    let mut fresh = Vec::new();
    for (r, pos) in found.into_iter().enumerate() {
        match pos {
            Some(l) => {
                at_left.push(l);
                from_right.push(r);
            }
            None => fresh.push(r),
        }
    }
    tracing::debug!(
        common = at_left.len(),
        appended = fresh.len(),
        "dict merge"
    );
    let mut out = left.clone();
    if !at_left.is_empty() {
        let z = Value::Array(right.values().select(&from_right)?);
        amend_shape(out.values_mut(), &Shape::Vector(at_left), f, Some(&z), cfg)?;
    }
    if !fresh.is_empty() {
        let (keys, values) = (right.keys().select(&fresh)?, right.values().select(&fresh)?);
        out.extend(&keys, &values)?;
    }
    Ok(out)
}
