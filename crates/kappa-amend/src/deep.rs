//! Path-based amend: `.[x;y;f]` and `.[x;y;f;z]`.
//!
//! The path is consumed one component at a time. Every container on the
//! way down is made unique before its slots are handed out, so nested
//! values shared with another owner are cloned and uniquely owned ones are
//! updated where they sit.

use std::rc::Rc;

use kappa_core::{AmendConfig, Array, KappaError, Result, Value};

use crate::apply::update;
use crate::flat::{self, checked_operand};
use crate::keyed::KeyPlan;
use crate::shape::{Operand, Shape};

pub(crate) fn deep_amend_value(
    x: &mut Value,
    path: &Value,
    f: &Value,
    z: Option<&Value>,
    cfg: &AmendConfig,
) -> Result<()> {
    let components: Vec<Value> = match path {
        Value::Array(a) => a.values().collect(),
        other => vec![other.clone()],
    };
    if components.len() > cfg.max_depth {
        return Err(KappaError::domain(format!(
            "path of length {} exceeds max depth {}",
            components.len(),
            cfg.max_depth
        ))
        .with_hint("raise KAPPA_MAX_DEPTH"));
    }
    descend(x, &components, f, z, cfg)
}

fn descend(
    x: &mut Value,
    path: &[Value],
    f: &Value,
    z: Option<&Value>,
    cfg: &AmendConfig,
) -> Result<()> {
    match path {
        [] => {
            *x = update(f, x.clone(), z.cloned())?;
            Ok(())
        }
        [y] => flat::amend_value(x, y, f, z, cfg),
        [head, rest @ ..] => match x {
            Value::Array(a) => {
                let shape = Shape::resolve(head, a.len())?;
                let z = checked_operand(f, z, &shape)?;
                if shape.positions().is_empty() {
                    return Ok(());
                }
                check_nested(a, shape.positions())?;
                descend_each(slots_of(a), &shape, rest, f, &z, cfg)
            }
            Value::Dict(d) => {
                let plan = KeyPlan::resolve(d, head, cfg);
                let z = checked_operand(f, z, plan.shape())?;
                if plan.shape().positions().is_empty() {
                    return Ok(());
                }
                check_nested(d.values(), plan.shape().positions())?;
                let d = Rc::make_mut(d);
                let shape = plan.commit(d);
                descend_each(slots_of(d.values_mut()), &shape, rest, f, &z, cfg)
            }
            other => Err(KappaError::type_error("array or dict", other.type_name())),
        },
    }
}

fn descend_each(
    slots: &mut [Value],
    shape: &Shape,
    rest: &[Value],
    f: &Value,
    z: &Operand<'_>,
    cfg: &AmendConfig,
) -> Result<()> {
    for (k, &i) in shape.positions().iter().enumerate() {
        descend(&mut slots[i], rest, f, z.at(k).as_ref(), cfg)?;
    }
    Ok(())
}

/// Every selected slot must be a container, including slots of keys about
/// to be appended (which hold `a.zero()`).
fn check_nested(a: &Array, positions: &[usize]) -> Result<()> {
    if !matches!(a, Array::Generic(_)) {
        let got = a.at(0).map_or(a.kind().name(), |v| v.type_name());
        return Err(KappaError::depth(got));
    }
    for &i in positions {
        let slot = a.at(i).unwrap_or_else(|| a.zero());
        if !slot.is_container() {
            return Err(KappaError::depth(slot.type_name()));
        }
    }
    Ok(())
}

/// Writable element slots of a container checked by [`check_nested`].
fn slots_of(a: &mut Array) -> &mut [Value] {
    a.generic_slots_mut().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kappa_core::Builtin;

    fn cfg() -> AmendConfig {
        AmendConfig::default()
    }

    fn matrix() -> Value {
        Value::list(vec![Value::ints(vec![1, 2]), Value::ints(vec![3, 4])])
    }

    #[test]
    fn negate_one_cell() {
        let mut x = matrix();
        let neg = Value::builtin(Builtin::Subtract);
        deep_amend_value(&mut x, &Value::ints(vec![0, 1]), &neg, None, &cfg()).unwrap();
        assert_eq!(
            x,
            Value::list(vec![Value::ints(vec![1, -2]), Value::ints(vec![3, 4])])
        );
    }

    #[test]
    fn wildcard_component_broadcasts() {
        let mut x = matrix();
        let path = Value::list(vec![Value::Nil, Value::int(0)]);
        let z = Value::ints(vec![10, 20]);
        let plus = Value::builtin(Builtin::Add);
        deep_amend_value(&mut x, &path, &plus, Some(&z), &cfg()).unwrap();
        assert_eq!(
            x,
            Value::list(vec![Value::ints(vec![11, 2]), Value::ints(vec![23, 4])])
        );
    }

    #[test]
    fn shared_rows_are_cloned() {
        let row = Value::ints(vec![1, 2]);
        let mut x = Value::list(vec![row.clone(), row.clone()]);
        let right = Value::builtin(Builtin::Right);
        let nine = Value::int(9);
        deep_amend_value(&mut x, &Value::ints(vec![1, 0]), &right, Some(&nine), &cfg()).unwrap();
        assert_eq!(row, Value::ints(vec![1, 2]));
        assert_eq!(
            x,
            Value::list(vec![Value::ints(vec![1, 2]), Value::ints(vec![9, 2])])
        );
    }

    #[test]
    fn deeper_than_data() {
        let mut x = Value::ints(vec![1, 2]);
        let neg = Value::builtin(Builtin::Subtract);
        let err =
            deep_amend_value(&mut x, &Value::ints(vec![0, 0]), &neg, None, &cfg()).unwrap_err();
        assert!(matches!(err, KappaError::Depth { .. }));
        let mut x = Value::list(vec![Value::int(1), Value::str("a")]);
        let err =
            deep_amend_value(&mut x, &Value::ints(vec![1, 0]), &neg, None, &cfg()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "rank error: index deeper than data (cannot index into string)"
        );
    }

    #[test]
    fn through_dict_values() {
        let d = Value::dict(Value::strs(&["p", "q"]), matrix()).unwrap();
        let mut x = d.clone();
        let path = Value::list(vec![Value::str("q"), Value::int(1)]);
        let neg = Value::builtin(Builtin::Subtract);
        deep_amend_value(&mut x, &path, &neg, None, &cfg()).unwrap();
        let expected = Value::dict(
            Value::strs(&["p", "q"]),
            Value::list(vec![Value::ints(vec![1, 2]), Value::ints(vec![3, -4])]),
        )
        .unwrap();
        assert_eq!(x, expected);
        assert_eq!(d, Value::dict(Value::strs(&["p", "q"]), matrix()).unwrap());
    }

    #[test]
    fn rejected_update_leaves_dict_unchanged() {
        let d = Value::dict(Value::strs(&["p", "q"]), matrix()).unwrap();
        let right = Value::builtin(Builtin::Right);

        let mut x = d.clone();
        let path = Value::list(vec![Value::strs(&["x", "y"]), Value::int(0)]);
        let z = Value::ints(vec![1, 2, 3]);
        let err = deep_amend_value(&mut x, &path, &right, Some(&z), &cfg()).unwrap_err();
        assert!(matches!(err, KappaError::Length { .. }), "{err}");
        assert_eq!(x, d);

        let mut x = d.clone();
        let path = Value::list(vec![Value::str("q"), Value::int(0)]);
        let err = deep_amend_value(&mut x, &path, &Value::int(3), None, &cfg()).unwrap_err();
        assert!(matches!(err, KappaError::Type { .. }), "{err}");
        assert_eq!(x, d);
    }

    #[test]
    fn missing_key_padding_must_be_indexable() {
        let values = Value::list(vec![Value::int(1), Value::str("s")]);
        let d = Value::dict(Value::strs(&["a", "b"]), values).unwrap();
        let mut x = d.clone();
        let path = Value::list(vec![Value::str("q"), Value::int(0)]);
        let neg = Value::builtin(Builtin::Subtract);
        let err = deep_amend_value(&mut x, &path, &neg, None, &cfg()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "rank error: index deeper than data (cannot index into int)"
        );
        assert_eq!(x, d);
    }

    #[test]
    fn empty_selection_touches_nothing() {
        let mut x = Value::ints(vec![1, 2, 3]);
        let path = Value::list(vec![Value::ints(vec![]), Value::int(0)]);
        let neg = Value::builtin(Builtin::Subtract);
        deep_amend_value(&mut x, &path, &neg, None, &cfg()).unwrap();
        assert_eq!(x, Value::ints(vec![1, 2, 3]));

        let d = Value::dict(Value::strs(&["p"]), Value::ints(vec![5])).unwrap();
        let mut x = d.clone();
        let path = Value::list(vec![Value::strs(&[]), Value::int(0)]);
        deep_amend_value(&mut x, &path, &neg, None, &cfg()).unwrap();
        assert_eq!(x, d);
    }

    #[test]
    fn empty_path_applies_to_whole() {
        let mut x = Value::ints(vec![1, 2]);
        let neg = Value::builtin(Builtin::Subtract);
        deep_amend_value(&mut x, &Value::ints(vec![]), &neg, None, &cfg()).unwrap();
        assert_eq!(x, Value::ints(vec![-1, -2]));
    }

    #[test]
    fn too_deep_is_refused() {
        let mut x = matrix();
        let tight = AmendConfig {
            max_depth: 1,
            ..AmendConfig::default()
        };
        let neg = Value::builtin(Builtin::Subtract);
        let err =
            deep_amend_value(&mut x, &Value::ints(vec![0, 0]), &neg, None, &tight).unwrap_err();
        assert!(matches!(err.inner(), KappaError::Domain(_)));
        assert_eq!(err.hint(), Some("raise KAPPA_MAX_DEPTH"));
    }
}
