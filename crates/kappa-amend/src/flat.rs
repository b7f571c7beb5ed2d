//! Single-level amend: `@[x;y;f]` and `@[x;y;f;z]`.

use std::rc::Rc;

use kappa_core::{canonicalize, AmendConfig, Array, KappaError, Result, Value};

use crate::apply::update;
use crate::fast;
use crate::keyed;
use crate::shape::{Operand, Shape};

/// Amend an array or dictionary in place. Writes committed before a
/// failure stay committed.
pub(crate) fn amend_value(
    x: &mut Value,
    y: &Value,
    f: &Value,
    z: Option<&Value>,
    cfg: &AmendConfig,
) -> Result<()> {
    match x {
        Value::Array(a) => amend_array(a, y, f, z, cfg),
        Value::Dict(d) => keyed::amend_dict(Rc::make_mut(d), y, f, z, cfg),
        other => Err(KappaError::type_error("array or dict", other.type_name())),
    }
}

pub(crate) fn amend_array(
    a: &mut Array,
    y: &Value,
    f: &Value,
    z: Option<&Value>,
    cfg: &AmendConfig,
) -> Result<()> {
    // A list of index specs: each element is amended with its own operand.
    if let Value::Array(Array::Generic(ys)) = y {
        let z = Operand::spread(z, ys.len())?;
        for (k, yk) in ys.as_slice().iter().enumerate() {
            amend_array(a, yk, f, z.at(k).as_ref(), cfg)?;
        }
        return Ok(());
    }
    let shape = Shape::resolve(y, a.len())?;
    amend_shape(a, &shape, f, z, cfg)
}

/// Apply the update at already-resolved positions.
pub(crate) fn amend_shape(
    a: &mut Array,
    shape: &Shape,
    f: &Value,
    z: Option<&Value>,
    cfg: &AmendConfig,
) -> Result<()> {
    let z = checked_operand(f, z, shape)?;
    if cfg.fast_paths && fast::try_amend(a, shape, f, &z) {
        return Ok(());
    }
    let result = write_each(a, shape, f, &z);
    if matches!(a, Array::Generic(_)) {
        *a = canonicalize(std::mem::take(a));
    }
    result
}

/// Checks that reject an update before anything is written: `f` must be
/// callable and a parallel `z` must match the positions.
pub(crate) fn checked_operand<'a>(
    f: &Value,
    z: Option<&'a Value>,
    shape: &Shape,
) -> Result<Operand<'a>> {
    if !f.is_function() {
        return Err(KappaError::type_error("function", f.type_name()));
    }
    Operand::for_shape(z, shape)
}

fn write_each(a: &mut Array, shape: &Shape, f: &Value, z: &Operand<'_>) -> Result<()> {
    for (k, &i) in shape.positions().iter().enumerate() {
        let old = a.get(i as i64)?;
        let new = update(f, old, z.at(k))?;
        a.set_widening(i, new);
    }
    Ok(())
}
