//! The amend engine: `@[x;y;f]`, `@[x;y;f;z]`, `.[x;y;f]`, `.[x;y;f;z]` and
//! their dictionary-keyed forms, plus the built-in operators they apply.
//!
//! The by-value entry points take `x` by value so that a uniquely owned
//! container is updated without a copy; the `_in_place` forms work on the
//! caller's slot and leave any writes committed before a failure in it.

mod apply;
mod deep;
mod fast;
mod flat;
mod keyed;
mod shape;
pub mod verbs;

use kappa_core::{AmendConfig, Result, Value};

pub use apply::apply;
pub use keyed::merge;

/// `@[x;y;f]`
pub fn amend(x: Value, y: &Value, f: &Value, cfg: &AmendConfig) -> Result<Value> {
    let mut x = x;
    amend_in_place(&mut x, y, f, None, cfg)?;
    Ok(x)
}

/// `@[x;y;f;z]`
pub fn amend4(x: Value, y: &Value, f: &Value, z: &Value, cfg: &AmendConfig) -> Result<Value> {
    let mut x = x;
    amend_in_place(&mut x, y, f, Some(z), cfg)?;
    Ok(x)
}

/// `.[x;y;f]`
pub fn deep_amend(x: Value, path: &Value, f: &Value, cfg: &AmendConfig) -> Result<Value> {
    let mut x = x;
    deep_amend_in_place(&mut x, path, f, None, cfg)?;
    Ok(x)
}

/// `.[x;y;f;z]`
pub fn deep_amend4(
    x: Value,
    path: &Value,
    f: &Value,
    z: &Value,
    cfg: &AmendConfig,
) -> Result<Value> {
    let mut x = x;
    deep_amend_in_place(&mut x, path, f, Some(z), cfg)?;
    Ok(x)
}

pub fn amend_in_place(
    x: &mut Value,
    y: &Value,
    f: &Value,
    z: Option<&Value>,
    cfg: &AmendConfig,
) -> Result<()> {
    tracing::debug!(x = x.type_name(), y = y.type_name(), f = %f, dyadic = z.is_some(), "amend");
    flat::amend_value(x, y, f, z, cfg).map_err(|e| e.in_op(surface("@", f, z.is_some())))
}

pub fn deep_amend_in_place(
    x: &mut Value,
    path: &Value,
    f: &Value,
    z: Option<&Value>,
    cfg: &AmendConfig,
) -> Result<()> {
    tracing::debug!(x = x.type_name(), path = %path, f = %f, dyadic = z.is_some(), "deep amend");
    deep::deep_amend_value(x, path, f, z, cfg).map_err(|e| e.in_op(surface(".", f, z.is_some())))
}

/// Textual form of an amend call, e.g. `@[x;y;+;z]`.
pub fn surface(verb: &str, f: &Value, dyadic: bool) -> String {
    let f = match f {
        Value::Builtin(b) => b.symbol().to_string(),
        Value::Lambda(l) => l.name.clone(),
        _ => "f".to_string(),
    };
    if dyadic {
        format!("{verb}[x;y;{f};z]")
    } else {
        format!("{verb}[x;y;{f}]")
    }
}
