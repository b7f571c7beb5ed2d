//! Built-in operators: monadic and dyadic forms, atomic over arrays and
//! dictionary values.

use std::cmp::Ordering;
use std::rc::Rc;

use kappa_core::{
    canonicalize, AmendConfig, Array, ArrayKind, Builtin, Dict, KappaError, Result, Typed, Value,
};

use crate::keyed::merge;

pub fn monadic(b: Builtin, x: &Value) -> Result<Value> {
    match b {
        Builtin::Identity | Builtin::Right => Ok(x.clone()),
        Builtin::Subtract => map_atoms(x, false, &negate),
        Builtin::Not => match x {
            Value::Array(Array::Bool(t)) => {
                Ok(Value::bools(t.as_slice().iter().map(|b| !b).collect()))
            }
            _ => map_atoms(x, true, &not),
        },
        Builtin::Join => Ok(Value::Array(enlist(x))),
        Builtin::Max => reverse(x),
        _ => Err(KappaError::domain(format!("{} has no monadic form", b.symbol()))),
    }
}

pub fn dyadic(b: Builtin, x: &Value, y: &Value) -> Result<Value> {
    match b {
        Builtin::Identity | Builtin::Right => Ok(y.clone()),
        Builtin::Not => Ok(Value::Int((x == y) as i64)),
        Builtin::Join => join(x, y),
        _ => pervade(b, x, y),
    }
}

fn is_predicate(b: Builtin) -> bool {
    matches!(b, Builtin::Equal | Builtin::Less | Builtin::More | Builtin::Not)
}

fn negate(v: &Value) -> Result<Value> {
    match v {
        Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
        Value::Float(x) => Ok(Value::Float(-x)),
        other => Err(KappaError::type_error("number", other.type_name())),
    }
}

fn not(v: &Value) -> Result<Value> {
    match v {
        Value::Int(n) => Ok(Value::Int((*n == 0) as i64)),
        Value::Float(x) => Ok(Value::Int((*x == 0.0) as i64)),
        other => Err(KappaError::type_error("number", other.type_name())),
    }
}

fn map_atoms(x: &Value, predicate: bool, f: &dyn Fn(&Value) -> Result<Value>) -> Result<Value> {
    match x {
        Value::Array(a) => {
            let items = a
                .values()
                .map(|v| map_atoms(&v, predicate, f))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(collect(items, a.kind(), predicate)))
        }
        Value::Dict(d) => {
            let values = map_atoms(&Value::Array(d.values().clone()), predicate, f)?;
            rebuild(d, values)
        }
        atom => f(atom),
    }
}

/// Assemble elementwise results. Empty results keep `kind`; predicate
/// results that are all 0 or 1 come back as a Bool array.
fn collect(items: Vec<Value>, kind: ArrayKind, predicate: bool) -> Array {
    if items.is_empty() {
        return Array::empty(if predicate { ArrayKind::Bool } else { kind });
    }
    let a = canonicalize(Array::Generic(Typed::new(items)));
    match a.as_ints() {
        Some(ns) if predicate && ns.iter().all(|n| *n == 0 || *n == 1) => {
            Array::Bool(Typed::new(ns.iter().map(|n| *n == 1).collect()))
        }
        _ => a,
    }
}

fn rebuild(d: &Dict, values: Value) -> Result<Value> {
    let Value::Array(values) = values else {
        return Err(KappaError::type_error("array", values.type_name()));
    };
    Ok(Value::Dict(Rc::new(Dict::new(d.keys().clone(), values)?)))
}

fn pervade(b: Builtin, x: &Value, y: &Value) -> Result<Value> {
    let predicate = is_predicate(b);
    match (x, y) {
        (Value::Dict(l), Value::Dict(r)) => {
            Ok(merge(l, r, &Value::Builtin(b), &AmendConfig::default())?.into())
        }
        (Value::Dict(d), _) => {
            let values = pervade(b, &Value::Array(d.values().clone()), y)?;
            rebuild(d, values)
        }
        (_, Value::Dict(d)) => {
            let values = pervade(b, x, &Value::Array(d.values().clone()))?;
            rebuild(d, values)
        }
        (Value::Array(a), Value::Array(c)) => {
            if a.len() != c.len() {
                return Err(KappaError::length(
                    format!("{} operands", b.symbol()),
                    a.len(),
                    c.len(),
                ));
            }
            let items = a
                .values()
                .zip(c.values())
                .map(|(u, v)| pervade(b, &u, &v))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(collect(items, a.kind(), predicate)))
        }
        (Value::Array(a), _) => {
            let items = a
                .values()
                .map(|u| pervade(b, &u, y))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(collect(items, a.kind(), predicate)))
        }
        (_, Value::Array(c)) => {
            let items = c
                .values()
                .map(|v| pervade(b, x, &v))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(collect(items, c.kind(), predicate)))
        }
        _ => atom(b, x, y),
    }
}

fn atom(b: Builtin, x: &Value, y: &Value) -> Result<Value> {
    match (x, y) {
        (Value::Int(m), Value::Int(n)) => Ok(int_op(b, *m, *n)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            match (x.as_float(), y.as_float()) {
                (Some(m), Some(n)) => Ok(float_op(b, m, n)),
                _ => Err(KappaError::type_error("number", x.type_name())),
            }
        }
        (Value::Str(s), Value::Str(t)) => str_op(b, s, t),
        (Value::Int(_) | Value::Float(_), bad) | (bad, _) => {
            Err(KappaError::type_error("number", bad.type_name()))
        }
    }
}

fn int_op(b: Builtin, m: i64, n: i64) -> Value {
    match b {
        Builtin::Add => Value::Int(m.wrapping_add(n)),
        Builtin::Subtract => Value::Int(m.wrapping_sub(n)),
        Builtin::Multiply => Value::Int(m.wrapping_mul(n)),
        Builtin::Divide => Value::Float(m as f64 / n as f64),
        Builtin::Min => Value::Int(m.min(n)),
        Builtin::Max => Value::Int(m.max(n)),
        _ => compare(b, m.cmp(&n)),
    }
}

fn float_op(b: Builtin, m: f64, n: f64) -> Value {
    match b {
        Builtin::Add => Value::Float(m + n),
        Builtin::Subtract => Value::Float(m - n),
        Builtin::Multiply => Value::Float(m * n),
        Builtin::Divide => Value::Float(m / n),
        Builtin::Min => Value::Float(m.min(n)),
        Builtin::Max => Value::Float(m.max(n)),
        _ => match m.partial_cmp(&n) {
            Some(ord) => compare(b, ord),
            None => Value::Int(0),
        },
    }
}

fn str_op(b: Builtin, s: &Rc<str>, t: &Rc<str>) -> Result<Value> {
    match b {
        Builtin::Min => Ok(Value::Str(Rc::clone(s.min(t)))),
        Builtin::Max => Ok(Value::Str(Rc::clone(s.max(t)))),
        Builtin::Equal | Builtin::Less | Builtin::More => Ok(compare(b, s.cmp(t))),
        _ => Err(KappaError::type_error("number", "string")),
    }
}

fn compare(b: Builtin, ord: Ordering) -> Value {
    let hit = match b {
        Builtin::Equal => ord == Ordering::Equal,
        Builtin::Less => ord == Ordering::Less,
        _ => ord == Ordering::Greater,
    };
    Value::Int(hit as i64)
}

fn enlist(x: &Value) -> Array {
    canonicalize(Array::Generic(Typed::new(vec![x.clone()])))
}

fn reverse(x: &Value) -> Result<Value> {
    match x {
        Value::Array(a) => {
            let positions: Vec<usize> = (0..a.len()).rev().collect();
            Ok(Value::Array(a.select(&positions)?))
        }
        other => Ok(other.clone()),
    }
}

fn join(x: &Value, y: &Value) -> Result<Value> {
    match (x, y) {
        (Value::Dict(l), Value::Dict(r)) => {
            Ok(merge(l, r, &Value::Builtin(Builtin::Right), &AmendConfig::default())?.into())
        }
        (Value::Array(a), Value::Array(c)) => Ok(Value::Array(a.concat(c))),
        (Value::Array(a), atom) => Ok(Value::Array(a.concat(&enlist(atom)))),
        (atom, Value::Array(c)) => Ok(Value::Array(enlist(atom).concat(c))),
        _ => Ok(Value::list(vec![x.clone(), y.clone()])),
    }
}
