//! Per-variant loops for the common update functions. Each loop produces
//! exactly what the generic element-by-element path would; anything it
//! cannot handle without widening is left to that path.

use std::rc::Rc;

use kappa_core::{Array, Builtin, Value};

use crate::shape::{Operand, Shape};

/// Try the specialized loop. Returns `false`, having touched nothing, when
/// no loop applies.
pub(crate) fn try_amend(a: &mut Array, shape: &Shape, f: &Value, z: &Operand<'_>) -> bool {
    let Value::Builtin(b) = f else {
        return false;
    };
    let ps = shape.positions();
    if ps.is_empty() {
        return false;
    }
    let hit = match z.value() {
        None => monadic(a, ps, *b),
        Some(zv) => dyadic(a, ps, *b, zv, z.is_parallel()),
    };
    if hit {
        tracing::trace!(op = b.symbol(), kind = a.kind().name(), n = ps.len(), "fast path");
    }
    hit
}

fn monadic(a: &mut Array, ps: &[usize], b: Builtin) -> bool {
    match (a, b) {
        (Array::Int(t), Builtin::Subtract) => each(t.as_mut_slice(), ps, |n| n.wrapping_neg()),
        (Array::Float(t), Builtin::Subtract) => each(t.as_mut_slice(), ps, |x| -x),
        (Array::Int(t), Builtin::Not) => each(t.as_mut_slice(), ps, |n| (n == 0) as i64),
        (Array::Bool(t), Builtin::Not) => each(t.as_mut_slice(), ps, |b| !b),
        _ => return false,
    }
    true
}

fn each<T: Copy>(dst: &mut [T], ps: &[usize], op: impl Fn(T) -> T) {
    for &i in ps {
        dst[i] = op(dst[i]);
    }
}

/// Right-hand operand: one atom for every position, or one element each.
enum Rhs<'a, T> {
    Atom(T),
    Each(&'a [T]),
}

impl<T: Clone> Rhs<'_, T> {
    fn at(&self, k: usize) -> T {
        match self {
            Rhs::Atom(v) => v.clone(),
            Rhs::Each(s) => s[k].clone(),
        }
    }

    fn all(&self, pred: impl Fn(&T) -> bool) -> bool {
        match self {
            Rhs::Atom(v) => pred(v),
            Rhs::Each(s) => s.iter().all(pred),
        }
    }
}

fn ints(z: &Value, parallel: bool) -> Option<Rhs<'_, i64>> {
    match z {
        Value::Int(n) => Some(Rhs::Atom(*n)),
        Value::Array(Array::Int(t)) if parallel => Some(Rhs::Each(t.as_slice())),
        _ => None,
    }
}

fn floats(z: &Value, parallel: bool) -> Option<Rhs<'_, f64>> {
    match z {
        Value::Float(x) => Some(Rhs::Atom(*x)),
        Value::Array(Array::Float(t)) if parallel => Some(Rhs::Each(t.as_slice())),
        _ => None,
    }
}

fn strs(z: &Value, parallel: bool) -> Option<Rhs<'_, Rc<str>>> {
    match z {
        Value::Str(s) => Some(Rhs::Atom(Rc::clone(s))),
        Value::Array(Array::Str(t)) if parallel => Some(Rhs::Each(t.as_slice())),
        _ => None,
    }
}

fn zip<T: Copy, U: Clone>(dst: &mut [T], ps: &[usize], rhs: &Rhs<'_, U>, op: impl Fn(T, U) -> T) {
    for (k, &i) in ps.iter().enumerate() {
        dst[i] = op(dst[i], rhs.at(k));
    }
}

fn int_op(b: Builtin) -> Option<fn(i64, i64) -> i64> {
    let op: fn(i64, i64) -> i64 = match b {
        Builtin::Right => |_, n| n,
        Builtin::Add => i64::wrapping_add,
        Builtin::Subtract => i64::wrapping_sub,
        Builtin::Multiply => i64::wrapping_mul,
        _ => return None,
    };
    Some(op)
}

fn float_op(b: Builtin) -> Option<fn(f64, f64) -> f64> {
    let op: fn(f64, f64) -> f64 = match b {
        Builtin::Add => |x, y| x + y,
        Builtin::Subtract => |x, y| x - y,
        Builtin::Multiply => |x, y| x * y,
        Builtin::Divide => |x, y| x / y,
        _ => return None,
    };
    Some(op)
}

fn dyadic(a: &mut Array, ps: &[usize], b: Builtin, z: &Value, parallel: bool) -> bool {
    match a {
        Array::Int(t) => match (int_op(b), ints(z, parallel)) {
            (Some(op), Some(rhs)) => zip(t.as_mut_slice(), ps, &rhs, op),
            _ => return false,
        },
        Array::Float(t) if b == Builtin::Right => match floats(z, parallel) {
            Some(rhs) => zip(t.as_mut_slice(), ps, &rhs, |_, y| y),
            None => return false,
        },
        Array::Float(t) => {
            let Some(op) = float_op(b) else {
                return false;
            };
            if let Some(rhs) = floats(z, parallel) {
                zip(t.as_mut_slice(), ps, &rhs, op);
            } else if let Some(rhs) = ints(z, parallel) {
                zip(t.as_mut_slice(), ps, &rhs, |x, n| op(x, n as f64));
            } else {
                return false;
            }
        }
        Array::Bool(t) if b == Builtin::Right => match ints(z, parallel) {
            Some(rhs) if rhs.all(|n| *n == 0 || *n == 1) => {
                zip(t.as_mut_slice(), ps, &rhs, |_, n| n == 1)
            }
            _ => return false,
        },
        Array::Str(t) if b == Builtin::Right => match strs(z, parallel) {
            Some(rhs) => {
                let dst = t.as_mut_slice();
                for (k, &i) in ps.iter().enumerate() {
                    dst[i] = rhs.at(k);
                }
            }
            None => return false,
        },
        _ => return false,
    }
    true
}
