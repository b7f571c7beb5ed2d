use kappa_core::{Derived, KappaError, Result, Value};

use crate::verbs;

/// Call a function value. An error value returned by the callee becomes
/// [`KappaError::Raised`].
pub fn apply(f: &Value, args: &[Value]) -> Result<Value> {
    let out = match f {
        Value::Builtin(b) => match args {
            [x] => verbs::monadic(*b, x),
            [x, y] => verbs::dyadic(*b, x, y),
            _ => Err(KappaError::arity(b.symbol(), "1-2", args.len())),
        },
        Value::Lambda(l) => {
            if args.len() != l.arity {
                return Err(KappaError::arity(&l.name, l.arity.to_string(), args.len()));
            }
            (l.func)(args)
        }
        Value::Derived(d) => match &**d {
            Derived::Compose { outer, inner } => {
                let mid = apply(inner, args)?;
                apply(outer, &[mid])
            }
            Derived::Projection { func, args: bound } => project(func, bound, args),
        },
        other => Err(KappaError::type_error("function", other.type_name())),
    }?;
    match out {
        Value::Error(e) => Err(KappaError::Raised((*e).clone())),
        v => Ok(v),
    }
}

fn project(func: &Value, bound: &[Option<Value>], args: &[Value]) -> Result<Value> {
    let holes = bound.iter().filter(|a| a.is_none()).count();
    if args.len() > holes {
        return Err(KappaError::arity(
            format!("{}", Value::project(func.clone(), bound.to_vec())),
            holes.to_string(),
            args.len(),
        ));
    }
    let mut supplied = args.iter();
    let filled: Vec<Option<Value>> = bound
        .iter()
        .map(|a| a.clone().or_else(|| supplied.next().cloned()))
        .collect();
    if args.len() < holes {
        return Ok(Value::project(func.clone(), filled));
    }
    let full: Vec<Value> = filled.into_iter().flatten().collect();
    apply(func, &full)
}

/// One update step of an amend: `f[old]`, or `f[old;z]` when an operand is
/// present.
pub(crate) fn update(f: &Value, old: Value, z: Option<Value>) -> Result<Value> {
    match z {
        Some(z) => apply(f, &[old, z]),
        None => apply(f, &[old]),
    }
}
