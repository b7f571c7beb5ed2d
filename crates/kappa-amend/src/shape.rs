use kappa_core::{Array, KappaError, Result, Value};

/// A resolved, bounds-checked index specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shape {
    Scalar(usize),
    Vector(Vec<usize>),
}

impl Shape {
    /// Resolve an int, an int or bool vector, or the wildcard against a
    /// container of length `len`. Every position is checked before any
    /// write happens.
    pub(crate) fn resolve(y: &Value, len: usize) -> Result<Shape> {
        match y {
            Value::Nil => Ok(Shape::Vector((0..len).collect())),
            Value::Int(i) => Ok(Shape::Scalar(check(*i, len)?)),
            Value::Array(Array::Int(t)) => t
                .as_slice()
                .iter()
                .map(|&i| check(i, len))
                .collect::<Result<_>>()
                .map(Shape::Vector),
            Value::Array(Array::Bool(t)) => t
                .as_slice()
                .iter()
                .map(|&b| check(b as i64, len))
                .collect::<Result<_>>()
                .map(Shape::Vector),
            other => Err(KappaError::type_error("int index", other.type_name())),
        }
    }

    pub(crate) fn positions(&self) -> &[usize] {
        match self {
            Shape::Scalar(i) => std::slice::from_ref(i),
            Shape::Vector(ps) => ps,
        }
    }
}

fn check(i: i64, len: usize) -> Result<usize> {
    usize::try_from(i)
        .ok()
        .filter(|&u| u < len)
        .ok_or_else(|| KappaError::out_of_bounds(i, len))
}

/// The `z` of a four-argument amend, either used whole for every position
/// or spread element-by-element over a vector of positions.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Operand<'a> {
    z: Option<&'a Value>,
    parallel: bool,
}

impl<'a> Operand<'a> {
    pub(crate) fn whole(z: Option<&'a Value>) -> Self {
        Operand { z, parallel: false }
    }

    /// An array `z` pairs with `count` positions and must match in length.
    pub(crate) fn spread(z: Option<&'a Value>, count: usize) -> Result<Self> {
        match z {
            Some(Value::Array(a)) if a.len() != count => {
                Err(KappaError::length("indices vs values", count, a.len()))
            }
            Some(Value::Array(_)) => Ok(Operand { z, parallel: true }),
            _ => Ok(Self::whole(z)),
        }
    }

    pub(crate) fn for_shape(z: Option<&'a Value>, shape: &Shape) -> Result<Self> {
        match shape {
            Shape::Scalar(_) => Ok(Self::whole(z)),
            Shape::Vector(ps) => Self::spread(z, ps.len()),
        }
    }

    /// Operand for the `k`-th position.
    pub(crate) fn at(&self, k: usize) -> Option<Value> {
        let z = self.z?;
        if self.parallel {
            z.as_array().and_then(|a| a.at(k))
        } else {
            Some(z.clone())
        }
    }

    pub(crate) fn value(&self) -> Option<&'a Value> {
        self.z
    }

    pub(crate) fn is_parallel(&self) -> bool {
        self.parallel
    }
}
