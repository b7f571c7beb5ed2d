use std::rc::Rc;

use crate::value::Value;

/// Check arity of a function application, returning `KappaError::Arity` on mismatch.
///
/// # Forms
///
/// ```ignore
/// check_arity!(args, "fn-name", 2);        // exactly 2
/// check_arity!(args, "fn-name", 1..=2);    // 1 to 2 inclusive
/// ```
#[macro_export]
macro_rules! check_arity {
    ($args:expr, $name:expr, $exact:literal) => {
        if $args.len() != $exact {
            return Err($crate::KappaError::arity(
                $name,
                stringify!($exact),
                $args.len(),
            ));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..= $hi:literal) => {
        if $args.len() < $lo || $args.len() > $hi {
            return Err($crate::KappaError::arity(
                $name,
                concat!(stringify!($lo), "-", stringify!($hi)),
                $args.len(),
            ));
        }
    };
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum KappaError {
    #[error("index error: {index} out of bounds for length {len}")]
    OutOfBounds { index: i64, len: usize },

    #[error("length error: {what} ({expected} vs {got})")]
    Length {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("type error: expected {expected}, got {got}")]
    Type { expected: String, got: String },

    #[error("rank error: index deeper than data (cannot index into {got})")]
    Depth { got: String },

    #[error("domain error: {0}")]
    Domain(String),

    #[error("arity error: {name} expects {expected} args, got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    /// Error value produced by a user function during an update.
    #[error("{0}")]
    Raised(Value),

    #[error("{op}: {inner}")]
    InOp { op: String, inner: Box<KappaError> },

    #[error("{inner}")]
    WithContext {
        inner: Box<KappaError>,
        hint: Option<String>,
    },
}

impl KappaError {
    pub fn out_of_bounds(index: i64, len: usize) -> Self {
        KappaError::OutOfBounds { index, len }
    }

    pub fn length(what: impl Into<String>, expected: usize, got: usize) -> Self {
        KappaError::Length {
            what: what.into(),
            expected,
            got,
        }
    }

    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        KappaError::Type {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn depth(got: impl Into<String>) -> Self {
        KappaError::Depth { got: got.into() }
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        KappaError::Domain(msg.into())
    }

    pub fn arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        KappaError::Arity {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }

    /// Tag this error with the textual form of the operator that failed.
    /// Already-tagged errors keep their innermost operator.
    pub fn in_op(self, op: impl Into<String>) -> Self {
        match self {
            KappaError::InOp { .. } => self,
            KappaError::WithContext { inner, hint } => KappaError::WithContext {
                inner: Box::new(inner.in_op(op)),
                hint,
            },
            other => KappaError::InOp {
                op: op.into(),
                inner: Box::new(other),
            },
        }
    }

    /// Attach a hint (actionable suggestion) to this error.
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            KappaError::WithContext { inner, .. } => KappaError::WithContext {
                inner,
                hint: Some(hint.into()),
            },
            other => KappaError::WithContext {
                inner: Box::new(other),
                hint: Some(hint.into()),
            },
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            KappaError::WithContext { hint, .. } => hint.as_deref(),
            KappaError::InOp { inner, .. } => inner.hint(),
            _ => None,
        }
    }

    /// The operator text recorded by [`KappaError::in_op`], if any.
    pub fn op(&self) -> Option<&str> {
        match self {
            KappaError::InOp { op, .. } => Some(op),
            KappaError::WithContext { inner, .. } => inner.op(),
            _ => None,
        }
    }

    pub fn inner(&self) -> &KappaError {
        match self {
            KappaError::InOp { inner, .. } => inner.inner(),
            KappaError::WithContext { inner, .. } => inner.inner(),
            other => other,
        }
    }

    /// Convert into a language-level error value carrying the full message.
    pub fn into_value(self) -> Value {
        match self.inner() {
            KappaError::Raised(v) if self.op().is_none() => Value::Error(Rc::new(v.clone())),
            _ => Value::Error(Rc::new(Value::str(&self.to_string()))),
        }
    }
}
