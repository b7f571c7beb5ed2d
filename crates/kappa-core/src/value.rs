use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::array::{Array, Typed};
use crate::canonical::canonicalize;
use crate::dict::Dict;
use crate::error::KappaError;

/// Built-in operators that can appear as values (e.g. the `f` of an amend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `::` identity
    Identity,
    /// `:` right (dyadic), used to overwrite in amend
    Right,
    Add,
    /// `-` subtract, or negate when monadic
    Subtract,
    Multiply,
    /// `%` divide, always producing floats
    Divide,
    /// `~` not (monadic) / match (dyadic)
    Not,
    Min,
    Max,
    Equal,
    Less,
    More,
    /// `,` enlist (monadic) / join (dyadic)
    Join,
}

impl Builtin {
    pub const ALL: [Builtin; 13] = [
        Builtin::Identity,
        Builtin::Right,
        Builtin::Add,
        Builtin::Subtract,
        Builtin::Multiply,
        Builtin::Divide,
        Builtin::Not,
        Builtin::Min,
        Builtin::Max,
        Builtin::Equal,
        Builtin::Less,
        Builtin::More,
        Builtin::Join,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Builtin::Identity => "::",
            Builtin::Right => ":",
            Builtin::Add => "+",
            Builtin::Subtract => "-",
            Builtin::Multiply => "*",
            Builtin::Divide => "%",
            Builtin::Not => "~",
            Builtin::Min => "&",
            Builtin::Max => "|",
            Builtin::Equal => "=",
            Builtin::Less => "<",
            Builtin::More => ">",
            Builtin::Join => ",",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.symbol() == s)
    }
}

/// Body of a user-defined function.
pub type LambdaFn = dyn Fn(&[Value]) -> Result<Value, KappaError>;

/// A user-defined function. Identity is the allocation: two lambdas are
/// equal only if they are the same `Rc`.
pub struct Lambda {
    pub name: String,
    pub arity: usize,
    pub func: Box<LambdaFn>,
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<lambda {}/{}>", self.name, self.arity)
    }
}

/// Function objects derived from other functions.
#[derive(Debug, Clone)]
pub enum Derived {
    /// `outer inner`: applies `inner`, then `outer` to its result.
    Compose { outer: Value, inner: Value },
    /// `func[a;]`: partial application, `None` marks a hole.
    Projection { func: Value, args: Vec<Option<Value>> },
}

/// A runtime value.
///
/// Scalars are stored inline; everything else sits behind a shared pointer
/// whose reference count decides whether the engine may mutate in place.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value. In index position it is the wildcard ("every position").
    #[default]
    Nil,
    Int(i64),
    Float(f64),
    Builtin(Builtin),
    Lambda(Rc<Lambda>),
    Str(Rc<str>),
    Array(Array),
    Dict(Rc<Dict>),
    Derived(Rc<Derived>),
    Error(Rc<Value>),
}

impl Value {
    pub fn nil() -> Value {
        Value::Nil
    }

    pub fn int(n: i64) -> Value {
        Value::Int(n)
    }

    pub fn float(f: f64) -> Value {
        Value::Float(f)
    }

    pub fn str(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn builtin(b: Builtin) -> Value {
        Value::Builtin(b)
    }

    pub fn lambda(
        name: impl Into<String>,
        arity: usize,
        f: impl Fn(&[Value]) -> Result<Value, KappaError> + 'static,
    ) -> Value {
        Value::Lambda(Rc::new(Lambda {
            name: name.into(),
            arity,
            func: Box::new(f),
        }))
    }

    pub fn compose(outer: Value, inner: Value) -> Value {
        Value::Derived(Rc::new(Derived::Compose { outer, inner }))
    }

    pub fn project(func: Value, args: Vec<Option<Value>>) -> Value {
        Value::Derived(Rc::new(Derived::Projection { func, args }))
    }

    pub fn error(v: Value) -> Value {
        Value::Error(Rc::new(v))
    }

    pub fn bools(v: Vec<bool>) -> Value {
        Value::Array(Array::Bool(Typed::new(v)))
    }

    pub fn ints(v: Vec<i64>) -> Value {
        Value::Array(Array::Int(Typed::new(v)))
    }

    pub fn floats(v: Vec<f64>) -> Value {
        Value::Array(Array::Float(Typed::new(v)))
    }

    pub fn strs(v: &[&str]) -> Value {
        Value::Array(Array::Str(Typed::new(v.iter().map(|s| Rc::from(*s)).collect())))
    }

    /// A list literal `(a;b;...)`, stored in canonical form.
    pub fn list(v: Vec<Value>) -> Value {
        Value::Array(canonicalize(Array::Generic(Typed::new(v))))
    }

    /// `keys!values`; both sides must be arrays of equal length.
    pub fn dict(keys: Value, values: Value) -> Result<Value, KappaError> {
        let (Value::Array(k), Value::Array(v)) = (&keys, &values) else {
            let got = if keys.as_array().is_some() { &values } else { &keys };
            return Err(KappaError::type_error("array", got.type_name()));
        };
        Ok(Value::Dict(Rc::new(Dict::new(k.clone(), v.clone())?)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Builtin(_) => "builtin",
            Value::Lambda(_) => "lambda",
            Value::Str(_) => "string",
            Value::Array(a) => a.kind().name(),
            Value::Dict(_) => "dict",
            Value::Derived(_) => "derived",
            Value::Error(_) => "error",
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self,
            Value::Builtin(_) | Value::Lambda(_) | Value::Derived(_)
        )
    }

    /// Arrays and dicts: the values a deep-amend path can descend into.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Dict(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Element count for containers, `None` for atoms.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(a.len()),
            Value::Dict(d) => Some(d.len()),
            _ => None,
        }
    }

    /// The neutral "empty" element of this value's type, used to pad
    /// dictionary values when a key is appended.
    pub fn zero_like(&self) -> Value {
        match self {
            Value::Int(_) => Value::Int(0),
            Value::Float(_) => Value::Float(0.0),
            Value::Str(_) => Value::str(""),
            Value::Array(a) => Value::Array(Array::empty(a.kind())),
            Value::Dict(_) => Value::Dict(Rc::new(Dict::empty())),
            _ => Value::Nil,
        }
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(Rc::new(d))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => {
                Rc::ptr_eq(a, b) || (a.keys() == b.keys() && a.values() == b.values())
            }
            (Value::Derived(a), Value::Derived(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Int(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Builtin(b) => b.hash(state),
            Value::Lambda(l) => Rc::as_ptr(l).hash(state),
            Value::Str(s) => s.hash(state),
            // Arrays compare by element regardless of variant, so hash the
            // element values rather than the storage.
            Value::Array(a) => {
                a.len().hash(state);
                for v in a.values() {
                    v.hash(state);
                }
            }
            Value::Dict(d) => {
                d.len().hash(state);
                for k in d.keys().values() {
                    k.hash(state);
                }
            }
            Value::Derived(d) => Rc::as_ptr(d).hash(state),
            Value::Error(e) => e.hash(state),
        }
    }
}

pub(crate) fn fmt_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        write!(f, "0n")
    } else if x.is_infinite() {
        write!(f, "{}0w", if x < 0.0 { "-" } else { "" })
    } else if x.fract() == 0.0 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

pub(crate) fn fmt_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            _ => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => Ok(()),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => fmt_float(f, *x),
            Value::Builtin(b) => write!(f, "{}", b.symbol()),
            Value::Lambda(l) => write!(f, "{}", l.name),
            Value::Str(s) => fmt_str(f, s),
            Value::Array(a) => write!(f, "{a}"),
            Value::Dict(d) => {
                if d.keys().len() == 1 || matches!(d.keys(), Array::Generic(_)) {
                    write!(f, "({})!{}", d.keys(), d.values())
                } else {
                    write!(f, "{}!{}", d.keys(), d.values())
                }
            }
            Value::Derived(d) => match &**d {
                Derived::Compose { outer, inner } => write!(f, "{outer}{inner}"),
                Derived::Projection { func, args } => {
                    write!(f, "{func}[")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ";")?;
                        }
                        if let Some(arg) = arg {
                            write!(f, "{arg}")?;
                        }
                    }
                    write!(f, "]")
                }
            },
            Value::Error(e) => write!(f, "error[{e}]"),
        }
    }
}
