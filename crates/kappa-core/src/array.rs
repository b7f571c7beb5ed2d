//! Array variants and their shared backing stores.
//!
//! Every variant wraps a [`Typed`] handle: an `Rc`-shared buffer plus a
//! window into it and a set of advisory [`Flags`]. The `Rc` strong count is
//! the sharing counter: a handle may write to its buffer only after
//! [`Typed::make_unique`] has proven it is the sole owner (cloning first
//! otherwise), and every write path in this module goes through it.

use std::fmt;
use std::rc::Rc;

use crate::canonical::canonicalize;
use crate::error::KappaError;
use crate::value::{fmt_float, fmt_str, Value};

/// Advisory facts about an array's content.
///
/// Cleared on every mutation; a missing flag only costs a slower path later.
/// `IMMUTABLE` pins the handle: the next mutation clones regardless of the
/// share count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const ASCENDING: Flags = Flags(1 << 0);
    pub const DISTINCT: Flags = Flags(1 << 1);
    /// Int array whose elements are all 0 or 1.
    pub const BOOL: Flags = Flags(1 << 2);
    pub const IMMUTABLE: Flags = Flags(1 << 3);

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    pub fn without(self, other: Flags) -> Flags {
        Flags(self.0 & !other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    Bool,
    Int,
    Float,
    Str,
    Generic,
}

impl ArrayKind {
    pub fn name(self) -> &'static str {
        match self {
            ArrayKind::Bool => "bools",
            ArrayKind::Int => "ints",
            ArrayKind::Float => "floats",
            ArrayKind::Str => "strings",
            ArrayKind::Generic => "list",
        }
    }
}

/// A window `[off, off+len)` into a shared buffer.
#[derive(Debug, Clone)]
pub struct Typed<T> {
    buf: Rc<Vec<T>>,
    off: usize,
    len: usize,
    flags: Flags,
}

impl<T: Clone> Typed<T> {
    pub fn new(items: Vec<T>) -> Self {
        let len = items.len();
        Typed {
            buf: Rc::new(items),
            off: 0,
            len,
            flags: Flags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buf[self.off..self.off + self.len]
    }

    /// Number of handles currently sharing the backing buffer.
    pub fn share_count(&self) -> usize {
        Rc::strong_count(&self.buf)
    }

    pub fn is_unique(&self) -> bool {
        !self.flags.contains(Flags::IMMUTABLE) && Rc::strong_count(&self.buf) == 1
    }

    /// Address of the backing buffer; stable for as long as it is alive.
    pub fn storage_id(&self) -> usize {
        Rc::as_ptr(&self.buf) as usize
    }

    /// True if both handles view the same window of the same buffer.
    pub fn ptr_eq(&self, other: &Typed<T>) -> bool {
        Rc::ptr_eq(&self.buf, &other.buf) && self.off == other.off && self.len == other.len
    }

    /// Sub-window `[i, j)` aliasing this buffer. Bounds are the caller's job.
    pub(crate) fn slice(&self, i: usize, j: usize) -> Self {
        Typed {
            buf: Rc::clone(&self.buf),
            off: self.off + i,
            len: j - i,
            flags: self.flags,
        }
    }

    /// Fresh storage holding a copy of this window.
    pub fn shallow_clone(&self) -> Self {
        Typed::new(self.as_slice().to_vec()).with_flags(self.flags.without(Flags::IMMUTABLE))
    }

    /// Reuse-or-clone: afterwards this handle is the sole owner of its
    /// buffer and its advisory flags are reset. Returns whether a copy was
    /// made.
    pub fn make_unique(&mut self) -> bool {
        let cloned = if self.is_unique() {
            false
        } else {
            tracing::trace!(
                len = self.len,
                shares = self.share_count(),
                pinned = self.flags.contains(Flags::IMMUTABLE),
                "copy-on-write clone"
            );
            self.buf = Rc::new(self.as_slice().to_vec());
            self.off = 0;
            true
        };
        self.flags = Flags::NONE;
        cloned
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.make_unique();
        let (off, len) = (self.off, self.len);
        // Unique at this point, so make_mut never copies.
        &mut Rc::make_mut(&mut self.buf)[off..off + len]
    }

    fn owned_vec(&mut self) -> &mut Vec<T> {
        self.make_unique();
        let (off, len) = (self.off, self.len);
        let v = Rc::make_mut(&mut self.buf);
        if off != 0 || v.len() != len {
            v.truncate(off + len);
            v.drain(..off);
            self.off = 0;
        }
        v
    }

    pub fn push(&mut self, item: T) {
        self.owned_vec().push(item);
        self.len += 1;
    }

    pub fn extend_from_slice(&mut self, items: &[T]) {
        self.owned_vec().extend_from_slice(items);
        self.len += items.len();
    }

    /// Mutable access to the buffer without the copy-on-write step, for
    /// updates that do not change content (such as pinning elements).
    pub(crate) fn get_mut_if_unique(&mut self) -> Option<&mut [T]> {
        let (off, len) = (self.off, self.len);
        Rc::get_mut(&mut self.buf).map(|v| &mut v[off..off + len])
    }
}

/// An array value: one of five backing-store variants.
#[derive(Debug, Clone)]
pub enum Array {
    Bool(Typed<bool>),
    Int(Typed<i64>),
    Float(Typed<f64>),
    Str(Typed<Rc<str>>),
    Generic(Typed<Value>),
}

macro_rules! each {
    ($arr:expr, $t:ident => $body:expr) => {
        match $arr {
            Array::Bool($t) => $body,
            Array::Int($t) => $body,
            Array::Float($t) => $body,
            Array::Str($t) => $body,
            Array::Generic($t) => $body,
        }
    };
}

macro_rules! rewrap {
    ($arr:expr, $t:ident => $body:expr) => {
        match $arr {
            Array::Bool($t) => Array::Bool($body),
            Array::Int($t) => Array::Int($body),
            Array::Float($t) => Array::Float($body),
            Array::Str($t) => Array::Str($body),
            Array::Generic($t) => Array::Generic($body),
        }
    };
}

impl Default for Array {
    fn default() -> Self {
        Array::empty(ArrayKind::Generic)
    }
}

impl Array {
    pub fn empty(kind: ArrayKind) -> Array {
        match kind {
            ArrayKind::Bool => Array::Bool(Typed::new(Vec::new())),
            ArrayKind::Int => Array::Int(Typed::new(Vec::new())),
            ArrayKind::Float => Array::Float(Typed::new(Vec::new())),
            ArrayKind::Str => Array::Str(Typed::new(Vec::new())),
            ArrayKind::Generic => Array::Generic(Typed::new(Vec::new())),
        }
    }

    /// `!n`: the ints `0..n`, flagged ascending and distinct.
    pub fn til(n: usize) -> Array {
        let mut flags = Flags::ASCENDING.union(Flags::DISTINCT);
        if n <= 2 {
            flags = flags.union(Flags::BOOL);
        }
        Array::Int(Typed::new((0..n as i64).collect()).with_flags(flags))
    }

    pub fn kind(&self) -> ArrayKind {
        match self {
            Array::Bool(_) => ArrayKind::Bool,
            Array::Int(_) => ArrayKind::Int,
            Array::Float(_) => ArrayKind::Float,
            Array::Str(_) => ArrayKind::Str,
            Array::Generic(_) => ArrayKind::Generic,
        }
    }

    pub fn len(&self) -> usize {
        each!(self, t => t.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flags(&self) -> Flags {
        each!(self, t => t.flags())
    }

    pub fn set_flags(&mut self, flags: Flags) {
        each!(self, t => t.set_flags(flags))
    }

    pub fn share_count(&self) -> usize {
        each!(self, t => t.share_count())
    }

    pub fn is_unique(&self) -> bool {
        each!(self, t => t.is_unique())
    }

    pub fn storage_id(&self) -> usize {
        each!(self, t => t.storage_id())
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        match (self, other) {
            (Array::Bool(a), Array::Bool(b)) => a.ptr_eq(b),
            (Array::Int(a), Array::Int(b)) => a.ptr_eq(b),
            (Array::Float(a), Array::Float(b)) => a.ptr_eq(b),
            (Array::Str(a), Array::Str(b)) => a.ptr_eq(b),
            (Array::Generic(a), Array::Generic(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// See [`Typed::make_unique`].
    pub fn make_unique(&mut self) -> bool {
        each!(self, t => t.make_unique())
    }

    pub fn shallow_clone(&self) -> Array {
        rewrap!(self, t => t.shallow_clone())
    }

    /// Element `i` as a value, `None` past the end.
    pub fn at(&self, i: usize) -> Option<Value> {
        match self {
            Array::Bool(t) => t.as_slice().get(i).map(|b| Value::Int(*b as i64)),
            Array::Int(t) => t.as_slice().get(i).map(|n| Value::Int(*n)),
            Array::Float(t) => t.as_slice().get(i).map(|x| Value::Float(*x)),
            Array::Str(t) => t.as_slice().get(i).map(|s| Value::Str(Rc::clone(s))),
            Array::Generic(t) => t.as_slice().get(i).cloned(),
        }
    }

    /// Bounds-checked element read.
    pub fn get(&self, i: i64) -> Result<Value, KappaError> {
        usize::try_from(i)
            .ok()
            .and_then(|u| self.at(u))
            .ok_or_else(|| KappaError::out_of_bounds(i, self.len()))
    }

    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).filter_map(move |i| self.at(i))
    }

    /// Sub-array `[i, j)` sharing this array's backing store.
    pub fn slice(&self, i: usize, j: usize) -> Result<Array, KappaError> {
        if j > self.len() {
            return Err(KappaError::out_of_bounds(j as i64, self.len()));
        }
        if i > j {
            return Err(KappaError::out_of_bounds(i as i64, j));
        }
        Ok(rewrap!(self, t => t.slice(i, j)))
    }

    /// Whether `v` can be stored in this variant without boxing.
    pub fn accepts(&self, v: &Value) -> bool {
        match (self, v) {
            (Array::Bool(_), Value::Int(n)) => *n == 0 || *n == 1,
            (Array::Int(_), Value::Int(_)) => true,
            (Array::Float(_), Value::Float(_)) => true,
            (Array::Str(_), Value::Str(_)) => true,
            (Array::Generic(_), _) => true,
            _ => false,
        }
    }

    /// Write element `i`, handing the value back if the variant cannot hold
    /// it. Establishes unique ownership first; panics only if `i` is out of
    /// bounds, which callers check beforehand.
    pub fn set(&mut self, i: usize, v: Value) -> Result<(), Value> {
        match (self, v) {
            (Array::Bool(t), Value::Int(n)) if n == 0 || n == 1 => t.as_mut_slice()[i] = n == 1,
            (Array::Int(t), Value::Int(n)) => t.as_mut_slice()[i] = n,
            (Array::Float(t), Value::Float(x)) => t.as_mut_slice()[i] = x,
            (Array::Str(t), Value::Str(s)) => t.as_mut_slice()[i] = s,
            (Array::Generic(t), v) => t.as_mut_slice()[i] = v,
            (_, v) => return Err(v),
        }
        Ok(())
    }

    /// Replace a specialized array by a Generic copy of its elements.
    pub fn widen(&mut self) {
        if matches!(self, Array::Generic(_)) {
            return;
        }
        tracing::debug!(from = self.kind().name(), len = self.len(), "widening to generic");
        *self = Array::Generic(Typed::new(self.values().collect()));
    }

    /// [`Array::set`], widening to Generic when the value does not fit.
    pub fn set_widening(&mut self, i: usize, v: Value) {
        if let Err(v) = self.set(i, v) {
            self.widen();
            if let Array::Generic(t) = self {
                t.as_mut_slice()[i] = v;
            }
        }
    }

    pub fn push_widening(&mut self, v: Value) {
        let v = match (&mut *self, v) {
            (Array::Bool(t), Value::Int(n)) if n == 0 || n == 1 => return t.push(n == 1),
            (Array::Int(t), Value::Int(n)) => return t.push(n),
            (Array::Float(t), Value::Float(x)) => return t.push(x),
            (Array::Str(t), Value::Str(s)) => return t.push(s),
            (Array::Generic(t), v) => return t.push(v),
            (_, v) => v,
        };
        self.widen();
        if let Array::Generic(t) = self {
            t.push(v);
        }
    }

    /// Mutable element slots of a Generic array, after copy-on-write.
    pub fn generic_slots_mut(&mut self) -> Option<&mut [Value]> {
        match self {
            Array::Generic(t) => Some(t.as_mut_slice()),
            _ => None,
        }
    }

    /// Type-appropriate filler used when padding.
    pub fn zero(&self) -> Value {
        match self {
            Array::Bool(_) | Array::Int(_) => Value::Int(0),
            Array::Float(_) => Value::Float(0.0),
            Array::Str(_) => Value::str(""),
            Array::Generic(t) => t
                .as_slice()
                .first()
                .map(Value::zero_like)
                .unwrap_or(Value::Nil),
        }
    }

    /// Elements at the given positions, same variant.
    pub fn select(&self, positions: &[usize]) -> Result<Array, KappaError> {
        if let Some(&bad) = positions.iter().find(|&&i| i >= self.len()) {
            return Err(KappaError::out_of_bounds(bad as i64, self.len()));
        }
        fn pick<T: Clone>(t: &Typed<T>, positions: &[usize]) -> Typed<T> {
            let s = t.as_slice();
            Typed::new(positions.iter().map(|&i| s[i].clone()).collect())
        }
        Ok(rewrap!(self, t => pick(t, positions)))
    }

    /// `x,y` for arrays: same variant when possible, canonical otherwise.
    pub fn concat(&self, other: &Array) -> Array {
        fn join<T: Clone>(a: &Typed<T>, b: &Typed<T>) -> Typed<T> {
            let mut v = Vec::with_capacity(a.len() + b.len());
            v.extend_from_slice(a.as_slice());
            v.extend_from_slice(b.as_slice());
            Typed::new(v)
        }
        match (self, other) {
            (Array::Bool(a), Array::Bool(b)) => Array::Bool(join(a, b)),
            (Array::Int(a), Array::Int(b)) => Array::Int(join(a, b)),
            (Array::Float(a), Array::Float(b)) => Array::Float(join(a, b)),
            (Array::Str(a), Array::Str(b)) => Array::Str(join(a, b)),
            _ if other.is_empty() => self.clone(),
            _ if self.is_empty() => other.clone(),
            _ => {
                let items: Vec<Value> = self.values().chain(other.values()).collect();
                canonicalize(Array::Generic(Typed::new(items)))
            }
        }
    }

    /// Position of the first element equal to `v`. Uses binary search when
    /// the array is flagged ascending.
    pub fn find(&self, v: &Value) -> Option<usize> {
        if self.flags().contains(Flags::ASCENDING) {
            if let Some(found) = self.search_sorted(v) {
                return found;
            }
        }
        match (self, v) {
            (Array::Bool(t), Value::Int(n)) => t.as_slice().iter().position(|b| *b as i64 == *n),
            (Array::Int(t), Value::Int(n)) => t.as_slice().iter().position(|x| x == n),
            (Array::Float(t), Value::Float(f)) => {
                t.as_slice().iter().position(|x| x.to_bits() == f.to_bits())
            }
            (Array::Str(t), Value::Str(s)) => t.as_slice().iter().position(|x| x == s),
            (Array::Generic(t), v) => t.as_slice().iter().position(|x| x == v),
            _ => None,
        }
    }

    /// Binary search on an ascending specialized array. The outer `None`
    /// means the search does not apply to this variant/value pair. Floats
    /// always scan: equality there is bitwise, which ordering cannot honor.
    fn search_sorted(&self, v: &Value) -> Option<Option<usize>> {
        fn first_eq<T: PartialOrd>(s: &[T], x: &T) -> Option<usize> {
            let i = s.partition_point(|e| e < x);
            (i < s.len() && s[i] == *x).then_some(i)
        }
        match (self, v) {
            (Array::Int(t), Value::Int(n)) => Some(first_eq(t.as_slice(), n)),
            (Array::Str(t), Value::Str(s)) => Some(first_eq(t.as_slice(), s)),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Array::Int(t) => Some(t.as_slice()),
            _ => None,
        }
    }

    pub fn as_generic(&self) -> Option<&[Value]> {
        match self {
            Array::Generic(t) => Some(t.as_slice()),
            _ => None,
        }
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        match (self, other) {
            (Array::Bool(a), Array::Bool(b)) => a.as_slice() == b.as_slice(),
            (Array::Int(a), Array::Int(b)) => a.as_slice() == b.as_slice(),
            (Array::Str(a), Array::Str(b)) => a.as_slice() == b.as_slice(),
            _ => self.values().zip(other.values()).all(|(x, y)| x == y),
        }
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return match self.kind() {
                ArrayKind::Bool | ArrayKind::Int => write!(f, "!0"),
                ArrayKind::Float => write!(f, "0#0.0"),
                ArrayKind::Str => write!(f, "0#\"\""),
                ArrayKind::Generic => write!(f, "()"),
            };
        }
        if self.len() == 1 {
            write!(f, ",")?;
        }
        match self {
            Array::Generic(t) if t.len() > 1 => {
                write!(f, "(")?;
                for (i, v) in t.as_slice().iter().enumerate() {
                    if i > 0 {
                        write!(f, ";")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Array::Generic(t) => match t.as_slice().first() {
                Some(v @ Value::Array(a)) if a.len() != 1 => write!(f, "({v})"),
                Some(v) => write!(f, "{v}"),
                None => Ok(()),
            },
            _ => {
                for (i, v) in self.values().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match v {
                        Value::Float(x) => fmt_float(f, x)?,
                        Value::Str(s) => fmt_str(f, &s)?,
                        other => write!(f, "{other}")?,
                    }
                }
                Ok(())
            }
        }
    }
}
