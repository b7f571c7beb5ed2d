use std::rc::Rc;

use crate::array::{Array, ArrayKind, Flags, Typed};
use crate::value::Value;

/// Convert a Generic array to the most specific variant that holds its
/// elements losslessly. Specialized arrays, empty arrays and mixed Generic
/// arrays come back unchanged (the latter with elements adopting the
/// container's ownership).
///
/// Ints become an Int array (flagged [`Flags::BOOL`] when all are 0 or 1),
/// never a Bool array: Bool arrays only come from operations that produce
/// booleans. Ints and floats are not merged.
pub fn canonicalize(array: Array) -> Array {
    let Array::Generic(t) = &array else {
        return array;
    };
    let items = t.as_slice();
    match common_kind(items) {
        Some(ArrayKind::Int) => {
            let ints: Vec<i64> = items.iter().filter_map(Value::as_int).collect();
            let flags = if ints.iter().all(|n| *n == 0 || *n == 1) {
                Flags::BOOL
            } else {
                Flags::NONE
            };
            Array::Int(Typed::new(ints).with_flags(flags))
        }
        Some(ArrayKind::Float) => Array::Float(Typed::new(
            items
                .iter()
                .filter_map(|v| match v {
                    Value::Float(x) => Some(*x),
                    _ => None,
                })
                .collect(),
        )),
        Some(ArrayKind::Str) => Array::Str(Typed::new(
            items
                .iter()
                .filter_map(|v| match v {
                    Value::Str(s) => Some(Rc::clone(s)),
                    _ => None,
                })
                .collect(),
        )),
        _ => adopt_elements(array),
    }
}

/// `canonicalize` lifted to values; non-arrays pass through.
pub fn canonicalize_value(v: Value) -> Value {
    match v {
        Value::Array(a) => Value::Array(canonicalize(a)),
        other => other,
    }
}

fn common_kind(items: &[Value]) -> Option<ArrayKind> {
    let first = match items.first()? {
        Value::Int(_) => ArrayKind::Int,
        Value::Float(_) => ArrayKind::Float,
        Value::Str(_) => ArrayKind::Str,
        _ => return None,
    };
    let same = items.iter().all(|v| {
        matches!(
            (first, v),
            (ArrayKind::Int, Value::Int(_))
                | (ArrayKind::Float, Value::Float(_))
                | (ArrayKind::Str, Value::Str(_))
        )
    });
    same.then_some(first)
}

fn adopt_elements(mut array: Array) -> Array {
    // Elements of a pinned container are reachable through the pin too.
    if array.flags().contains(Flags::IMMUTABLE) {
        array.freeze();
    }
    array
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic(v: Vec<Value>) -> Array {
        Array::Generic(Typed::new(v))
    }

    #[test]
    fn ints_become_int_array() {
        let a = canonicalize(generic(vec![Value::int(1), Value::int(5)]));
        assert_eq!(a.kind(), ArrayKind::Int);
        assert!(!a.flags().contains(Flags::BOOL));
    }

    #[test]
    fn zero_one_ints_are_flagged() {
        let a = canonicalize(generic(vec![Value::int(1), Value::int(0)]));
        assert_eq!(a.kind(), ArrayKind::Int);
        assert!(a.flags().contains(Flags::BOOL));
    }

    #[test]
    fn floats_and_strings() {
        let a = canonicalize(generic(vec![Value::float(1.5), Value::float(2.0)]));
        assert_eq!(a.kind(), ArrayKind::Float);
        let a = canonicalize(generic(vec![Value::str("a"), Value::str("b")]));
        assert_eq!(a.kind(), ArrayKind::Str);
    }

    #[test]
    fn mixed_numbers_stay_generic() {
        let a = canonicalize(generic(vec![Value::int(1), Value::float(2.0)]));
        assert_eq!(a.kind(), ArrayKind::Generic);
    }

    #[test]
    fn nested_arrays_stay_generic() {
        let a = canonicalize(generic(vec![Value::ints(vec![1]), Value::ints(vec![2])]));
        assert_eq!(a.kind(), ArrayKind::Generic);
    }

    #[test]
    fn empty_stays_generic() {
        let a = canonicalize(generic(vec![]));
        assert_eq!(a.kind(), ArrayKind::Generic);
        assert!(a.is_empty());
    }

    #[test]
    fn idempotent() {
        let cases = vec![
            generic(vec![Value::int(1), Value::int(2)]),
            generic(vec![Value::int(1), Value::str("x")]),
            generic(vec![]),
            generic(vec![Value::float(0.5)]),
        ];
        for x in cases {
            let once = canonicalize(x);
            let twice = canonicalize(once.clone());
            assert_eq!(once, twice);
            assert_eq!(once.kind(), twice.kind());
        }
    }

    #[test]
    fn specialized_is_untouched() {
        let a = Array::til(4);
        let id = a.storage_id();
        let b = canonicalize(a);
        assert_eq!(b.storage_id(), id);
    }

    #[test]
    fn pinned_generic_pins_elements() {
        let mut a = generic(vec![Value::ints(vec![1]), Value::str("x")]);
        a.mark_shared();
        let a = canonicalize(a);
        assert!(!a.as_generic().unwrap()[0].is_uniquely_owned());
    }
}
