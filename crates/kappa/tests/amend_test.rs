mod common;

use common::{add10, b};
use kappa::{verbs, Builtin, Engine, KappaError, Value};

// ============================================================
// Flat amend: fast paths on and off
// ============================================================

dual_path_tests! {
    add10_at_vector: |e| e.amend(Value::ints(vec![1, 2, 3]), &Value::ints(vec![0, 1]), &add10())
        => Value::ints(vec![11, 12, 3]),
    plus_with_parallel_z: |e| e.amend4(
            Value::ints(vec![8, 4, 5]),
            &Value::ints(vec![1, 2, 0]),
            &b("+"),
            &Value::ints(vec![10, 5, -2]),
        ) => Value::ints(vec![6, 14, 10]),
    negate_everything: |e| e.amend(Value::ints(vec![1, -2, 3]), &Value::Nil, &b("-"))
        => Value::ints(vec![-1, 2, -3]),
    right_overwrites_scalar: |e| e.amend4(
            Value::floats(vec![1.0, 2.0]),
            &Value::int(1),
            &b(":"),
            &Value::float(9.5),
        ) => Value::floats(vec![1.0, 9.5]),
    right_widens_on_mismatch: |e| e.amend4(
            Value::ints(vec![1, 2]),
            &Value::int(1),
            &b(":"),
            &Value::str("x"),
        ) => Value::list(vec![Value::int(1), Value::str("x")]),
    divide_widens_ints: |e| e.amend4(
            Value::ints(vec![4, 6]),
            &Value::int(0),
            &b("%"),
            &Value::int(8),
        ) => Value::list(vec![Value::float(0.5), Value::int(6)]),
    divide_all_floats: |e| e.amend4(Value::ints(vec![4, 6]), &Value::Nil, &b("%"), &Value::int(2))
        => Value::floats(vec![2.0, 3.0]),
    not_on_bools: |e| e.amend(
            Value::bools(vec![true, false, true]),
            &Value::ints(vec![0, 1]),
            &b("~"),
        ) => Value::bools(vec![false, true, true]),
    multiply_floats_by_ints: |e| e.amend4(
            Value::floats(vec![1.5, 2.0]),
            &Value::Nil,
            &b("*"),
            &Value::ints(vec![2, 3]),
        ) => Value::floats(vec![3.0, 6.0]),
    int_add_wraps: |e| e.amend4(
            Value::ints(vec![i64::MAX]),
            &Value::int(0),
            &b("+"),
            &Value::int(1),
        ) => Value::ints(vec![i64::MIN]),
    repeated_indices_accumulate: |e| e.amend4(
            Value::ints(vec![0, 0]),
            &Value::ints(vec![1, 1, 1]),
            &b("+"),
            &Value::int(5),
        ) => Value::ints(vec![0, 15]),
    bool_vector_indexes_positions: |e| e.amend4(
            Value::ints(vec![7, 8]),
            &Value::bools(vec![true, false]),
            &b(":"),
            &Value::ints(vec![1, 2]),
        ) => Value::ints(vec![2, 1]),
    empty_index_vector_is_noop: |e| e.amend(Value::ints(vec![1, 2]), &Value::ints(vec![]), &b("-"))
        => Value::ints(vec![1, 2]),
    list_of_strings_updates: |e| e.amend4(
            Value::strs(&["a", "b"]),
            &Value::int(0),
            &b(":"),
            &Value::str("z"),
        ) => Value::strs(&["z", "b"]),
}

// ============================================================
// Identity and equivalences
// ============================================================

fn samples() -> Vec<Value> {
    vec![
        Value::bools(vec![true, false, true]),
        Value::ints(vec![5, 6, 7]),
        Value::floats(vec![0.5, -1.0, 2.25]),
        Value::strs(&["x", "y", "z"]),
        Value::list(vec![Value::int(1), Value::str("two"), Value::ints(vec![3])]),
    ]
}

#[test]
fn identity_amend_is_a_round_trip() {
    let e = common::fast_engine();
    for x in samples() {
        for i in 0..3 {
            let r = e.amend(x.clone(), &Value::int(i), &b("::")).unwrap();
            assert_eq!(r, x, "identity at {i} on {x}");
            assert_eq!(r.type_name(), x.type_name());
        }
        let r = e.amend(x.clone(), &Value::Nil, &b("::")).unwrap();
        assert_eq!(r, x);
    }
}

#[test]
fn singleton_vector_matches_scalar() {
    let f = Value::lambda("twice", 1, |args| {
        verbs::dyadic(Builtin::Add, &args[0], &args[0])
    });
    for e in [common::fast_engine(), common::generic_engine()] {
        let x = Value::ints(vec![3, 4, 5]);
        for i in 0..3 {
            let scalar = e.amend(x.clone(), &Value::int(i), &f).unwrap();
            let vector = e.amend(x.clone(), &Value::ints(vec![i]), &f).unwrap();
            assert_eq!(scalar, vector);
            let scalar = e.amend(x.clone(), &Value::int(i), &b("-")).unwrap();
            let vector = e.amend(x.clone(), &Value::ints(vec![i]), &b("-")).unwrap();
            assert_eq!(scalar, vector);
        }
    }
}

// ============================================================
// Bounds
// ============================================================

fn is_out_of_bounds(err: &KappaError) -> bool {
    matches!(err.inner(), KappaError::OutOfBounds { .. })
}

#[test]
fn past_the_end_fails() {
    for x in samples() {
        let len = x.len().unwrap() as i64;
        let err = common::run_both_err(|e| e.amend(x.clone(), &Value::int(len), &b("-")));
        assert!(is_out_of_bounds(&err), "{err}");
    }
}

#[test]
fn negative_index_fails() {
    for x in samples() {
        let err = common::run_both_err(|e| e.amend(x.clone(), &Value::int(-1), &b("::")));
        assert!(is_out_of_bounds(&err), "{err}");
    }
}

#[test]
fn empty_array_has_no_positions() {
    let err = common::run_both_err(|e| e.amend(Value::ints(vec![]), &Value::int(0), &b("-")));
    assert!(is_out_of_bounds(&err));
    let err = common::run_both_err(|e| e.amend(Value::list(vec![]), &Value::int(0), &b("-")));
    assert!(is_out_of_bounds(&err));
}

#[test]
fn one_bad_index_in_a_vector_rejects_all() {
    let e = Engine::new();
    let mut slot = Value::ints(vec![1, 2, 3]);
    let err = e
        .amend_in_place(&mut slot, &Value::ints(vec![0, 3]), &b("-"), None)
        .unwrap_err();
    assert!(is_out_of_bounds(&err));
    assert_eq!(slot, Value::ints(vec![1, 2, 3]));
}

#[test]
fn parallel_operand_length_mismatch() {
    let err = common::run_both_err(|e| {
        e.amend4(
            Value::ints(vec![1, 2, 3]),
            &Value::ints(vec![0, 1]),
            &b("+"),
            &Value::ints(vec![1, 2, 3]),
        )
    });
    assert!(matches!(err.inner(), KappaError::Length { .. }));
    assert_eq!(err.op(), Some("@[x;y;+;z]"));
}

#[test]
fn bad_index_types() {
    for y in [Value::float(0.0), Value::str("a"), Value::floats(vec![0.0])] {
        let err = common::run_both_err(|e| e.amend(Value::ints(vec![1]), &y, &b("-")));
        assert!(matches!(err.inner(), KappaError::Type { .. }), "{err}");
    }
}

#[test]
fn update_must_be_callable() {
    let err =
        common::run_both_err(|e| e.amend(Value::ints(vec![1]), &Value::int(0), &Value::int(3)));
    assert_eq!(err.to_string(), "@[x;y;f]: type error: expected function, got int");
}
