#![allow(dead_code)]

use kappa::{Builtin, Engine, KappaError, Result, Value};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fast_engine() -> Engine {
    init_tracing();
    Engine::builder().with_fast_paths(true).build()
}

pub fn generic_engine() -> Engine {
    init_tracing();
    Engine::builder().with_fast_paths(false).build()
}

/// Run with the specialized loops enabled
pub fn run_fast(f: impl Fn(&Engine) -> Result<Value>) -> Value {
    f(&fast_engine()).unwrap_or_else(|e| panic!("fast paths failed: {e}"))
}

/// Run with every update going through the element-by-element path
pub fn run_generic(f: impl Fn(&Engine) -> Result<Value>) -> Value {
    f(&generic_engine()).unwrap_or_else(|e| panic!("generic path failed: {e}"))
}

/// Assert both configurations agree and return the result
pub fn run_both(f: impl Fn(&Engine) -> Result<Value>) -> Value {
    let fast = run_fast(&f);
    let generic = run_generic(&f);
    assert_eq!(fast, generic, "fast vs generic mismatch");
    fast
}

/// Assert both configurations fail and return the fast-path error
pub fn run_both_err(f: impl Fn(&Engine) -> Result<Value>) -> KappaError {
    let generic = f(&generic_engine());
    assert!(generic.is_err(), "generic path should fail, got {generic:?}");
    f(&fast_engine()).expect_err("fast paths should fail")
}

pub fn b(sym: &str) -> Value {
    match Builtin::from_symbol(sym) {
        Some(op) => Value::builtin(op),
        None => panic!("no builtin {sym}"),
    }
}

pub fn add10() -> Value {
    Value::project(b("+"), vec![None, Some(Value::int(10))])
}

/// Generate one test per configuration: fast paths on and off.
///
/// Usage:
/// ```ignore
/// dual_path_tests! {
///     test_name: |e| e.amend(x, &y, &f) => expected_value,
/// }
/// ```
///
/// This generates `test_name_fast` and `test_name_generic` test functions.
#[macro_export]
macro_rules! dual_path_tests {
    ($($name:ident : $run:expr => $expected:expr),* $(,)?) => {
        $(
            paste::paste! {
                #[test]
                fn [<$name _fast>]() {
                    let result = common::run_fast($run);
                    assert_eq!(result, $expected, "fast paths: {}", stringify!($name));
                }

                #[test]
                fn [<$name _generic>]() {
                    let result = common::run_generic($run);
                    assert_eq!(result, $expected, "generic path: {}", stringify!($name));
                }
            }
        )*
    };
}
