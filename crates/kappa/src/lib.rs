//! kappa: the value model and amend engine of a k-style array language.
//!
//! This crate is the embedding API: an [`Engine`] carries the amend
//! configuration and exposes the four amend forms, function application,
//! dictionary merge and a VM-style call surface that reports failures as
//! error values.
//!
//! # Quick Start
//!
//! ```no_run
//! use kappa::{Builtin, Engine, Value};
//!
//! let engine = Engine::new();
//! let x = Value::ints(vec![8, 4, 5]);
//! let y = Value::ints(vec![1, 2, 0]);
//! let z = Value::ints(vec![10, 5, -2]);
//! let r = engine.amend4(x, &y, &Value::builtin(Builtin::Add), &z).unwrap();
//! assert_eq!(r, Value::ints(vec![6, 14, 10]));
//! ```

// Re-export core types.
pub use kappa_core::{
    adopt_shared_ownership, canonicalize, canonicalize_value, check_arity, AmendConfig, Array,
    ArrayKind, Builtin, Derived, Dict, Flags, KappaError, Lambda, Typed, Value,
};
pub use kappa_amend::{surface, verbs};

pub type Result<T> = std::result::Result<T, KappaError>;

/// Builder for configuring and constructing an [`Engine`].
///
/// Starts from [`AmendConfig::default`]; use [`EngineBuilder::from_env`] to
/// start from the `KAPPA_*` environment variables instead.
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: AmendConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from `KAPPA_FAST_PATHS`, `KAPPA_MAX_DEPTH` and
    /// `KAPPA_HASH_FIND_MIN`.
    pub fn from_env() -> Self {
        Self {
            config: AmendConfig::from_env(),
        }
    }

    /// Enable or disable the per-variant fast paths (default: `true`).
    pub fn with_fast_paths(mut self, enable: bool) -> Self {
        self.config.fast_paths = enable;
        self
    }

    /// Longest accepted deep-amend path (default: 64).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Key-batch size from which dictionary lookups are hashed (default: 32).
    pub fn with_hash_find_min(mut self, n: usize) -> Self {
        self.config.hash_find_min = n;
        self
    }

    pub fn with_config(mut self, config: AmendConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Engine {
        tracing::debug!(config = ?self.config, "engine built");
        Engine {
            config: self.config,
        }
    }
}

/// An amend engine instance.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: AmendConfig,
}

impl Engine {
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> &AmendConfig {
        &self.config
    }

    /// `@[x;y;f]`: apply unary `f` at `y`.
    pub fn amend(&self, x: Value, y: &Value, f: &Value) -> Result<Value> {
        kappa_amend::amend(x, y, f, &self.config)
    }

    /// `@[x;y;f;z]`: `f[x[y];z]` at `y`.
    pub fn amend4(&self, x: Value, y: &Value, f: &Value, z: &Value) -> Result<Value> {
        kappa_amend::amend4(x, y, f, z, &self.config)
    }

    /// `.[x;y;f]`: `y` is a path into nested containers.
    pub fn deep_amend(&self, x: Value, path: &Value, f: &Value) -> Result<Value> {
        kappa_amend::deep_amend(x, path, f, &self.config)
    }

    /// `.[x;y;f;z]`
    pub fn deep_amend4(&self, x: Value, path: &Value, f: &Value, z: &Value) -> Result<Value> {
        kappa_amend::deep_amend4(x, path, f, z, &self.config)
    }

    /// Amend the value in `slot`. On failure, writes made before the
    /// failing position remain in `slot`.
    pub fn amend_in_place(
        &self,
        slot: &mut Value,
        y: &Value,
        f: &Value,
        z: Option<&Value>,
    ) -> Result<()> {
        kappa_amend::amend_in_place(slot, y, f, z, &self.config)
    }

    pub fn deep_amend_in_place(
        &self,
        slot: &mut Value,
        path: &Value,
        f: &Value,
        z: Option<&Value>,
    ) -> Result<()> {
        kappa_amend::deep_amend_in_place(slot, path, f, z, &self.config)
    }

    /// Call any function value.
    pub fn apply(&self, f: &Value, args: &[Value]) -> Result<Value> {
        kappa_amend::apply(f, args)
    }

    /// `left f right` on dictionaries.
    pub fn merge(&self, left: &Dict, right: &Dict, f: &Value) -> Result<Dict> {
        kappa_amend::merge(left, right, f, &self.config)
    }

    /// VM entry point for `@` and `.` with three or four arguments
    /// (`x`, `y`, `f`, optional `z`). Failures come back as error values
    /// whose message names the surface form.
    pub fn call(&self, op: &str, args: &[Value]) -> Value {
        self.try_call(op, args).unwrap_or_else(KappaError::into_value)
    }

    fn try_call(&self, op: &str, args: &[Value]) -> Result<Value> {
        check_arity!(args, op, 3..=4);
        let (x, y, f, z) = (args[0].clone(), &args[1], &args[2], args.get(3));
        match (op, z) {
            ("@", None) => self.amend(x, y, f),
            ("@", Some(z)) => self.amend4(x, y, f, z),
            (".", None) => self.deep_amend(x, y, f),
            (".", Some(z)) => self.deep_amend4(x, y, f, z),
            _ => Err(KappaError::domain(format!("unknown amend operator {op}"))),
        }
    }
}
