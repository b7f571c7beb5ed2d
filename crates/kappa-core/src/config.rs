use std::env;

/// Tunables for the amend engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmendConfig {
    /// Run the per-variant loops for negate, not, right and arithmetic.
    pub fast_paths: bool,
    /// Longest deep-amend path accepted.
    pub max_depth: usize,
    /// Key-batch size from which dictionary lookups build a hash index.
    pub hash_find_min: usize,
}

impl Default for AmendConfig {
    fn default() -> Self {
        Self {
            fast_paths: true,
            max_depth: 64,
            hash_find_min: 32,
        }
    }
}

impl AmendConfig {
    /// Read `KAPPA_FAST_PATHS`, `KAPPA_MAX_DEPTH` and `KAPPA_HASH_FIND_MIN`,
    /// falling back to the defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            fast_paths: get("KAPPA_FAST_PATHS")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.fast_paths),
            max_depth: get("KAPPA_MAX_DEPTH")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_depth),
            hash_find_min: get("KAPPA_HASH_FIND_MIN")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.hash_find_min),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
