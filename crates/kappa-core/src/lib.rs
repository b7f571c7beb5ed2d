pub mod array;
pub mod canonical;
pub mod config;
pub mod dict;
pub mod error;
pub mod rc;
pub mod value;

pub use array::{Array, ArrayKind, Flags, Typed};
pub use canonical::{canonicalize, canonicalize_value};
pub use config::AmendConfig;
pub use dict::Dict;
pub use error::KappaError;
pub use rc::adopt_shared_ownership;
pub use value::{Builtin, Derived, Lambda, LambdaFn, Value};

pub type Result<T> = std::result::Result<T, KappaError>;
