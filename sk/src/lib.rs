//! SecretKeys - shared definition of secret-bearing environment keys
//!
//! Configuration keys are supplied through the environment with one of two
//! namespace prefixes. A key is secret-bearing when it carries one of those
//! prefixes and ends with one of [`SECRET_SUFFIXES`]. Both the configuration
//! loader and the template function library consume this crate so the two
//! never drift apart.
//!
//! # Example
//!
//! ```
//! use secretkeys::{is_secret_env_key, redact};
//!
//! assert!(is_secret_env_key("AUTHELIA_JWT_SECRET"));
//! assert!(!is_secret_env_key("AUTHELIA_PORT"));
//! assert_eq!(redact("AUTHELIA_JWT_SECRET", "hunter2"), "<redacted>");
//! ```

mod classify;

pub use classify::{is_namespaced, is_secret_env_key, redact, redacted_pairs};

/// Primary environment namespace prefix
pub const ENV_PREFIX: &str = "AUTHELIA_";

/// Alternate environment namespace prefix
pub const ENV_X_PREFIX: &str = "X_AUTHELIA_";

/// Key suffixes that mark a value as secret-bearing, compared case-insensitively
pub const SECRET_SUFFIXES: [&str; 5] = ["KEY", "SECRET", "PASSWORD", "TOKEN", "CERTIFICATE_CHAIN"];

/// Replacement shown in place of a secret value
pub const REDACTED: &str = "<redacted>";
