//! Secret key classification and value redaction

use std::borrow::Cow;

use tracing::debug;

use crate::{ENV_PREFIX, ENV_X_PREFIX, REDACTED, SECRET_SUFFIXES};

/// Whether the key carries either environment namespace prefix (case-insensitive)
pub fn is_namespaced(key: &str) -> bool {
    let key = key.to_uppercase();
    key.starts_with(ENV_PREFIX) || key.starts_with(ENV_X_PREFIX)
}

/// Classify an environment key as secret-bearing
///
/// The key must start with [`ENV_PREFIX`] or [`ENV_X_PREFIX`] and end with any of
/// [`SECRET_SUFFIXES`]. Both checks ignore case. Any matching suffix is enough.
pub fn is_secret_env_key(key: &str) -> bool {
    let key = key.to_uppercase();

    if !key.starts_with(ENV_PREFIX) && !key.starts_with(ENV_X_PREFIX) {
        return false;
    }

    let secret = SECRET_SUFFIXES
        .iter()
        .any(|suffix| key.ends_with(suffix.to_uppercase().as_str()));
    debug!(%key, %secret, "is_secret_env_key: classified");
    secret
}

/// Mask the value when the key is secret-bearing
pub fn redact<'a>(key: &str, value: &'a str) -> Cow<'a, str> {
    if is_secret_env_key(key) {
        Cow::Borrowed(REDACTED)
    } else {
        Cow::Borrowed(value)
    }
}

/// Apply [`redact`] over key/value pairs, keeping their order
pub fn redacted_pairs<I, K, V>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(k, v)| {
            let value = redact(k.as_ref(), v.as_ref()).into_owned();
            (k.as_ref().to_string(), value)
        })
        .collect()
}
