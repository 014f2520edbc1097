//! Template function library
//!
//! Both dialects are compiled against the same [`FunctionLibrary`], so a helper
//! available in a `.txt` template is available under the same name in its `.html`
//! sibling.
//!
//! A bare `{{name}}` calls the helper called `name` when one is registered. Data fields
//! that share a helper's name (`title`, `default`, `join`, ...) must be written as
//! `{{this.title}}`.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, LazyLock};

use handlebars::{Handlebars, HelperDef, handlebars_helper};
use regex::{Captures, Regex};
use serde_json::Value as Json;
use tracing::debug;

/// Named set of helpers injected into every template registry
pub trait FunctionLibrary: Send + Sync {
    /// Helper names in registration order
    fn names(&self) -> Vec<&'static str>;

    /// Register every helper into `registry`
    fn install(&self, registry: &mut Handlebars<'static>);
}

type BoxedHelper = Box<dyn HelperDef + Send + Sync + 'static>;
type HelperFactory = Arc<dyn Fn() -> BoxedHelper + Send + Sync>;

/// A [`FunctionLibrary`] built from helper factories
///
/// Each registry gets its own helper instances; the factories are shared.
#[derive(Clone, Default)]
pub struct FunctionSet {
    entries: Vec<(&'static str, HelperFactory)>,
}

impl FunctionSet {
    /// An empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard helpers available to notification templates
    pub fn standard() -> Self {
        Self::new()
            .with("env", || fn_env)
            .with("expandenv", || fn_expandenv)
            .with("upper", || fn_upper)
            .with("lower", || fn_lower)
            .with("title", || fn_title)
            .with("trim", || fn_trim)
            .with("quote", || fn_quote)
            .with("squote", || fn_squote)
            .with("contains", || fn_contains)
            .with("hasPrefix", || fn_has_prefix)
            .with("hasSuffix", || fn_has_suffix)
            .with("join", || fn_join)
            .with("split", || fn_split)
            .with("indent", || fn_indent)
            .with("nindent", || fn_nindent)
            .with("default", || fn_default)
            .with("safeUrl", || fn_safe_url)
    }

    /// Add a helper; a later entry with the same name replaces an earlier one
    pub fn with<H, F>(mut self, name: &'static str, factory: F) -> Self
    where
        H: HelperDef + Send + Sync + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries
            .push((name, Arc::new(move || Box::new(factory()) as BoxedHelper)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for FunctionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSet").field("names", &self.names()).finish()
    }
}

impl FunctionLibrary for FunctionSet {
    fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    fn install(&self, registry: &mut Handlebars<'static>) {
        debug!(count = self.entries.len(), "FunctionSet::install: registering helpers");
        for (name, factory) in &self.entries {
            registry.register_helper(name, factory());
        }
    }
}

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid env reference pattern")
});

/// Environment value for templates; secret-bearing keys always read as empty
pub fn lookup_env(key: &str) -> String {
    if secretkeys::is_secret_env_key(key) {
        debug!(%key, "lookup_env: refusing secret key");
        return String::new();
    }
    std::env::var(key).unwrap_or_default()
}

/// Expand `$VAR` and `${VAR}` references using [`lookup_env`]
pub fn expand_env(input: &str) -> Cow<'_, str> {
    ENV_REFERENCE.replace_all(input, |caps: &Captures<'_>| {
        let key = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or_default();
        lookup_env(key)
    })
}

/// Replacement for a link whose scheme is not known to be safe
pub const UNSAFE_URL: &str = "#ZgotmplZ";

const SAFE_URL_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Pass `url` through when it is relative or uses a safe scheme, else [`UNSAFE_URL`]
pub fn sanitize_url(url: &str) -> Cow<'_, str> {
    let scheme = url
        .split_once(':')
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.contains(['/', '?', '#']));
    match scheme {
        Some(scheme) if !SAFE_URL_SCHEMES.contains(&scheme.trim().to_ascii_lowercase().as_str()) => {
            debug!(%scheme, "sanitize_url: unsafe scheme");
            Cow::Borrowed(UNSAFE_URL)
        }
        _ => Cow::Borrowed(url),
    }
}

fn json_to_string(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

fn indent_lines(width: u64, s: &str) -> String {
    let pad = " ".repeat(width as usize);
    s.split('\n').map(|line| format!("{}{}", pad, line)).collect::<Vec<_>>().join("\n")
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_empty_value(value: &Json) -> bool {
    match value {
        Json::Null => true,
        Json::Bool(b) => !b,
        Json::String(s) => s.is_empty(),
        Json::Array(a) => a.is_empty(),
        Json::Object(o) => o.is_empty(),
        Json::Number(_) => false,
    }
}

handlebars_helper!(fn_env: |key: str| lookup_env(key));
handlebars_helper!(fn_expandenv: |s: str| expand_env(s).into_owned());
handlebars_helper!(fn_upper: |s: str| s.to_uppercase());
handlebars_helper!(fn_lower: |s: str| s.to_lowercase());
handlebars_helper!(fn_title: |s: str| title_case(s));
handlebars_helper!(fn_trim: |s: str| s.trim().to_string());
handlebars_helper!(fn_quote: |s: str| format!("\"{}\"", s));
handlebars_helper!(fn_squote: |s: str| format!("'{}'", s));
handlebars_helper!(fn_contains: |substr: str, s: str| s.contains(substr));
handlebars_helper!(fn_has_prefix: |prefix: str, s: str| s.starts_with(prefix));
handlebars_helper!(fn_has_suffix: |suffix: str, s: str| s.ends_with(suffix));
handlebars_helper!(fn_join: |sep: str, list: array| list.iter().map(json_to_string).collect::<Vec<_>>().join(sep));
handlebars_helper!(fn_split: |sep: str, s: str| s.split(sep).map(str::to_string).collect::<Vec<_>>());
handlebars_helper!(fn_indent: |width: u64, s: str| indent_lines(width, s));
handlebars_helper!(fn_nindent: |width: u64, s: str| format!("\n{}", indent_lines(width, s)));
handlebars_helper!(fn_safe_url: |url: str| sanitize_url(url).into_owned());
handlebars_helper!(fn_default: |fallback: Json, value: Json| {
    if is_empty_value(value) { fallback.clone() } else { value.clone() }
});
