//! Template source resolution
//!
//! A logical template is looked up first as an operator override on disk
//! (`<override-dir>/<name><ext>`), then in the embedded store
//! (`src/<category>/<name><ext>`).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::embedded::EmbeddedStore;
use crate::error::{Result, TemplateError};

/// Template grammar a source is compiled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Plain text, no escaping
    Text,
    /// HTML markup, values are escaped
    Markup,
}

impl Dialect {
    /// File extension, including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => ".txt",
            Self::Markup => ".html",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markup => "markup",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Namespace segment of the embedded store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    Notifications,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notifications => "notifications",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where resolved template bytes came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Operator-supplied file in the override directory
    Override,
    /// Default bundled with the program
    Embedded,
}

impl Origin {
    /// Human description of a template at `path` with this origin
    pub(crate) fn describe(&self, path: &Path) -> String {
        match self {
            Self::Override => format!("template override at path '{}'", path.display()),
            Self::Embedded => format!("embedded template '{}'", path.display()),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

/// Raw template bytes together with where they were found
#[derive(Debug, Clone)]
pub struct TemplateSource {
    /// Filesystem path for overrides, logical store path for embedded templates
    pub path: PathBuf,
    pub origin: Origin,
    pub data: Vec<u8>,
}

/// An override only counts when the path can be stat'ed and is not a directory
fn override_exists(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => !meta.is_dir(),
        Err(e) => {
            debug!(?path, error = %e, "override_exists: stat failed");
            false
        }
    }
}

/// Path of a template inside the embedded store
pub fn embedded_path(name: &str, dialect: Dialect, category: TemplateCategory) -> String {
    format!("src/{}/{}{}", category.as_str(), name, dialect.extension())
}

/// Resolve the source bytes for one dialect of a logical template
///
/// An empty `override_root` is treated the same as `None`. Once an override file is
/// found, failing to read it is an error; there is no fallback to the embedded default.
pub fn resolve(
    name: &str,
    dialect: Dialect,
    category: TemplateCategory,
    override_root: Option<&Path>,
    store: &dyn EmbeddedStore,
) -> Result<TemplateSource> {
    debug!(%name, %dialect, %category, ?override_root, "resolve: called");

    if let Some(root) = override_root.filter(|root| !root.as_os_str().is_empty()) {
        let path = root.join(format!("{}{}", name, dialect.extension()));

        if override_exists(&path) {
            info!(?path, "Using template override");
            let data = fs::read(&path).map_err(|source| TemplateError::OverrideRead {
                path: path.clone(),
                source,
            })?;

            return Ok(TemplateSource {
                path,
                origin: Origin::Override,
                data,
            });
        }

        debug!(?path, "resolve: no override, falling back to embedded");
    }

    let path = embedded_path(name, dialect, category);
    let data = store
        .read(&path)
        .map_err(|source| TemplateError::EmbeddedRead {
            path: path.clone(),
            source,
        })?
        .into_owned();

    debug!(%path, bytes = data.len(), "resolve: read embedded template");
    Ok(TemplateSource {
        path: PathBuf::from(path),
        origin: Origin::Embedded,
        data,
    })
}
