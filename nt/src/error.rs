//! Template error types

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::source::Origin;

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors that can occur while resolving, parsing or rendering a template
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template override at path '{}': {source}", .path.display())]
    OverrideRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read embedded template '{path}': {source}")]
    EmbeddedRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .origin.describe(.path))]
    Parse {
        path: PathBuf,
        origin: Origin,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },
}

/// A template calls a helper that neither Handlebars nor the function library provides
#[derive(Debug, Error)]
#[error("function \"{name}\" not defined")]
pub struct UndefinedFunction {
    pub name: String,
}

impl TemplateError {
    /// The origin the failing template came from, when known
    pub fn origin(&self) -> Option<Origin> {
        match self {
            TemplateError::OverrideRead { .. } => Some(Origin::Override),
            TemplateError::EmbeddedRead { .. } => Some(Origin::Embedded),
            TemplateError::Parse { origin, .. } => Some(*origin),
            TemplateError::Render { .. } => None,
        }
    }

    /// Check if this error points at an operator-supplied override
    pub fn is_override(&self) -> bool {
        self.origin() == Some(Origin::Override)
    }

    /// The path that was being read or parsed
    pub fn path(&self) -> Option<&Path> {
        match self {
            TemplateError::OverrideRead { path, .. } | TemplateError::Parse { path, .. } => Some(path.as_path()),
            TemplateError::EmbeddedRead { path, .. } => Some(Path::new(path.as_str())),
            TemplateError::Render { .. } => None,
        }
    }
}
