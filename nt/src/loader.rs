//! Template pair loader
//!
//! Resolves and compiles both dialects of a notification template. The text
//! dialect is handled first; the first failure is returned as-is.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::embedded::{BundledStore, EmbeddedStore};
use crate::error::Result;
use crate::functions::{FunctionLibrary, FunctionSet};
use crate::parser::{self, CompiledTemplate};
use crate::source::{self, Dialect, TemplateCategory};

/// Both compiled dialects of one logical notification template
#[derive(Debug)]
pub struct TemplateBundle {
    pub text: CompiledTemplate,
    pub markup: CompiledTemplate,
}

impl TemplateBundle {
    /// The compiled template for a dialect
    pub fn get(&self, dialect: Dialect) -> &CompiledTemplate {
        match dialect {
            Dialect::Text => &self.text,
            Dialect::Markup => &self.markup,
        }
    }
}

/// Resolve and compile the text and markup dialects of `name`
pub fn load_pair(
    name: &str,
    override_root: Option<&Path>,
    store: &dyn EmbeddedStore,
    functions: &dyn FunctionLibrary,
) -> Result<TemplateBundle> {
    debug!(%name, ?override_root, "load_pair: called");
    let category = TemplateCategory::Notifications;

    let src = source::resolve(name, Dialect::Text, category, override_root, store)?;
    let text = parser::parse_text(name, &src, functions)?;

    let src = source::resolve(name, Dialect::Markup, category, override_root, store)?;
    let markup = parser::parse_markup(name, &src, functions)?;

    info!(
        "Loaded template '{}' (text: {}, markup: {})",
        name,
        text.origin(),
        markup.origin()
    );
    Ok(TemplateBundle { text, markup })
}

/// Loads notification template pairs with a fixed override directory, store and library
#[derive(Clone)]
pub struct TemplateLoader {
    override_root: Option<PathBuf>,
    store: Arc<dyn EmbeddedStore>,
    functions: Arc<dyn FunctionLibrary>,
}

impl TemplateLoader {
    /// Loader over the bundled defaults and the standard function library
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self {
            override_root,
            store: Arc::new(BundledStore),
            functions: Arc::new(FunctionSet::standard()),
        }
    }

    /// Loader configured from `templates.override-dir`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.templates.override_dir.clone())
    }

    /// Use a different embedded store
    pub fn with_store(mut self, store: Arc<dyn EmbeddedStore>) -> Self {
        self.store = store;
        self
    }

    /// Use a different function library
    pub fn with_functions(mut self, functions: Arc<dyn FunctionLibrary>) -> Self {
        self.functions = functions;
        self
    }

    pub fn override_root(&self) -> Option<&Path> {
        self.override_root.as_deref()
    }

    /// Resolve and compile both dialects of `name`
    pub fn load(&self, name: &str) -> Result<TemplateBundle> {
        load_pair(
            name,
            self.override_root.as_deref(),
            self.store.as_ref(),
            self.functions.as_ref(),
        )
    }
}
