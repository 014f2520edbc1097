//! NotifyTemplates - notification template resolution and parsing
//!
//! Every notification has a plain-text and an HTML variant. For a logical template
//! name this crate finds the source of each variant, either an operator override on
//! disk or the default bundled with the program, and compiles both against one
//! shared function library.
//!
//! ```text
//! <override-dir>/
//! ├── password-reset.txt     # used instead of src/notifications/password-reset.txt
//! └── password-reset.html
//! ```
//!
//! # Example
//!
//! ```ignore
//! use notifytemplates::TemplateLoader;
//!
//! let loader = TemplateLoader::new(Some("/etc/notify/templates".into()));
//! let bundle = loader.load("password-reset")?;
//! let body = bundle.markup.render(&serde_json::json!({"display_name": "Ann"}))?;
//! ```

pub mod cli;
pub mod config;
pub mod embedded;
pub mod error;
pub mod functions;
pub mod loader;
pub mod parser;
pub mod source;

pub use config::Config;
pub use embedded::{BundledStore, EmbeddedStore, MemoryStore};
pub use error::{Result, TemplateError, UndefinedFunction};
pub use functions::{FunctionLibrary, FunctionSet};
pub use loader::{TemplateBundle, TemplateLoader, load_pair};
pub use parser::{CompiledTemplate, parse, parse_markup, parse_text};
pub use source::{Dialect, Origin, TemplateCategory, TemplateSource, resolve};
