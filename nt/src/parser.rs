//! Dual-dialect template parser
//!
//! Each [`CompiledTemplate`] owns a private Handlebars registry holding exactly one
//! template. Text templates render without escaping; markup templates escape every
//! interpolated value as HTML.
//!
//! Markup escaping is entity-only: it is not aware of attribute or URL context. Values
//! interpolated into `href` or `src` should go through the `safeUrl` helper, which
//! replaces links with an unexpected scheme by `#ZgotmplZ`.
//!
//! Helper calls are checked when a template is compiled. Calling a name that is neither a
//! Handlebars built-in nor part of the function library is a parse error.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use handlebars::template::{HelperTemplate, Parameter, Template, TemplateElement};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TemplateError, UndefinedFunction};
use crate::functions::FunctionLibrary;
use crate::source::{Dialect, Origin, TemplateSource};

/// A parsed template, bound to its function library and ready to render
pub struct CompiledTemplate {
    name: String,
    dialect: Dialect,
    path: PathBuf,
    origin: Origin,
    registry: Handlebars<'static>,
}

impl CompiledTemplate {
    /// Registered name, `<name><ext>`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Path the source was resolved from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Render with the given data
    pub fn render<T: Serialize>(&self, data: &T) -> Result<String> {
        debug!(name = %self.name, "CompiledTemplate::render: called");
        self.registry
            .render(&self.name, data)
            .map_err(|source| TemplateError::Render {
                name: self.name.clone(),
                source: Box::new(source),
            })
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("name", &self.name)
            .field("dialect", &self.dialect)
            .field("path", &self.path)
            .field("origin", &self.origin)
            .finish()
    }
}

fn registry_for(dialect: Dialect, functions: &dyn FunctionLibrary) -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    match dialect {
        Dialect::Text => registry.register_escape_fn(handlebars::no_escape),
        Dialect::Markup => registry.register_escape_fn(handlebars::html_escape),
    }
    // Helpers go in before the body is compiled
    functions.install(&mut registry);
    registry
}

/// Helpers every Handlebars registry ships with
const BUILTIN_HELPERS: &[&str] = &[
    "if", "unless", "each", "with", "lookup", "raw", "log", "eq", "ne", "gt", "gte", "lt", "lte", "and", "or",
    "not", "len",
];

/// Walks a compiled template and rejects calls to helpers that are not registered.
///
/// A bare `{{name}}` is ambiguous between a data lookup and a zero-argument helper call,
/// so only expressions with arguments and blocks count as calls. Subexpressions follow
/// the same rule.
struct HelperCheck<'a> {
    known: HashSet<&'a str>,
}

impl HelperCheck<'_> {
    fn template(&self, template: &Template) -> std::result::Result<(), UndefinedFunction> {
        template.elements.iter().try_for_each(|element| self.element(element))
    }

    fn element(&self, element: &TemplateElement) -> std::result::Result<(), UndefinedFunction> {
        match element {
            TemplateElement::Expression(ht) | TemplateElement::HtmlExpression(ht) => {
                let is_call = !ht.params.is_empty() || !ht.hash.is_empty();
                self.helper(ht, is_call)
            }
            TemplateElement::HelperBlock(ht) => self.helper(ht, true),
            _ => Ok(()),
        }
    }

    fn helper(&self, ht: &HelperTemplate, is_call: bool) -> std::result::Result<(), UndefinedFunction> {
        if is_call {
            if let Some(name) = ht.name.as_name() {
                if !BUILTIN_HELPERS.contains(&name) && !self.known.contains(name) {
                    return Err(UndefinedFunction { name: name.to_string() });
                }
            }
        }

        self.parameter(&ht.name)?;
        for param in ht.params.iter().chain(ht.hash.values()) {
            self.parameter(param)?;
        }
        if let Some(inner) = &ht.template {
            self.template(inner)?;
        }
        if let Some(inverse) = &ht.inverse {
            self.template(inverse)?;
        }
        Ok(())
    }

    fn parameter(&self, param: &Parameter) -> std::result::Result<(), UndefinedFunction> {
        match param {
            Parameter::Subexpression(sub) => self.element(sub.as_element()),
            _ => Ok(()),
        }
    }
}

/// Compile `source` as `dialect` under the logical template `name`
pub fn parse(
    dialect: Dialect,
    name: &str,
    source: &TemplateSource,
    functions: &dyn FunctionLibrary,
) -> Result<CompiledTemplate> {
    let registered = format!("{}{}", name, dialect.extension());
    debug!(%registered, path = ?source.path, origin = %source.origin, "parse: called");

    let parse_error = |cause: Box<dyn std::error::Error + Send + Sync>| TemplateError::Parse {
        path: source.path.clone(),
        origin: source.origin,
        source: cause,
    };

    let body = std::str::from_utf8(&source.data).map_err(|e| parse_error(Box::new(e)))?;

    let mut registry = registry_for(dialect, functions);
    registry
        .register_template_string(&registered, body)
        .map_err(|e| parse_error(Box::new(e)))?;

    if let Some(template) = registry.get_template(&registered) {
        let check = HelperCheck {
            known: functions.names().into_iter().collect(),
        };
        check.template(template).map_err(|e| parse_error(Box::new(e)))?;
    }

    Ok(CompiledTemplate {
        name: registered,
        dialect,
        path: source.path.clone(),
        origin: source.origin,
        registry,
    })
}

/// Compile a plain-text template
pub fn parse_text(name: &str, source: &TemplateSource, functions: &dyn FunctionLibrary) -> Result<CompiledTemplate> {
    parse(Dialect::Text, name, source, functions)
}

/// Compile an HTML markup template
pub fn parse_markup(name: &str, source: &TemplateSource, functions: &dyn FunctionLibrary) -> Result<CompiledTemplate> {
    parse(Dialect::Markup, name, source, functions)
}
