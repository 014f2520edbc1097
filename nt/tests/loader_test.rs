//! Integration tests for template pair loading
//!
//! These tests exercise override resolution against real directories and the
//! bundled default templates.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use notifytemplates::{
    BundledStore, FunctionSet, MemoryStore, Origin, TemplateCategory, TemplateError, TemplateLoader, load_pair,
};
use serde_json::json;
use tempfile::TempDir;

fn foo_store() -> MemoryStore {
    MemoryStore::new()
        .with("src/notifications/foo.txt", "embedded {{name}}")
        .with("src/notifications/foo.html", "<p>embedded {{name}}</p>")
}

fn write_overrides(dir: &Path, text: &str, html: &str) {
    fs::write(dir.join("foo.txt"), text).expect("Failed to write text override");
    fs::write(dir.join("foo.html"), html).expect("Failed to write html override");
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_overrides_take_precedence() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_overrides(dir.path(), "override {{name}}", "<p>override {{name}}</p>");

    let bundle = load_pair("foo", Some(dir.path()), &foo_store(), &FunctionSet::standard()).unwrap();

    assert_eq!(bundle.text.origin(), Origin::Override);
    assert_eq!(bundle.markup.origin(), Origin::Override);
    assert_eq!(bundle.text.path(), dir.path().join("foo.txt"));
    assert_eq!(bundle.markup.path(), dir.path().join("foo.html"));
    assert_eq!(bundle.text.render(&json!({"name": "a"})).unwrap(), "override a");
}

#[test]
fn test_embedded_without_override_root() {
    let bundle = load_pair("foo", None, &foo_store(), &FunctionSet::standard()).unwrap();

    assert_eq!(bundle.text.origin(), Origin::Embedded);
    assert_eq!(bundle.markup.origin(), Origin::Embedded);
    assert_eq!(bundle.markup.render(&json!({"name": "a"})).unwrap(), "<p>embedded a</p>");
}

#[test]
fn test_empty_override_root_is_ignored() {
    let bundle = load_pair("foo", Some(Path::new("")), &foo_store(), &FunctionSet::standard()).unwrap();

    assert_eq!(bundle.text.origin(), Origin::Embedded);
    assert_eq!(bundle.markup.origin(), Origin::Embedded);
}

#[test]
fn test_directory_override_falls_through() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(dir.path().join("foo.txt")).unwrap();
    fs::write(dir.path().join("foo.html"), "<b>{{name}}</b>").unwrap();

    let bundle = load_pair("foo", Some(dir.path()), &foo_store(), &FunctionSet::standard()).unwrap();

    assert_eq!(bundle.text.origin(), Origin::Embedded);
    assert_eq!(bundle.markup.origin(), Origin::Override);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_invalid_override_markup_reports_override() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_overrides(dir.path(), "fine {{name}}", "{{#if name}}<p>{{/each}}");

    let err = load_pair("foo", Some(dir.path()), &foo_store(), &FunctionSet::standard()).unwrap_err();

    assert!(matches!(err, TemplateError::Parse { origin: Origin::Override, .. }));
    let msg = err.to_string();
    assert!(msg.contains("failed to parse template override at path"), "{}", msg);
    assert!(!msg.contains("embedded"), "{}", msg);
}

#[test]
fn test_override_calling_unknown_function_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_overrides(dir.path(), "hello {{frobnicate name}}", "<p>{{name}}</p>");

    let err = load_pair("foo", Some(dir.path()), &foo_store(), &FunctionSet::standard()).unwrap_err();

    assert!(matches!(err, TemplateError::Parse { origin: Origin::Override, .. }));
    assert_eq!(err.path(), Some(dir.path().join("foo.txt").as_path()));
    assert!(err.to_string().contains("function \"frobnicate\" not defined"), "{}", err);
}

#[test]
fn test_embedded_calling_unknown_function_is_rejected() {
    let store = MemoryStore::new()
        .with("src/notifications/foo.txt", "embedded {{name}}")
        .with("src/notifications/foo.html", "<p>{{#frobnicate}}x{{/frobnicate}}</p>");

    let err = load_pair("foo", None, &store, &FunctionSet::standard()).unwrap_err();

    assert!(matches!(err, TemplateError::Parse { origin: Origin::Embedded, .. }));
    assert!(err.to_string().contains("embedded template 'src/notifications/foo.html'"), "{}", err);
}

#[test]
fn test_invalid_embedded_reports_embedded() {
    let store = MemoryStore::new()
        .with("src/notifications/foo.txt", "{{#each x}}{{/if}}")
        .with("src/notifications/foo.html", "ok");

    let err = load_pair("foo", None, &store, &FunctionSet::standard()).unwrap_err();

    assert_eq!(err.origin(), Some(Origin::Embedded));
    assert!(err.to_string().contains("failed to parse embedded template 'src/notifications/foo.txt'"));
}

#[test]
fn test_unknown_template() {
    let err = TemplateLoader::new(None).load("does-not-exist").unwrap_err();

    assert!(matches!(err, TemplateError::EmbeddedRead { .. }));
}

// =============================================================================
// Bundle behavior
// =============================================================================

#[test]
fn test_repeated_loads_are_independent() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_overrides(dir.path(), "v1 {{name}}", "<p>v1 {{name}}</p>");

    let functions = FunctionSet::standard();
    let first = load_pair("foo", Some(dir.path()), &foo_store(), &functions).unwrap();
    let second = load_pair("foo", Some(dir.path()), &foo_store(), &functions).unwrap();

    let data = json!({"name": "Ann"});
    assert_eq!(first.text.render(&data).unwrap(), second.text.render(&data).unwrap());
    assert_eq!(first.markup.render(&data).unwrap(), second.markup.render(&data).unwrap());

    // No caching: a later load sees the new override, the earlier bundle keeps its content
    write_overrides(dir.path(), "v2 {{name}}", "<p>v2 {{name}}</p>");
    let third = load_pair("foo", Some(dir.path()), &foo_store(), &functions).unwrap();
    assert_eq!(third.text.render(&data).unwrap(), "v2 Ann");
    assert_eq!(first.text.render(&data).unwrap(), "v1 Ann");
}

#[test]
fn test_concurrent_loads() {
    let loader = Arc::new(TemplateLoader::new(None));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let loader = Arc::clone(&loader);
            thread::spawn(move || loader.load("password-reset").map(|b| b.text.origin()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), Origin::Embedded);
    }
}

#[test]
fn test_bundled_templates_render() {
    let loader = TemplateLoader::new(None);
    let data = json!({
        "title": "Reset your password",
        "display_name": "<Ann>",
        "event": "second factor registration",
        "details": {"Method": "TOTP"},
        "link_text": "Confirm",
        "link_url": "https://auth.example.com/confirm?token=abc",
        "revocation_link_text": "Revoke",
        "revocation_link_url": "https://auth.example.com/revoke",
        "remote_ip": "192.0.2.1",
    });

    for name in BundledStore.names(TemplateCategory::Notifications) {
        let bundle = loader.load(&name).unwrap();

        let text = bundle.text.render(&data).unwrap();
        assert!(text.contains("Hi <Ann>"), "{}: {}", name, text);

        let html = bundle.markup.render(&data).unwrap();
        assert!(html.contains("Hi &lt;Ann&gt;"), "{}: {}", name, html);
    }
}

#[test]
fn test_bundled_title_is_a_data_field() {
    let bundle = TemplateLoader::new(None).load("identity-verification").unwrap();
    let data = json!({"title": "Reset your password", "display_name": "Ann"});

    let text = bundle.text.render(&data).unwrap();
    assert!(text.contains("Purpose: Reset your password."), "{}", text);

    let html = bundle.markup.render(&data).unwrap();
    assert!(html.contains("<title>Reset your password</title>"), "{}", html);
}

#[test]
fn test_bundled_links_are_sanitised() {
    let bundle = TemplateLoader::new(None).load("identity-verification").unwrap();
    let data = json!({
        "title": "Register device",
        "link_text": "Confirm",
        "link_url": "javascript:alert(1)",
        "revocation_link_text": "Revoke",
        "revocation_link_url": "https://auth.example.com/revoke",
    });

    let html = bundle.markup.render(&data).unwrap();
    assert!(html.contains(r##"<a href="#ZgotmplZ">Confirm</a>"##), "{}", html);
    assert!(html.contains(r#"<a href="https://auth.example.com/revoke">Revoke</a>"#), "{}", html);
    assert!(!html.contains("javascript:"), "{}", html);
}

#[test]
fn test_custom_function_library_shared_by_both_dialects() {
    handlebars::handlebars_helper!(brand: |s: str| format!("[{}]", s));

    let store = MemoryStore::new()
        .with("src/notifications/foo.txt", "{{brand name}}")
        .with("src/notifications/foo.html", "<i>{{brand name}}</i>");
    let loader = TemplateLoader::new(None)
        .with_store(Arc::new(store))
        .with_functions(Arc::new(FunctionSet::new().with("brand", || brand)));

    let bundle = loader.load("foo").unwrap();
    let data = json!({"name": "acme"});
    assert_eq!(bundle.text.render(&data).unwrap(), "[acme]");
    assert_eq!(bundle.markup.render(&data).unwrap(), "<i>[acme]</i>");
}
