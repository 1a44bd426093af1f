use dbhash_core::errors::{DbHashError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("database", "sales")
        .with_context("side", "source")
}

#[test]
fn connection_error_surface() {
    let err = DbHashError::Connection(sample_info("collect.connect", "server selection timed out"));
    assert_eq!(err.info().code, "collect.connect");
    assert!(err.info().context.contains_key("side"));
    assert!(!err.is_isolated());
}

#[test]
fn command_error_is_isolated() {
    let err = DbHashError::Command(sample_info("collect.db_hash", "unauthorized"));
    assert!(err.is_isolated());
    assert_eq!(err.info().context["database"], "sales");
}

#[test]
fn render_error_display_includes_context_and_hint() {
    let err = DbHashError::Render(
        ErrorInfo::new("report.persist", "permission denied")
            .with_context("path", "/readonly/out.xlsx")
            .with_hint("choose a writable --output path"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("render error: permission denied (code: report.persist)"));
    assert!(rendered.contains("path=/readonly/out.xlsx"));
    assert!(rendered.ends_with("hint: choose a writable --output path"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = DbHashError::Reconcile(ErrorInfo::new("engine.empty_name", "empty database name"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "Reconcile");
    assert_eq!(json["detail"]["code"], "engine.empty_name");
}
