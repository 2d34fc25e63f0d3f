use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_builder_collects_labels_and_notes() {
    let diag = Diagnostic::error(ErrorCode::E3001)
        .with_message("module \"./lib\" has no exported member `foo`")
        .with_label(Span::new(9, 12), "imported here")
        .with_secondary_label(Span::new(0, 4), "module loaded here")
        .with_note("exports: bar");

    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.primary_span(), Some(Span::new(9, 12)));
    assert_eq!(diag.notes, vec!["exports: bar".to_string()]);
}

#[test]
fn test_warning_is_not_error() {
    let diag = Diagnostic::warning(ErrorCode::E2002).with_message("shadowed");
    assert!(!diag.is_error());
    assert_eq!(diag.primary_span(), None);
}

#[test]
fn test_display_format() {
    let diag = unknown_identifier(Span::new(4, 7), "foo");
    assert_eq!(
        diag.to_string(),
        "error [E2001]: unknown identifier `foo`\n  --> 4..7: not found in this scope"
    );
}

#[test]
fn test_duplicate_declaration_points_at_both() {
    let diag = duplicate_declaration(Span::new(20, 23), Span::new(0, 3), "foo");
    assert_eq!(diag.code, ErrorCode::E2002);
    assert_eq!(diag.primary_span(), Some(Span::new(20, 23)));
    assert!(diag.labels.iter().any(|l| !l.is_primary && l.span == Span::new(0, 3)));
}

#[test]
fn test_unexpected_token_message() {
    let diag = unexpected_token(Span::new(1, 2), "`(`", "{");
    assert_eq!(diag.code, ErrorCode::E1001);
    assert_eq!(diag.message, "unexpected token: expected `(`, found `{`");
}
