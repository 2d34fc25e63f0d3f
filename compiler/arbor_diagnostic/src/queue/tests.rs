use super::*;
use crate::unknown_identifier;
use pretty_assertions::assert_eq;

#[test]
fn test_sorted_by_position() {
    let mut queue = DiagnosticQueue::new();
    queue.add(unknown_identifier(Span::new(30, 33), "b"));
    queue.add(unknown_identifier(Span::new(4, 5), "a"));

    let flushed = queue.flush();
    let starts: Vec<u32> = flushed
        .iter()
        .filter_map(|d| d.primary_span().map(|s| s.start))
        .collect();
    assert_eq!(starts, vec![4, 30]);
    assert!(queue.is_empty());
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn test_dedup_same_code_same_span() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(unknown_identifier(Span::new(1, 2), "x")));
    assert!(!queue.add(unknown_identifier(Span::new(1, 2), "x")));
    assert!(queue.add(unknown_identifier(Span::new(5, 6), "x")));
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_unlimited_keeps_duplicates() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(unknown_identifier(Span::new(1, 2), "x"));
    queue.add(unknown_identifier(Span::new(1, 2), "x"));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_error_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    for i in 0..5 {
        queue.add(unknown_identifier(Span::new(i, i + 1), "x"));
    }
    assert_eq!(queue.len(), 2);
    assert!(queue.limit_reached());
}

#[test]
fn test_warnings_do_not_count() {
    let mut queue = DiagnosticQueue::new();
    queue.add(Diagnostic::warning(ErrorCode::E2002).with_message("w"));
    assert!(queue.has_errors().is_none());

    queue.add(unknown_identifier(Span::new(0, 1), "y"));
    assert!(queue.has_errors().is_some());

    queue.flush();
    assert!(queue.has_errors().is_none());
}
