use super::*;
use crate::ErrorCode;
use lexr_ir::Span;
use pretty_assertions::assert_eq;

fn error_at(code: ErrorCode, start: u32) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(format!("{code} at {start}"))
        .with_label(Span::new(start, start + 1), "here")
}

#[test]
fn counts_by_severity() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.error_guaranteed().is_none());

    queue.push(error_at(ErrorCode::L2001, 4));
    queue.push(Diagnostic::warning(ErrorCode::W3001).with_message("unreachable"));

    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.warning_count(), 1);
    assert!(queue.has_errors());
    assert!(queue.error_guaranteed().is_some());
}

#[test]
fn duplicates_are_dropped() {
    let mut queue = DiagnosticQueue::new();
    queue.push(error_at(ErrorCode::L1002, 9));
    queue.push(error_at(ErrorCode::L1002, 9));
    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.flush().len(), 1);
}

#[test]
fn flush_orders_by_position() {
    let mut queue = DiagnosticQueue::new();
    queue.push(Diagnostic::warning(ErrorCode::W3001).with_message("no span"));
    queue.push(error_at(ErrorCode::L2001, 30));
    queue.push(error_at(ErrorCode::L1001, 2));

    let codes: Vec<_> = queue.flush().into_iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![ErrorCode::L1001, ErrorCode::L2001, ErrorCode::W3001]
    );
    assert!(queue.is_empty());
    assert!(!queue.has_errors());
}

#[test]
fn emit_error_proves_failure() {
    let mut queue = DiagnosticQueue::new();
    let _proof: ErrorGuaranteed = queue.emit_error(error_at(ErrorCode::L1003, 0));
    assert!(queue.has_errors());
}
