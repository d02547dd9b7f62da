//! Diagnostic system for the lexr compiler stages.
//!
//! Every stage reports problems as [`Diagnostic`] values:
//! - an error code for searchability (`lexr explain L2001`)
//! - a message saying what went wrong
//! - labeled spans saying where
//! - notes and suggestions saying why and how to fix
//!
//! Stages never abort on the first problem. They push into a
//! [`DiagnosticQueue`], and the driver decides after each stage whether a
//! fatal error was recorded. [`ErrorGuaranteed`] is the type-level proof
//! that at least one error reached the queue.

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::DiagnosticQueue;
