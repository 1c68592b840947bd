//! Line-oriented diagnostic output
//!
//! Diagnostics are write-only: lease details, the formatted message and the
//! delivery outcome. The loop never reads anything back from a sink.

use core::fmt;

/// Log target used by [`LogSink`]
pub const DIAG_TARGET: &str = "notifier::diag";

pub trait DiagnosticSink {
    /// Emit one line of diagnostic text
    fn line(&mut self, args: fmt::Arguments<'_>);
}

/// Forwards every line to the `log` facade at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn line(&mut self, args: fmt::Arguments<'_>) {
        log::info!(target: DIAG_TARGET, "{}", args);
    }
}

