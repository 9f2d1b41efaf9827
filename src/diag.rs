//! Diagnostics reporting
//!
//! Every non-fatal condition (missing secondary archive, unreadable cache,
//! per-file dex failure) is reported through an injected sink instead of a
//! process-wide logger, so embedders decide where diagnostics land.

use log::warn;

/// Receiver for non-fatal diagnostics.
pub trait DiagnosticsSink {
    fn log(&self, message: &str);
}

impl<T: DiagnosticsSink + ?Sized> DiagnosticsSink for &T {
    fn log(&self, message: &str) {
        (**self).log(message);
    }
}

/// Default sink: forwards to the `log` facade at warn level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn log(&self, message: &str) {
        warn!("{message}");
    }
}

#[cfg(test)]
pub(crate) use self::testing::RecordingSink;
