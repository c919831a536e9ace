//! Diagnostics sink for non-fatal configuration warnings.
//!
//! Channels take the sink by injection instead of writing to a process-wide
//! logger, so a host can route warnings wherever it wants. The default sink
//! forwards to `tracing`. Any `FnMut(&str)` closure also works.

/// Receiver for warnings about unsupported or degraded configurations.
pub trait Diagnostics {
    /// Report a warning. Called from configuration paths only, never from
    /// `generate`.
    fn warn(&mut self, message: &str);
}

/// Forwards warnings to `tracing` at `WARN` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&mut self, message: &str) {
        tracing::warn!(target: "tss_audio", "{message}");
    }
}

impl<F: FnMut(&str)> Diagnostics for F {
    fn warn(&mut self, message: &str) {
        self(message)
    }
}
