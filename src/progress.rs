/// Receives free-text progress messages. Purely observational.
pub trait ProgressSink {
    fn report(&self, message: &str);
}

/// Forwards progress messages to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, message: &str) {
        tracing::info!("{message}");
    }
}

impl<F: Fn(&str)> ProgressSink for F {
    fn report(&self, message: &str) {
        self(message);
    }
}
