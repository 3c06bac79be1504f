use tracing::{error, info};

/// Sink for user-facing status messages. Purely informational: nothing in
/// the pipeline depends on a message being shown.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn success(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Forwards messages to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "stain_area::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "stain_area::notify", "{}", message);
    }
}
