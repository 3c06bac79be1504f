//! Session module
//!
//! Caller-facing entry point: load an image, estimate its stain area and
//! keep the run in the history.

mod notifier;
mod orchestrator;


pub use notifier::{Notifier, NoopNotifier, TracingNotifier};
pub use orchestrator::StainAreaSession;
