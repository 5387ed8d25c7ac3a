//! Operator notifier that writes alerts to the tracing pipeline.

use async_trait::async_trait;

use crate::core::{OperatorAlert, OperatorNotifier};

/// Emits each alert as a structured log event.
///
/// Stands in for email or chat-webhook delivery, which live outside the
/// engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl OperatorNotifier for LogNotifier {
    async fn notify(&self, alert: OperatorAlert) {
        match alert {
            OperatorAlert::CallbackFailure {
                application_id,
                queue_id,
                participant_id,
                detail,
            } => tracing::error!(
                target: "waitroom::alert",
                application = %application_id,
                queue = %queue_id,
                participant = participant_id,
                detail = %detail,
                "callback failure alert"
            ),
            OperatorAlert::QueueDepth {
                queue_id,
                queue_name,
                depth,
                threshold,
            } => tracing::warn!(
                target: "waitroom::alert",
                queue = %queue_id,
                queue_name = %queue_name,
                depth,
                threshold,
                "queue length alert"
            ),
        }
    }
}
