use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::request::ServiceRequest;

/// Best-effort delivery of lifecycle events.
///
/// Failures are logged by the caller and never roll back the committed
/// transition. The SMTP/SMS transport behind a real implementation is an
/// external collaborator; the default just traces.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Reports that `request` changed status, triggered by `actor_id`.
    async fn request_transitioned(&self, request: &ServiceRequest, actor_id: Uuid) -> Result<()>;
}

/// A notifier that only writes to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn request_transitioned(&self, request: &ServiceRequest, actor_id: Uuid) -> Result<()> {
        tracing::info!(
            "📣 Request {} is now {} (by {}), notifying owner {}",
            request.request_code,
            request.status.as_str(),
            actor_id,
            request.user_id
        );
        Ok(())
    }
}
