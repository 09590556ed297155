//! Post-append notification seam.
//!
//! Delivery itself (email, chat, whatever the operator wires up) lives with
//! an external collaborator. The pipeline only guarantees that the hook
//! fires after a successful append and that a hook failure never rolls the
//! append back.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::AcceptedPosting;

/// Best-effort notification about a run's newly accepted postings.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_new_postings(&self, postings: &[AcceptedPosting]) -> Result<()>;
}

/// Notifier used when no delivery channel is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify_new_postings(&self, postings: &[AcceptedPosting]) -> Result<()> {
        tracing::debug!(
            count = postings.len(),
            "No notifier configured, skipping notification"
        );
        Ok(())
    }
}
