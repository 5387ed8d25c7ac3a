//! Expiration sweeper: reclaims participants whose admission window elapsed.

use std::sync::Arc;

use crate::core::{EngineError, ParticipantStore, Transition};
use crate::util::clock::Clock;
use crate::util::metrics::EngineMetrics;

/// Periodic waiting -> expired reclamation. Sends no callbacks.
pub struct ExpirationSweeper {
    store: Arc<dyn ParticipantStore>,
    clock: Arc<dyn Clock>,
    metrics: Arc<EngineMetrics>,
}

impl ExpirationSweeper {
    /// Create a sweeper.
    pub fn new(
        store: Arc<dyn ParticipantStore>,
        clock: Arc<dyn Clock>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            store,
            clock,
            metrics,
        }
    }

    /// Expire every waiting participant whose expiry is in the past.
    ///
    /// Participants released or cancelled between selection and transition
    /// are skipped. Returns how many were expired by this call.
    pub fn run_cycle(&self) -> Result<usize, EngineError> {
        let now = self.clock.now_ms();
        let candidates = self.store.select_expired(now)?;
        let mut expired = 0usize;
        for candidate in candidates {
            match self.store.transition(candidate.id, Transition::Expire) {
                Ok(_) => expired += 1,
                Err(EngineError::StoreConflict) => {
                    tracing::debug!(participant = candidate.id, "already terminal, skipping expiry");
                }
                Err(err) => {
                    tracing::warn!(participant = candidate.id, error = %err, "expiry transition failed");
                }
            }
        }
        if expired > 0 {
            self.metrics.record_expired(expired as u64);
            tracing::info!(expired, "marked participants as expired");
        }
        Ok(expired)
    }
}
