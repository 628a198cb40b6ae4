//! Visit event model for deferred visit counting.

use chrono::{DateTime, Utc};

/// A resolved redirect whose visit has not been counted yet.
///
/// Produced by the redirect path when the destination was served from the
/// ephemeral cache, and consumed by
/// [`crate::domain::visit_worker::run_visit_worker`], which performs the
/// atomic increment at the store.
#[derive(Debug, Clone)]
pub struct VisitEvent {
    pub short_code: String,
    pub occurred_at: DateTime<Utc>,
}

impl VisitEvent {
    /// Creates a visit event stamped with the current time.
    pub fn new(short_code: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            occurred_at: Utc::now(),
        }
    }
}
