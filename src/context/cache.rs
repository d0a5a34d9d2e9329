//! Context expiry bookkeeping.

use super::AuthContext;
use std::sync::Arc;

/// A received context and the instant it stops being usable.
///
/// Valid while `now < valid_until_ms`, where
/// `valid_until_ms = acquired_at_ms + expires_in * 1000 - margin_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedContext {
    context: Arc<AuthContext>,
    acquired_at_ms: i64,
    valid_until_ms: i64,
}

impl CachedContext {
    pub fn new(context: AuthContext, acquired_at_ms: i64, margin_ms: i64) -> Self {
        let lifetime_ms = i64::try_from(context.auth.expires_in)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        let valid_until_ms = acquired_at_ms
            .saturating_add(lifetime_ms)
            .saturating_sub(margin_ms);
        Self {
            context: Arc::new(context),
            acquired_at_ms,
            valid_until_ms,
        }
    }

    pub fn context(&self) -> Arc<AuthContext> {
        Arc::clone(&self.context)
    }

    pub fn acquired_at_ms(&self) -> i64 {
        self.acquired_at_ms
    }

    pub fn valid_until_ms(&self) -> i64 {
        self.valid_until_ms
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.valid_until_ms
    }
}
