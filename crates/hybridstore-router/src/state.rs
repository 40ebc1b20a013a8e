//! Primary-backend availability state.
//!
//! Owned by a router instance, never process-global. Two states: the primary
//! is `Available` (attempted first on every upload) or `Disabled` (skipped
//! until an explicit re-enable probe succeeds). The transition to `Disabled`
//! fires when the consecutive-failure counter reaches the configured
//! threshold.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Availability flag plus consecutive-failure counter for the primary backend.
///
/// Both fields are plain atomics: the trip decision is not atomic across a
/// racing pair of uploads, and does not need to be. Two calls can both
/// observe a near-threshold counter and both increment past it; disabling an
/// already-disabled backend is a no-op, so no stronger coordination is
/// warranted.
#[derive(Debug)]
pub struct RouterState {
    primary_available: AtomicBool,
    consecutive_failures: AtomicU32,
}

impl RouterState {
    pub fn new() -> Self {
        Self {
            primary_available: AtomicBool::new(true),
            consecutive_failures: AtomicU32::new(0),
        }
    }

    pub fn is_primary_available(&self) -> bool {
        self.primary_available.load(Ordering::SeqCst)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    /// A primary upload succeeded: the failure streak is over.
    pub fn record_primary_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    /// A primary upload failed. Returns the new streak length; disables the
    /// primary when the streak reaches the threshold.
    pub fn record_primary_failure(&self, threshold: u32) -> u32 {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= threshold {
            self.primary_available.store(false, Ordering::SeqCst);
        }
        failures
    }

    /// A re-enable probe succeeded: back to `Available` with a clean streak.
    pub fn reenable(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.primary_available.store(true, Ordering::SeqCst);
    }
}

impl Default for RouterState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_available() {
        let state = RouterState::new();
        assert!(state.is_primary_available());
        assert_eq!(state.consecutive_failures(), 0);
    }

    #[test]
    fn test_trips_at_threshold() {
        let state = RouterState::new();
        assert_eq!(state.record_primary_failure(3), 1);
        assert!(state.is_primary_available());
        assert_eq!(state.record_primary_failure(3), 2);
        assert!(state.is_primary_available());
        assert_eq!(state.record_primary_failure(3), 3);
        assert!(!state.is_primary_available());
    }

    #[test]
    fn test_success_resets_streak_only() {
        let state = RouterState::new();
        state.record_primary_failure(3);
        state.record_primary_failure(3);
        state.record_primary_success();
        assert_eq!(state.consecutive_failures(), 0);
        assert!(state.is_primary_available());
    }

    #[test]
    fn test_increment_past_threshold_is_idempotent() {
        let state = RouterState::new();
        for _ in 0..5 {
            state.record_primary_failure(3);
        }
        assert!(!state.is_primary_available());
        assert_eq!(state.consecutive_failures(), 5);
    }

    #[test]
    fn test_reenable_resets_everything() {
        let state = RouterState::new();
        for _ in 0..4 {
            state.record_primary_failure(3);
        }
        state.reenable();
        assert!(state.is_primary_available());
        assert_eq!(state.consecutive_failures(), 0);
    }
}
