//! Duplicate-submission suppression.
//!
//! The key is a deterministic fingerprint of (workspace, run, symbol, side,
//! second): two submissions of the same order within the same wall-clock
//! second collapse into one. The key is recorded BEFORE any check runs,
//! which minimizes (not eliminates) the duplicate window between two racing
//! submissions in the same second.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use warden_core::{OrderProposal, OrderSide, Symbol};

/// 64-bit fingerprint of a proposal within one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(u64);

impl IdempotencyKey {
    /// Derive the key for a proposal at `now`.
    pub fn derive(proposal: &OrderProposal, now: DateTime<Utc>) -> Self {
        Self::from_parts(
            &proposal.workspace_id,
            proposal.run_id.as_deref(),
            &proposal.symbol,
            proposal.side,
            now.timestamp(),
        )
    }

    /// Derive from raw parts (second-floored timestamp).
    pub fn from_parts(
        workspace: &str,
        run: Option<&str>,
        symbol: &Symbol,
        side: OrderSide,
        epoch_seconds: i64,
    ) -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        workspace.hash(&mut hasher);
        run.hash(&mut hasher);
        symbol.as_str().hash(&mut hasher);
        side.hash(&mut hasher);
        epoch_seconds.hash(&mut hasher);
        Self(hasher.finish())
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Concurrent set of recently seen keys.
///
/// `record_first` is the only write path and is atomic per key: exactly one
/// of two racing calls with the same key observes `true`.
#[derive(Debug)]
pub struct IdempotencyStore {
    seen: DashMap<IdempotencyKey, DateTime<Utc>>,
    /// How long a key stays before `prune` may drop it.
    retention: Duration,
}

impl IdempotencyStore {
    pub fn new(retention_secs: u64) -> Self {
        Self {
            seen: DashMap::new(),
            retention: Duration::seconds(retention_secs as i64),
        }
    }

    /// Record the key if unseen. Returns false when it was already present.
    pub fn record_first(&self, key: IdempotencyKey, now: DateTime<Utc>) -> bool {
        match self.seen.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
        }
    }

    /// Drop keys older than the retention window.
    pub fn prune(&self, now: DateTime<Utc>) {
        self.seen.retain(|_, seen_at| now - *seen_at <= self.retention);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for IdempotencyStore {
    fn default() -> Self {
        Self::new(60)
    }
}
