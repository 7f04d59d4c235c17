// src/keyring/epoch.rs
//! Epoch tokens and their allocation

use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Generation identifier of a project's keyring
///
/// Tokens minted here are decimal millisecond timestamps, so they stay
/// readable by clients that produced `Date.now()`-style epochs. Numeric
/// tokens order numerically; any non-numeric token from elsewhere orders
/// before all numeric ones and lexicographically among its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(String);

impl Epoch {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of a timestamp token
    pub fn as_millis(&self) -> Option<u64> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl Ord for Epoch {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_millis(), other.as_millis()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Epoch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Epoch {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Issues strictly increasing epochs
///
/// Each token is `max(now, floor + 1)` where the floor is the larger of the
/// last token this allocator issued and the caller-supplied previous epoch.
/// Two rotations in the same millisecond therefore still get distinct,
/// ordered tokens, provided they draw from the same allocator. Coordinators
/// share [`EpochAllocator::shared`] unless handed one explicitly.
#[derive(Debug, Default)]
pub struct EpochAllocator {
    last_issued: AtomicU64,
}

impl EpochAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide allocator
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<EpochAllocator>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::new())))
    }

    pub fn next(&self, previous: Option<&Epoch>) -> Epoch {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now, previous)
    }

    pub fn next_at(&self, now_millis: u64, previous: Option<&Epoch>) -> Epoch {
        let previous = previous.and_then(Epoch::as_millis).unwrap_or(0);
        let mut issued = 0;
        // fetch_update only fails if the closure returns None
        let _ = self
            .last_issued
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |last| {
                issued = now_millis.max(last.max(previous).saturating_add(1));
                Some(issued)
            });
        Epoch::from_millis(issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_epochs_order_by_value_not_text() {
        assert!(Epoch::new("999") < Epoch::new("1000"));
        assert!(Epoch::new("1700000000000") > Epoch::new("999999999999"));
    }

    #[test]
    fn foreign_tokens_order_before_numeric() {
        assert!(Epoch::new("legacy") < Epoch::new("1"));
        assert!(Epoch::new("a") < Epoch::new("b"));
    }

    #[test]
    fn allocator_is_strictly_increasing_within_one_millisecond() {
        let allocator = EpochAllocator::new();
        let a = allocator.next_at(5_000, None);
        let b = allocator.next_at(5_000, None);
        let c = allocator.next_at(4_000, None);
        assert!(a < b && b < c);
        assert_eq!(a, Epoch::from_millis(5_000));
    }

    #[test]
    fn shared_allocator_orders_across_holders() {
        let a = EpochAllocator::shared();
        let b = EpochAllocator::shared();
        assert!(Arc::ptr_eq(&a, &b));

        let first = a.next_at(5_000, None);
        let second = b.next_at(5_000, None);
        assert!(second > first);
    }

    #[test]
    fn allocator_respects_previous_epoch_ahead_of_clock() {
        let allocator = EpochAllocator::new();
        let previous = Epoch::from_millis(9_000);
        let next = allocator.next_at(1_000, Some(&previous));
        assert_eq!(next, Epoch::from_millis(9_001));
    }
}
