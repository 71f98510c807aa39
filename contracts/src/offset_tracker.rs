//! # Carbon Offset Tracker
//!
//! A per-principal running total of carbon offsets, moved in lockstep with
//! credit balances. There is no public write path: the
//! [`CreditLedger`](crate::credit_ledger::CreditLedger) records every
//! successful mint and transfer here as part of the same state change.
//!
//! Offsets are signed. They mirror balance deltas rather than bounding them,
//! so nothing here refuses a debit.

use std::collections::HashMap;

use gridledger_protocol::Principal;
use serde::{Deserialize, Serialize};

/// Cumulative carbon offsets keyed by principal.
///
/// An entry appears the first time a mint or transfer touches a principal
/// and is never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OffsetTracker {
    offsets: HashMap<Principal, i128>,
}

impl OffsetTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset held by `principal`, or 0 if it was never touched.
    pub fn offset_of(&self, principal: &str) -> i128 {
        self.offsets.get(principal).copied().unwrap_or(0)
    }

    /// Number of principals with an offset entry.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` if no mint or transfer has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Sum of all offsets. Transfers cancel out, so this equals the total
    /// ever minted.
    pub fn net_total(&self) -> i128 {
        self.offsets.values().sum()
    }

    pub(crate) fn record_mint(&mut self, recipient: &Principal, amount: u64) {
        *self.entry(recipient) += i128::from(amount);
    }

    pub(crate) fn record_transfer(
        &mut self,
        sender: &Principal,
        recipient: &Principal,
        amount: u64,
    ) {
        let delta = i128::from(amount);
        *self.entry(sender) -= delta;
        *self.entry(recipient) += delta;
    }

    fn entry(&mut self, principal: &Principal) -> &mut i128 {
        self.offsets.entry(principal.clone()).or_insert(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Principal {
        Principal::from(s)
    }

    #[test]
    fn untouched_principal_reads_zero() {
        let tracker = OffsetTracker::new();
        assert_eq!(tracker.offset_of("nobody"), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn mint_then_transfer_mirrors_deltas() {
        let mut tracker = OffsetTracker::new();
        tracker.record_mint(&p("w1"), 100);
        tracker.record_transfer(&p("w1"), &p("w2"), 50);
        assert_eq!(tracker.offset_of("w1"), 50);
        assert_eq!(tracker.offset_of("w2"), 50);
        assert_eq!(tracker.net_total(), 100);
    }

    #[test]
    fn offsets_may_go_negative() {
        let mut tracker = OffsetTracker::new();
        tracker.record_transfer(&p("w1"), &p("w2"), 30);
        assert_eq!(tracker.offset_of("w1"), -30);
        assert_eq!(tracker.offset_of("w2"), 30);
    }

    #[test]
    fn self_transfer_creates_entry_without_change() {
        let mut tracker = OffsetTracker::new();
        tracker.record_transfer(&p("w1"), &p("w1"), 30);
        assert_eq!(tracker.offset_of("w1"), 0);
        assert_eq!(tracker.len(), 1);
    }
}
