//! # Carbon Credit Ledger
//!
//! Fungible carbon-credit balances with operator-gated minting and plain
//! balance-checked transfers. Every balance change is mirrored into the
//! ledger's [`OffsetTracker`] before the method returns.
//!
//! ## Supply Model
//!
//! - **Mint** — the configured ledger operator creates new credits. This and
//!   the investment reward (see [`crate::project_registry`]) are the only
//!   ways supply grows.
//! - **Transfer** — zero-sum between two principals. Never drives a balance
//!   below zero.
//!
//! Because every balance is at most `total_supply`, a mint that fits in the
//! supply counter can never overflow an individual balance. All arithmetic is
//! still checked: wrapping arithmetic and money do not mix.

use std::collections::HashMap;

use gridledger_protocol::config::AmountPolicy;
use gridledger_protocol::{CodedError, ErrorCode, Principal};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::offset_tracker::OffsetTracker;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during credit ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreditError {
    /// The caller is not the ledger operator.
    #[error("unauthorized: {caller} is not the ledger operator")]
    Unauthorized {
        /// The principal that attempted to mint.
        caller: Principal,
    },

    /// The sender does not hold enough credits.
    #[error("insufficient balance: {principal} has {available}, requested {requested}")]
    InsufficientBalance {
        /// The principal being debited.
        principal: Principal,
        /// Its current balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// The amount was rejected by the configured [`AmountPolicy`].
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: u64,
    },

    /// Minting would push total supply past `u64::MAX`.
    #[error("supply overflow: minting {amount} would exceed u64::MAX")]
    SupplyOverflow {
        /// The amount that was attempted.
        amount: u64,
    },
}

impl CodedError for CreditError {
    fn code(&self) -> ErrorCode {
        match self {
            CreditError::Unauthorized { .. } => ErrorCode::Unauthorized,
            CreditError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            CreditError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CreditError::SupplyOverflow { .. } => ErrorCode::AmountOverflow,
        }
    }
}

// ---------------------------------------------------------------------------
// CreditLedger
// ---------------------------------------------------------------------------

/// Balances, total supply and the offset view, owned together so that a
/// single `&mut` borrow covers every register a credit operation touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditLedger {
    /// The only principal allowed to call [`mint`](Self::mint).
    operator: Principal,
    /// Treatment of zero amounts.
    policy: AmountPolicy,
    /// Credit balances. Absent means zero.
    balances: HashMap<Principal, u64>,
    /// Sum of every successful mint, operator and reward alike.
    total_supply: u64,
    /// Offsets moved in lockstep with `balances`.
    offsets: OffsetTracker,
}

impl CreditLedger {
    /// Creates an empty ledger minted by `operator`.
    pub fn new(operator: Principal, policy: AmountPolicy) -> Self {
        Self {
            operator,
            policy,
            balances: HashMap::new(),
            total_supply: 0,
            offsets: OffsetTracker::new(),
        }
    }

    /// The configured ledger operator.
    pub fn operator(&self) -> &Principal {
        &self.operator
    }

    /// Mints `amount` new credits to `recipient`.
    ///
    /// Returns the recipient's new balance.
    ///
    /// # Errors
    ///
    /// - [`CreditError::Unauthorized`] if `caller` is not the operator.
    /// - [`CreditError::InvalidAmount`] if the amount policy rejects `amount`.
    /// - [`CreditError::SupplyOverflow`] if total supply would overflow.
    pub fn mint(
        &mut self,
        caller: &Principal,
        recipient: &Principal,
        amount: u64,
    ) -> Result<u64, CreditError> {
        if caller != &self.operator {
            warn!(caller = %caller, recipient = %recipient, amount, "mint rejected: not operator");
            return Err(CreditError::Unauthorized {
                caller: caller.clone(),
            });
        }
        self.check_amount(amount)?;

        let balance = self.issue(recipient, amount)?;
        info!(
            recipient = %recipient,
            amount,
            balance,
            total_supply = self.total_supply,
            "carbon credits minted"
        );
        Ok(balance)
    }

    /// Moves `amount` credits from `sender` to `recipient`.
    ///
    /// A self-transfer passes the same checks and then changes nothing.
    ///
    /// # Errors
    ///
    /// - [`CreditError::InvalidAmount`] if the amount policy rejects `amount`.
    /// - [`CreditError::InsufficientBalance`] if `sender` holds less than `amount`.
    pub fn transfer(
        &mut self,
        sender: &Principal,
        recipient: &Principal,
        amount: u64,
    ) -> Result<(), CreditError> {
        self.check_amount(amount)?;
        self.check_balance(sender, amount)?;

        self.move_credits(sender, recipient, amount);
        info!(sender = %sender, recipient = %recipient, amount, "carbon credits transferred");
        Ok(())
    }

    /// Balance of `principal`, or 0 if it was never touched.
    pub fn balance_of(&self, principal: &str) -> u64 {
        self.balances.get(principal).copied().unwrap_or(0)
    }

    /// Carbon offset of `principal`, or 0 if it was never touched.
    pub fn offset_of(&self, principal: &str) -> i128 {
        self.offsets.offset_of(principal)
    }

    /// Total credits ever minted.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Read-only view of the offset register.
    pub fn offsets(&self) -> &OffsetTracker {
        &self.offsets
    }

    /// Iterates over every principal holding a balance entry.
    pub fn balances(&self) -> impl Iterator<Item = (&Principal, u64)> {
        self.balances.iter().map(|(p, b)| (p, *b))
    }

    // -----------------------------------------------------------------------
    // Investment settlement
    // -----------------------------------------------------------------------

    /// Validates the credit side of an investment without changing anything.
    ///
    /// Checks, in order: amount policy, investor balance, supply headroom for
    /// the reward mint. Returns the total supply after the reward.
    pub(crate) fn check_investment(
        &self,
        investor: &Principal,
        amount: u64,
    ) -> Result<u64, CreditError> {
        self.check_amount(amount)?;
        self.check_balance(investor, amount)?;
        self.supply_after(amount)
    }

    /// Applies the credit side of an investment: `investor` pays `owner`,
    /// then `investor` is minted the same amount as an energy-credit reward.
    ///
    /// The reward mint runs under the project registry's authority, not the
    /// operator's. It is unreachable from outside the crate.
    pub(crate) fn settle_investment(
        &mut self,
        investor: &Principal,
        owner: &Principal,
        amount: u64,
    ) -> Result<(), CreditError> {
        let total_supply = self.check_investment(investor, amount)?;

        // Nothing below can fail: a transfer leaves total supply unchanged.
        self.move_credits(investor, owner, amount);
        let balance = self.apply_issue(investor, amount, total_supply);
        debug!(
            investor = %investor,
            owner = %owner,
            amount,
            investor_balance = balance,
            total_supply = self.total_supply,
            "investment settled with reward mint"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn check_amount(&self, amount: u64) -> Result<(), CreditError> {
        if self.policy.allows(amount) {
            Ok(())
        } else {
            Err(CreditError::InvalidAmount { amount })
        }
    }

    fn check_balance(&self, principal: &Principal, amount: u64) -> Result<(), CreditError> {
        let available = self.balance_of(principal.as_str());
        if available < amount {
            debug!(principal = %principal, available, requested = amount, "insufficient balance");
            return Err(CreditError::InsufficientBalance {
                principal: principal.clone(),
                available,
                requested: amount,
            });
        }
        Ok(())
    }

    fn supply_after(&self, amount: u64) -> Result<u64, CreditError> {
        self.total_supply
            .checked_add(amount)
            .ok_or(CreditError::SupplyOverflow { amount })
    }

    /// Creates `amount` new credits for `recipient`.
    fn issue(&mut self, recipient: &Principal, amount: u64) -> Result<u64, CreditError> {
        let total_supply = self.supply_after(amount)?;
        Ok(self.apply_issue(recipient, amount, total_supply))
    }

    /// Writes a mint whose new `total_supply` has already been checked.
    /// Every balance is at most the total supply, so the recipient's balance
    /// cannot overflow either.
    fn apply_issue(&mut self, recipient: &Principal, amount: u64, total_supply: u64) -> u64 {
        let balance = self.balance_of(recipient.as_str()).saturating_add(amount);

        self.total_supply = total_supply;
        self.balances.insert(recipient.clone(), balance);
        self.offsets.record_mint(recipient, amount);
        balance
    }

    /// Moves credits the caller has already checked the sender holds.
    fn move_credits(&mut self, sender: &Principal, recipient: &Principal, amount: u64) {
        if sender != recipient {
            let sender_balance = self.balance_of(sender.as_str()) - amount;
            // Bounded by total_supply, which already fits in a u64.
            let recipient_balance = self.balance_of(recipient.as_str()).saturating_add(amount);
            self.balances.insert(sender.clone(), sender_balance);
            self.balances.insert(recipient.clone(), recipient_balance);
        }
        self.offsets.record_transfer(sender, recipient, amount);
    }
}
