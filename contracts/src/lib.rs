//! # Grid Ledger Contracts
//!
//! The stateful half of the grid ledger. Three registers, one store:
//!
//! - **Credit Ledger** — carbon-credit balances, operator-gated minting and
//!   peer transfers, with a carbon offset tracked alongside every balance.
//! - **Project Registry** — crowdfunding for renewable-energy projects,
//!   paid in credits and rewarded with freshly minted credits.
//! - **Grid Registry** — supply and demand per grid, with demand driven by
//!   per-user consumption reports.
//! - **Ledger** — the shared store that owns all three behind one lock and
//!   executes boundary calls.
//!
//! ## Design Principles
//!
//! 1. All monetary operations check for overflow. `checked_add` and
//!    `checked_sub` everywhere; a failing check changes nothing.
//! 2. Validate first, mutate last. An operation either applies completely or
//!    returns an error with the state untouched.
//! 3. State transitions are explicit: enum variants, not boolean flags.
//! 4. Every public type is serializable (serde) for wire transport and
//!    snapshots.

pub mod credit_ledger;
pub mod grid_registry;
pub mod ledger;
pub mod offset_tracker;
pub mod project_registry;

pub use credit_ledger::{CreditError, CreditLedger};
pub use grid_registry::{GridError, GridRegistry, GridStatus};
pub use ledger::{Ledger, LedgerState};
pub use offset_tracker::OffsetTracker;
pub use project_registry::{
    InvestmentReceipt, Project, ProjectError, ProjectRegistry, ProjectStatus,
};
