// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Grid Ledger Protocol — Shared Vocabulary
//!
//! Everything the ledger registers and their callers need to agree on, without
//! any of the state itself. The registers live in `gridledger-contracts`; this
//! crate only defines the words they speak.
//!
//! - **identity** — Principals (authenticated caller identities) and the
//!   project / grid identifiers.
//! - **error** — The numeric failure codes external consumers depend on.
//! - **config** — Operator identities, amount policy, protocol constants.
//! - **rpc** — The call/response boundary: one tagged call per operation,
//!   one response shape for all of them.
//! - **logging** — `tracing` subscriber setup for hosts embedding the ledger.
//!
//! ## Design Philosophy
//!
//! 1. The host authenticates; we never second-guess a principal string.
//! 2. Error codes are a wire contract. Variants may grow, numbers never move.
//! 3. Every public type is serializable, because every one of them crosses
//!    the boundary sooner or later.

pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod rpc;

pub use config::{AmountPolicy, ConfigError, LedgerConfig};
pub use error::{CodedError, ErrorCode};
pub use identity::{GridId, Principal, ProjectId};
pub use rpc::{Call, Response};
