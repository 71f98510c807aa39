//! # Ledger Configuration & Constants
//!
//! Every magic value in the ledger lives here: who the operators are, how
//! zero amounts are treated, where project numbering starts.
//!
//! The defaults reproduce the deployed behaviour, with one exception: zero
//! amounts are rejected unless [`AmountPolicy::Permissive`] is selected.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::identity::{Principal, ProjectId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The deployer identity of the live ledger. Used as both the ledger operator
/// and the grid operator unless configured otherwise.
pub const DEFAULT_OPERATOR: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

/// Identifier handed to the first project ever created.
pub const FIRST_PROJECT_ID: ProjectId = 1;

/// Environment variable overriding [`LedgerConfig::ledger_operator`].
pub const ENV_LEDGER_OPERATOR: &str = "GRIDLEDGER_OPERATOR";

/// Environment variable overriding [`LedgerConfig::grid_operator`].
pub const ENV_GRID_OPERATOR: &str = "GRIDLEDGER_GRID_OPERATOR";

/// Environment variable overriding [`LedgerConfig::amount_policy`].
pub const ENV_AMOUNT_POLICY: &str = "GRIDLEDGER_AMOUNT_POLICY";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building or validating a [`LedgerConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An operator identity was configured as the empty string.
    #[error("{role} operator must not be empty")]
    EmptyOperator {
        /// Which operator slot was empty ("ledger" or "grid").
        role: &'static str,
    },

    /// The amount policy string was not recognized.
    #[error("unknown amount policy '{0}' (expected 'reject-zero' or 'permissive')")]
    UnknownAmountPolicy(String),
}

// ---------------------------------------------------------------------------
// AmountPolicy
// ---------------------------------------------------------------------------

/// How the registers treat a zero amount (mint, transfer, investment) or a
/// zero project target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmountPolicy {
    /// Reject with `InvalidAmount` before touching any state.
    #[default]
    RejectZero,
    /// Accept zero as a successful no-op amount, as the deployed contracts did.
    Permissive,
}

impl AmountPolicy {
    /// Returns `true` if `amount` is acceptable under this policy.
    pub fn allows(self, amount: u64) -> bool {
        match self {
            AmountPolicy::RejectZero => amount > 0,
            AmountPolicy::Permissive => true,
        }
    }
}

impl FromStr for AmountPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject-zero" | "reject_zero" | "strict" => Ok(AmountPolicy::RejectZero),
            "permissive" => Ok(AmountPolicy::Permissive),
            other => Err(ConfigError::UnknownAmountPolicy(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Runtime configuration of a ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The only principal allowed to mint carbon credits.
    pub ledger_operator: Principal,
    /// The only principal allowed to set grid supply and demand.
    pub grid_operator: Principal,
    /// Treatment of zero amounts and targets.
    #[serde(default)]
    pub amount_policy: AmountPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_operator: Principal::from(DEFAULT_OPERATOR),
            grid_operator: Principal::from(DEFAULT_OPERATOR),
            amount_policy: AmountPolicy::default(),
        }
    }
}

impl LedgerConfig {
    /// Uses `operator` for both the ledger and the grid.
    pub fn with_operator(mut self, operator: impl Into<Principal>) -> Self {
        let operator = operator.into();
        self.grid_operator = operator.clone();
        self.ledger_operator = operator;
        self
    }

    /// Overrides the grid operator only.
    pub fn with_grid_operator(mut self, operator: impl Into<Principal>) -> Self {
        self.grid_operator = operator.into();
        self
    }

    /// Overrides the amount policy.
    pub fn with_amount_policy(mut self, policy: AmountPolicy) -> Self {
        self.amount_policy = policy;
        self
    }

    /// Defaults overlaid with the `GRIDLEDGER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each
    /// `GRIDLEDGER_*` key. A missing key keeps the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(operator) = lookup(ENV_LEDGER_OPERATOR) {
            config = config.with_operator(operator);
        }
        if let Some(operator) = lookup(ENV_GRID_OPERATOR) {
            config = config.with_grid_operator(operator);
        }
        if let Some(policy) = lookup(ENV_AMOUNT_POLICY) {
            config.amount_policy = policy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations no ledger should run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger_operator.is_empty() {
            return Err(ConfigError::EmptyOperator { role: "ledger" });
        }
        if self.grid_operator.is_empty() {
            return Err(ConfigError::EmptyOperator { role: "grid" });
        }
        Ok(())
    }
}
