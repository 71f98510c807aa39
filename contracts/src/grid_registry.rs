//! # Grid Load Registry
//!
//! Supply and demand bookkeeping for energy grids. The grid operator sets a
//! grid's supply and baseline demand wholesale; consumers then report their
//! current consumption, and demand moves by the difference.
//!
//! ## Demand Accounting
//!
//! Reports are absolute, not cumulative. Each report replaces the user's
//! previous figure for that grid, so demand changes by exactly
//! `new − previous`:
//!
//! ```text
//! operator sets demand = 800
//! user reports 50   → demand = 800 + (50 − 0)  = 850
//! user reports 30   → demand = 850 + (30 − 50) = 830
//! user reports 30   → demand = 830 + (30 − 30) = 830
//! ```
//!
//! An operator update replaces the baseline but keeps every user's last
//! report. The next report from a user is still netted against that report,
//! on top of the new baseline.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use gridledger_protocol::{CodedError, ErrorCode, GridId, Principal};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during grid registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The caller is not the grid operator.
    #[error("unauthorized: {caller} is not the grid operator")]
    Unauthorized {
        /// The principal that attempted the update.
        caller: Principal,
    },

    /// No grid has this id.
    #[error("grid not found: {0}")]
    GridNotFound(GridId),

    /// Demand would leave the `i64` range.
    #[error("demand overflow on grid {grid_id}")]
    DemandOverflow {
        /// The grid whose demand would overflow.
        grid_id: GridId,
    },
}

impl CodedError for GridError {
    fn code(&self) -> ErrorCode {
        match self {
            GridError::Unauthorized { .. } => ErrorCode::Unauthorized,
            GridError::GridNotFound(_) => ErrorCode::NotFound,
            GridError::DemandOverflow { .. } => ErrorCode::AmountOverflow,
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Current load picture of one grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridStatus {
    /// Available supply as set by the operator.
    pub total_supply: u64,
    /// Operator baseline plus every reported consumption delta since.
    /// Signed: a baseline reset below outstanding reports can drive it
    /// negative.
    pub total_demand: i64,
    /// Last operator update or consumption report.
    pub last_updated: DateTime<Utc>,
}

impl GridStatus {
    /// Supply minus demand. Negative means the grid is over-subscribed.
    pub fn headroom(&self) -> i128 {
        i128::from(self.total_supply) - i128::from(self.total_demand)
    }

    /// Returns `true` if demand exceeds supply.
    pub fn is_overloaded(&self) -> bool {
        self.headroom() < 0
    }
}

// ---------------------------------------------------------------------------
// GridRegistry
// ---------------------------------------------------------------------------

/// Grid statuses and the per-user consumption reports behind their demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridRegistry {
    /// The only principal allowed to call
    /// [`update_grid_status`](Self::update_grid_status).
    operator: Principal,
    grids: BTreeMap<GridId, GridStatus>,
    /// Last report: `grid_id -> (user -> amount)`.
    consumption: HashMap<GridId, HashMap<Principal, u64>>,
}

impl GridRegistry {
    /// Creates an empty registry administered by `operator`.
    pub fn new(operator: Principal) -> Self {
        Self {
            operator,
            grids: BTreeMap::new(),
            consumption: HashMap::new(),
        }
    }

    /// The configured grid operator.
    pub fn operator(&self) -> &Principal {
        &self.operator
    }

    /// Creates or overwrites grid `grid_id` with the given supply and
    /// baseline demand.
    ///
    /// # Errors
    ///
    /// - [`GridError::Unauthorized`] if `caller` is not the grid operator.
    /// - [`GridError::DemandOverflow`] if `demand` exceeds `i64::MAX`.
    pub fn update_grid_status(
        &mut self,
        caller: &Principal,
        grid_id: GridId,
        supply: u64,
        demand: u64,
    ) -> Result<(), GridError> {
        if caller != &self.operator {
            warn!(caller = %caller, grid_id, "grid update rejected: not operator");
            return Err(GridError::Unauthorized {
                caller: caller.clone(),
            });
        }
        let total_demand =
            i64::try_from(demand).map_err(|_| GridError::DemandOverflow { grid_id })?;

        self.grids.insert(
            grid_id,
            GridStatus {
                total_supply: supply,
                total_demand,
                last_updated: Utc::now(),
            },
        );
        info!(grid_id, supply, demand, "grid status updated");
        Ok(())
    }

    /// Records `user`'s current consumption on `grid_id` and moves the grid's
    /// demand by the difference from their previous report.
    ///
    /// Returns the demand delta applied.
    ///
    /// # Errors
    ///
    /// - [`GridError::GridNotFound`] if the grid has never been set.
    /// - [`GridError::DemandOverflow`] if demand would leave the `i64` range.
    pub fn report_consumption(
        &mut self,
        user: &Principal,
        grid_id: GridId,
        amount: u64,
    ) -> Result<i64, GridError> {
        let grid = self
            .grids
            .get_mut(&grid_id)
            .ok_or(GridError::GridNotFound(grid_id))?;

        let previous = self
            .consumption
            .get(&grid_id)
            .and_then(|per_user| per_user.get(user.as_str()))
            .copied()
            .unwrap_or(0);

        let overflow = GridError::DemandOverflow { grid_id };
        let delta = i128::from(amount) - i128::from(previous);
        let delta = i64::try_from(delta).map_err(|_| overflow.clone())?;
        let total_demand = grid.total_demand.checked_add(delta).ok_or(overflow)?;

        grid.total_demand = total_demand;
        grid.last_updated = Utc::now();
        self.consumption
            .entry(grid_id)
            .or_default()
            .insert(user.clone(), amount);

        info!(
            grid_id,
            user = %user,
            amount,
            previous,
            total_demand,
            "consumption reported"
        );
        Ok(delta)
    }

    /// Returns the grid's status, or `None` if it has never been set.
    pub fn get_grid_status(&self, grid_id: GridId) -> Option<&GridStatus> {
        self.grids.get(&grid_id)
    }

    /// Returns `user`'s last report on `grid_id`, or `None` if they never
    /// reported there.
    pub fn get_user_consumption(&self, user: &str, grid_id: GridId) -> Option<u64> {
        self.consumption
            .get(&grid_id)
            .and_then(|per_user| per_user.get(user))
            .copied()
    }

    /// Number of grids ever set.
    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }
}
