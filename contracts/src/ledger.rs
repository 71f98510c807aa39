//! # Ledger — the Shared Store
//!
//! One [`Ledger`] owns every register. Callers share it as `Arc<Ledger>` and
//! invoke one operation at a time; each operation runs start to finish under
//! a single guard on one `RwLock`, so no caller ever observes another
//! operation half-applied.
//!
//! ```text
//!            ┌───────────────── RwLock<LedgerState> ─────────────────┐
//!  mint ────►│ CreditLedger ── OffsetTracker                         │
//!  transfer ►│      ▲                                                │
//!  invest ──►│ ProjectRegistry (transfer + reward mint + project)    │
//!  report ──►│ GridRegistry                                          │
//!            └───────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations take the write lock, reads take the read lock. Nothing in here
//! blocks on I/O or awaits, so the coarse lock is held only for the length of
//! a few map operations.

use gridledger_protocol::config::{ConfigError, LedgerConfig};
use gridledger_protocol::{Call, GridId, Principal, ProjectId, Response};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credit_ledger::{CreditError, CreditLedger};
use crate::grid_registry::{GridError, GridRegistry, GridStatus};
use crate::project_registry::{InvestmentReceipt, Project, ProjectError, ProjectRegistry};

// ---------------------------------------------------------------------------
// LedgerState
// ---------------------------------------------------------------------------

/// Every register, owned together behind the ledger's lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    pub credits: CreditLedger,
    pub projects: ProjectRegistry,
    pub grids: GridRegistry,
}

impl LedgerState {
    /// Empty registers wired to `config`.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            credits: CreditLedger::new(config.ledger_operator.clone(), config.amount_policy),
            projects: ProjectRegistry::new(config.amount_policy),
            grids: GridRegistry::new(config.grid_operator.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The shared, thread-safe store.
pub struct Ledger {
    config: LedgerConfig,
    state: RwLock<LedgerState>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .field("total_supply", &state.credits.total_supply())
            .field("projects", &state.projects.project_count())
            .field("grids", &state.grids.grid_count())
            .finish()
    }
}

impl Ledger {
    /// Creates an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`LedgerConfig::validate`].
    pub fn new(config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = LedgerState::new(&config);
        Ok(Self {
            config,
            state: RwLock::new(state),
        })
    }

    /// The configuration this ledger was built with.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Runs `f` against a consistent view of every register.
    ///
    /// Use this when several values must be read from the same instant, e.g.
    /// summing all balances against total supply.
    ///
    /// # Deadlocks
    ///
    /// `f` runs while the read guard is held. It must only use the
    /// `&LedgerState` it is given: calling back into any `Ledger` method
    /// deadlocks on a write, and on a read too once a writer is queued.
    pub fn read<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        f(&self.state.read())
    }

    /// Clones the full state.
    pub fn snapshot(&self) -> LedgerState {
        self.state.read().clone()
    }

    // -----------------------------------------------------------------------
    // Credits
    // -----------------------------------------------------------------------

    /// See [`CreditLedger::mint`].
    pub fn mint(
        &self,
        caller: &Principal,
        recipient: &Principal,
        amount: u64,
    ) -> Result<u64, CreditError> {
        self.state.write().credits.mint(caller, recipient, amount)
    }

    /// See [`CreditLedger::transfer`].
    pub fn transfer(
        &self,
        sender: &Principal,
        recipient: &Principal,
        amount: u64,
    ) -> Result<(), CreditError> {
        self.state.write().credits.transfer(sender, recipient, amount)
    }

    pub fn balance_of(&self, principal: &str) -> u64 {
        self.state.read().credits.balance_of(principal)
    }

    pub fn offset_of(&self, principal: &str) -> i128 {
        self.state.read().credits.offset_of(principal)
    }

    pub fn total_supply(&self) -> u64 {
        self.state.read().credits.total_supply()
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// See [`ProjectRegistry::create_project`].
    pub fn create_project(
        &self,
        owner: &Principal,
        name: impl Into<String>,
        target_amount: u64,
    ) -> Result<ProjectId, ProjectError> {
        self.state
            .write()
            .projects
            .create_project(owner, name, target_amount)
    }

    /// See [`ProjectRegistry::invest`]. The credit movement, the reward mint
    /// and the project update happen under one write guard.
    pub fn invest(
        &self,
        investor: &Principal,
        project_id: ProjectId,
        amount: u64,
    ) -> Result<InvestmentReceipt, ProjectError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state
            .projects
            .invest(&mut state.credits, investor, project_id, amount)
    }

    pub fn get_project(&self, project_id: ProjectId) -> Option<Project> {
        self.state.read().projects.get_project(project_id).cloned()
    }

    pub fn get_investment(&self, project_id: ProjectId, investor: &str) -> Option<u64> {
        self.state.read().projects.get_investment(project_id, investor)
    }

    pub fn project_count(&self) -> usize {
        self.state.read().projects.project_count()
    }

    // -----------------------------------------------------------------------
    // Grids
    // -----------------------------------------------------------------------

    /// See [`GridRegistry::update_grid_status`].
    pub fn update_grid_status(
        &self,
        caller: &Principal,
        grid_id: GridId,
        supply: u64,
        demand: u64,
    ) -> Result<(), GridError> {
        self.state
            .write()
            .grids
            .update_grid_status(caller, grid_id, supply, demand)
    }

    /// See [`GridRegistry::report_consumption`].
    pub fn report_consumption(
        &self,
        user: &Principal,
        grid_id: GridId,
        amount: u64,
    ) -> Result<i64, GridError> {
        self.state
            .write()
            .grids
            .report_consumption(user, grid_id, amount)
    }

    pub fn get_grid_status(&self, grid_id: GridId) -> Option<GridStatus> {
        self.state.read().grids.get_grid_status(grid_id).cloned()
    }

    pub fn get_user_consumption(&self, user: &str, grid_id: GridId) -> Option<u64> {
        self.state.read().grids.get_user_consumption(user, grid_id)
    }

    pub fn grid_count(&self) -> usize {
        self.state.read().grids.grid_count()
    }

    // -----------------------------------------------------------------------
    // Boundary
    // -----------------------------------------------------------------------

    /// Executes one boundary [`Call`] and packages the outcome.
    ///
    /// Failures carry their numeric code; not-found reads succeed with a
    /// `null` value.
    pub fn execute(&self, call: Call) -> Response {
        let method = call.method();
        let response = match call {
            Call::Mint {
                caller,
                recipient,
                amount,
            } => Response::from_result(self.mint(&caller, &recipient, amount)),
            Call::Transfer {
                sender,
                recipient,
                amount,
            } => Response::from_result(self.transfer(&sender, &recipient, amount)),
            Call::BalanceOf { principal } => Response::ok(self.balance_of(principal.as_str())),
            // i128 travels as a string; JSON numbers stop being exact at 2^53.
            Call::OffsetOf { principal } => {
                Response::ok(self.offset_of(principal.as_str()).to_string())
            }
            Call::TotalSupply => Response::ok(self.total_supply()),
            Call::CreateProject {
                owner,
                name,
                target_amount,
            } => Response::from_result(self.create_project(&owner, name, target_amount)),
            Call::Invest {
                investor,
                project_id,
                amount,
            } => Response::from_result(self.invest(&investor, project_id, amount)),
            Call::GetProject { project_id } => Response::ok(self.get_project(project_id)),
            Call::GetInvestment {
                project_id,
                investor,
            } => Response::ok(self.get_investment(project_id, investor.as_str())),
            Call::UpdateGridStatus {
                caller,
                grid_id,
                supply,
                demand,
            } => Response::from_result(self.update_grid_status(&caller, grid_id, supply, demand)),
            Call::ReportConsumption {
                user,
                grid_id,
                amount,
            } => Response::from_result(self.report_consumption(&user, grid_id, amount)),
            Call::GetGridStatus { grid_id } => Response::ok(self.get_grid_status(grid_id)),
            Call::GetUserConsumption { user, grid_id } => {
                Response::ok(self.get_user_consumption(user.as_str(), grid_id))
            }
        };

        debug!(method, success = response.success, error = ?response.error, "call executed");
        response
    }
}

impl Default for Ledger {
    fn default() -> Self {
        let config = LedgerConfig::default();
        let state = LedgerState::new(&config);
        Self {
            config,
            state: RwLock::new(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridledger_protocol::config::DEFAULT_OPERATOR;
    use gridledger_protocol::ErrorCode;

    fn p(s: &str) -> Principal {
        Principal::from(s)
    }

    #[test]
    fn empty_operator_config_rejected() {
        let config = LedgerConfig::default().with_operator("");
        assert!(Ledger::new(config).is_err());
    }

    #[test]
    fn default_ledger_uses_deployer_operator() {
        let ledger = Ledger::default();
        assert_eq!(ledger.config().ledger_operator.as_str(), DEFAULT_OPERATOR);
        ledger.mint(&p(DEFAULT_OPERATOR), &p("w1"), 10).unwrap();
        assert_eq!(ledger.balance_of("w1"), 10);
    }

    #[test]
    fn invest_touches_both_registers() {
        let ledger = Ledger::default();
        let op = p(DEFAULT_OPERATOR);
        ledger.mint(&op, &p("w2"), 500).unwrap();
        let id = ledger.create_project(&p("w1"), "Solar Farm", 1000).unwrap();
        ledger.invest(&p("w2"), id, 500).unwrap();

        ledger.read(|state| {
            assert_eq!(state.credits.balance_of("w1"), 500);
            assert_eq!(state.credits.balance_of("w2"), 500);
            assert_eq!(state.projects.get_project(id).unwrap().current_amount, 500);
        });
    }

    #[test]
    fn execute_maps_errors_to_codes() {
        let ledger = Ledger::default();
        let resp = ledger.execute(Call::Mint {
            caller: p("w1"),
            recipient: p("w2"),
            amount: 100,
        });
        assert!(!resp.success);
        assert_eq!(resp.error, Some(ErrorCode::Unauthorized));
    }

    #[test]
    fn execute_not_found_read_is_null_success() {
        let ledger = Ledger::default();
        let resp = ledger.execute(Call::GetGridStatus { grid_id: 9 });
        assert!(resp.success);
        assert_eq!(resp.value, Some(serde_json::Value::Null));
    }

    #[test]
    fn snapshot_serializes() {
        let ledger = Ledger::default();
        ledger.mint(&p(DEFAULT_OPERATOR), &p("w1"), 10).unwrap();
        let json = serde_json::to_value(ledger.snapshot()).unwrap();
        assert_eq!(json["credits"]["total_supply"], 10);
    }
}
