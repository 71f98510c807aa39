//! # Project Investment Registry
//!
//! Crowdfunding for renewable-energy projects. An owner registers a project
//! with a funding target; investors pay carbon credits into it until the
//! target is reached. The lifecycle is:
//!
//! ```text
//!    ┌──────────┐  current_amount >= target_amount  ┌──────────┐
//!    │  Active  │ ────────────────────────────────► │  Funded  │ (terminal)
//!    └──────────┘                                   └──────────┘
//! ```
//!
//! ## Investment Economics
//!
//! A successful [`invest`](ProjectRegistry::invest) has two economic effects:
//!
//! 1. The investment itself: credits move from investor to project owner.
//! 2. An energy-credit reward: the investor is minted the same amount of new
//!    credits, under the registry's own minting authority.
//!
//! Net effect: the owner gains `amount`, the investor's balance is unchanged,
//! and total supply grows by `amount`. Consumers rely on the reward; it is not
//! a double count.
//!
//! Overshoot is kept. An investment larger than the remaining gap still funds
//! the project and the full amount is recorded; there is no refund or cap.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use gridledger_protocol::config::{AmountPolicy, FIRST_PROJECT_ID};
use gridledger_protocol::{CodedError, ErrorCode, Principal, ProjectId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::credit_ledger::{CreditError, CreditLedger};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during project registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    /// No project has this id.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The project no longer accepts investment.
    #[error("invalid state transition: project {project_id} is {status}, expected Active")]
    ProjectNotActive {
        /// The project that was targeted.
        project_id: ProjectId,
        /// Its current status.
        status: ProjectStatus,
    },

    /// The funding target was rejected by the amount policy.
    #[error("invalid target amount: {0}")]
    InvalidTarget(u64),

    /// A project or investment counter would overflow.
    #[error("amount overflow: project {project_id} cannot absorb {amount} more")]
    AmountOverflow {
        /// The project whose counters would overflow.
        project_id: ProjectId,
        /// The amount that was attempted.
        amount: u64,
    },

    /// The project id counter is exhausted.
    #[error("project id space exhausted")]
    IdsExhausted,

    /// The credit side of the investment failed.
    #[error(transparent)]
    Credit(#[from] CreditError),
}

impl CodedError for ProjectError {
    fn code(&self) -> ErrorCode {
        match self {
            ProjectError::ProjectNotFound(_) => ErrorCode::NotFound,
            ProjectError::ProjectNotActive { .. } => ErrorCode::InvalidState,
            ProjectError::InvalidTarget(_) => ErrorCode::InvalidAmount,
            ProjectError::AmountOverflow { .. } | ProjectError::IdsExhausted => {
                ErrorCode::AmountOverflow
            }
            ProjectError::Credit(inner) => inner.code(),
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Funding status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Accepting investment.
    Active,
    /// Target reached. No further investment, ever.
    Funded,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "Active"),
            ProjectStatus::Funded => write!(f, "Funded"),
        }
    }
}

/// A registered energy project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Sequential identifier, starting at 1.
    pub id: ProjectId,
    /// Display name. Not unique.
    pub name: String,
    /// Credits needed to reach `Funded`.
    pub target_amount: u64,
    /// Credits invested so far, overshoot included.
    pub current_amount: u64,
    /// Receives every investment.
    pub owner: Principal,
    /// Current lifecycle status.
    pub status: ProjectStatus,
    /// When the project was registered.
    pub created_at: DateTime<Utc>,
    /// When the project last received investment.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Returns `true` while the project accepts investment.
    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }

    /// Credits still needed to reach the target; 0 once funded.
    pub fn remaining(&self) -> u64 {
        self.target_amount.saturating_sub(self.current_amount)
    }
}

/// What a successful investment did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentReceipt {
    pub project_id: ProjectId,
    pub investor: Principal,
    /// Amount of this investment.
    pub amount: u64,
    /// Investor's cumulative investment in this project.
    pub total_invested: u64,
    /// Project total after this investment.
    pub current_amount: u64,
    /// Project status after this investment.
    pub status: ProjectStatus,
}

// ---------------------------------------------------------------------------
// ProjectRegistry
// ---------------------------------------------------------------------------

/// Projects, per-investor investment totals and the id counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRegistry {
    /// Projects keyed by id. Ordered so listings come out in creation order.
    projects: BTreeMap<ProjectId, Project>,
    /// Cumulative investment: `project_id -> (investor -> amount)`.
    investments: HashMap<ProjectId, HashMap<Principal, u64>>,
    /// Id handed to the next created project.
    next_id: ProjectId,
    /// Treatment of zero targets.
    policy: AmountPolicy,
}

impl ProjectRegistry {
    /// Creates an empty registry.
    pub fn new(policy: AmountPolicy) -> Self {
        Self {
            projects: BTreeMap::new(),
            investments: HashMap::new(),
            next_id: FIRST_PROJECT_ID,
            policy,
        }
    }

    /// Registers a new project and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::InvalidTarget`] if the amount policy rejects
    /// `target_amount`.
    pub fn create_project(
        &mut self,
        owner: &Principal,
        name: impl Into<String>,
        target_amount: u64,
    ) -> Result<ProjectId, ProjectError> {
        if !self.policy.allows(target_amount) {
            return Err(ProjectError::InvalidTarget(target_amount));
        }

        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(ProjectError::IdsExhausted)?;

        let now = Utc::now();
        let project = Project {
            id,
            name: name.into(),
            target_amount,
            current_amount: 0,
            owner: owner.clone(),
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
        };

        info!(
            project_id = id,
            owner = %owner,
            name = %project.name,
            target_amount,
            "project created"
        );
        self.projects.insert(id, project);
        self.next_id = next_id;
        Ok(id)
    }

    /// Invests `amount` credits from `investor` into project `project_id`.
    ///
    /// The following checks are applied in order, before anything changes:
    ///
    /// 1. **Existence** — the project must exist.
    /// 2. **Status** — the project must be `Active`.
    /// 3. **Counters** — project and investment totals must not overflow.
    /// 4. **Credits** — amount policy, investor balance, reward supply headroom.
    ///
    /// On success the transfer, the reward mint, the investment record and the
    /// project update are applied together.
    pub fn invest(
        &mut self,
        credits: &mut CreditLedger,
        investor: &Principal,
        project_id: ProjectId,
        amount: u64,
    ) -> Result<InvestmentReceipt, ProjectError> {
        // 1. Existence.
        let project = self
            .projects
            .get(&project_id)
            .ok_or(ProjectError::ProjectNotFound(project_id))?;

        // 2. Status.
        if !project.is_active() {
            debug!(project_id, investor = %investor, "investment rejected: project funded");
            return Err(ProjectError::ProjectNotActive {
                project_id,
                status: project.status,
            });
        }

        // 3. Counters.
        let overflow = ProjectError::AmountOverflow { project_id, amount };
        let current_amount = project
            .current_amount
            .checked_add(amount)
            .ok_or_else(|| overflow.clone())?;
        let total_invested = self
            .get_investment(project_id, investor.as_str())
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(overflow)?;

        // 4. Credits. Validates fully before moving anything.
        let owner = project.owner.clone();
        credits.settle_investment(investor, &owner, amount)?;

        let project = self
            .projects
            .get_mut(&project_id)
            .ok_or(ProjectError::ProjectNotFound(project_id))?;
        project.current_amount = current_amount;
        if project.current_amount >= project.target_amount {
            project.status = ProjectStatus::Funded;
        }
        project.updated_at = Utc::now();
        let status = project.status;

        self.investments
            .entry(project_id)
            .or_default()
            .insert(investor.clone(), total_invested);

        info!(
            project_id,
            investor = %investor,
            amount,
            current_amount,
            status = %status,
            "investment recorded"
        );

        Ok(InvestmentReceipt {
            project_id,
            investor: investor.clone(),
            amount,
            total_invested,
            current_amount,
            status,
        })
    }

    /// Returns the project, or `None` if it does not exist.
    pub fn get_project(&self, project_id: ProjectId) -> Option<&Project> {
        self.projects.get(&project_id)
    }

    /// Returns `investor`'s cumulative investment in `project_id`, or `None`
    /// if it never invested there.
    pub fn get_investment(&self, project_id: ProjectId, investor: &str) -> Option<u64> {
        self.investments
            .get(&project_id)
            .and_then(|per_investor| per_investor.get(investor))
            .copied()
    }

    /// Iterates over all projects in creation order.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// Number of projects ever created.
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}
