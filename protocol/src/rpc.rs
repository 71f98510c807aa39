//! # Call/Response Boundary
//!
//! Type-safe definitions for the ledger's external surface. A host (RPC
//! server, message queue consumer, test harness) turns whatever arrives on
//! its transport into a [`Call`], hands it to the ledger together with the
//! authenticated caller, and serializes the [`Response`] back out.
//!
//! ## Call Index
//!
//! | Method                  | Register        | Mutates |
//! |-------------------------|-----------------|---------|
//! | `mint`                  | credit ledger   | yes     |
//! | `transfer`              | credit ledger   | yes     |
//! | `balance_of`            | credit ledger   | no      |
//! | `offset_of`             | offset tracker  | no      |
//! | `total_supply`          | credit ledger   | no      |
//! | `create_project`        | projects        | yes     |
//! | `invest`                | projects        | yes     |
//! | `get_project`           | projects        | no      |
//! | `get_investment`        | projects        | no      |
//! | `update_grid_status`    | grids           | yes     |
//! | `report_consumption`    | grids           | yes     |
//! | `get_grid_status`       | grids           | no      |
//! | `get_user_consumption`  | grids           | no      |
//!
//! On the wire a call looks like:
//!
//! ```text
//! {"method": "invest", "params": {"investor": "ST2...", "project_id": 1, "amount": 500}}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CodedError, ErrorCode};
use crate::identity::{GridId, Principal, ProjectId};

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

/// One ledger operation with its arguments.
///
/// The acting principal is always an explicit parameter: the host has already
/// authenticated it and the ledger takes it at face value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum Call {
    Mint {
        caller: Principal,
        recipient: Principal,
        amount: u64,
    },
    Transfer {
        sender: Principal,
        recipient: Principal,
        amount: u64,
    },
    BalanceOf {
        principal: Principal,
    },
    OffsetOf {
        principal: Principal,
    },
    TotalSupply,
    CreateProject {
        owner: Principal,
        name: String,
        target_amount: u64,
    },
    Invest {
        investor: Principal,
        project_id: ProjectId,
        amount: u64,
    },
    GetProject {
        project_id: ProjectId,
    },
    GetInvestment {
        project_id: ProjectId,
        investor: Principal,
    },
    UpdateGridStatus {
        caller: Principal,
        grid_id: GridId,
        supply: u64,
        demand: u64,
    },
    ReportConsumption {
        user: Principal,
        grid_id: GridId,
        amount: u64,
    },
    GetGridStatus {
        grid_id: GridId,
    },
    GetUserConsumption {
        user: Principal,
        grid_id: GridId,
    },
}

impl Call {
    /// Parses a call from its JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The wire name of this call's method.
    pub fn method(&self) -> &'static str {
        match self {
            Call::Mint { .. } => "mint",
            Call::Transfer { .. } => "transfer",
            Call::BalanceOf { .. } => "balance_of",
            Call::OffsetOf { .. } => "offset_of",
            Call::TotalSupply => "total_supply",
            Call::CreateProject { .. } => "create_project",
            Call::Invest { .. } => "invest",
            Call::GetProject { .. } => "get_project",
            Call::GetInvestment { .. } => "get_investment",
            Call::UpdateGridStatus { .. } => "update_grid_status",
            Call::ReportConsumption { .. } => "report_consumption",
            Call::GetGridStatus { .. } => "get_grid_status",
            Call::GetUserConsumption { .. } => "get_user_consumption",
        }
    }

    /// Returns `true` if executing this call can change ledger state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::Mint { .. }
                | Call::Transfer { .. }
                | Call::CreateProject { .. }
                | Call::Invest { .. }
                | Call::UpdateGridStatus { .. }
                | Call::ReportConsumption { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Outcome of a [`Call`].
///
/// Exactly one of `value` or `error` is meaningful: `success == true` carries
/// a value (possibly `null` for not-found reads), `success == false` carries
/// a numeric [`ErrorCode`] and a human-readable message.
///
/// One exception: a success value that fails to serialize (see
/// [`Response::ok`]) yields `success == false` with a message and no code,
/// since no ledger rule was violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    /// A successful response carrying `value`.
    ///
    /// If `value` cannot be represented as JSON the response is a failure
    /// with `error == None` and the serializer's message.
    pub fn ok(value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self {
                success: true,
                value: Some(value),
                error: None,
                message: None,
            },
            // Every ledger record serializes; this only fires for a
            // hand-rolled value with a non-string map key.
            Err(e) => Self {
                success: false,
                value: None,
                error: None,
                message: Some(format!("unserializable result: {}", e)),
            },
        }
    }

    /// A failed response for `err`.
    pub fn failure<E: CodedError>(err: &E) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(err.code()),
            message: Some(err.to_string()),
        }
    }

    /// Converts an operation result into a response.
    pub fn from_result<T, E>(result: Result<T, E>) -> Self
    where
        T: Serialize,
        E: CodedError,
    {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::failure(&e),
        }
    }

    /// The numeric error code, if this is a failure.
    pub fn error_code(&self) -> Option<u32> {
        self.error.map(ErrorCode::as_u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("nope")]
    struct Nope;

    impl CodedError for Nope {
        fn code(&self) -> ErrorCode {
            ErrorCode::Unauthorized
        }
    }

    #[test]
    fn parses_invest_call() {
        let call = Call::from_json(
            r#"{"method":"invest","params":{"investor":"W2","project_id":1,"amount":500}}"#,
        )
        .unwrap();
        assert_eq!(
            call,
            Call::Invest {
                investor: Principal::from("W2"),
                project_id: 1,
                amount: 500,
            }
        );
        assert_eq!(call.method(), "invest");
        assert!(call.is_mutation());
    }

    #[test]
    fn unknown_method_rejected() {
        assert!(Call::from_json(r#"{"method":"burn","params":{}}"#).is_err());
    }

    #[test]
    fn reads_are_not_mutations() {
        let call = Call::GetUserConsumption {
            user: Principal::from("W1"),
            grid_id: 1,
        };
        assert!(!call.is_mutation());
        assert!(!Call::TotalSupply.is_mutation());
    }

    #[test]
    fn failure_carries_numeric_code() {
        let resp = Response::from_result::<u64, _>(Err(Nope));
        assert!(!resp.success);
        assert_eq!(resp.error_code(), Some(100));
        assert_eq!(resp.message.as_deref(), Some("nope"));

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["error"], 100);
        assert!(json.get("value").is_none());
    }

    #[test]
    fn success_carries_value() {
        let resp = Response::from_result::<_, Nope>(Ok(42u64));
        assert!(resp.success);
        assert_eq!(resp.value, Some(serde_json::json!(42)));
        assert_eq!(resp.error_code(), None);
    }

    #[test]
    fn unserializable_value_fails_without_code() {
        let mut bad = std::collections::HashMap::new();
        bad.insert((1u8, 2u8), 3u8);
        let resp = Response::ok(bad);
        assert!(!resp.success);
        assert_eq!(resp.error, None);
        assert!(resp.message.unwrap().starts_with("unserializable result"));
    }
}
