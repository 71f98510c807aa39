//! # Error Codes
//!
//! Each register has its own closed error enum (see `gridledger-contracts`),
//! but external consumers only ever see a number. That number is defined
//! here, once, for every family.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 100  | Unauthorized — non-operator called an operator action |
//! | 101  | Not found — no such project or grid                  |
//! | 102  | Invalid state — project is no longer `Active`        |
//! | 103  | Insufficient balance                                 |
//! | 104  | Invalid amount — rejected by the amount policy       |
//! | 105  | Amount overflow — checked arithmetic would wrap      |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric failure code exposed at the call/response boundary.
///
/// Codes 100–103 are inherited from deployed consumers and must never be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
#[repr(u32)]
pub enum ErrorCode {
    Unauthorized = 100,
    NotFound = 101,
    InvalidState = 102,
    InsufficientBalance = 103,
    InvalidAmount = 104,
    AmountOverflow = 105,
}

impl ErrorCode {
    /// The wire value.
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl From<ErrorCode> for u32 {
    fn from(code: ErrorCode) -> Self {
        code.as_u32()
    }
}

impl TryFrom<u32> for ErrorCode {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            100 => Ok(ErrorCode::Unauthorized),
            101 => Ok(ErrorCode::NotFound),
            102 => Ok(ErrorCode::InvalidState),
            103 => Ok(ErrorCode::InsufficientBalance),
            104 => Ok(ErrorCode::InvalidAmount),
            105 => Ok(ErrorCode::AmountOverflow),
            other => Err(format!("unknown error code: {}", other)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::NotFound => "not found",
            ErrorCode::InvalidState => "invalid state",
            ErrorCode::InsufficientBalance => "insufficient balance",
            ErrorCode::InvalidAmount => "invalid amount",
            ErrorCode::AmountOverflow => "amount overflow",
        };
        write!(f, "{} ({})", name, self.as_u32())
    }
}

/// An error that knows which boundary code it maps to.
pub trait CodedError: std::error::Error {
    fn code(&self) -> ErrorCode;
}
