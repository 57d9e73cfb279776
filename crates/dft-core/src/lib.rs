// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DFT HARNESS - CORE MODULE
//
// Decimal-aware token amount conversion and reinstall plan construction
// for the DFT canister family (basic, basic2, burnable, mintable, receiver,
// tx storage). Everything here is a pure transform: no I/O beyond the
// explicit file loaders, no async, no shared state.
// All token arithmetic uses arbitrary-precision `Nat` (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;

pub mod amount;
pub mod executor;
pub mod fee;
pub mod identity;
pub mod ledger;
pub mod plan;
pub mod rows;

pub use amount::{to_human, to_origin, DecimalConverter, OriginAmount, OriginScaler};
pub use executor::{execute_plan, ExecutionError, ReinstallExecutor};
pub use fee::FeeSchedule;
pub use identity::{IdentityBook, IdentityResolver};
pub use plan::{
    build_plan, parse_init_options, CanisterInitOptions, CanisterLayout, CanisterOption,
    CanisterReinstallOptions, PlanFlags, ReinstallPlanBuilder,
};
pub use rows::ConfigRow;

/// Canister key used in errors for a row that has no `key` column.
pub const UNKEYED_ROW: &str = "<unkeyed>";

/// Why a human amount was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountFault {
    Empty,
    Negative,
    NotDecimal,
    Overflow,
}

impl fmt::Display for AmountFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AmountFault::Empty => write!(f, "amount is empty"),
            AmountFault::Negative => write!(f, "amount is negative"),
            AmountFault::NotDecimal => write!(f, "not a decimal numeral"),
            AmountFault::Overflow => write!(f, "amount does not fit the target width"),
        }
    }
}

/// What is wrong with one field of a configuration row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFault {
    Missing,
    NotAnInteger(String),
    InvalidAmount { input: String, reason: AmountFault },
    UnknownIdentity(String),
}

impl fmt::Display for RowFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RowFault::Missing => write!(f, "field is missing"),
            RowFault::NotAnInteger(value) => write!(f, "'{}' is not a small integer", value),
            RowFault::InvalidAmount { input, reason } => {
                write!(f, "invalid amount '{}': {}", input, reason)
            }
            RowFault::UnknownIdentity(alias) => write!(f, "unknown identity '{}'", alias),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DftError {
    InvalidAmount {
        input: String,
        reason: AmountFault,
    },
    UnknownIdentity {
        alias: String,
    },
    MalformedConfigRow {
        canister: String,
        field: &'static str,
        fault: RowFault,
    },
}

impl DftError {
    /// Re-qualify a converter or resolver failure as a fault of `field` in
    /// the row configuring `canister`.
    pub fn in_row(self, canister: &str, field: &'static str) -> DftError {
        let fault = match self {
            DftError::InvalidAmount { input, reason } => RowFault::InvalidAmount { input, reason },
            DftError::UnknownIdentity { alias } => RowFault::UnknownIdentity(alias),
            already @ DftError::MalformedConfigRow { .. } => return already,
        };
        DftError::MalformedConfigRow {
            canister: canister.to_string(),
            field,
            fault,
        }
    }

    /// Canister key named by a row error, if any.
    pub fn canister(&self) -> Option<&str> {
        match self {
            DftError::MalformedConfigRow { canister, .. } => Some(canister),
            _ => None,
        }
    }

    /// Row field named by a row error, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DftError::MalformedConfigRow { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for DftError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DftError::InvalidAmount { input, reason } => {
                write!(f, "Invalid amount '{}': {}", input, reason)
            }
            DftError::UnknownIdentity { alias } => {
                write!(f, "Unknown identity: no principal registered for '{}'", alias)
            }
            DftError::MalformedConfigRow {
                canister,
                field,
                fault,
            } => write!(
                f,
                "Malformed config row for canister '{}': field '{}': {}",
                canister, field, fault
            ),
        }
    }
}

impl std::error::Error for DftError {}

// ─────────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────────
