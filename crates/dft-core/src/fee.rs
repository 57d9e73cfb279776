use crate::amount::{self, pow10, OriginAmount, OriginScaler};
use crate::DftError;
use candid::{CandidType, Nat};
use serde::{Deserialize, Serialize};

/// Transfer fee parameters of a token canister.
///
/// `minimum` is in the token's origin units. `rate` lives in its own
/// decimal space: the effective rate is `rate / 10^rate_decimals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    #[serde(with = "crate::plan::nat_text")]
    pub minimum: OriginAmount,
    #[serde(with = "crate::plan::nat_text")]
    pub rate: OriginAmount,
    pub rate_decimals: u8,
}

/// Fee record as the token canisters take it in their constructor.
#[derive(CandidType, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CandidTokenFee {
    pub minimum: Nat,
    pub rate: Nat,
    pub rate_decimals: u8,
}

impl FeeSchedule {
    /// Build a schedule from the raw row fields.
    ///
    /// The minimum is scaled by the token's `decimals`; the rate by
    /// `rate_decimals`. A rate written as zero is stored as literal `0`
    /// without going through the scaler.
    pub fn from_human<S: OriginScaler + ?Sized>(
        fee_minimum: &str,
        fee_rate: &str,
        decimals: u8,
        rate_decimals: u8,
        scaler: &S,
    ) -> Result<Self, FeeFieldError> {
        let minimum = scaler
            .to_origin(fee_minimum, decimals)
            .map_err(FeeFieldError::Minimum)?;
        let rate = if amount::is_zero_numeral(fee_rate) {
            Nat::from(0u32)
        } else {
            scaler
                .to_origin(fee_rate, rate_decimals)
                .map_err(FeeFieldError::Rate)?
        };

        Ok(Self {
            minimum,
            rate,
            rate_decimals,
        })
    }

    /// A schedule that never charges.
    pub fn free(rate_decimals: u8) -> Self {
        Self {
            minimum: Nat::from(0u32),
            rate: Nat::from(0u32),
            rate_decimals,
        }
    }

    pub fn is_free(&self) -> bool {
        amount::is_zero(&self.minimum) && amount::is_zero(&self.rate)
    }

    /// Fee charged on a transfer of `value` origin units:
    /// `max(rate × value / 10^rate_decimals, minimum)`, floor division.
    pub fn transfer_fee(&self, value: &OriginAmount) -> OriginAmount {
        let rate_fee = &self.rate.0 * &value.0 / pow10(self.rate_decimals);
        if rate_fee > self.minimum.0 {
            Nat::from(rate_fee)
        } else {
            self.minimum.clone()
        }
    }

    pub fn to_candid(&self) -> CandidTokenFee {
        CandidTokenFee {
            minimum: self.minimum.clone(),
            rate: self.rate.clone(),
            rate_decimals: self.rate_decimals,
        }
    }
}

/// Which fee field a scaling failure came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeFieldError {
    Minimum(DftError),
    Rate(DftError),
}

impl FeeFieldError {
    /// Row column the failure belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            FeeFieldError::Minimum(_) => "fee_minimum",
            FeeFieldError::Rate(_) => "fee_rate",
        }
    }

    pub fn into_inner(self) -> DftError {
        match self {
            FeeFieldError::Minimum(e) | FeeFieldError::Rate(e) => e,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────────
