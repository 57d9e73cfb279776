// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TOKEN CANISTER STEPS
//
// The call surface of a DFT token canister, and the harness steps built on
// it: every human amount is scaled with the decimals the canister itself
// reports, every alias goes through an IdentityResolver.
// Transport is not handled here; implementors of `TokenCanister` own it.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::amount::{to_human, to_origin, OriginAmount};
use crate::identity::IdentityResolver;
use crate::DftError;
use candid::Principal;
use std::fmt;

/// Subset of `tokenInfo` the steps check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub fee_to: Principal,
}

/// Calls a token canister answers. `Err` carries the canister's own
/// rejection text.
pub trait TokenCanister {
    fn decimals(&self) -> Result<u8, String>;
    fn balance_of(&self, holder: &Principal) -> Result<OriginAmount, String>;
    fn transfer(&mut self, to: &Principal, value: &OriginAmount) -> Result<(), String>;
    fn burn(&mut self, value: &OriginAmount) -> Result<(), String>;
    fn burn_from(&mut self, owner: &Principal, value: &OriginAmount) -> Result<(), String>;
    fn set_fee_to(&mut self, fee_to: &Principal) -> Result<(), String>;
    fn token_info(&self) -> Result<TokenInfo, String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    Core(DftError),
    Rejected {
        op: &'static str,
        reason: String,
    },
    BalanceMismatch {
        holder: Principal,
        expected: OriginAmount,
        actual: OriginAmount,
    },
    FeeToMismatch {
        expected: Principal,
        actual: Principal,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StepError::Core(e) => write!(f, "{}", e),
            StepError::Rejected { op, reason } => write!(f, "{} rejected: {}", op, reason),
            StepError::BalanceMismatch {
                holder,
                expected,
                actual,
            } => write!(
                f,
                "Balance of {} is {}, expected {}",
                holder.to_text(),
                actual.0,
                expected.0
            ),
            StepError::FeeToMismatch { expected, actual } => write!(
                f,
                "fee_to is {}, expected {}",
                actual.to_text(),
                expected.to_text()
            ),
        }
    }
}

impl std::error::Error for StepError {}

impl From<DftError> for StepError {
    fn from(e: DftError) -> Self {
        StepError::Core(e)
    }
}

fn rejected(op: &'static str) -> impl FnOnce(String) -> StepError {
    move |reason| StepError::Rejected { op, reason }
}

/// Scale `human` with the canister's reported decimals.
pub fn origin_for<T: TokenCanister + ?Sized>(
    token: &T,
    human: &str,
) -> Result<OriginAmount, StepError> {
    let decimals = token.decimals().map_err(rejected("decimals"))?;
    Ok(to_origin(human, decimals)?)
}

/// Transfer `human` tokens to `to_alias`, then check the receiver holds
/// exactly the transferred origin amount (receivers start empty).
pub fn transfer_to<T, R>(
    token: &mut T,
    resolver: &R,
    to_alias: &str,
    human: &str,
) -> Result<OriginAmount, StepError>
where
    T: TokenCanister + ?Sized,
    R: IdentityResolver + ?Sized,
{
    let to = resolver.principal_of(to_alias)?;
    let value = origin_for(token, human)?;
    token.transfer(&to, &value).map_err(rejected("transfer"))?;

    let actual = token.balance_of(&to).map_err(rejected("balanceOf"))?;
    if actual != value {
        return Err(StepError::BalanceMismatch {
            holder: to,
            expected: value,
            actual,
        });
    }
    log::debug!("transferred {} ({}) to {}", human, value.0, to_alias);
    Ok(value)
}

/// Burn `human` tokens from the caller's balance.
pub fn burn<T>(token: &mut T, human: &str) -> Result<OriginAmount, StepError>
where
    T: TokenCanister + ?Sized,
{
    let value = origin_for(token, human)?;
    token.burn(&value).map_err(rejected("burn"))?;
    Ok(value)
}

/// Burn `human` tokens from `owner_alias` using the caller's allowance.
pub fn burn_from<T, R>(
    token: &mut T,
    resolver: &R,
    owner_alias: &str,
    human: &str,
) -> Result<OriginAmount, StepError>
where
    T: TokenCanister + ?Sized,
    R: IdentityResolver + ?Sized,
{
    let owner = resolver.principal_of(owner_alias)?;
    let value = origin_for(token, human)?;
    token.burn_from(&owner, &value).map_err(rejected("burnFrom"))?;
    Ok(value)
}

/// Point fees at `alias` and confirm `tokenInfo` reports it.
pub fn set_fee_to<T, R>(token: &mut T, resolver: &R, alias: &str) -> Result<Principal, StepError>
where
    T: TokenCanister + ?Sized,
    R: IdentityResolver + ?Sized,
{
    let fee_to = resolver.principal_of(alias)?;
    token.set_fee_to(&fee_to).map_err(rejected("setFeeTo"))?;

    let info = token.token_info().map_err(rejected("tokenInfo"))?;
    if info.fee_to != fee_to {
        return Err(StepError::FeeToMismatch {
            expected: fee_to,
            actual: info.fee_to,
        });
    }
    Ok(fee_to)
}

/// Balance of `alias` in canonical human form.
pub fn balance_in_human<T, R>(token: &T, resolver: &R, alias: &str) -> Result<String, StepError>
where
    T: TokenCanister + ?Sized,
    R: IdentityResolver + ?Sized,
{
    let holder = resolver.principal_of(alias)?;
    let decimals = token.decimals().map_err(rejected("decimals"))?;
    let balance = token.balance_of(&holder).map_err(rejected("balanceOf"))?;
    Ok(to_human(&balance, decimals))
}

/// True when `alias` holds exactly `human` tokens.
pub fn has_balance<T, R>(
    token: &T,
    resolver: &R,
    alias: &str,
    human: &str,
) -> Result<bool, StepError>
where
    T: TokenCanister + ?Sized,
    R: IdentityResolver + ?Sized,
{
    let holder = resolver.principal_of(alias)?;
    let expected = origin_for(token, human)?;
    let balance = token.balance_of(&holder).map_err(rejected("balanceOf"))?;
    Ok(balance == expected)
}

// ─────────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────────
