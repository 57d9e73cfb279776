// ========================================
// END-TO-END: TOKEN STEPS AGAINST AN IN-MEMORY LEDGER
// ========================================
//
// A token canister is simulated in memory, seeded from the constructor
// options a reinstall plan produces. Fees follow the canister rules:
// transfers charge max(rate × value / 10^rate_decimals, minimum) to the
// sender and credit fee_to; burns charge nothing but must reach the
// minimum.
//
// Usage:
//   cargo test --test token_steps_e2e -- --nocapture
//
// ========================================

use candid::{Nat, Principal};
use dft_core::ledger::{
    balance_in_human, burn, burn_from, has_balance, set_fee_to, transfer_to, StepError,
    TokenCanister, TokenInfo,
};
use dft_core::{
    build_plan, CanisterInitOptions, CanisterLayout, ConfigRow, FeeSchedule, IdentityBook,
    OriginAmount, PlanFlags,
};
use std::collections::BTreeMap;

struct MemoryToken {
    caller: Principal,
    owner: Principal,
    fee_to: Principal,
    decimals: u8,
    fee: FeeSchedule,
    balances: BTreeMap<Principal, Nat>,
    allowances: BTreeMap<(Principal, Principal), Nat>,
}

impl MemoryToken {
    /// Install from constructor options; the owner holds the supply and
    /// receives fees until told otherwise.
    fn install(options: &CanisterInitOptions) -> Self {
        let mut balances = BTreeMap::new();
        balances.insert(options.owner, options.total_supply.clone());
        Self {
            caller: options.owner,
            owner: options.owner,
            fee_to: options.owner,
            decimals: options.decimals,
            fee: options.fee.clone(),
            balances,
            allowances: BTreeMap::new(),
        }
    }

    fn balance(&self, holder: &Principal) -> Nat {
        self.balances
            .get(holder)
            .cloned()
            .unwrap_or_else(|| Nat::from(0u32))
    }

    fn debit(&mut self, holder: &Principal, value: &Nat) -> Result<(), String> {
        let balance = self.balance(holder);
        if balance < *value {
            return Err("InsufficientBalance".to_string());
        }
        self.balances
            .insert(*holder, Nat(&balance.0 - &value.0));
        Ok(())
    }

    fn credit(&mut self, holder: &Principal, value: &Nat) {
        let balance = self.balance(holder);
        self.balances.insert(*holder, Nat(&balance.0 + &value.0));
    }

    fn approve(&mut self, owner: Principal, spender: Principal, value: Nat) {
        self.allowances.insert((owner, spender), value);
    }
}

impl TokenCanister for MemoryToken {
    fn decimals(&self) -> Result<u8, String> {
        Ok(self.decimals)
    }

    fn balance_of(&self, holder: &Principal) -> Result<OriginAmount, String> {
        Ok(self.balance(holder))
    }

    fn transfer(&mut self, to: &Principal, value: &OriginAmount) -> Result<(), String> {
        let from = self.caller;
        let fee = self.fee.transfer_fee(value);
        if self.balance(&from).0 < &value.0 + &fee.0 {
            return Err("InsufficientBalance".to_string());
        }
        let fee_to = self.fee_to;
        self.debit(&from, &fee)?;
        self.credit(&fee_to, &fee);
        self.debit(&from, value)?;
        self.credit(to, value);
        Ok(())
    }

    fn burn(&mut self, value: &OriginAmount) -> Result<(), String> {
        if *value < self.fee.minimum {
            return Err("BurnValueTooSmall".to_string());
        }
        let caller = self.caller;
        self.debit(&caller, value)
    }

    fn burn_from(&mut self, owner: &Principal, value: &OriginAmount) -> Result<(), String> {
        if *value < self.fee.minimum {
            return Err("BurnValueTooSmall".to_string());
        }
        if self.balance(owner) < *value {
            return Err("InsufficientBalance".to_string());
        }
        let key = (*owner, self.caller);
        let allowed = self
            .allowances
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Nat::from(0u32));
        if allowed < *value {
            return Err("InsufficientAllowance".to_string());
        }
        self.allowances.insert(key, Nat(&allowed.0 - &value.0));
        self.debit(owner, value)
    }

    fn set_fee_to(&mut self, fee_to: &Principal) -> Result<(), String> {
        if self.caller != self.owner {
            return Err("OnlyOwnerAllowCallIt".to_string());
        }
        self.fee_to = *fee_to;
        Ok(())
    }

    fn token_info(&self) -> Result<TokenInfo, String> {
        Ok(TokenInfo { fee_to: self.fee_to })
    }
}

fn principal(n: u8) -> Principal {
    Principal::from_slice(&[n])
}

fn book() -> IdentityBook {
    let mut book = IdentityBook::new();
    book.insert("owner", principal(1));
    book.insert("alice", principal(2));
    book.insert("bob", principal(3));
    book.insert("treasury", principal(4));
    book
}

/// Install dft_burnable the way a reinstall plan describes it.
fn install(fee_minimum: &str, fee_rate: &str) -> MemoryToken {
    let row = ConfigRow::new()
        .with("key", "dft_burnable")
        .with("name", "Burnable")
        .with("symbol", "BRN")
        .with("decimals", "8")
        .with("total_supply", "1000000")
        .with("fee_minimum", fee_minimum)
        .with("fee_rate", fee_rate)
        .with("rate_decimals", "4")
        .with("owner", "owner");
    let plan = build_plan(&[row], &CanisterLayout::default(), PlanFlags::default(), &book())
        .unwrap();
    let options = plan
        .get("dft_burnable")
        .and_then(|o| o.init_options.as_ref())
        .unwrap();
    MemoryToken::install(options)
}

// ========================================
// TEST 1: TRANSFER WITH MINIMUM FEE
// ========================================
#[test]
fn test_transfer_charges_minimum_fee() {
    let mut token = install("0.01", "0");
    let book = book();

    let sent = transfer_to(&mut token, &book, "alice", "100").unwrap();
    assert_eq!(sent, Nat::from(10_000_000_000u64));
    assert_eq!(balance_in_human(&token, &book, "alice").unwrap(), "100");
    // The owner is fee_to, so it pays and receives the fee.
    assert_eq!(balance_in_human(&token, &book, "owner").unwrap(), "999900");
}

// ========================================
// TEST 2: RATE FEE ABOVE MINIMUM GOES TO fee_to
// ========================================
#[test]
fn test_rate_fee_credits_fee_to() {
    let mut token = install("0.01", "0.001");
    let book = book();

    let treasury = set_fee_to(&mut token, &book, "treasury").unwrap();
    assert_eq!(treasury, principal(4));

    // 0.001 × 100 = 0.1, above the 0.01 minimum.
    transfer_to(&mut token, &book, "alice", "100").unwrap();
    assert_eq!(balance_in_human(&token, &book, "treasury").unwrap(), "0.1");
    assert_eq!(balance_in_human(&token, &book, "owner").unwrap(), "999899.9");
    assert!(has_balance(&token, &book, "alice", "100.000").unwrap());
}

#[test]
fn test_fee_schedule_matches_ledger() {
    let mut token = install("0.01", "0.001");
    let book = book();
    set_fee_to(&mut token, &book, "treasury").unwrap();

    let value = Nat::from(123_456_789u64);
    let expected = token.fee.transfer_fee(&value);
    token.transfer(&principal(3), &value).unwrap();
    assert_eq!(token.balance(&principal(4)), expected);
}

// ========================================
// TEST 3: BURN AND BURN FROM
// ========================================
#[test]
fn test_burn_respects_minimum() {
    let mut token = install("0.01", "0");

    assert_eq!(
        burn(&mut token, "0.001").unwrap_err(),
        StepError::Rejected {
            op: "burn",
            reason: "BurnValueTooSmall".to_string()
        }
    );
    burn(&mut token, "1.5").unwrap();
    assert_eq!(
        balance_in_human(&token, &book(), "owner").unwrap(),
        "999998.5"
    );
}

#[test]
fn test_burn_from_uses_allowance() {
    let mut token = install("0", "0");
    let book = book();
    transfer_to(&mut token, &book, "alice", "10").unwrap();

    assert!(matches!(
        burn_from(&mut token, &book, "alice", "1"),
        Err(StepError::Rejected { op: "burnFrom", .. })
    ));

    token.approve(principal(2), principal(1), Nat::from(300_000_000u64));
    let burned = burn_from(&mut token, &book, "alice", "2.5").unwrap();
    assert_eq!(burned, Nat::from(250_000_000u64));
    assert_eq!(balance_in_human(&token, &book, "alice").unwrap(), "7.5");

    // 0.5 of allowance left.
    assert!(burn_from(&mut token, &book, "alice", "1").is_err());
    burn_from(&mut token, &book, "alice", "0.5").unwrap();
}

// ========================================
// TEST 4: OWNER-ONLY fee_to
// ========================================
#[test]
fn test_set_fee_to_requires_owner() {
    let mut token = install("0", "0");
    token.caller = principal(2);

    assert_eq!(
        set_fee_to(&mut token, &book(), "alice").unwrap_err(),
        StepError::Rejected {
            op: "setFeeTo",
            reason: "OnlyOwnerAllowCallIt".to_string()
        }
    );
}

#[test]
fn test_unknown_alias_is_core_error() {
    let mut token = install("0", "0");
    assert!(matches!(
        transfer_to(&mut token, &book(), "carol", "1"),
        Err(StepError::Core(dft_core::DftError::UnknownIdentity { .. }))
    ));
}
