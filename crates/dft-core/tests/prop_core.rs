// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROPERTY-BASED TESTS - dft-core
//
// Invariants of the amount converter and the plan builder that must hold
// for every input proptest can generate.
// Run: cargo test --release -p dft-core --test prop_core
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use candid::{Nat, Principal};
use dft_core::amount::{is_zero_numeral, to_human, to_origin};
use dft_core::fee::FeeSchedule;
use dft_core::{
    build_plan, CanisterLayout, ConfigRow, DecimalConverter, DftError, IdentityBook, PlanFlags,
};
use num_bigint::BigUint;
use proptest::prelude::*;

// ─────────────────────────────────────────────────────────────────
// STRATEGIES
// ─────────────────────────────────────────────────────────────────

/// Well-formed non-negative numerals: "123", "123.45", ".5", "7."
fn arb_numeral() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,30}",
        "[0-9]{1,30}\\.[0-9]{1,30}",
        "\\.[0-9]{1,30}",
        "[0-9]{1,30}\\.",
    ]
}

fn arb_origin() -> impl Strategy<Value = Nat> {
    "[0-9]{1,60}".prop_map(|digits| {
        Nat::from(BigUint::parse_bytes(digits.as_bytes(), 10).unwrap_or_default())
    })
}

/// Numeric value of a numeral as (integer digits, fraction digits), with
/// insignificant zeros removed, so two spellings of one number compare equal.
fn canonical(numeral: &str) -> (String, String) {
    let (int, frac) = numeral.split_once('.').unwrap_or((numeral, ""));
    let int = int.trim_start_matches('0');
    let frac = frac.trim_end_matches('0');
    (int.to_string(), frac.to_string())
}

// ─────────────────────────────────────────────────────────────────
// AMOUNT CONVERTER PROPERTIES
// ─────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// PROPERTY: origin → human → origin is the identity
    #[test]
    fn prop_origin_round_trip(origin in arb_origin(), decimals in 0u8..=40) {
        let human = to_human(&origin, decimals);
        prop_assert_eq!(to_origin(&human, decimals).unwrap(), origin);
    }

    /// PROPERTY: human → origin → human keeps the value when decimals suffice
    #[test]
    fn prop_human_round_trip(numeral in arb_numeral(), extra in 0u8..=10) {
        let frac_len = numeral.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
        let decimals = frac_len as u8 + extra;

        let origin = to_origin(&numeral, decimals).unwrap();
        let human = to_human(&origin, decimals);
        prop_assert_eq!(canonical(&human), canonical(&numeral));
    }

    /// PROPERTY: zero is zero at any scale
    #[test]
    fn prop_zero_at_any_decimals(decimals in 0u8..=255) {
        prop_assert_eq!(to_origin("0", decimals).unwrap(), Nat::from(0u32));
    }

    /// PROPERTY: surplus fractional digits are truncated, never rounded up
    #[test]
    fn prop_truncation_never_exceeds(numeral in arb_numeral(), decimals in 0u8..=8) {
        let exact = to_origin(&numeral, 40).unwrap();
        let scaled = to_origin(&numeral, decimals).unwrap();
        let back = to_origin(&to_human(&scaled, decimals), 40).unwrap();
        prop_assert!(back <= exact);
    }

    /// PROPERTY: negative and non-numeric input is always InvalidAmount
    #[test]
    fn prop_rejects_negative(numeral in arb_numeral(), decimals in 0u8..=18) {
        let negative = format!("-{}", numeral);
        let is_invalid_amount = matches!(
            to_origin(&negative, decimals),
            Err(DftError::InvalidAmount { .. })
        );
        prop_assert!(is_invalid_amount);
    }

    #[test]
    fn prop_rejects_letters(word in "[a-zA-Z]{1,12}", decimals in 0u8..=18) {
        let is_invalid_amount = matches!(
            to_origin(&word, decimals),
            Err(DftError::InvalidAmount { .. })
        );
        prop_assert!(is_invalid_amount);
    }

    /// PROPERTY: any zero spelling short-circuits the fee rate to 0
    #[test]
    fn prop_zero_rate_is_zero(zeros in "0{1,5}(\\.0{0,5})?", rate_decimals in 0u8..=30) {
        prop_assert!(is_zero_numeral(&zeros));
        let fee = FeeSchedule::from_human("1", &zeros, 8, rate_decimals, &DecimalConverter)
            .unwrap();
        prop_assert_eq!(fee.rate, Nat::from(0u32));
    }

    /// PROPERTY: transfer fee is never below the minimum
    #[test]
    fn prop_fee_at_least_minimum(
        minimum in 0u64..=1_000_000,
        rate in 0u64..=10_000,
        value in 0u64..=u64::MAX,
    ) {
        let fee = FeeSchedule {
            minimum: Nat::from(minimum),
            rate: Nat::from(rate),
            rate_decimals: 4,
        };
        prop_assert!(fee.transfer_fee(&Nat::from(value)) >= Nat::from(minimum));
    }
}

// ─────────────────────────────────────────────────────────────────
// PLAN BUILDER PROPERTIES
// ─────────────────────────────────────────────────────────────────

proptest! {
    /// PROPERTY: with no rows, exactly the fixed keys appear, bare
    #[test]
    fn prop_fixed_keys_only(
        fixed in proptest::collection::btree_set("[a-z_]{3,12}", 1..6),
        build in any::<bool>(),
        init in any::<bool>(),
        one_by_one in any::<bool>(),
    ) {
        let fixed: Vec<&str> = fixed.iter().map(String::as_str).collect();
        let layout = CanisterLayout::new(&[], &fixed);
        let flags = PlanFlags { build, init, one_by_one };

        let plan = build_plan(&[], &layout, flags, &IdentityBook::new()).unwrap();

        prop_assert_eq!(plan.flags(), flags);
        prop_assert_eq!(plan.canisters.len(), fixed.len());
        for key in &fixed {
            let option = plan.get(key).unwrap();
            prop_assert!(option.reinstall);
            prop_assert!(option.init_options.is_none());
        }
    }

    /// PROPERTY: building twice from the same input gives the same plan
    #[test]
    fn prop_plan_is_pure(
        supply in "[0-9]{1,20}(\\.[0-9]{1,8})?",
        decimals in 0u8..=18,
    ) {
        let mut book = IdentityBook::new();
        book.insert("alice", Principal::anonymous());
        let row = ConfigRow::new()
            .with("key", "dft_basic")
            .with("name", "Token")
            .with("symbol", "TKN")
            .with("decimals", &decimals.to_string())
            .with("total_supply", &supply)
            .with("fee_minimum", "0")
            .with("fee_rate", "0")
            .with("rate_decimals", "8")
            .with("owner", "alice");
        let rows = vec![row];
        let layout = CanisterLayout::default();

        let first = build_plan(&rows, &layout, PlanFlags::default(), &book).unwrap();
        let second = build_plan(&rows, &layout, PlanFlags::default(), &book).unwrap();
        prop_assert_eq!(first, second);
    }
}
