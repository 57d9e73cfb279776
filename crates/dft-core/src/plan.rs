// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// REINSTALL PLAN BUILDER
//
// Turns raw configuration rows into a typed reinstall plan: which canisters
// the executor must rebuild/reinstall and with which constructor options.
//
// Rules:
// - Token canisters are reinstalled only when a row configures them.
//   No row => no entry (never a defaulted options record).
// - Fixed canisters (no constructor options) are always reinstalled.
// - The first malformed row aborts the whole plan with an error naming
//   the canister key and the field.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::amount::{DecimalConverter, OriginAmount, OriginScaler};
use crate::fee::FeeSchedule;
use crate::identity::IdentityResolver;
use crate::rows::{find_row, ConfigRow};
use crate::{DftError, RowFault, UNKEYED_ROW};
use candid::Principal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Serde adapter for Nat ↔ JSON/TOML: serialize as a decimal string,
/// deserialize from a string or a plain integer.
/// Origin amounts routinely exceed 2^53, so numbers are never emitted.
pub(crate) mod nat_text {
    use candid::Nat;
    use num_bigint::BigUint;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(val: &Nat, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.0.to_str_radix(10))
    }

    const ARBITRARY_NUMBER_TOKEN: &str = "$serde_json::private::Number";

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Nat, D::Error> {
        use serde::de::{self, Visitor};
        struct NatVisitor;

        impl<'de> Visitor<'de> for NatVisitor {
            type Value = Nat;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a natural number as a decimal string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Nat, E> {
                if v.is_empty() || !v.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(E::custom(format!("invalid natural number '{}'", v)));
                }
                BigUint::parse_bytes(v.as_bytes(), 10)
                    .map(Nat::from)
                    .ok_or_else(|| E::custom(format!("invalid natural number '{}'", v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Nat, E> {
                Ok(Nat::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Nat, E> {
                u64::try_from(v)
                    .map(Nat::from)
                    .map_err(|_| E::custom("negative value for nat"))
            }

            // serde_json with `arbitrary_precision` hands a number to
            // `deserialize_any` as a one-entry map holding its literal text.
            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Nat, A::Error> {
                match map.next_entry::<String, String>()? {
                    Some((key, digits)) if key == ARBITRARY_NUMBER_TOKEN => {
                        self.visit_str(&digits)
                    }
                    _ => Err(de::Error::custom("expected a natural number, found a map")),
                }
            }
        }

        d.deserialize_any(NatVisitor)
    }
}

/// Serde adapter for principals as their textual form.
mod principal_text {
    use candid::Principal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(val: &Principal, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_text())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Principal, D::Error> {
        let text = String::deserialize(d)?;
        Principal::from_text(&text).map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────
// PLAN TYPES
// ─────────────────────────────────────────────────────────────────

/// Constructor options for one token canister.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanisterInitOptions {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "totalSupply", with = "nat_text")]
    pub total_supply: OriginAmount,
    pub fee: FeeSchedule,
    /// Always emitted empty.
    #[serde(default)]
    pub desc: Vec<(String, String)>,
    #[serde(with = "principal_text")]
    pub owner: Principal,
}

impl CanisterInitOptions {
    /// Candid-encoded constructor arguments:
    /// `(opt owner, opt logo, name, symbol, decimals, total_supply, fee, opt fee_to)`.
    pub fn encode_init_args(&self) -> Result<Vec<u8>, candid::Error> {
        candid::encode_args((
            Some(self.owner),
            None::<Vec<u8>>,
            self.name.clone(),
            self.symbol.clone(),
            self.decimals,
            self.total_supply.clone(),
            self.fee.to_candid(),
            None::<Principal>,
        ))
    }
}

/// Per-canister entry of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanisterOption {
    pub reinstall: bool,
    #[serde(
        rename = "initOptions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub init_options: Option<CanisterInitOptions>,
}

impl CanisterOption {
    /// Reinstall without constructor options.
    pub fn bare() -> Self {
        Self {
            reinstall: true,
            init_options: None,
        }
    }

    pub fn with_options(options: CanisterInitOptions) -> Self {
        Self {
            reinstall: true,
            init_options: Some(options),
        }
    }
}

/// Plan-wide switches. The builder copies these verbatim; it never infers them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFlags {
    /// Recompile canister binaries before reinstalling.
    pub build: bool,
    /// Run post-install initialization.
    pub init: bool,
    /// Reinstall canisters sequentially instead of concurrently.
    pub one_by_one: bool,
}

/// The reinstall plan handed to the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanisterReinstallOptions {
    pub build: bool,
    pub init: bool,
    pub one_by_one: bool,
    pub canisters: BTreeMap<String, CanisterOption>,
}

impl CanisterReinstallOptions {
    pub fn empty(flags: PlanFlags) -> Self {
        Self {
            build: flags.build,
            init: flags.init,
            one_by_one: flags.one_by_one,
            canisters: BTreeMap::new(),
        }
    }

    pub fn flags(&self) -> PlanFlags {
        PlanFlags {
            build: self.build,
            init: self.init,
            one_by_one: self.one_by_one,
        }
    }

    pub fn get(&self, key: &str) -> Option<&CanisterOption> {
        self.canisters.get(key)
    }

    /// Canisters marked for reinstall, in key order.
    pub fn reinstall_targets(&self) -> Vec<(&str, &CanisterOption)> {
        self.canisters
            .iter()
            .filter(|(_, option)| option.reinstall)
            .map(|(key, option)| (key.as_str(), option))
            .collect()
    }

    /// Targets grouped for execution: one canister per batch when
    /// `one_by_one` is set, otherwise a single concurrent batch.
    pub fn batches(&self) -> Vec<Vec<(&str, &CanisterOption)>> {
        let targets = self.reinstall_targets();
        if targets.is_empty() {
            return Vec::new();
        }
        if self.one_by_one {
            targets.into_iter().map(|t| vec![t]).collect()
        } else {
            vec![targets]
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ─────────────────────────────────────────────────────────────────
// CANISTER LAYOUT
// ─────────────────────────────────────────────────────────────────

/// Which canisters take token constructor options and which are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanisterLayout {
    pub token_canisters: Vec<String>,
    pub fixed_canisters: Vec<String>,
}

impl Default for CanisterLayout {
    fn default() -> Self {
        Self {
            token_canisters: ["dft_basic", "dft_basic2", "dft_burnable", "dft_mintable"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fixed_canisters: ["dft_receiver", "dft_tx_storage"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CanisterLayout {
    pub fn new(token_canisters: &[&str], fixed_canisters: &[&str]) -> Self {
        Self {
            token_canisters: token_canisters.iter().map(|s| s.to_string()).collect(),
            fixed_canisters: fixed_canisters.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Load a layout from TOML.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let layout: CanisterLayout = toml::from_str(&content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Every key must be non-empty and appear once across both lists.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = BTreeSet::new();
        for key in self.token_canisters.iter().chain(&self.fixed_canisters) {
            if key.trim().is_empty() {
                return Err("canister key cannot be empty".to_string());
            }
            if !seen.insert(key.as_str()) {
                return Err(format!("canister '{}' listed more than once", key));
            }
        }
        Ok(())
    }

    pub fn is_token_canister(&self, key: &str) -> bool {
        self.token_canisters.iter().any(|k| k == key)
    }

    pub fn is_fixed_canister(&self, key: &str) -> bool {
        self.fixed_canisters.iter().any(|k| k == key)
    }
}

// ─────────────────────────────────────────────────────────────────
// ROW PARSING
// ─────────────────────────────────────────────────────────────────

fn malformed(canister: &str, field: &'static str, fault: RowFault) -> DftError {
    DftError::MalformedConfigRow {
        canister: canister.to_string(),
        field,
        fault,
    }
}

/// The cell as written. Blank cells count as missing.
fn required<'r>(
    row: &'r ConfigRow,
    canister: &str,
    field: &'static str,
) -> Result<&'r str, DftError> {
    match row.get(field) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(malformed(canister, field, RowFault::Missing)),
    }
}

/// Unsigned digits only, same as the amount grammar: no `+` or `-`.
fn small_int(row: &ConfigRow, canister: &str, field: &'static str) -> Result<u8, DftError> {
    let raw = required(row, canister, field)?;
    let digits = raw.trim();
    let not_an_integer =
        || malformed(canister, field, RowFault::NotAnInteger(raw.to_string()));
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_an_integer());
    }
    digits.parse::<u8>().map_err(|_| not_an_integer())
}

/// Builds reinstall plans for a canister layout.
pub struct ReinstallPlanBuilder<'a, R: ?Sized, S = DecimalConverter> {
    resolver: &'a R,
    scaler: S,
    layout: CanisterLayout,
    flags: PlanFlags,
}

impl<'a, R: IdentityResolver + ?Sized> ReinstallPlanBuilder<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self {
            resolver,
            scaler: DecimalConverter,
            layout: CanisterLayout::default(),
            flags: PlanFlags::default(),
        }
    }
}

impl<'a, R: IdentityResolver + ?Sized, S: OriginScaler> ReinstallPlanBuilder<'a, R, S> {
    pub fn with_layout(mut self, layout: CanisterLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_flags(mut self, flags: PlanFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the amount scaler (tests substitute a recording one).
    pub fn with_scaler<T: OriginScaler>(self, scaler: T) -> ReinstallPlanBuilder<'a, R, T> {
        ReinstallPlanBuilder {
            resolver: self.resolver,
            scaler,
            layout: self.layout,
            flags: self.flags,
        }
    }

    pub fn layout(&self) -> &CanisterLayout {
        &self.layout
    }

    /// Type one row into constructor options. `None` in, `None` out.
    ///
    /// `decimals` and `rate_decimals` are read first since every amount
    /// depends on them.
    pub fn parse_init_options(
        &self,
        canister: &str,
        row: Option<&ConfigRow>,
    ) -> Result<Option<CanisterInitOptions>, DftError> {
        let Some(row) = row else {
            return Ok(None);
        };
        log::debug!("parsing init options for {}: {:?}", canister, row);

        let decimals = small_int(row, canister, "decimals")?;
        let rate_decimals = small_int(row, canister, "rate_decimals")?;

        let name = required(row, canister, "name")?.to_string();
        let symbol = required(row, canister, "symbol")?.to_string();

        let total_supply = self
            .scaler
            .to_origin(required(row, canister, "total_supply")?, decimals)
            .map_err(|e| e.in_row(canister, "total_supply"))?;

        let fee = FeeSchedule::from_human(
            required(row, canister, "fee_minimum")?,
            required(row, canister, "fee_rate")?,
            decimals,
            rate_decimals,
            &self.scaler,
        )
        .map_err(|e| {
            let field = e.field();
            e.into_inner().in_row(canister, field)
        })?;

        let owner = self
            .resolver
            .principal_of(required(row, canister, "owner")?.trim())
            .map_err(|e| e.in_row(canister, "owner"))?;

        Ok(Some(CanisterInitOptions {
            name,
            symbol,
            decimals,
            total_supply,
            fee,
            desc: Vec::new(),
            owner,
        }))
    }

    /// Assemble the plan from all rows.
    pub fn build(&self, rows: &[ConfigRow]) -> Result<CanisterReinstallOptions, DftError> {
        self.check_rows(rows)?;

        let mut plan = CanisterReinstallOptions::empty(self.flags);

        for key in &self.layout.token_canisters {
            match self.parse_init_options(key, find_row(rows, key))? {
                Some(options) => {
                    let option = CanisterOption::with_options(options);
                    plan.canisters.insert(key.clone(), option);
                }
                None => log::debug!("no row for {}, leaving it installed as is", key),
            }
        }

        for key in &self.layout.fixed_canisters {
            plan.canisters.insert(key.clone(), CanisterOption::bare());
        }

        log::info!(
            "reinstall plan: {} canisters ({} with init options), build={} init={} one_by_one={}",
            plan.canisters.len(),
            plan.canisters.values().filter(|o| o.init_options.is_some()).count(),
            plan.build,
            plan.init,
            plan.one_by_one
        );
        Ok(plan)
    }

    /// Reject unkeyed rows; warn about rows that will not be used.
    fn check_rows(&self, rows: &[ConfigRow]) -> Result<(), DftError> {
        let mut seen = BTreeSet::new();
        for row in rows {
            let Some(key) = row.key() else {
                return Err(malformed(UNKEYED_ROW, "key", RowFault::Missing));
            };
            if self.layout.is_fixed_canister(key) {
                log::warn!("{} takes no init options, ignoring its row", key);
            } else if !self.layout.is_token_canister(key) {
                log::warn!("row for unknown canister '{}' ignored", key);
            } else if !seen.insert(key) {
                log::warn!("duplicate row for {}, using the first one", key);
            }
        }
        Ok(())
    }
}

/// Type one row with the standard converter.
pub fn parse_init_options<R: IdentityResolver + ?Sized>(
    canister: &str,
    row: Option<&ConfigRow>,
    resolver: &R,
) -> Result<Option<CanisterInitOptions>, DftError> {
    ReinstallPlanBuilder::new(resolver).parse_init_options(canister, row)
}

/// Build a plan with the standard converter.
pub fn build_plan<R: IdentityResolver + ?Sized>(
    rows: &[ConfigRow],
    layout: &CanisterLayout,
    flags: PlanFlags,
    resolver: &R,
) -> Result<CanisterReinstallOptions, DftError> {
    ReinstallPlanBuilder::new(resolver)
        .with_layout(layout.clone())
        .with_flags(flags)
        .build(rows)
}

// ─────────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────────
