//! Scoring rules for one run: thresholds, fee schedule and coverage policy.
//!
//! Rules are read from their own file (JSON or TOML) rather than from the
//! application config, and are immutable once loaded. The JSON form accepts
//! the keys of the legacy `rules.json` (`Topseller`, `Profit`,
//! `Fees.FeePercentage`, `Fees.FBAClass`, `DaysCoverd`, `SalesMultiplier`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fee class used for SKUs whose classification has no entry of its own.
pub const DEFAULT_FEE_CLASS: &str = "default";

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("could not read rules file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse rules file `{path}`: {message}")]
    ParseFile { path: PathBuf, message: String },
    #[error("could not parse rules: {0}")]
    Parse(String),
    #[error("fee class table is missing the mandatory `default` entry")]
    MissingDefaultFee,
    #[error("rules validation failed: {0}")]
    Validation(String),
}

/// Flat per-unit fee by vendor classification, with a guaranteed default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Decimal>", into = "BTreeMap<String, Decimal>")]
pub struct FeeSchedule {
    default_fee: Decimal,
    class_fees: BTreeMap<String, Decimal>,
}

impl FeeSchedule {
    pub fn new(class_fees: BTreeMap<String, Decimal>) -> Result<Self, RulesError> {
        let default_fee =
            class_fees.get(DEFAULT_FEE_CLASS).copied().ok_or(RulesError::MissingDefaultFee)?;

        if let Some((class, fee)) = class_fees.iter().find(|(_, fee)| fee.is_sign_negative()) {
            return Err(RulesError::Validation(format!(
                "fee for class `{class}` must not be negative (got {fee})"
            )));
        }

        Ok(Self { default_fee, class_fees })
    }

    /// Flat fee for `classification`, falling back to the `default` entry.
    pub fn class_fee(&self, classification: &str) -> Decimal {
        self.class_fees.get(classification).copied().unwrap_or(self.default_fee)
    }

    pub fn default_fee(&self) -> Decimal {
        self.default_fee
    }

    pub fn classes(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.class_fees.iter().map(|(class, fee)| (class.as_str(), *fee))
    }
}

impl TryFrom<BTreeMap<String, Decimal>> for FeeSchedule {
    type Error = RulesError;

    fn try_from(value: BTreeMap<String, Decimal>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeeSchedule> for BTreeMap<String, Decimal> {
    fn from(value: FeeSchedule) -> Self {
        value.class_fees
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRules {
    /// Marketplace referral fee as a fraction of the selling price.
    #[serde(alias = "FeePercentage")]
    pub fee_percentage: Decimal,
    #[serde(alias = "FBAClass")]
    pub classes: FeeSchedule,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Minimum units sold in the report window for a SKU to be considered.
    #[serde(alias = "Topseller")]
    pub topseller: u32,
    #[serde(alias = "Profit")]
    pub target_profit: Decimal,
    #[serde(alias = "Fees")]
    pub fees: FeeRules,
    #[serde(alias = "DaysCoverd", alias = "DaysCovered")]
    pub days_of_coverage: u32,
    #[serde(alias = "SalesMultiplier")]
    pub sales_multiplier: Decimal,
}

impl RulesConfig {
    /// Reads a rules file; `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| RulesError::ReadFile { path: path.to_path_buf(), source })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            serde_json::from_str::<Self>(&raw).map_err(|error| error.to_string())
        } else {
            toml::from_str::<Self>(&raw).map_err(|error| error.to_string())
        };

        let rules = parsed
            .map_err(|message| RulesError::ParseFile { path: path.to_path_buf(), message })?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RulesError> {
        let rules = serde_json::from_str::<Self>(raw)
            .map_err(|error| RulesError::Parse(error.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, RulesError> {
        let rules =
            toml::from_str::<Self>(raw).map_err(|error| RulesError::Parse(error.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.fees.fee_percentage.is_sign_negative() {
            return Err(RulesError::Validation(
                "fees.fee_percentage must not be negative".to_string(),
            ));
        }

        if self.sales_multiplier.is_sign_negative() {
            return Err(RulesError::Validation(
                "sales_multiplier must not be negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Referral fee on `price` plus the flat fee for the SKU's class, or
    /// `None` when the amount does not fit in a `Decimal`.
    pub fn estimated_fees(&self, price: Decimal, classification: &str) -> Option<Decimal> {
        price
            .checked_mul(self.fees.fee_percentage)?
            .checked_add(self.fees.classes.class_fee(classification))
    }
}
