//! Boundary to the vendor inventory/cost service.
//!
//! The service itself lives outside this crate; the engine only sees a
//! synchronous lookup that returns whatever subset of the requested SKUs the
//! vendor knows about. Missing SKUs are simply absent from the result.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::domain::{InventoryRecord, Sku};

pub type InventorySnapshot = BTreeMap<Sku, InventoryRecord>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("inventory service unavailable: {0}")]
    Unavailable(String),
    #[error("inventory response was malformed: {0}")]
    Malformed(String),
}

pub trait InventoryLookup {
    fn lookup(&self, skus: &BTreeSet<Sku>) -> Result<InventorySnapshot, LookupError>;
}

impl<F> InventoryLookup for F
where
    F: Fn(&BTreeSet<Sku>) -> Result<InventorySnapshot, LookupError>,
{
    fn lookup(&self, skus: &BTreeSet<Sku>) -> Result<InventorySnapshot, LookupError> {
        self(skus)
    }
}

/// A vendor catalog held in memory, e.g. loaded from an export file.
#[derive(Clone, Debug, Default)]
pub struct InMemoryInventory {
    records: InventorySnapshot,
}

impl InMemoryInventory {
    pub fn new(records: InventorySnapshot) -> Self {
        Self { records }
    }
}

impl FromIterator<(Sku, InventoryRecord)> for InMemoryInventory {
    fn from_iter<T: IntoIterator<Item = (Sku, InventoryRecord)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl InventoryLookup for InMemoryInventory {
    fn lookup(&self, skus: &BTreeSet<Sku>) -> Result<InventorySnapshot, LookupError> {
        Ok(skus
            .iter()
            .filter_map(|sku| self.records.get(sku).map(|record| (sku.clone(), record.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use super::{InMemoryInventory, InventoryLookup, InventorySnapshot, LookupError};
    use crate::domain::{InventoryRecord, Sku};

    fn record(cost: i64) -> InventoryRecord {
        InventoryRecord { cost: Decimal::from(cost), ..InventoryRecord::default() }
    }

    #[test]
    fn in_memory_lookup_returns_only_requested_known_skus() {
        let catalog: InMemoryInventory =
            [(Sku::from("A1"), record(5)), (Sku::from("C3"), record(9))].into_iter().collect();

        let requested: BTreeSet<Sku> = [Sku::from("A1"), Sku::from("B2")].into_iter().collect();
        let result = catalog.lookup(&requested).expect("in-memory lookup cannot fail");

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(&Sku::from("A1")), Some(&record(5)));
        assert!(!result.contains_key(&Sku::from("B2")));
        assert!(!result.contains_key(&Sku::from("C3")));
    }

    #[test]
    fn closures_act_as_lookups() {
        let failing = |_: &BTreeSet<Sku>| -> Result<InventorySnapshot, LookupError> {
            Err(LookupError::Unavailable("timeout".to_owned()))
        };

        let error = failing.lookup(&BTreeSet::new()).expect_err("closure error propagates");
        assert_eq!(error.to_string(), "inventory service unavailable: timeout");
    }
}
