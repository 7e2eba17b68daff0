//! Splits inventory results between the existing restock worklist and new
//! scoring candidates.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{ConfirmedRestockRecord, InventoryRecord, PendingRestockRecord, Sku};
use crate::inventory::InventorySnapshot;

pub type PendingRestock = BTreeMap<Sku, PendingRestockRecord>;
pub type ConfirmedRestock = BTreeMap<Sku, ConfirmedRestockRecord>;
pub type Candidates = BTreeMap<Sku, InventoryRecord>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestockPartition {
    /// SKUs on the worklist that also have inventory data this run.
    pub confirmed: ConfirmedRestock,
    /// SKUs with inventory data that are not on the worklist.
    pub candidates: Candidates,
    /// Worklist SKUs the inventory lookup knew nothing about.
    pub unmatched_pending: Vec<Sku>,
}

/// Every inventory SKU lands in exactly one of `confirmed` or `candidates`.
/// Worklist entries without inventory data are dropped for this run.
pub fn partition_restock(
    inventory: &InventorySnapshot,
    pending: &PendingRestock,
) -> RestockPartition {
    let mut partition = RestockPartition::default();

    for (sku, record) in inventory {
        match pending.get(sku) {
            Some(pending_record) => {
                partition.confirmed.insert(
                    sku.clone(),
                    ConfirmedRestockRecord::new(pending_record.clone(), record.clone()),
                );
            }
            None => {
                partition.candidates.insert(sku.clone(), record.clone());
            }
        }
    }

    partition.unmatched_pending =
        pending.keys().filter(|sku| !inventory.contains_key(*sku)).cloned().collect();

    debug!(
        event_name = "restock.partition.completed",
        confirmed = partition.confirmed.len(),
        candidates = partition.candidates.len(),
        unmatched_pending = partition.unmatched_pending.len(),
        "restock worklist partitioned against inventory"
    );

    partition
}
