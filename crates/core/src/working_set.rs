use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{SalesPerformanceRecord, Sku, TrafficRecord};
use crate::errors::DomainError;
use crate::inventory::InventorySnapshot;
use crate::partition::{partition_restock, Candidates, ConfirmedRestock, PendingRestock};

pub type SalesPerformance = BTreeMap<Sku, SalesPerformanceRecord>;
pub type Traffic = BTreeMap<Sku, TrafficRecord>;

/// Restock worklist as ingested, and after it has been matched to inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestockState {
    Pending(PendingRestock),
    Confirmed(ConfirmedRestock),
}

/// Run-scoped aggregate of every keyed collection the engine works on.
///
/// Each run builds a fresh working set; nothing here is shared between runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkingSet {
    sales: SalesPerformance,
    traffic: Traffic,
    restock: RestockState,
}

impl WorkingSet {
    pub fn new(sales: SalesPerformance, traffic: Traffic, pending: PendingRestock) -> Self {
        Self { sales, traffic, restock: RestockState::Pending(pending) }
    }

    pub fn sales(&self) -> &SalesPerformance {
        &self.sales
    }

    pub fn traffic(&self) -> &Traffic {
        &self.traffic
    }

    pub fn restock(&self) -> &RestockState {
        &self.restock
    }

    /// SKUs to request from the inventory service: every sales-performance
    /// SKU plus every worklist SKU.
    pub fn sku_universe(&self) -> BTreeSet<Sku> {
        let restock_keys: Vec<&Sku> = match &self.restock {
            RestockState::Pending(pending) => pending.keys().collect(),
            RestockState::Confirmed(confirmed) => confirmed.keys().collect(),
        };

        self.sales.keys().chain(restock_keys).cloned().collect()
    }

    /// Matches the pending worklist against `inventory`, replacing it with the
    /// confirmed entries, and returns the SKUs left for scoring.
    pub fn confirm_restock(
        &mut self,
        inventory: &InventorySnapshot,
    ) -> Result<Candidates, DomainError> {
        let RestockState::Pending(pending) = &self.restock else {
            return Err(DomainError::RestockAlreadyConfirmed);
        };

        let partition = partition_restock(inventory, pending);
        self.restock = RestockState::Confirmed(partition.confirmed);
        Ok(partition.candidates)
    }

    /// Splits the set for scoring. The restock map is empty while the
    /// worklist is still pending.
    pub fn into_parts(self) -> (SalesPerformance, Traffic, ConfirmedRestock) {
        let confirmed = match self.restock {
            RestockState::Pending(_) => ConfirmedRestock::new(),
            RestockState::Confirmed(confirmed) => confirmed,
        };

        (self.sales, self.traffic, confirmed)
    }
}
