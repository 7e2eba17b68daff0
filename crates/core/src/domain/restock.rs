use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::inventory::InventoryRecord;

/// Appended to a confirmed restock alert when the SKU had no marketplace sales.
pub const NO_SALES_ALERT_MARKER: &str = " [SKU had no sales on AMZ]";

/// An entry from the existing warehouse-restock worklist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRestockRecord {
    pub inbound: u32,
    pub alert: String,
    pub recommended_qty: u32,
    pub recommended_date: Option<DateTime<Utc>>,
}

impl PendingRestockRecord {
    /// A worklist row with neither an alert nor a recommendation carries no
    /// restock signal and is discarded at ingestion.
    pub fn has_signal(&self) -> bool {
        !self.alert.trim().is_empty() || self.recommended_qty > 0
    }
}

/// A pending restock entry that also has current inventory data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedRestockRecord {
    #[serde(flatten)]
    pub pending: PendingRestockRecord,
    #[serde(flatten)]
    pub inventory: InventoryRecord,
}

impl ConfirmedRestockRecord {
    pub fn new(pending: PendingRestockRecord, inventory: InventoryRecord) -> Self {
        Self { pending, inventory }
    }

    /// Notes on the alert that the SKU sold nothing on the marketplace.
    /// Applying it twice leaves a single marker.
    pub fn flag_no_marketplace_sales(&mut self) {
        if !self.pending.alert.ends_with(NO_SALES_ALERT_MARKER) {
            self.pending.alert.push_str(NO_SALES_ALERT_MARKER);
        }
    }
}
