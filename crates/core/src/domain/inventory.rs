use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vendor cost/classification data for one SKU, fetched fresh each run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub cost: Decimal,
    pub classification: String,
    pub upc: String,
    pub brand: String,
    pub available_qty: i64,
    pub vendor_title: String,
}
