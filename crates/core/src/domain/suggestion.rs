use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::inventory::InventoryRecord;
use super::report::{SalesPerformanceRecord, TrafficRecord};

/// A scored SKU recommended for replenishment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    #[serde(flatten)]
    pub sales: SalesPerformanceRecord,
    #[serde(flatten)]
    pub traffic: TrafficRecord,
    #[serde(flatten)]
    pub inventory: InventoryRecord,
    pub estimated_fees: Decimal,
    pub estimated_price: Decimal,
    pub estimated_profit: Decimal,
    pub suggested_qty: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_price: Option<Decimal>,
    pub restock: bool,
}

/// Why a candidate SKU was left out of the suggestion set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// No marketplace revenue per unit could be estimated.
    ZeroPrice,
    /// Estimated profit fell under the target and price suggestion was off.
    BelowTargetProfit,
    /// Candidate had inventory data but no sales-performance line.
    MissingSalesRecord,
    /// The sales window was missing, empty, or inverted.
    InvalidSalesWindow,
    /// Nothing left to restock after rounding and the availability clamp.
    ZeroQuantity,
    /// Fees, cost or profit did not fit in a `Decimal`.
    ArithmeticOverflow,
}

impl ExclusionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZeroPrice => "zero_price",
            Self::BelowTargetProfit => "below_target_profit",
            Self::MissingSalesRecord => "missing_sales_record",
            Self::InvalidSalesWindow => "invalid_sales_window",
            Self::ZeroQuantity => "zero_quantity",
            Self::ArithmeticOverflow => "arithmetic_overflow",
        }
    }
}
