pub mod inventory;
pub mod report;
pub mod restock;
pub mod sku;
pub mod suggestion;

pub use inventory::InventoryRecord;
pub use report::{SalesPerformanceRecord, TrafficRecord};
pub use restock::{ConfirmedRestockRecord, PendingRestockRecord, NO_SALES_ALERT_MARKER};
pub use sku::Sku;
pub use suggestion::{ExclusionReason, SuggestionRecord};
