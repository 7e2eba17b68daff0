use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// One SKU's line from the marketplace sales-performance report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesPerformanceRecord {
    pub report_start_date: Option<DateTime<Utc>>,
    pub report_end_date: Option<DateTime<Utc>>,
    pub title: String,
    pub qty_sold: u32,
    pub gmv: Decimal,
}

impl SalesPerformanceRecord {
    /// Length of the report window in (possibly fractional) days.
    ///
    /// Returns `None` when either bound is missing or the window is empty or
    /// inverted, so callers never divide by a non-positive length.
    pub fn window_days(&self) -> Option<Decimal> {
        let (start, end) = (self.report_start_date?, self.report_end_date?);
        let seconds = (end - start).num_seconds();
        if seconds <= 0 {
            return None;
        }

        Decimal::from(seconds).checked_div(Decimal::from(SECONDS_PER_DAY))
    }

    /// Units sold per day over the report window.
    pub fn daily_sales_rate(&self) -> Option<Decimal> {
        let days = self.window_days()?;
        Decimal::from(self.qty_sold).checked_div(days)
    }
}

/// One SKU's line from the marketplace traffic/conversion report.
///
/// A SKU with no traffic line is scored against `TrafficRecord::default()`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub parent_asin: String,
    pub child_asin: String,
    pub sessions: u32,
    pub page_views: u32,
    pub buy_box_percentage: Decimal,
    pub unit_session_percentage: Decimal,
    pub units_ordered: u32,
    pub ordered_product_sales: Decimal,
}

impl TrafficRecord {
    /// Revenue per ordered unit, or zero when nothing was ordered.
    pub fn average_selling_price(&self) -> Decimal {
        if self.units_ordered == 0 {
            return Decimal::ZERO;
        }

        self.ordered_product_sales.checked_div(Decimal::from(self.units_ordered)).unwrap_or_default()
    }
}
