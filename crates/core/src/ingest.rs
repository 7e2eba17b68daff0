//! Report row shapes and the per-SKU indexes built from them.
//!
//! Rows deserialize from any serde source (the CLI feeds CSV). Headers may use
//! snake_case, the legacy PascalCase field names, or the marketplace's own
//! column titles. Cells are parsed leniently: currency symbols, thousands
//! separators and percent signs are ignored, and blank or malformed numbers
//! become zero. Unparseable dates become `None`, which later excludes the SKU
//! at scoring rather than failing the run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::domain::{
    InventoryRecord, PendingRestockRecord, SalesPerformanceRecord, Sku, TrafficRecord,
};
use crate::inventory::InventorySnapshot;
use crate::partition::PendingRestock;
use crate::rules::RulesConfig;
use crate::working_set::{SalesPerformance, Traffic, WorkingSet};

const NAIVE_DATETIME_FORMATS: &[&str] =
    &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SalesPerformanceRow {
    #[serde(alias = "SKU", alias = "Sku")]
    pub sku: String,
    #[serde(alias = "ReportStartDate", default, deserialize_with = "lenient_datetime")]
    pub report_start_date: Option<DateTime<Utc>>,
    #[serde(alias = "ReportEndDate", default, deserialize_with = "lenient_datetime")]
    pub report_end_date: Option<DateTime<Utc>>,
    #[serde(alias = "Title", default)]
    pub title: String,
    #[serde(alias = "QtySold", default, deserialize_with = "lenient_u32")]
    pub qty_sold: u32,
    #[serde(alias = "GMV", default, deserialize_with = "lenient_decimal")]
    pub gmv: Decimal,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrafficRow {
    #[serde(alias = "SKU", alias = "Sku")]
    pub sku: String,
    #[serde(alias = "Parent", alias = "(Parent) ASIN", default)]
    pub parent_asin: String,
    #[serde(alias = "Child", alias = "(Child) ASIN", default)]
    pub child_asin: String,
    #[serde(alias = "Sessions", default, deserialize_with = "lenient_u32")]
    pub sessions: u32,
    #[serde(alias = "PageViews", alias = "Page Views", default, deserialize_with = "lenient_u32")]
    pub page_views: u32,
    #[serde(
        alias = "BuyBoxPercentage",
        alias = "Buy Box Percentage",
        default,
        deserialize_with = "lenient_decimal"
    )]
    pub buy_box_percentage: Decimal,
    #[serde(
        alias = "UnitSessionPercentage",
        alias = "Unit Session Percentage",
        default,
        deserialize_with = "lenient_decimal"
    )]
    pub unit_session_percentage: Decimal,
    #[serde(
        alias = "UnitsOrdered",
        alias = "Units Ordered",
        default,
        deserialize_with = "lenient_u32"
    )]
    pub units_ordered: u32,
    #[serde(
        alias = "OrdProdSales",
        alias = "Ordered Product Sales",
        default,
        deserialize_with = "lenient_decimal"
    )]
    pub ordered_product_sales: Decimal,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PendingRestockRow {
    #[serde(alias = "SKU", alias = "Sku")]
    pub sku: String,
    #[serde(alias = "Inbound", default, deserialize_with = "lenient_u32")]
    pub inbound: u32,
    #[serde(alias = "Alert", default)]
    pub alert: String,
    #[serde(alias = "RecQt", default, deserialize_with = "lenient_u32")]
    pub recommended_qty: u32,
    #[serde(alias = "RecDate", default, deserialize_with = "lenient_datetime")]
    pub recommended_date: Option<DateTime<Utc>>,
}

/// One product from the vendor inventory export.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct InventoryRow {
    #[serde(alias = "SKU", alias = "Sku")]
    pub sku: String,
    #[serde(alias = "Cost", default, deserialize_with = "lenient_decimal")]
    pub cost: Decimal,
    #[serde(alias = "Classification", alias = "Class", default)]
    pub classification: String,
    #[serde(alias = "UPC", alias = "Code", default)]
    pub upc: String,
    #[serde(alias = "Brand", default)]
    pub brand: String,
    #[serde(
        alias = "AvailableQt",
        alias = "QuantityAvailable",
        default,
        deserialize_with = "lenient_i64"
    )]
    pub available_qty: i64,
    #[serde(alias = "SvTitle", alias = "Description", default)]
    pub vendor_title: String,
}

/// Indexes the sales-performance report, keeping only SKUs that sold at least
/// `topseller` units in the window.
pub fn index_sales_performance(
    rows: impl IntoIterator<Item = SalesPerformanceRow>,
    topseller: u32,
) -> SalesPerformance {
    rows.into_iter()
        .filter(|row| row.qty_sold >= topseller)
        .filter_map(|row| {
            let sku = Sku::parse(&row.sku)?;
            Some((
                sku,
                SalesPerformanceRecord {
                    report_start_date: row.report_start_date,
                    report_end_date: row.report_end_date,
                    title: row.title,
                    qty_sold: row.qty_sold,
                    gmv: row.gmv,
                },
            ))
        })
        .collect()
}

pub fn index_traffic(rows: impl IntoIterator<Item = TrafficRow>) -> Traffic {
    rows.into_iter()
        .filter_map(|row| {
            let sku = Sku::parse(&row.sku)?;
            Some((
                sku,
                TrafficRecord {
                    parent_asin: row.parent_asin,
                    child_asin: row.child_asin,
                    sessions: row.sessions,
                    page_views: row.page_views,
                    buy_box_percentage: row.buy_box_percentage,
                    unit_session_percentage: row.unit_session_percentage,
                    units_ordered: row.units_ordered,
                    ordered_product_sales: row.ordered_product_sales,
                },
            ))
        })
        .collect()
}

/// Indexes the restock worklist, discarding rows that carry no signal.
pub fn index_pending_restock(rows: impl IntoIterator<Item = PendingRestockRow>) -> PendingRestock {
    rows.into_iter()
        .filter_map(|row| {
            let sku = Sku::parse(&row.sku)?;
            let record = PendingRestockRecord {
                inbound: row.inbound,
                alert: row.alert,
                recommended_qty: row.recommended_qty,
                recommended_date: row.recommended_date,
            };
            record.has_signal().then_some((sku, record))
        })
        .collect()
}

pub fn index_inventory(rows: impl IntoIterator<Item = InventoryRow>) -> InventorySnapshot {
    rows.into_iter()
        .filter_map(|row| {
            let sku = Sku::parse(&row.sku)?;
            Some((
                sku,
                InventoryRecord {
                    cost: row.cost,
                    classification: row.classification.trim().to_owned(),
                    upc: row.upc,
                    brand: row.brand,
                    available_qty: row.available_qty,
                    vendor_title: row.vendor_title,
                },
            ))
        })
        .collect()
}

/// Builds a fresh working set from the three marketplace reports.
pub fn build_working_set(
    rules: &RulesConfig,
    sales: impl IntoIterator<Item = SalesPerformanceRow>,
    traffic: impl IntoIterator<Item = TrafficRow>,
    restock: impl IntoIterator<Item = PendingRestockRow>,
) -> WorkingSet {
    WorkingSet::new(
        index_sales_performance(sales, rules.topseller),
        index_traffic(traffic),
        index_pending_restock(restock),
    )
}

fn clean_numeric(raw: &str) -> String {
    raw.trim().chars().filter(|ch| !matches!(ch, '$' | ',' | '%' | ' ')).collect()
}

fn parse_decimal(raw: &str) -> Decimal {
    let cleaned = clean_numeric(raw);
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or_else(|_| {
            debug!(event_name = "restock.ingest.malformed_number", raw, "treating cell as zero");
            Decimal::ZERO
        })
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(trimmed, format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
        });

    if naive.is_none() {
        debug!(event_name = "restock.ingest.malformed_date", raw = trimmed, "ignoring date cell");
    }
    naive.map(|value| value.and_utc())
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_decimal(&raw))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_decimal(&raw).trunc().to_u32().unwrap_or(0))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_decimal(&raw).trunc().to_i64().unwrap_or(0))
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_datetime(&raw))
}
