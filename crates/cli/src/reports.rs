//! CSV report loading for the marketplace exports and the vendor catalog.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use restock_core::ingest::{InventoryRow, PendingRestockRow, SalesPerformanceRow, TrafficRow};
use serde::de::DeserializeOwned;

/// Every input a run needs, read from disk.
#[derive(Debug, Default)]
pub struct ReportBundle {
    pub sales: Vec<SalesPerformanceRow>,
    pub traffic: Vec<TrafficRow>,
    pub restock: Vec<PendingRestockRow>,
    pub inventory: Vec<InventoryRow>,
}

pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)
        .with_context(|| format!("could not open report `{}`", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| {
            // Header is line 1.
            row.with_context(|| {
                format!("malformed row at line {} of `{}`", index + 2, path.display())
            })
        })
        .collect()
}

pub fn read_bundle(
    sales: &Path,
    traffic: &Path,
    restock: &Path,
    inventory: &Path,
) -> Result<ReportBundle> {
    Ok(ReportBundle {
        sales: read_rows(sales)?,
        traffic: read_rows(traffic)?,
        restock: read_rows(restock)?,
        inventory: read_rows(inventory)?,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use restock_core::ingest::{PendingRestockRow, TrafficRow};
    use tempfile::TempDir;

    use super::read_rows;

    #[test]
    fn reads_marketplace_headers_and_trims_cells() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("traffic.csv");
        fs::write(
            &path,
            "SKU,(Parent) ASIN,Units Ordered,Ordered Product Sales\n A1 , B00X ,30,\"$300.00\"\n",
        )
        .expect("write csv");

        let rows: Vec<TrafficRow> = read_rows(&path).expect("rows parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, "A1");
        assert_eq!(rows[0].parent_asin, "B00X");
        assert_eq!(rows[0].units_ordered, 30);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("absent.csv");

        let error = read_rows::<PendingRestockRow>(&path).expect_err("missing file fails");
        assert!(error.to_string().contains("absent.csv"));
    }
}
