use anyhow::{Context, Result};
use std::path::Path;

use super::RenderOutcome;
use crate::db::SchemaVariant;
use crate::models::Transaction;

pub(crate) const EXPORT_FILE: &str = "transactions_export.csv";

/// Full-table CSV dump in the schema variant's field order.
pub(crate) fn render_csv_export(
    records: &[Transaction],
    variant: SchemaVariant,
    path: &Path,
) -> Result<RenderOutcome> {
    if records.is_empty() {
        return Ok(RenderOutcome::NoData);
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    writer
        .write_record(variant.headers())
        .context("Failed to write CSV header")?;

    for txn in records {
        let mut record: Vec<String> = vec![
            txn.id.to_string(),
            txn.kind.to_string(),
            txn.category.clone(),
        ];
        if variant.has_quantity {
            record.push(txn.quantity.map(|q| q.to_string()).unwrap_or_default());
        }
        record.push(format!("{:.2}", txn.amount));
        record.push(txn.description.clone());
        record.push(txn.created_at.clone());
        if variant.has_outlier {
            record.push(if txn.is_outlier { "1" } else { "0" }.into());
        }
        writer
            .write_record(&record)
            .with_context(|| format!("Failed to write transaction {}", txn.id))?;
    }

    writer.flush().context("Failed to finalize CSV export")?;
    Ok(RenderOutcome::Rendered(path.to_path_buf()))
}

#[cfg(test)]
#[path = "csv_export_tests.rs"]
mod tests;
