mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::{Transaction, TxnKind};

/// Which optional columns the live `transactions` table carries.
/// Older stores predate `quantity` and `is_outlier`; everything downstream
/// (field order, summary columns) keys off this instead of forking code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SchemaVariant {
    pub(crate) has_quantity: bool,
    pub(crate) has_outlier: bool,
}

impl SchemaVariant {
    /// Field order for detail sheets and CSV export.
    pub(crate) fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec!["id", "type", "category"];
        if self.has_quantity {
            headers.push("quantity");
        }
        headers.extend(["amount", "description", "created_at"]);
        if self.has_outlier {
            headers.push("is_outlier");
        }
        headers
    }
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        conn.execute_batch(schema::SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory_legacy() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::SCHEMA_LEGACY)?;
        Ok(Self { conn })
    }

    /// Inspect the live table once per run to learn which optional columns exist.
    pub(crate) fn schema_variant(&self) -> Result<SchemaVariant> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info('transactions')")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let names = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(SchemaVariant {
            has_quantity: names.iter().any(|n| n == "quantity"),
            has_outlier: names.iter().any(|n| n == "is_outlier"),
        })
    }

    /// Every transaction row in id order, for the detail and export reports.
    pub(crate) fn fetch_transactions(&self, variant: SchemaVariant) -> Result<Vec<Transaction>> {
        let mut cols = String::from(
            "id, type, category, CAST(amount AS TEXT), COALESCE(description, ''), created_at",
        );
        if variant.has_quantity {
            cols.push_str(", CAST(quantity AS TEXT)");
        }
        if variant.has_outlier {
            cols.push_str(", COALESCE(is_outlier, 0)");
        }
        let sql = format!("SELECT {cols} FROM transactions ORDER BY id");

        let quantity_idx = 6;
        let outlier_idx = if variant.has_quantity { 7 } else { 6 };

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(1)?;
            let amount: String = row.get(3)?;
            let quantity = if variant.has_quantity {
                row.get::<_, Option<String>>(quantity_idx)?
                    .and_then(|q| Decimal::from_str(&q).ok())
            } else {
                None
            };
            let is_outlier = if variant.has_outlier {
                row.get::<_, i64>(outlier_idx)? != 0
            } else {
                false
            };
            Ok(Transaction {
                id: row.get(0)?,
                kind: TxnKind::parse(&kind),
                category: row.get(2)?,
                quantity,
                amount: Decimal::from_str(&amount).unwrap_or_default(),
                description: row.get(4)?,
                created_at: row.get(5)?,
                is_outlier,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Per-day per-category expense sums for a `created_at` range (inclusive),
    /// day taken from the timestamp's day-of-month.
    pub(crate) fn expense_by_day_and_category(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(u32, String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT CAST(strftime('%d', created_at) AS INTEGER) AS day,
                    category,
                    CAST(SUM(amount) AS TEXT)
             FROM transactions
             WHERE type = 'expense' AND created_at >= ?1 AND created_at <= ?2
             GROUP BY day, category
             ORDER BY day",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            let day: i64 = row.get(0)?;
            let category: String = row.get(1)?;
            let total: String = row.get(2)?;
            Ok((
                day as u32,
                category,
                Decimal::from_str(&total).unwrap_or_default(),
            ))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Per-category expense sums for a half-open `created_at` range,
    /// largest total first.
    pub(crate) fn expense_by_category(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, CAST(SUM(amount) AS TEXT) AS total
             FROM transactions
             WHERE type = 'expense' AND created_at >= ?1 AND created_at < ?2
             GROUP BY category
             ORDER BY SUM(amount) DESC",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            let category: String = row.get(0)?;
            let total: String = row.get(1)?;
            Ok((category, Decimal::from_str(&total).unwrap_or_default()))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Daily expense sums between two calendar dates (inclusive), keyed by
    /// `YYYY-MM-DD`. Days with no expense rows are simply absent.
    pub(crate) fn expense_by_date(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT DATE(created_at) AS date, CAST(SUM(amount) AS TEXT)
             FROM transactions
             WHERE type = 'expense' AND DATE(created_at) BETWEEN ?1 AND ?2
             GROUP BY DATE(created_at)
             ORDER BY DATE(created_at)",
        )?;
        let rows = stmt.query_map(params![start_date, end_date], |row| {
            let date: String = row.get(0)?;
            let total: String = row.get(1)?;
            Ok((date, Decimal::from_str(&total).unwrap_or_default()))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
