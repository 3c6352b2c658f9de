// Spreadsheet output: one CSV row per resolved variant

use crate::links::item_number;
use anyhow::{Context, Result};
use csv::Writer;
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};
use varscout_scanner::VariantRecord;

pub const SHEET_HEADERS: [&str; 14] = [
    "Label",
    "id",
    "price",
    "price_converted",
    "vat_price",
    "quantity",
    "in_stock",
    "sold",
    "available",
    "watch_count",
    "epid",
    "top_product",
    "traits",
    "eBay Item Number",
];

/// When rows are pushed to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// Flush after every row; a crash loses at most the row being written
    #[default]
    PerRow,
    /// Flush once all rows of a link are written
    PerLink,
}

impl CommitPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "row" => Some(CommitPolicy::PerRow),
            "link" => Some(CommitPolicy::PerLink),
            _ => None,
        }
    }
}

/// Append-only spreadsheet of variant rows.
pub struct VariantSheet {
    writer: Writer<File>,
    path: PathBuf,
    policy: CommitPolicy,
    rows_written: usize,
}

impl VariantSheet {
    /// Create (or truncate) the sheet at `path` and write the header row.
    pub fn create(path: &Path, policy: CommitPolicy) -> Result<Self> {
        let mut writer = Writer::from_path(path)
            .with_context(|| format!("Failed to create spreadsheet {}", path.display()))?;
        writer
            .write_record(SHEET_HEADERS)
            .with_context(|| format!("Failed to write header to {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            policy,
            rows_written: 0,
        })
    }

    pub fn append(&mut self, link: &str, label: &str, record: &VariantRecord) -> Result<()> {
        let row = variant_row(link, label, record)?;
        self.writer
            .write_record(&row)
            .with_context(|| format!("Failed to append row to {}", self.path.display()))?;
        self.rows_written += 1;

        if self.policy == CommitPolicy::PerRow {
            self.flush()?;
        }
        Ok(())
    }

    /// Called once every row of a link has been appended.
    pub fn end_link(&mut self) -> Result<()> {
        if self.policy == CommitPolicy::PerLink {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Cells of one spreadsheet row, in [`SHEET_HEADERS`] order.
pub fn variant_row(link: &str, label: &str, record: &VariantRecord) -> Result<Vec<String>> {
    let traits = serde_json::to_string(&record.traits).context("Failed to serialize traits")?;

    Ok(vec![
        label.to_string(),
        record.id.clone(),
        cell(&record.price),
        cell(&record.price_converted),
        cell(&record.vat_price),
        cell(&record.quantity),
        cell(&record.in_stock),
        cell(&record.sold),
        cell(&record.available),
        cell(&record.watch_count),
        cell(&record.epid),
        cell(&record.top_product),
        traits,
        item_number(link).to_string(),
    ])
}

/// Render a JSON value as a spreadsheet cell.
///
/// Strings are written without quotes and `null` as an empty cell.
pub fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
