//! CSV export of the stored article table.
//!
//! The downstream consumer is a spreadsheet or notebook, so the output is a
//! flat tabular file with a header row and RFC-4180-style quoting.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::storage::{Database, StoredArticle};

/// Rows echoed back to the caller for a quick sanity check.
const PREVIEW_ROWS: usize = 5;

/// Result of an export: how many rows were written and the first few of
/// them for display.
#[derive(Debug)]
pub struct ExportReport {
    pub rows: usize,
    pub preview: Vec<StoredArticle>,
}

/// Fail fast when the store file does not exist.
///
/// Opening the store would create an empty database and mask the real
/// problem (the pipeline has not run yet), so the existence check happens
/// before any connection is made.
pub fn ensure_store_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        bail!(
            "Article store not found at {}. Run the pipeline first.",
            path.display()
        );
    }
}

/// Write every stored row to a CSV file, returning count and preview.
pub async fn export_csv(db: &Database, out_path: &Path) -> Result<ExportReport> {
    let articles = db.get_all_articles().await?;

    let mut out = String::from("id,source,title,url,published_at,scraped_at\n");
    for a in &articles {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            a.id,
            csv_field(&a.source),
            csv_field(&a.title),
            csv_field(&a.url),
            csv_field(&a.published_at),
            csv_field(&a.scraped_at),
        ));
    }

    std::fs::write(out_path, out)
        .with_context(|| format!("Failed to write CSV to {}", out_path.display()))?;

    tracing::info!(rows = articles.len(), path = %out_path.display(), "Exported article store");

    let preview = articles.iter().take(PREVIEW_ROWS).cloned().collect();
    Ok(ExportReport {
        rows: articles.len(),
        preview,
    })
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
