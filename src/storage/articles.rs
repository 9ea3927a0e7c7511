use anyhow::Result;
use sqlx::FromRow;

use super::db::Database;
use crate::model::NormalizedArticle;

/// Canonical timestamp format persisted to the store (ISO 8601, second
/// precision, no offset).
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A persisted article row.
///
/// Timestamps stay as the stored TEXT representation; nothing downstream
/// (export, preview) needs them re-parsed.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StoredArticle {
    pub id: i64,
    pub source: String,
    pub title: String,
    pub url: String,
    pub published_at: String,
    pub scraped_at: String,
}

impl Database {
    // ========================================================================
    // Article Operations
    // ========================================================================

    /// Insert articles under insert-if-absent semantics, returning the
    /// number of rows actually inserted.
    ///
    /// A URL that is already stored is not an error: the row is left
    /// untouched (first-seen data wins) and counted as "already known".
    /// Any other per-row failure is logged and skipped; failure isolation
    /// is per-row, never per-batch.
    pub async fn insert_articles(&self, articles: &[NormalizedArticle]) -> Result<usize> {
        let mut inserted = 0;

        for article in articles {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO articles (source, title, url, published_at, scraped_at)
                VALUES (?, ?, ?, ?, ?)
            "#,
            )
            .bind(&article.source)
            .bind(&article.title)
            .bind(&article.url)
            .bind(article.published_at.format(DATE_FORMAT).to_string())
            .bind(article.scraped_at.format(DATE_FORMAT).to_string())
            .execute(&self.pool)
            .await;

            match result {
                Ok(r) if r.rows_affected() > 0 => inserted += 1,
                Ok(_) => {
                    tracing::debug!(url = %article.url, "URL already stored, skipping");
                }
                Err(e) => {
                    tracing::warn!(url = %article.url, error = %e, "Row insert failed, skipping");
                }
            }
        }

        Ok(inserted)
    }

    /// Bulk-read every stored article in insertion order.
    pub async fn get_all_articles(&self) -> Result<Vec<StoredArticle>> {
        let articles = sqlx::query_as::<_, StoredArticle>(
            r#"
            SELECT id, source, title, url, published_at, scraped_at
            FROM articles
            ORDER BY id
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(articles)
    }

    /// Total number of stored articles.
    pub async fn count_articles(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
