use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use url::Url;

use super::{RelationSource, DEFAULT_DOMAINS_QUERY, DEFAULT_PAGES_QUERY};
use crate::error::{ResolverError, Result};
use crate::models::{DomainRow, PageId, PageRow, SelectionRow};

/// Reads the page and domain relations from a MySQL database.
pub struct MySqlSource {
    pool: MySqlPool,
    pages_query: String,
    domains_query: String,
}

impl MySqlSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            pages_query: DEFAULT_PAGES_QUERY.to_string(),
            domains_query: DEFAULT_DOMAINS_QUERY.to_string(),
        }
    }

    /// Open a single-connection pool. Connecting performs a round-trip, so a
    /// reachable but misconfigured server fails here rather than at load time.
    pub async fn connect(url: &Url) -> Result<Self> {
        tracing::info!(
            host = url.host_str().unwrap_or("localhost"),
            database = url.path().trim_start_matches('/'),
            "Connecting to database"
        );

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(url.as_str())
            .await
            .map_err(ResolverError::Connection)?;

        Ok(Self::new(pool))
    }

    pub fn with_queries(mut self, pages_query: String, domains_query: String) -> Self {
        self.pages_query = pages_query;
        self.domains_query = domains_query;
        self
    }
}

#[async_trait]
impl RelationSource for MySqlSource {
    async fn page_rows(&self) -> Result<Vec<PageRow>> {
        let rows = sqlx::query(&self.pages_query)
            .fetch_all(&self.pool)
            .await
            .map_err(ResolverError::load("pages"))?;

        rows.iter()
            .map(|r| {
                Ok(PageRow {
                    uid: decode_id(r, 0)?,
                    pid: decode_id(r, 1)?,
                    is_root: decode_flag(r, 2)?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(ResolverError::load("pages"))
    }

    async fn domain_rows(&self) -> Result<Vec<DomainRow>> {
        let rows = sqlx::query(&self.domains_query)
            .fetch_all(&self.pool)
            .await
            .map_err(ResolverError::load("domains"))?;

        rows.iter()
            .map(|r| {
                Ok(DomainRow {
                    root_uid: decode_id(r, 0)?,
                    domain: decode_text(r, 1)?,
                    forced: decode_flag(r, 2)?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(ResolverError::load("domains"))
    }

    /// Runs over the text protocol so every projected column arrives as text,
    /// whatever its SQL type (DECIMAL, DATETIME, JSON, ...).
    async fn selection_rows(&self, sql: &str, nfields: usize) -> Result<Vec<SelectionRow>> {
        let rows = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(ResolverError::Query)?;

        rows.iter()
            .map(|r| {
                if r.len() != nfields + 1 {
                    return Err(ResolverError::QueryShape {
                        expected: nfields + 1,
                        found: r.len(),
                    });
                }
                let uid = decode_id(r, 0).map_err(ResolverError::Query)?;
                let fields = (1..=nfields)
                    .map(|i| decode_raw_text(r, i))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(ResolverError::Query)?;
                Ok(SelectionRow { uid, fields })
            })
            .collect()
    }
}

// =============================================================================
// Lenient column decoding
//
// Page tables in the wild declare uids as signed or unsigned ints of any width
// and flags as TINYINT, BOOL or even text; accept all of them.
// =============================================================================

fn decode_error<E>(index: usize, err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(err),
    }
}

fn decode_id(row: &MySqlRow, index: usize) -> std::result::Result<PageId, sqlx::Error> {
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Ok(v);
    }
    if let Ok(v) = row.try_get::<u64, _>(index) {
        return PageId::try_from(v).map_err(|e| decode_error(index, e));
    }
    let text: String = row.try_get(index)?;
    text.trim()
        .parse::<PageId>()
        .map_err(|e| decode_error(index, e))
}

fn decode_flag(row: &MySqlRow, index: usize) -> std::result::Result<bool, sqlx::Error> {
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return Ok(v.unwrap_or(false));
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Ok(v != 0);
    }
    if let Ok(v) = row.try_get::<u64, _>(index) {
        return Ok(v != 0);
    }
    let text: String = row.try_get(index)?;
    match text.trim() {
        "" | "0" => Ok(false),
        t => t
            .parse::<i64>()
            .map(|v| v != 0)
            .map_err(|e| decode_error(index, e)),
    }
}

/// NULL decodes to the empty string; numbers render in their plain form.
fn decode_text(row: &MySqlRow, index: usize) -> std::result::Result<String, sqlx::Error> {
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return Ok(v.unwrap_or_default());
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<u64, _>(index) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<f32, _>(index) {
        return Ok(v.to_string());
    }
    let bytes: Vec<u8> = row.try_get(index)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Text-protocol values are their textual rendering, so skip the type check.
/// NULL decodes to the empty string.
fn decode_raw_text(row: &MySqlRow, index: usize) -> std::result::Result<String, sqlx::Error> {
    if let Ok(v) = row.try_get_unchecked::<Option<String>, _>(index) {
        return Ok(v.unwrap_or_default());
    }
    let bytes: Option<Vec<u8>> = row.try_get_unchecked(index)?;
    Ok(bytes
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default())
}
