use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DomainRow, PageRow, SelectionRow};

pub mod mysql;
pub use mysql::MySqlSource;

pub const DEFAULT_PAGES_QUERY: &str = "SELECT uid, pid, is_siteroot FROM pages";
pub const DEFAULT_DOMAINS_QUERY: &str =
    "SELECT pid, domainName, forced FROM sys_domain ORDER BY sorting ASC";

/// The relational boundary the resolver reads from.
///
/// Implementations return whole result sets; the resolver never streams.
#[async_trait]
pub trait RelationSource: Send + Sync {
    /// All rows of the pages relation as `(uid, pid, is_root)`.
    async fn page_rows(&self) -> Result<Vec<PageRow>>;

    /// All rows of the domains relation, already in priority order.
    async fn domain_rows(&self) -> Result<Vec<DomainRow>>;

    /// Run caller-supplied SQL whose first column is a page uid followed by
    /// `nfields` extra columns.
    async fn selection_rows(&self, sql: &str, nfields: usize) -> Result<Vec<SelectionRow>>;
}
