//! In-memory relation source for pipeline tests.
//!
//! Holds the rows a database would return so the whole resolve pipeline can be
//! exercised without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use page_resolver::models::{DomainRow, PageId, PageRow, SelectionRow};
use page_resolver::source::RelationSource;
use page_resolver::{ResolverError, Result};

#[derive(Default)]
pub struct StaticSource {
    pub pages: Vec<PageRow>,
    pub domains: Vec<DomainRow>,
    /// SQL text -> rows (uid followed by every projected field)
    pub queries: HashMap<String, Vec<(PageId, Vec<&'static str>)>>,
    pub fail_pages: bool,
    pub query_calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(pages: Vec<PageRow>, domains: Vec<DomainRow>) -> Self {
        Self {
            pages,
            domains,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, sql: &str, rows: Vec<(PageId, Vec<&'static str>)>) -> Self {
        self.queries.insert(sql.to_string(), rows);
        self
    }

    pub fn failing_pages(mut self) -> Self {
        self.fail_pages = true;
        self
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationSource for StaticSource {
    async fn page_rows(&self) -> Result<Vec<PageRow>> {
        if self.fail_pages {
            return Err(ResolverError::Load {
                relation: "pages",
                source: sqlx::Error::Protocol("table pages doesn't exist".to_string()),
            });
        }
        Ok(self.pages.clone())
    }

    async fn domain_rows(&self) -> Result<Vec<DomainRow>> {
        Ok(self.domains.clone())
    }

    async fn selection_rows(&self, sql: &str, nfields: usize) -> Result<Vec<SelectionRow>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);

        let rows = self.queries.get(sql).ok_or_else(|| {
            ResolverError::Query(sqlx::Error::Protocol(format!("unknown query: {sql}")))
        })?;

        rows.iter()
            .map(|(uid, fields)| {
                if fields.len() != nfields {
                    return Err(ResolverError::QueryShape {
                        expected: nfields + 1,
                        found: fields.len() + 1,
                    });
                }
                Ok(SelectionRow::new(
                    *uid,
                    fields.iter().map(|f| f.to_string()).collect(),
                ))
            })
            .collect()
    }
}

/// Pages `{(1,0,root),(2,1),(3,2)}` bound to example.com, plus an unbound
/// second tree under 100.
pub fn example_site() -> StaticSource {
    StaticSource::new(
        vec![
            PageRow::new(1, 0, true),
            PageRow::new(2, 1, false),
            PageRow::new(3, 2, false),
            PageRow::new(4, 1, false),
            PageRow::new(100, 0, false),
            PageRow::new(101, 100, false),
        ],
        vec![DomainRow::new(1, "example.com", false)],
    )
}
