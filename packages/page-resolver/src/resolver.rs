//! The one-shot resolve pipeline: load, query, combine, render.

use std::io::Write;

use crate::assoc::AssociatedRows;
use crate::error::Result;
use crate::index::HierarchyIndex;
use crate::models::PageId;
use crate::output::{write_id_list, OutputFormat, UrlWriter};
use crate::selection::{combine, Selection, Transform};
use crate::source::RelationSource;

/// Everything a single run needs besides the data source.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Seed uid; ignored unless positive.
    pub pid: PageId,
    /// Caller-supplied SQL yielding uids in its first column.
    pub query: Option<String>,
    /// Extra columns the query projects after the uid.
    pub nfields: usize,
    pub transform: Transform,
    pub format: OutputFormat,
    pub url_scheme: String,
}

impl Default for ResolveRequest {
    fn default() -> Self {
        Self {
            pid: 0,
            query: None,
            nfields: 0,
            transform: Transform::identity(),
            format: OutputFormat::Urls,
            url_scheme: "https".to_string(),
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutcome {
    pub uids: Vec<PageId>,
    pub lines: usize,
}

/// Loaded hierarchy plus whatever associated values queries have recorded.
pub struct Resolver {
    index: HierarchyIndex,
    assoc: AssociatedRows,
}

impl Resolver {
    pub fn new(index: HierarchyIndex) -> Self {
        Self {
            index,
            assoc: AssociatedRows::new(),
        }
    }

    pub async fn load<S>(source: &S) -> Result<Self>
    where
        S: RelationSource + ?Sized,
    {
        Ok(Self::new(HierarchyIndex::load(source).await?))
    }

    pub fn index(&self) -> &HierarchyIndex {
        &self.index
    }

    pub fn assoc(&self) -> &AssociatedRows {
        &self.assoc
    }

    pub async fn run_query<S>(&mut self, source: &S, sql: &str, nfields: usize) -> Result<Vec<PageId>>
    where
        S: RelationSource + ?Sized,
    {
        self.assoc.run_query(source, sql, nfields).await
    }

    /// Combine and render against an already loaded index.
    pub async fn resolve<S, W>(
        &mut self,
        source: &S,
        request: &ResolveRequest,
        out: &mut W,
    ) -> Result<ResolveOutcome>
    where
        S: RelationSource + ?Sized,
        W: Write,
    {
        let query_ids = match request.query.as_deref().filter(|q| !q.trim().is_empty()) {
            Some(sql) => Some(self.run_query(source, sql, request.nfields).await?),
            None => None,
        };

        let selection = Selection {
            explicit: Some(request.pid),
            query_ids: query_ids.as_deref(),
            transform: request.transform,
        };
        let uids = combine(&self.index, &selection)?;

        let lines = match request.format {
            OutputFormat::IdList => {
                write_id_list(out, &uids)?;
                1
            }
            OutputFormat::Urls => UrlWriter::new(&self.index, &request.url_scheme)
                .with_assoc(&self.assoc, request.nfields)
                .write(out, &uids)?,
        };

        tracing::info!(selected = uids.len(), lines, "Resolved pages");
        Ok(ResolveOutcome { uids, lines })
    }
}

/// Load the hierarchy from `source` and run one request against it.
pub async fn resolve<S, W>(source: &S, request: &ResolveRequest, out: &mut W) -> Result<ResolveOutcome>
where
    S: RelationSource + ?Sized,
    W: Write,
{
    let mut resolver = Resolver::load(source).await?;
    resolver.resolve(source, request, out).await
}
