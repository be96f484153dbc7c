//! Extra per-page columns captured from a caller-supplied query.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{PageId, SelectionRow};
use crate::source::RelationSource;

/// Associated values keyed by page uid. A uid seen again overwrites its values.
#[derive(Debug, Clone, Default)]
pub struct AssociatedRows {
    rows: HashMap<PageId, Vec<String>>,
}

impl AssociatedRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `sql` and return its uids in result order.
    ///
    /// With `nfields > 0` the next `nfields` columns of every row are recorded
    /// against that row's uid; with `nfields == 0` nothing is recorded.
    pub async fn run_query<S>(&mut self, source: &S, sql: &str, nfields: usize) -> Result<Vec<PageId>>
    where
        S: RelationSource + ?Sized,
    {
        let rows = source.selection_rows(sql, nfields).await?;
        tracing::debug!(rows = rows.len(), nfields, "Argument query returned");

        Ok(rows
            .into_iter()
            .map(|row| {
                let uid = row.uid;
                if nfields > 0 {
                    self.record(row);
                }
                uid
            })
            .collect())
    }

    pub fn record(&mut self, row: SelectionRow) {
        self.rows.insert(row.uid, row.fields);
    }

    pub fn get(&self, uid: PageId) -> Option<&[String]> {
        self.rows.get(&uid).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
