//! Merging the explicit uid and the query uids into the final output sequence.

use crate::error::{ResolverError, Result};
use crate::index::HierarchyIndex;
use crate::models::PageId;

/// Which transform to apply to every seed uid. Both may be set; their outputs
/// are concatenated, children first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transform {
    pub children: bool,
    pub roots: bool,
}

impl Transform {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        !self.children && !self.roots
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    /// Ignored unless positive.
    pub explicit: Option<PageId>,
    /// Present whenever an argument query ran, even if it returned nothing.
    pub query_ids: Option<&'a [PageId]>,
    pub transform: Transform,
}

impl<'a> Selection<'a> {
    pub fn explicit(uid: PageId) -> Self {
        Self {
            explicit: Some(uid),
            ..Self::default()
        }
    }

    pub fn queried(uids: &'a [PageId]) -> Self {
        Self {
            query_ids: Some(uids),
            ..Self::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Produce the final uid sequence.
///
/// In identity mode the query uids replace whatever the explicit uid
/// contributed; in transform mode both sources append. Seeds are transformed
/// independently, so overlapping subtrees repeat.
pub fn combine(index: &HierarchyIndex, selection: &Selection<'_>) -> Result<Vec<PageId>> {
    let transform = selection.transform;
    let mut uids = Vec::new();

    if let Some(uid) = selection.explicit.filter(|uid| *uid > 0) {
        if transform.children {
            uids.extend(index.descendants(uid)?);
        }
        if transform.roots {
            uids.push(index.root(uid)?);
        }
        if transform.is_identity() {
            uids.push(uid);
        }
    }

    if let Some(query_ids) = selection.query_ids {
        if transform.children {
            for &uid in query_ids {
                uids.extend(index.descendants(uid)?);
            }
        }
        if transform.roots {
            for &uid in query_ids {
                uids.push(index.root(uid)?);
            }
        }
        if transform.is_identity() {
            uids = query_ids.to_vec();
        }
    }

    tracing::debug!(count = uids.len(), ?transform, "Combined selection");

    if uids.is_empty() {
        return Err(ResolverError::NoSelection);
    }
    Ok(uids)
}
