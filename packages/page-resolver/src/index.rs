//! In-memory page hierarchy.
//!
//! The index is built once from the flat page and domain rows and is read-only
//! afterwards. It answers three questions: which root owns a page, which pages
//! hang below a page, and which domain a root publishes under.

use std::collections::{HashMap, HashSet};

use crate::error::{ResolverError, Result};
use crate::models::{DomainRow, PageId, PageRow};
use crate::source::RelationSource;

#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    /// uid -> pid
    parents: HashMap<PageId, PageId>,
    /// pid -> child uids, ascending
    children: HashMap<PageId, Vec<PageId>>,
    roots: HashSet<PageId>,
    /// root uid -> domain name
    domains: HashMap<PageId, String>,
}

impl HierarchyIndex {
    /// Build the index from already-fetched rows.
    ///
    /// Domain rows must arrive in priority order: the first binding for a root
    /// is kept unless a later row is forced, in which case the later row wins.
    pub fn build<P, D>(pages: P, domains: D) -> Self
    where
        P: IntoIterator<Item = PageRow>,
        D: IntoIterator<Item = DomainRow>,
    {
        let mut parents = HashMap::new();
        let mut roots = HashSet::new();
        for page in pages {
            parents.insert(page.uid, page.pid);
            if page.is_root || page.pid == 0 {
                roots.insert(page.uid);
            }
        }

        let mut children: HashMap<PageId, Vec<PageId>> = HashMap::new();
        for (&uid, &pid) in &parents {
            children.entry(pid).or_default().push(uid);
        }
        for list in children.values_mut() {
            list.sort_unstable();
        }

        let mut bound: HashMap<PageId, String> = HashMap::new();
        for row in domains {
            if bound.contains_key(&row.root_uid) && !row.forced {
                continue;
            }
            bound.insert(row.root_uid, row.domain);
        }

        Self {
            parents,
            children,
            roots,
            domains: bound,
        }
    }

    /// Fetch both relations from `source` and build the index.
    pub async fn load<S>(source: &S) -> Result<Self>
    where
        S: RelationSource + ?Sized,
    {
        let pages = source.page_rows().await?;
        let domains = source.domain_rows().await?;

        let index = Self::build(pages, domains);
        tracing::info!(
            pages = index.page_count(),
            roots = index.root_count(),
            domains = index.domain_count(),
            "Loaded page hierarchy"
        );
        Ok(index)
    }

    pub fn is_root(&self, uid: PageId) -> bool {
        self.roots.contains(&uid)
    }

    /// Walk parent pointers up to the owning root.
    ///
    /// Returns `0` when the chain breaks before a root is reached.
    pub fn root(&self, uid: PageId) -> Result<PageId> {
        if self.is_root(uid) {
            return Ok(uid);
        }

        let mut visited = HashSet::from([uid]);
        let mut current = uid;
        loop {
            let Some(&parent) = self.parents.get(&current) else {
                return Ok(0);
            };
            if self.is_root(parent) {
                return Ok(parent);
            }
            if !visited.insert(parent) {
                return Err(ResolverError::Cycle {
                    start: uid,
                    at: parent,
                });
            }
            current = parent;
        }
    }

    /// Every page below `uid` at any depth, depth-first, each exactly once.
    /// `uid` itself is never included.
    pub fn descendants(&self, uid: PageId) -> Result<Vec<PageId>> {
        let mut found = Vec::new();
        let mut visited = HashSet::from([uid]);
        let mut stack: Vec<PageId> = self.children_of(uid).iter().rev().copied().collect();

        while let Some(child) = stack.pop() {
            if !visited.insert(child) {
                return Err(ResolverError::Cycle {
                    start: uid,
                    at: child,
                });
            }
            found.push(child);
            stack.extend(self.children_of(child).iter().rev());
        }

        Ok(found)
    }

    /// Domain bound to a root, or `""` when none is.
    pub fn domain(&self, root_uid: PageId) -> &str {
        self.domains.get(&root_uid).map(String::as_str).unwrap_or("")
    }

    pub fn page_count(&self) -> usize {
        self.parents.len()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    fn children_of(&self, uid: PageId) -> &[PageId] {
        self.children.get(&uid).map(Vec::as_slice).unwrap_or(&[])
    }
}
