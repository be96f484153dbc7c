//! Row shapes produced by the data source.

/// Page uid. `0` doubles as "no parent" and "no root found".
pub type PageId = i64;

/// One row of the pages relation: `(uid, pid, is_siteroot)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRow {
    pub uid: PageId,
    pub pid: PageId,
    pub is_root: bool,
}

impl PageRow {
    pub fn new(uid: PageId, pid: PageId, is_root: bool) -> Self {
        Self { uid, pid, is_root }
    }
}

/// One row of the domains relation, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRow {
    pub root_uid: PageId,
    pub domain: String,
    /// A forced binding overwrites whatever an earlier row bound.
    pub forced: bool,
}

impl DomainRow {
    pub fn new(root_uid: PageId, domain: impl Into<String>, forced: bool) -> Self {
        Self {
            root_uid,
            domain: domain.into(),
            forced,
        }
    }
}

/// One row of a caller-supplied query: the id plus its extra projected columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRow {
    pub uid: PageId,
    pub fields: Vec<String>,
}

impl SelectionRow {
    pub fn new(uid: PageId, fields: Vec<String>) -> Self {
        Self { uid, fields }
    }
}
