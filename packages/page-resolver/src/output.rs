//! Rendering the final uid sequence.

use std::io::Write;

use crate::assoc::AssociatedRows;
use crate::error::Result;
use crate::index::HierarchyIndex;
use crate::models::PageId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line of comma-separated uids.
    IdList,
    /// One URL (or quoted CSV row) per uid that has a bound domain.
    #[default]
    Urls,
}

/// Renders URLs for resolved uids.
pub struct UrlWriter<'a> {
    index: &'a HierarchyIndex,
    scheme: &'a str,
    /// Associated values and their column count, when CSV rows are wanted.
    assoc: Option<(&'a AssociatedRows, usize)>,
}

impl<'a> UrlWriter<'a> {
    pub fn new(index: &'a HierarchyIndex, scheme: &'a str) -> Self {
        Self {
            index,
            scheme,
            assoc: None,
        }
    }

    /// Emit quoted CSV rows carrying `nfields` associated values per uid.
    /// `nfields == 0` keeps plain URL lines.
    pub fn with_assoc(mut self, assoc: &'a AssociatedRows, nfields: usize) -> Self {
        self.assoc = (nfields > 0).then_some((assoc, nfields));
        self
    }

    /// Render one line per uid whose root has a domain.
    ///
    /// Every root is resolved before anything is returned, so a cycle anywhere
    /// in the selection yields no lines at all.
    pub fn render(&self, uids: &[PageId]) -> Result<Vec<String>> {
        let mut lines = Vec::with_capacity(uids.len());
        for &uid in uids {
            let root = self.index.root(uid)?;
            let domain = self.index.domain(root);
            if domain.is_empty() {
                tracing::debug!(uid, root, "No domain bound, skipping");
                continue;
            }

            let url = page_url(self.scheme, domain, uid);
            lines.push(match self.assoc {
                Some((assoc, nfields)) => {
                    csv_row(&url, assoc.get(uid).unwrap_or_default(), nfields)
                }
                None => url,
            });
        }
        Ok(lines)
    }

    /// Write the rendered lines. Nothing reaches `out` unless every uid resolved.
    /// Returns lines written.
    pub fn write<W: Write>(&self, out: &mut W, uids: &[PageId]) -> Result<usize> {
        let lines = self.render(uids)?;
        for line in &lines {
            writeln!(out, "{line}")?;
        }
        Ok(lines.len())
    }
}

pub fn page_url(scheme: &str, domain: &str, uid: PageId) -> String {
    format!("{scheme}://{domain}/index.php?id={uid}")
}

pub fn write_id_list<W: Write>(out: &mut W, uids: &[PageId]) -> Result<()> {
    writeln!(out, "{}", id_list(uids))?;
    Ok(())
}

pub fn id_list(uids: &[PageId]) -> String {
    uids.iter()
        .map(|uid| uid.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// URL first, then exactly `nfields` values; missing values render empty.
fn csv_row(url: &str, values: &[String], nfields: usize) -> String {
    let mut fields = Vec::with_capacity(nfields + 1);
    fields.push(format!("\"{url}\""));
    for i in 0..nfields {
        let value = values.get(i).map(String::as_str).unwrap_or("");
        fields.push(quote(value));
    }
    fields.join(",")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}
