use crate::error::DicerError;
use crate::page::Page;

/// One contiguous run of pages sharing a group key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEntry {
    /// Marker value truncated at the first `-` (whole value when there
    /// is no hyphen). Leading unmarked pages fall under `""`.
    pub group_key: String,
    /// Marker tail after the last `/` (whole marker when there is no
    /// slash); `None` when the opening page carried no marker.
    pub id: Option<String>,
    /// Literal marker observed on the first page of the run. May be
    /// absent for an unmarked leading page.
    pub start_marker: Option<String>,
    /// Marker observed on the last marker-bearing page of the run;
    /// unset until a second marked page appears.
    pub end_marker: Option<String>,
    /// 1-based first page of the run.
    pub from: usize,
    /// Number of pages in the run.
    pub pages: usize,
}

impl RangeEntry {
    /// 1-based last page of the run.
    pub fn to(&self) -> usize {
        self.from + self.pages - 1
    }
}

/// Ranges keyed by group key, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeTable {
    entries: Vec<RangeEntry>,
}

impl RangeTable {
    pub fn entries(&self) -> &[RangeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, group_key: &str) -> Option<&RangeEntry> {
        self.entries.iter().find(|e| e.group_key == group_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RangeEntry> {
        self.entries.iter()
    }

    fn entry_mut(&mut self, group_key: &str) -> Option<&mut RangeEntry> {
        self.entries.iter_mut().find(|e| e.group_key == group_key)
    }
}

/// Everything before the first `-`, or the whole value without one.
fn group_key_of(marker: &str) -> &str {
    match marker.find('-') {
        Some(i) => &marker[..i],
        None => marker,
    }
}

/// Everything after the last `/`, or the whole value without one.
fn id_of(marker: &str) -> &str {
    match marker.rfind('/') {
        Some(i) => &marker[i + 1..],
        None => marker,
    }
}

/// Fold the ordered, classified page sequence into contiguous ranges.
///
/// Single left-to-right pass with a carried group key (initially the
/// empty string). A page with an absent marker inherits the previous
/// page's group key, so a sub-document marked only on its first and
/// last pages absorbs the unmarked pages in between. Leading unmarked
/// pages form their own group under the empty key.
///
/// The resulting entries must exactly partition `1..=N`; a marker
/// sequence that revisits an earlier group key after another key
/// intervened would break that invariant and aborts assembly instead of
/// being silently absorbed.
pub fn assemble(pages: &[Page]) -> crate::error::Result<RangeTable> {
    let mut table = RangeTable::default();
    let mut current_key = String::new();

    for page in pages {
        if let Some(marker) = &page.marker {
            current_key = group_key_of(marker).to_owned();
        }

        match table.entry_mut(&current_key) {
            Some(entry) => {
                entry.pages += 1;
                if page.marker.is_some() {
                    entry.end_marker = page.marker.clone();
                }
            }
            None => {
                table.entries.push(RangeEntry {
                    group_key: current_key.clone(),
                    id: page.marker.as_deref().map(|m| id_of(m).to_owned()),
                    start_marker: page.marker.clone(),
                    end_marker: None,
                    from: page.index,
                    pages: 1,
                });
            }
        }
    }

    verify_partition(&table, pages)?;
    Ok(table)
}

/// Entries must tile the page sequence with no gaps or overlaps and in
/// ascending page order.
fn verify_partition(table: &RangeTable, pages: &[Page]) -> crate::error::Result<()> {
    let Some(first) = pages.first() else {
        return Ok(());
    };

    let mut expected = first.index;
    for entry in &table.entries {
        if entry.from != expected {
            return Err(DicerError::range_assembly(format!(
                "range '{}' starts at page {} but page {} was expected; \
                 marker sequence does not form contiguous groups",
                entry.group_key, entry.from, expected
            )));
        }
        expected += entry.pages;
    }

    let last = pages.len() + first.index;
    if expected != last {
        return Err(DicerError::range_assembly(format!(
            "assembled ranges cover pages up to {} but the document ends at {}",
            expected - 1,
            last - 1
        )));
    }
    Ok(())
}
