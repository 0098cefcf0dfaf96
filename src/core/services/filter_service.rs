use std::cmp::Ordering;
use std::str::FromStr;

use crate::core::models::edit_record::EditRecord;

/// Which records to keep from a fetched result set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditFilter {
    #[default]
    All,
    /// Case-insensitive substring of the editor's name.
    User(String),
    /// Case-insensitive substring of any tag.
    Tag(String),
    /// Minimum absolute byte change, as typed by the user.
    ///
    /// Text that does not parse as a non-negative integer disables the filter.
    MinBytes(String),
}

impl EditFilter {
    pub fn matches(&self, edit: &EditRecord) -> bool {
        match self {
            EditFilter::All => true,
            EditFilter::User(needle) => {
                needle.is_empty() || edit.user.to_lowercase().contains(&needle.to_lowercase())
            }
            EditFilter::Tag(needle) => {
                let needle = needle.to_lowercase();
                needle.is_empty() || edit.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            }
            EditFilter::MinBytes(raw) => match raw.trim().parse::<u64>() {
                Ok(threshold) => edit.size.diff().unsigned_abs() >= threshold,
                Err(_) => true,
            },
        }
    }
}

/// Keep the records that pass `filter`, preserving order.
pub fn apply_filter(edits: &[EditRecord], filter: &EditFilter) -> Vec<EditRecord> {
    edits.iter().filter(|e| filter.matches(e)).cloned().collect()
}

/// Field an edit list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Timestamp,
    Size,
    Property,
    User,
    Title,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "timestamp" | "time" | "date" => Ok(SortField::Timestamp),
            "size" | "diff" => Ok(SortField::Size),
            "property" => Ok(SortField::Property),
            "user" => Ok(SortField::User),
            "title" | "entity" => Ok(SortField::Title),
            other => Err(format!(
                "unknown sort field '{other}' (expected timestamp, size, property, user or title)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort order '{other}' (expected asc or desc)")),
        }
    }
}

fn compare(a: &EditRecord, b: &EditRecord, field: SortField) -> Ordering {
    match field {
        SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortField::Size => a.size.diff().cmp(&b.size.diff()),
        SortField::Property => {
            let a = a.property.map(|p| p.as_str()).unwrap_or("");
            let b = b.property.map(|p| p.as_str()).unwrap_or("");
            a.cmp(b)
        }
        SortField::User => a.user.to_lowercase().cmp(&b.user.to_lowercase()),
        SortField::Title => a.title.cmp(&b.title),
    }
}

/// Stable sort by `field` in `direction`. Equal keys keep their input order.
pub fn sort_edits(edits: &mut [EditRecord], field: SortField, direction: SortDirection) {
    edits.sort_by(|a, b| {
        let ord = compare(a, b, field);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number that was requested.
    pub page: usize,
    pub pages: usize,
    pub total: usize,
}

/// Slice out 1-based `page` of size `per_page`.
///
/// `per_page == 0` returns everything as a single page; pages past the end
/// are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let total = items.len();
    if per_page == 0 {
        return Page {
            items,
            page: 1,
            pages: 1,
            total,
        };
    }

    let pages = total.div_ceil(per_page).max(1);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);
    Page {
        items: &items[start..end],
        page,
        pages,
        total,
    }
}
