//! Facet search types.
//!
//! Provides the value types shared by the query builder, the facet counter
//! and the renderers:
//! - SortDirection: ASC/DESC with toggling
//! - FacetColumn / ResultColumn: configured columns
//! - ResultRow, FacetCountEntry, SearchOutcome: per-request results

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `ASC` / `DESC`, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    /// The opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SortDirection> for sea_query::Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => sea_query::Order::Asc,
            SortDirection::Desc => sea_query::Order::Desc,
        }
    }
}

/// A filterable column and the label shown above its value list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetColumn {
    pub column: String,
    pub label: String,
}

/// A column shown in the results table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultColumn {
    pub column: String,

    /// Header label.
    pub label: String,

    /// CSS length used as the header's `min-width`.
    #[serde(default)]
    pub min_width: Option<String>,

    /// Sibling column whose value becomes the cell's link target.
    #[serde(default)]
    pub link_column: Option<String>,
}

/// One materialized result row: column name to display string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ResultRow(BTreeMap<String, String>);

impl ResultRow {
    /// Value of a column, empty when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map(String::as_str).unwrap_or_default()
    }

    /// Build a row from a JSON object as produced by `row_to_json`.
    ///
    /// Nulls become empty strings; numbers and booleans use their JSON text.
    pub fn from_json(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(object) = value else {
            return Self::default();
        };
        Self(
            object
                .into_iter()
                .map(|(column, value)| (column, json_to_display(value)))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResultRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn json_to_display(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Number of rows that hold `value` in a facet column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetCountEntry {
    pub facet_column: String,
    pub value: String,
    pub count: u64,
}

/// All count entries for one facet, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetCounts {
    pub column: String,
    pub label: String,
    pub entries: Vec<FacetCountEntry>,
}

/// Result of one render pass: a page of rows, the total and facet counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub rows: Vec<ResultRow>,

    /// Total matching rows (before paging).
    pub total: u64,

    /// Current page (0-indexed).
    pub page: u64,

    pub page_size: u64,

    pub total_pages: u64,

    pub has_next: bool,

    pub has_prev: bool,

    /// Per-facet counts in configuration order.
    pub facets: Vec<FacetCounts>,
}

impl SearchOutcome {
    /// Create an outcome with paging calculations.
    pub fn new(
        rows: Vec<ResultRow>,
        total: u64,
        page: u64,
        page_size: u64,
        facets: Vec<FacetCounts>,
    ) -> Self {
        let total_pages = total_pages(total, page_size);
        Self {
            rows,
            total,
            page,
            page_size,
            total_pages,
            has_next: page + 1 < total_pages,
            has_prev: page > 0,
            facets,
        }
    }
}

/// Number of pages needed for `total` rows.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_direction() {
        assert_eq!(SortDirection::Asc.toggle().toggle(), SortDirection::Asc);
        assert_eq!(SortDirection::Desc.toggle().toggle(), SortDirection::Desc);
        assert_eq!(SortDirection::Asc.toggle(), SortDirection::Desc);
    }

    #[test]
    fn sort_direction_parsing() {
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse(" asc "), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("sideways"), None);
    }

    #[test]
    fn sort_direction_serialization() {
        let json = serde_json::to_string(&SortDirection::Desc).unwrap();
        assert_eq!(json, "\"DESC\"");
    }

    #[test]
    fn row_from_json_stringifies_values() {
        let row = ResultRow::from_json(serde_json::json!({
            "name": "Acme",
            "amount": 1200,
            "active": true,
            "note": null
        }));
        assert_eq!(row.get("name"), "Acme");
        assert_eq!(row.get("amount"), "1200");
        assert_eq!(row.get("active"), "true");
        assert_eq!(row.get("note"), "");
        assert_eq!(row.get("missing"), "");
    }

    #[test]
    fn outcome_paging() {
        let outcome = SearchOutcome::new(vec![], 45, 1, 20, vec![]);
        assert_eq!(outcome.total_pages, 3);
        assert!(outcome.has_next);
        assert!(outcome.has_prev);

        let last = SearchOutcome::new(vec![], 45, 2, 20, vec![]);
        assert!(!last.has_next);

        let empty = SearchOutcome::new(vec![], 0, 0, 20, vec![]);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }
}
