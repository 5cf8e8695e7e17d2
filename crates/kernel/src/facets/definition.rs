//! Facet configuration: which table, which columns, how they behave.
//!
//! Loaded once at startup and shared read-only across requests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::{FacetColumn, ResultColumn, SortDirection};
use crate::error::FacetError;

/// Control parameters accepted alongside the facet columns.
pub const RESERVED_PARAMETERS: [&str; 5] = ["keys", "sort", "sort_direction", "page", "full_text"];

/// Static description of a faceted table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetConfig {
    /// Table (or view) to query.
    pub database_table: String,

    /// Facet columns in display order.
    #[serde(default)]
    pub facets: Vec<FacetColumn>,

    /// Alias column -> main facet column. A filter on the main column also
    /// matches rows holding the value in the alias column.
    #[serde(default)]
    pub additional_columns: BTreeMap<String, String>,

    /// Columns that must be non-null and non-empty for a row to be shown.
    #[serde(default)]
    pub required_columns: Vec<String>,

    /// Columns searched by the keyword box.
    #[serde(default)]
    pub keyword_columns: Vec<String>,

    /// Sortable columns and their default direction.
    #[serde(default)]
    pub sort_directions: BTreeMap<String, SortDirection>,

    /// Columns of the results table in display order.
    #[serde(default)]
    pub result_columns: Vec<ResultColumn>,

    #[serde(default = "default_no_results_message")]
    pub no_results_message: String,

    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Name of the synthetic relevance column exposed while searching.
    #[serde(default = "default_relevance_column")]
    pub relevance_column: String,

    /// PostgreSQL text search configuration used for keyword matching.
    #[serde(default = "default_text_search_config")]
    pub text_search_config: String,

    /// Number of numbered links shown by the pager.
    #[serde(default = "default_pager_window")]
    pub pager_window: u64,

    /// URL prefix of the stylesheet and script.
    #[serde(default = "default_asset_path")]
    pub asset_path: String,
}

fn default_no_results_message() -> String {
    "No results found.".to_string()
}

fn default_page_size() -> u64 {
    20
}

fn default_relevance_column() -> String {
    "relevance".to_string()
}

fn default_text_search_config() -> String {
    "english".to_string()
}

fn default_pager_window() -> u64 {
    9
}

fn default_asset_path() -> String {
    "assets".to_string()
}

impl FacetConfig {
    /// Minimal configuration for a table with no facets.
    pub fn new(database_table: impl Into<String>) -> Self {
        Self {
            database_table: database_table.into(),
            facets: Vec::new(),
            additional_columns: BTreeMap::new(),
            required_columns: Vec::new(),
            keyword_columns: Vec::new(),
            sort_directions: BTreeMap::new(),
            result_columns: Vec::new(),
            no_results_message: default_no_results_message(),
            page_size: default_page_size(),
            relevance_column: default_relevance_column(),
            text_search_config: default_text_search_config(),
            pager_window: default_pager_window(),
            asset_path: default_asset_path(),
        }
    }

    /// Load and validate a configuration file.
    ///
    /// The format follows the extension: `.toml`, `.yml`/`.yaml` or `.json`.
    pub fn load(path: &Path) -> Result<Self, FacetError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FacetError::config(format!("cannot read {}: {e}", path.display()))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("yml" | "yaml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(FacetError::config(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, FacetError> {
        let config: Self =
            toml::from_str(text).map_err(|e| FacetError::config(format!("invalid TOML: {e}")))?;
        config.validated()
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, FacetError> {
        let config: Self = serde_yml::from_str(text)
            .map_err(|e| FacetError::config(format!("invalid YAML: {e}")))?;
        config.validated()
    }

    pub fn from_json_str(text: &str) -> Result<Self, FacetError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| FacetError::config(format!("invalid JSON: {e}")))?;
        config.validated()
    }

    /// Check every invariant the query builder relies on.
    ///
    /// Identifiers are interpolated into SQL, so each one must pass
    /// [`is_safe_identifier`].
    pub fn validated(self) -> Result<Self, FacetError> {
        check_identifier("database table", &self.database_table)?;
        check_identifier("text search configuration", &self.text_search_config)?;
        check_identifier("relevance column", &self.relevance_column)?;

        if self.page_size == 0 {
            return Err(FacetError::config("page size must be greater than 0"));
        }

        let mut seen = BTreeSet::new();
        for facet in &self.facets {
            check_identifier("facet column", &facet.column)?;
            if RESERVED_PARAMETERS.contains(&facet.column.as_str()) {
                return Err(FacetError::config(format!(
                    "facet column `{}` collides with a reserved parameter",
                    facet.column
                )));
            }
            if !seen.insert(facet.column.as_str()) {
                return Err(FacetError::config(format!(
                    "facet column `{}` is listed twice",
                    facet.column
                )));
            }
        }

        for (alias, main) in &self.additional_columns {
            check_identifier("additional column", alias)?;
            if !seen.contains(main.as_str()) {
                return Err(FacetError::config(format!(
                    "additional column `{alias}` maps to `{main}`, which is not a facet column"
                )));
            }
        }

        for column in &self.required_columns {
            check_identifier("required column", column)?;
        }
        for column in &self.keyword_columns {
            check_identifier("keyword column", column)?;
        }
        for column in self.sort_directions.keys() {
            check_identifier("sortable column", column)?;
        }
        for result in &self.result_columns {
            check_identifier("result column", &result.column)?;
            if let Some(link) = &result.link_column {
                check_identifier("link column", link)?;
            }
        }

        if self.keyword_columns.is_empty() {
            warn!(
                table = %self.database_table,
                "no keyword columns configured; keyword searches will be ignored"
            );
        }

        Ok(self)
    }

    /// Facet column names in display order.
    pub fn facet_columns(&self) -> impl Iterator<Item = &str> {
        self.facets.iter().map(|f| f.column.as_str())
    }

    pub fn is_facet(&self, column: &str) -> bool {
        self.facets.iter().any(|f| f.column == column)
    }

    pub fn facet_label(&self, column: &str) -> Option<&str> {
        self.facets
            .iter()
            .find(|f| f.column == column)
            .map(|f| f.label.as_str())
    }

    /// Facet columns plus the reserved control parameters.
    pub fn allowed_parameters(&self) -> BTreeSet<String> {
        self.facet_columns()
            .chain(RESERVED_PARAMETERS)
            .map(str::to_string)
            .collect()
    }

    /// The facet column itself followed by every alias mapped onto it.
    pub fn columns_to_check<'a>(&'a self, facet: &'a str) -> Vec<&'a str> {
        std::iter::once(facet)
            .chain(
                self.additional_columns
                    .iter()
                    .filter(|(_, main)| main.as_str() == facet)
                    .map(|(alias, _)| alias.as_str()),
            )
            .collect()
    }

    pub fn is_sortable(&self, column: &str) -> bool {
        self.sort_directions.contains_key(column)
    }

    /// Configured default direction; the relevance column defaults to DESC.
    pub fn default_direction(&self, column: &str) -> SortDirection {
        match self.sort_directions.get(column) {
            Some(direction) => *direction,
            None if column == self.relevance_column => SortDirection::Desc,
            None => SortDirection::Asc,
        }
    }

    /// Whether keyword search can run against this table.
    pub fn supports_keywords(&self) -> bool {
        !self.keyword_columns.is_empty()
    }
}

/// Validate a SQL identifier name (table/column names).
/// Allows only `[a-zA-Z_][a-zA-Z0-9_]*` with max 63 chars (PostgreSQL limit).
pub fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
}

fn check_identifier(what: &str, name: &str) -> Result<(), FacetError> {
    if is_safe_identifier(name) {
        Ok(())
    } else {
        let shown: String = name.chars().take(64).collect();
        Err(FacetError::config(format!("unsafe {what} name: '{shown}'")))
    }
}
