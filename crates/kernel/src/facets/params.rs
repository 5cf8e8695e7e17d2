//! Request parameter parsing.
//!
//! Turns a raw query string into [`RequestParameters`], keeping only the
//! parameters the facet configuration allows. Bad values never fail the
//! request: they are logged and dropped or replaced by a default.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use super::definition::FacetConfig;
use super::keywords::to_websearch_query;
use super::types::SortDirection;
use crate::error::ParameterError;

/// A raw query parameter value: one string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),
    Multiple(Vec<String>),
}

/// Raw query parameters keyed by name, with `name[]` folded into `name`.
pub type RawParams = BTreeMap<String, QueryValue>;

/// Parse a query string.
///
/// `col[]=a&col[]=b` and `col[0]=a` produce a list under `col`; a plain key
/// that repeats is also collected into a list.
pub fn parse_query_string(query: &str) -> RawParams {
    let mut params = RawParams::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let (name, is_list) = match key.find('[') {
            Some(open) if key.ends_with(']') => (&key[..open], true),
            _ => (key.as_ref(), false),
        };
        if name.is_empty() {
            continue;
        }

        let value = value.into_owned();
        match params.remove(name) {
            None if is_list => {
                params.insert(name.to_string(), QueryValue::Multiple(vec![value]));
            }
            None => {
                params.insert(name.to_string(), QueryValue::Single(value));
            }
            Some(QueryValue::Single(existing)) => {
                params.insert(name.to_string(), QueryValue::Multiple(vec![existing, value]));
            }
            Some(QueryValue::Multiple(mut values)) => {
                values.push(value);
                params.insert(name.to_string(), QueryValue::Multiple(values));
            }
        }
    }

    params
}

/// Validated parameters of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestParameters {
    /// Selected values per facet column. Values are unique per facet.
    pub facet_selections: BTreeMap<String, BTreeSet<String>>,

    /// Free-text keyword search.
    pub keywords: Option<String>,

    /// Requested sort column (always a configured sortable column).
    pub sort_column: Option<String>,

    pub sort_direction: Option<SortDirection>,

    /// Current page, 0-indexed.
    pub page: u64,

    /// Reserved parameter carried through links unchanged.
    pub full_text: Option<String>,
}

impl RequestParameters {
    /// Parse raw parameters against the configuration's allow-list.
    pub fn parse(raw: &RawParams, config: &FacetConfig) -> Self {
        let mut params = Self::default();

        for name in config.allowed_parameters() {
            let Some(value) = raw.get(&name) else {
                continue;
            };

            if config.is_facet(&name) {
                let values: BTreeSet<String> = match value {
                    QueryValue::Single(v) => std::iter::once(v.clone()).collect(),
                    QueryValue::Multiple(vs) => vs.iter().cloned().collect(),
                };
                let values: BTreeSet<String> = values
                    .into_iter()
                    .filter(|v| !v.is_empty())
                    .filter(|v| {
                        let storable = is_storable(v);
                        if !storable {
                            debug!(error = %invalid(&name, v), "dropping facet value");
                        }
                        storable
                    })
                    .collect();
                if !values.is_empty() {
                    params.facet_selections.insert(name, values);
                }
                continue;
            }

            let value = match value {
                QueryValue::Single(v) => v.as_str(),
                QueryValue::Multiple(_) => {
                    let err = ParameterError::UnexpectedList { param: name };
                    warn!(error = %err, "dropping parameter");
                    continue;
                }
            };
            if value.is_empty() {
                continue;
            }
            if !is_storable(value) {
                debug!(error = %invalid(&name, value), "dropping parameter");
                continue;
            }

            match name.as_str() {
                "keys" => params.keywords = Some(value.to_string()),
                "sort" => match parse_sort_column(value, config) {
                    Ok(column) => params.sort_column = Some(column),
                    Err(err) => debug!(error = %err, "dropping sort parameter"),
                },
                "sort_direction" => match SortDirection::parse(value) {
                    Some(direction) => params.sort_direction = Some(direction),
                    None => debug!(
                        error = %invalid("sort_direction", value),
                        "dropping sort direction"
                    ),
                },
                "page" => {
                    params.page = parse_page(value).unwrap_or_else(|err| {
                        debug!(error = %err, "falling back to first page");
                        0
                    });
                }
                "full_text" => params.full_text = Some(value.to_string()),
                _ => {}
            }
        }

        params
    }

    /// Parse a query string directly.
    pub fn from_query_string(query: &str, config: &FacetConfig) -> Self {
        Self::parse(&parse_query_string(query), config)
    }

    /// Trimmed keywords, if any remain.
    pub fn active_keywords(&self) -> Option<&str> {
        self.keywords
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Keywords in `websearch_to_tsquery` syntax, when a keyword search
    /// applies to this request.
    pub fn keyword_query(&self, config: &FacetConfig) -> Option<String> {
        if !config.supports_keywords() {
            return None;
        }
        let query = to_websearch_query(self.active_keywords()?);
        (!query.is_empty()).then_some(query)
    }

    pub fn is_selected(&self, facet: &str, value: &str) -> bool {
        self.facet_selections
            .get(facet)
            .is_some_and(|values| values.contains(value))
    }

    /// The column results are ordered by, with its direction.
    ///
    /// An explicit sort wins. Otherwise an active keyword search orders by
    /// relevance, descending unless a direction was requested.
    pub fn effective_sort(&self, config: &FacetConfig) -> Option<(String, SortDirection)> {
        let keywords_active = self.keyword_query(config).is_some();

        if let Some(column) = &self.sort_column {
            let relevance = *column == config.relevance_column;
            if config.is_sortable(column) && (!relevance || keywords_active) {
                let direction = self
                    .sort_direction
                    .unwrap_or_else(|| config.default_direction(column));
                return Some((column.clone(), direction));
            }
        }

        if keywords_active {
            let direction = self
                .sort_direction
                .filter(|_| self.sort_column.is_none())
                .unwrap_or(SortDirection::Desc);
            return Some((config.relevance_column.clone(), direction));
        }

        None
    }

    /// The parameters as link query values, ready for [`build_href`].
    ///
    /// [`build_href`]: crate::render::build_href
    pub fn to_query(&self) -> RawParams {
        let mut query = RawParams::new();
        for (facet, values) in &self.facet_selections {
            query.insert(
                facet.clone(),
                QueryValue::Multiple(values.iter().cloned().collect()),
            );
        }
        if let Some(keywords) = &self.keywords {
            query.insert("keys".to_string(), QueryValue::Single(keywords.clone()));
        }
        if let Some(sort) = &self.sort_column {
            query.insert("sort".to_string(), QueryValue::Single(sort.clone()));
        }
        if let Some(direction) = self.sort_direction {
            query.insert(
                "sort_direction".to_string(),
                QueryValue::Single(direction.to_string()),
            );
        }
        if self.page > 0 {
            query.insert("page".to_string(), QueryValue::Single(self.page.to_string()));
        }
        if let Some(full_text) = &self.full_text {
            query.insert("full_text".to_string(), QueryValue::Single(full_text.clone()));
        }
        query
    }

    /// Copy with one facet value added or removed, back on the first page.
    pub fn with_toggled_value(&self, facet: &str, value: &str) -> Self {
        let mut toggled = self.clone();
        toggled.page = 0;
        let values = toggled.facet_selections.entry(facet.to_string()).or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        if values.is_empty() {
            toggled.facet_selections.remove(facet);
        }
        toggled
    }

    /// Copy pointing at another page.
    pub fn with_page(&self, page: u64) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Copy sorted by `column` in `direction`.
    pub fn with_sort(&self, column: &str, direction: SortDirection) -> Self {
        Self {
            sort_column: Some(column.to_string()),
            sort_direction: Some(direction),
            ..self.clone()
        }
    }
}

/// Parse a page number. Negative and non-numeric input is rejected.
pub fn parse_page(value: &str) -> Result<u64, ParameterError> {
    let page: i64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("page", value))?;
    u64::try_from(page).map_err(|_| invalid("page", value))
}

fn parse_sort_column(value: &str, config: &FacetConfig) -> Result<String, ParameterError> {
    if config.is_sortable(value) {
        Ok(value.to_string())
    } else {
        Err(ParameterError::UnknownColumn {
            column: value.to_string(),
            kind: "sortable",
        })
    }
}

/// PostgreSQL text cannot hold NUL bytes.
fn is_storable(value: &str) -> bool {
    !value.contains('\0')
}

fn invalid(param: &str, value: &str) -> ParameterError {
    ParameterError::InvalidValue {
        param: param.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::types::FacetColumn;

    fn config() -> FacetConfig {
        let mut config = FacetConfig::new("grants");
        config.facets = vec![
            FacetColumn {
                column: "state".to_string(),
                label: "State".to_string(),
            },
            FacetColumn {
                column: "program".to_string(),
                label: "Program".to_string(),
            },
        ];
        config.keyword_columns = vec!["title".to_string()];
        config
            .sort_directions
            .insert("title".to_string(), SortDirection::Asc);
        config
            .sort_directions
            .insert("relevance".to_string(), SortDirection::Desc);
        config
    }

    #[test]
    fn query_string_folds_array_keys() {
        let raw = parse_query_string("state[]=CA&state[]=NV&keys=water&program[3]=A");
        assert_eq!(
            raw.get("state"),
            Some(&QueryValue::Multiple(vec!["CA".to_string(), "NV".to_string()]))
        );
        assert_eq!(raw.get("keys"), Some(&QueryValue::Single("water".to_string())));
        assert_eq!(
            raw.get("program"),
            Some(&QueryValue::Multiple(vec!["A".to_string()]))
        );
    }

    #[test]
    fn repeated_plain_keys_become_lists() {
        let raw = parse_query_string("state=CA&state=NV");
        assert_eq!(
            raw.get("state"),
            Some(&QueryValue::Multiple(vec!["CA".to_string(), "NV".to_string()]))
        );
    }

    #[test]
    fn nul_bytes_are_dropped() {
        let params = RequestParameters::from_query_string(
            "state=CA%00&state=NV&program[]=%00&keys=wa%00ter&full_text=x%00",
            &config(),
        );
        assert_eq!(
            params.facet_selections.get("state"),
            Some(&BTreeSet::from(["NV".to_string()]))
        );
        assert!(!params.facet_selections.contains_key("program"));
        assert_eq!(params.keywords, None);
        assert_eq!(params.full_text, None);
        assert_eq!(params.keyword_query(&config()), None);
    }

    #[test]
    fn facets_collect_unique_values() {
        let params = RequestParameters::from_query_string(
            "state[]=CA&state[]=CA&state[]=NV&program=Legal",
            &config(),
        );
        assert_eq!(params.facet_selections["state"].len(), 2);
        assert!(params.is_selected("program", "Legal"));
    }

    #[test]
    fn unknown_and_empty_parameters_are_dropped() {
        let params = RequestParameters::from_query_string(
            "secret=1&state[]=&keys=&sort=password",
            &config(),
        );
        assert!(params.facet_selections.is_empty());
        assert!(params.keywords.is_none());
        assert!(params.sort_column.is_none());
    }

    #[test]
    fn list_for_scalar_parameter_is_dropped() {
        let params = RequestParameters::from_query_string("keys[]=a&keys[]=b&page=2", &config());
        assert!(params.keywords.is_none());
        assert_eq!(params.page, 2);
    }

    #[test]
    fn page_falls_back_to_zero() {
        let cfg = config();
        assert_eq!(RequestParameters::from_query_string("", &cfg).page, 0);
        assert_eq!(RequestParameters::from_query_string("page=-3", &cfg).page, 0);
        assert_eq!(RequestParameters::from_query_string("page=abc", &cfg).page, 0);
        assert_eq!(RequestParameters::from_query_string("page=4", &cfg).page, 4);
    }

    #[test]
    fn parse_page_errors() {
        assert_eq!(parse_page(" 7 "), Ok(7));
        assert!(matches!(
            parse_page("-1"),
            Err(ParameterError::InvalidValue { .. })
        ));
    }

    #[test]
    fn sort_direction_accepts_any_case() {
        let params =
            RequestParameters::from_query_string("sort=title&sort_direction=desc", &config());
        assert_eq!(params.sort_column.as_deref(), Some("title"));
        assert_eq!(params.sort_direction, Some(SortDirection::Desc));
    }

    #[test]
    fn effective_sort_prefers_explicit_column() {
        let cfg = config();
        let params = RequestParameters::from_query_string("keys=water&sort=title", &cfg);
        assert_eq!(
            params.effective_sort(&cfg),
            Some(("title".to_string(), SortDirection::Asc))
        );
    }

    #[test]
    fn effective_sort_defaults_to_relevance_with_keywords() {
        let cfg = config();
        let params = RequestParameters::from_query_string("keys=water", &cfg);
        assert_eq!(
            params.effective_sort(&cfg),
            Some(("relevance".to_string(), SortDirection::Desc))
        );

        let params = RequestParameters::from_query_string("", &cfg);
        assert_eq!(params.effective_sort(&cfg), None);
    }

    #[test]
    fn relevance_sort_needs_keywords() {
        let cfg = config();
        let params = RequestParameters::from_query_string("sort=relevance", &cfg);
        assert_eq!(params.effective_sort(&cfg), None);
    }

    #[test]
    fn toggling_values() {
        let cfg = config();
        let params = RequestParameters::from_query_string("state=CA&page=3", &cfg);

        let added = params.with_toggled_value("state", "NV");
        assert!(added.is_selected("state", "NV"));
        assert_eq!(added.page, 0);

        let removed = params.with_toggled_value("state", "CA");
        assert!(!removed.facet_selections.contains_key("state"));
    }

    #[test]
    fn round_trips_through_query() {
        let cfg = config();
        let params = RequestParameters::from_query_string(
            "state[]=CA&state[]=NV&keys=clean+water&sort=title&sort_direction=DESC&page=2&full_text=1",
            &cfg,
        );
        let again = RequestParameters::parse(&params.to_query(), &cfg);
        assert_eq!(params, again);
    }
}
