//! Results table.

use super::{build_link, html_escape};
use crate::facets::{
    FacetConfig, FacetQueryBuilder, RequestParameters, ResultColumn, ResultRow, SortDirection,
};

const SORT_LINK_CLASS: &str = "doj-facet-sort-link";

/// Render the results table, or the no-results message when `rows` is empty.
///
/// The relevance column only appears while a keyword search is active.
pub fn render_results(
    rows: &[ResultRow],
    config: &FacetConfig,
    params: &RequestParameters,
    base_url: &str,
) -> String {
    if rows.is_empty() {
        return format!("<p>{}</p>\n", html_escape(&config.no_results_message));
    }

    let builder = FacetQueryBuilder::new(config, params);
    let current_sort = builder.effective_sort();
    let columns: Vec<&ResultColumn> = config
        .result_columns
        .iter()
        .filter(|c| c.column != config.relevance_column || builder.keywords_active())
        .collect();

    let mut out = String::from("<table class=\"doj-facet-search-results\">\n");
    out.push_str("  <thead>\n    <tr>\n");
    for column in &columns {
        let style = column
            .min_width
            .as_deref()
            .filter(|w| !w.is_empty())
            .map(|w| format!(" style=\"min-width:{};\"", html_escape(w)))
            .unwrap_or_default();
        let label = header_label(column, config, params, current_sort.as_ref(), base_url);
        out.push_str(&format!("      <th{style}>{label}</th>\n"));
    }
    out.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for row in rows {
        out.push_str("  <tr>\n");
        for column in &columns {
            let value = html_escape(row.get(&column.column));
            let href = column
                .link_column
                .as_deref()
                .map(|link| row.get(link))
                .filter(|href| !href.is_empty());
            match href {
                Some(href) => {
                    out.push_str(&format!(
                        "    <td><a href=\"{}\">{value}</a></td>\n",
                        html_escape(href)
                    ));
                }
                None => {
                    out.push_str(&format!("    <td>{value}</td>\n"));
                }
            }
        }
        out.push_str("  </tr>\n");
    }

    out.push_str("  </tbody>\n</table>\n");
    out
}

/// Header text; a sort link for sortable columns.
///
/// The current sort column links to the opposite direction and carries a
/// class naming its current one. Other columns link to their default.
fn header_label(
    column: &ResultColumn,
    config: &FacetConfig,
    params: &RequestParameters,
    current_sort: Option<&(String, SortDirection)>,
    base_url: &str,
) -> String {
    if !config.is_sortable(&column.column) {
        return html_escape(&column.label);
    }

    let (direction, class) = match current_sort {
        Some((sorted, direction)) if *sorted == column.column => (
            direction.toggle(),
            format!(
                "{SORT_LINK_CLASS} {SORT_LINK_CLASS}-{}",
                direction.as_str().to_ascii_lowercase()
            ),
        ),
        _ => (
            config.default_direction(&column.column),
            SORT_LINK_CLASS.to_string(),
        ),
    };

    let query = params.with_sort(&column.column, direction).to_query();
    build_link(base_url, &column.label, &query, &class)
}
