//! Facet lists with per-value counts.

use super::{build_link, html_escape};
use crate::facets::{FacetCounts, RequestParameters};

const ITEM_CLASS: &str = "doj-facet-item";
const ACTIVE_ITEM_CLASS: &str = "doj-facet-item doj-facet-item-active";

/// Render one block per facet, in the order given.
///
/// Each value links to the current search with that value toggled and the
/// page reset. Selected values that no longer occur in the counts are still
/// listed (with a zero count) so they can be removed.
pub fn render_facets(facets: &[FacetCounts], params: &RequestParameters, base_url: &str) -> String {
    let mut html = String::new();

    for facet in facets {
        let selected = params.facet_selections.get(&facet.column);
        let mut items: Vec<(&str, u64)> = facet
            .entries
            .iter()
            .map(|e| (e.value.as_str(), e.count))
            .collect();
        if let Some(selected) = selected {
            for value in selected {
                if !items.iter().any(|(v, _)| *v == value.as_str()) {
                    items.push((value.as_str(), 0));
                }
            }
        }
        if items.is_empty() {
            continue;
        }

        html.push_str(&format!(
            "<div class=\"doj-facet doj-facet-{}\">\n  <h3 class=\"doj-facet-label\">{}</h3>\n  <ul class=\"doj-facet-items\">\n",
            html_escape(&facet.column),
            html_escape(&facet.label)
        ));
        for (value, count) in items {
            let class = if params.is_selected(&facet.column, value) {
                ACTIVE_ITEM_CLASS
            } else {
                ITEM_CLASS
            };
            let query = params.with_toggled_value(&facet.column, value).to_query();
            let label = format!("{value} ({count})");
            html.push_str(&format!(
                "    <li>{}</li>\n",
                build_link(base_url, &label, &query, class)
            ));
        }
        html.push_str("  </ul>\n</div>\n");
    }

    html
}
