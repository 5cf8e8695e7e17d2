//! Pager links.

use super::{build_link, html_escape};
use crate::facets::types::total_pages;
use crate::facets::{FacetConfig, RequestParameters};

/// Render first/previous/numbered/next/last links for `total` rows.
///
/// Every link carries the full current parameter set with only `page`
/// replaced. Nothing is rendered when everything fits on one page.
pub fn render_pager(
    total: u64,
    config: &FacetConfig,
    params: &RequestParameters,
    base_url: &str,
) -> String {
    let pages = total_pages(total, config.page_size);
    if pages <= 1 {
        return String::new();
    }

    let current = params.page;
    let last = pages - 1;
    let link = |page: u64, label: &str, class: &str| {
        build_link(base_url, label, &params.with_page(page).to_query(), class)
    };

    let mut html = String::from("<div class=\"doj-facet-pager\">\n");

    if current > 0 {
        html.push_str(&link(0, "« First", "doj-facet-pager-first"));
        html.push('\n');
        html.push_str(&link(
            current.min(pages) - 1,
            "‹ Previous",
            "doj-facet-pager-previous",
        ));
        html.push('\n');
    }

    for page in window(current, pages, config.pager_window) {
        let label = (page + 1).to_string();
        if page == current {
            html.push_str(&format!(
                "<span class=\"doj-facet-pager-current\">{}</span>\n",
                html_escape(&label)
            ));
        } else {
            html.push_str(&link(page, &label, "doj-facet-pager-item"));
            html.push('\n');
        }
    }

    if current < last {
        html.push_str(&link(current + 1, "Next ›", "doj-facet-pager-next"));
        html.push('\n');
        html.push_str(&link(last, "Last »", "doj-facet-pager-last"));
        html.push('\n');
    }

    html.push_str("</div>\n");
    html
}

/// Page numbers shown around `current`, at most `size` of them.
fn window(current: u64, pages: u64, size: u64) -> std::ops::Range<u64> {
    let size = size.clamp(1, pages);
    let anchor = current.min(pages - 1);
    let start = anchor.saturating_sub(size / 2);
    let end = (start + size).min(pages);
    end - size..end
}
