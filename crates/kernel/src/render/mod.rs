//! HTML fragments for a faceted search page.
//!
//! Every renderer is a pure function of the configuration, the current
//! request parameters and the outcome of a search pass. Stateful links are
//! produced by round-tripping [`RequestParameters`] through [`build_href`].
//!
//! [`RequestParameters`]: crate::facets::RequestParameters

mod assets;
mod facet_list;
mod links;
mod pager;
mod results;
mod search_bar;

pub use assets::{DEFAULT_SCRIPT, DEFAULT_STYLESHEET, SCRIPT_FILE, STYLESHEET_FILE};
pub use assets::{render_javascript, render_styles};
pub use facet_list::render_facets;
pub use links::{build_href, build_link, build_query_string};
pub use pager::render_pager;
pub use results::render_results;
pub use search_bar::render_keyword_search;

/// Escape text for HTML element content and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
