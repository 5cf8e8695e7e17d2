//! Keyword search form.

use super::html_escape;
use crate::facets::{QueryValue, RequestParameters};

/// A GET form for the `keys` parameter.
///
/// Facet selections and sort parameters ride along as hidden inputs; the
/// page is dropped so a new search starts at the beginning.
pub fn render_keyword_search(params: &RequestParameters, base_url: &str) -> String {
    let mut html = format!(
        "<form class=\"doj-facet-keyword-search\" method=\"get\" action=\"{}\">\n",
        html_escape(base_url)
    );
    html.push_str(&format!(
        "  <input type=\"text\" name=\"keys\" value=\"{}\" />\n",
        html_escape(params.keywords.as_deref().unwrap_or_default())
    ));

    let mut preserved = params.with_page(0).to_query();
    preserved.remove("keys");
    for (name, value) in &preserved {
        match value {
            QueryValue::Single(v) => hidden_input(&mut html, name, v),
            QueryValue::Multiple(values) => {
                let name = format!("{name}[]");
                for v in values {
                    hidden_input(&mut html, &name, v);
                }
            }
        }
    }

    html.push_str("  <input type=\"submit\" value=\"Search\" />\n</form>\n");
    html
}

fn hidden_input(html: &mut String, name: &str, value: &str) {
    html.push_str(&format!(
        "  <input type=\"hidden\" name=\"{}\" value=\"{}\" />\n",
        html_escape(name),
        html_escape(value)
    ));
}
