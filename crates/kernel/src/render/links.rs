//! Link building.

use super::html_escape;
use crate::facets::{QueryValue, RawParams};

/// Serialize query parameters. Lists are written as repeated `key[]` pairs.
///
/// Keys come out in sorted order, so equal parameter sets always produce the
/// same string.
pub fn build_query_string(query: &RawParams) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        match value {
            QueryValue::Single(v) => {
                serializer.append_pair(key, v);
            }
            QueryValue::Multiple(values) => {
                let list_key = format!("{key}[]");
                for v in values {
                    serializer.append_pair(&list_key, v);
                }
            }
        }
    }
    serializer.finish()
}

/// `url` with the query string appended; no `?` for an empty query.
pub fn build_href(url: &str, query: &RawParams) -> String {
    let query_string = build_query_string(query);
    if query_string.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{query_string}")
    }
}

/// An anchor to `url` with `query`, escaped for HTML.
pub fn build_link(url: &str, label: &str, query: &RawParams, css_class: &str) -> String {
    format!(
        r#"<a href="{}" class="{}">{}</a>"#,
        html_escape(&build_href(url, query)),
        html_escape(css_class),
        html_escape(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(value: &str) -> QueryValue {
        QueryValue::Single(value.to_string())
    }

    #[test]
    fn sort_link_has_stable_order() {
        let mut query = RawParams::new();
        query.insert("sort_direction".to_string(), single("DESC"));
        query.insert("sort".to_string(), single("name"));

        assert_eq!(
            build_href("/search", &query),
            "/search?sort=name&sort_direction=DESC"
        );

        let link = build_link("/search", "Name", &query, "cls");
        assert_eq!(
            link,
            r#"<a href="/search?sort=name&amp;sort_direction=DESC" class="cls">Name</a>"#
        );
    }

    #[test]
    fn empty_query_omits_question_mark() {
        assert_eq!(build_href("/search", &RawParams::new()), "/search");
    }

    #[test]
    fn lists_use_bracket_keys() {
        let mut query = RawParams::new();
        query.insert(
            "state".to_string(),
            QueryValue::Multiple(vec!["CA".to_string(), "New York".to_string()]),
        );
        assert_eq!(
            build_query_string(&query),
            "state%5B%5D=CA&state%5B%5D=New+York"
        );
    }

    #[test]
    fn label_and_href_are_escaped() {
        let mut query = RawParams::new();
        query.insert("keys".to_string(), single("\"><script>"));
        let link = build_link("/s", "<b>", &query, "c");
        assert!(!link.contains("<script>"));
        assert!(link.contains("&lt;b&gt;"));
    }
}
