//! Query explanation for configuration authors.

use crate::facets::{BuiltQuery, FacetConfig, FacetQueryBuilder, RequestParameters};

/// Every statement a search pass would run for `query`, with bound values.
pub fn explain(config: &FacetConfig, query: &str) -> String {
    let params = RequestParameters::from_query_string(query, config);
    let builder = FacetQueryBuilder::new(config, &params);

    let mut out = format!("-- parameters: {params:?}\n");
    push_query(&mut out, "main query", &builder.build());
    push_query(&mut out, "total count", &builder.build_count());
    for facet in config.facet_columns() {
        push_query(
            &mut out,
            &format!("facet counts: {facet}"),
            &builder.build_facet_counts(facet),
        );
    }
    out
}

fn push_query(out: &mut String, title: &str, query: &BuiltQuery) {
    out.push_str(&format!(
        "\n-- {title}\n{};\n-- values: {:?}\n",
        query.sql, query.values.0
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::FacetColumn;

    #[test]
    fn lists_every_statement() {
        let mut config = FacetConfig::new("grants");
        config.facets.push(FacetColumn {
            column: "state".to_string(),
            label: "State".to_string(),
        });
        let out = explain(&config, "state=CA&page=1");

        assert!(out.contains("-- main query"));
        assert!(out.contains("-- total count"));
        assert!(out.contains("-- facet counts: state"));
        assert!(out.contains("\"CA\""));
    }
}
