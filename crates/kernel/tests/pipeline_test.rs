#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Query pipeline tests that need no database.
//!
//! Covers configuration loading, parameter parsing, SQL generation and
//! rendering as a caller sees them through the public API.

mod common;

use sea_query::{PostgresQueryBuilder, Value};
use tablefacets_kernel::explain::explain;
use tablefacets_kernel::facets::keywords::tokenize_quoted;
use tablefacets_kernel::facets::{
    FacetConfig, FacetCountEntry, FacetCounts, FacetQueryBuilder, RequestParameters,
    SortDirection, parse_query_string,
};
use tablefacets_kernel::render::{render_facets, render_pager, render_results};

fn config() -> FacetConfig {
    common::facet_config("grants")
}

fn where_clause(sql: &str) -> &str {
    let start = sql.find(" WHERE ").map(|i| i + 7).unwrap_or(sql.len());
    let end = [" ORDER BY ", " LIMIT "]
        .iter()
        .filter_map(|marker| sql[start..].find(marker).map(|i| start + i))
        .min()
        .unwrap_or(sql.len());
    &sql[start..end]
}

// -------------------------------------------------------------------------
// Query builder properties
// -------------------------------------------------------------------------

#[test]
fn no_filters_leaves_only_required_columns() {
    let cfg = config();
    let params = RequestParameters::from_query_string("", &cfg);
    let sql = FacetQueryBuilder::new(&cfg, &params)
        .main_statement()
        .to_string(PostgresQueryBuilder);

    let clause = where_clause(&sql);
    assert!(clause.contains("\"title\""), "{clause}");
    assert!(!clause.contains("state"), "{clause}");
    assert!(!clause.contains("program"), "{clause}");
    assert!(!clause.contains("tsvector"), "{clause}");
}

#[test]
fn facets_are_conjunctive_across_and_disjunctive_within() {
    let cfg = config();
    let params = RequestParameters::from_query_string("state[]=CA&state[]=NV&program=Water", &cfg);
    let sql = FacetQueryBuilder::new(&cfg, &params)
        .main_statement()
        .to_string(PostgresQueryBuilder);

    let clause = where_clause(&sql);
    assert!(clause.contains("CAST(\"state\" AS TEXT) IN ('CA', 'NV')"), "{clause}");
    assert!(
        clause.contains("CAST(\"secondary_state\" AS TEXT) IN ('CA', 'NV')"),
        "{clause}"
    );
    assert!(clause.contains(" OR "), "{clause}");
    assert!(clause.contains("CAST(\"program\" AS TEXT) IN ('Water')"), "{clause}");
    assert_eq!(clause.matches(" OR ").count(), 1, "{clause}");
}

#[test]
fn every_user_value_is_bound() {
    let cfg = config();
    let params = RequestParameters::from_query_string(
        "state=Robert%27%29%3B+DROP+TABLE+grants%3B--&keys=x",
        &cfg,
    );
    let built = FacetQueryBuilder::new(&cfg, &params).build();

    assert!(!built.sql.contains("Robert"), "{}", built.sql);
    assert!(!built.sql.contains("DROP"), "{}", built.sql);
    assert!(
        built
            .values
            .0
            .iter()
            .any(|v| matches!(v, Value::String(Some(s)) if s.starts_with("Robert")))
    );
}

#[test]
fn pagination_offsets_by_page_size() {
    let mut cfg = config();
    cfg.page_size = 20;
    let params = RequestParameters::from_query_string("page=2", &cfg);
    let sql = FacetQueryBuilder::new(&cfg, &params)
        .main_statement()
        .to_string(PostgresQueryBuilder);
    assert!(sql.ends_with("LIMIT 20 OFFSET 40"), "{sql}");

    for query in ["", "page=-1", "page=two"] {
        let params = RequestParameters::from_query_string(query, &cfg);
        assert_eq!(params.page, 0, "{query}");
    }
}

#[test]
fn facet_counts_are_independent_of_own_selection() {
    let cfg = config();
    let both = RequestParameters::from_query_string("state=CA&program=Water", &cfg);
    let other = RequestParameters::from_query_string("program=Water", &cfg);

    assert_eq!(
        FacetQueryBuilder::new(&cfg, &both).build_facet_counts("state"),
        FacetQueryBuilder::new(&cfg, &other).build_facet_counts("state")
    );
    assert_ne!(
        FacetQueryBuilder::new(&cfg, &both).build_facet_counts("program"),
        FacetQueryBuilder::new(&cfg, &other).build_facet_counts("program")
    );
}

#[test]
fn keyword_search_defaults_to_relevance() {
    let cfg = config();
    let params = RequestParameters::from_query_string("keys=water", &cfg);
    assert_eq!(
        FacetQueryBuilder::new(&cfg, &params).effective_sort(),
        Some(("relevance".to_string(), SortDirection::Desc))
    );
}

#[test]
fn sort_toggle_round_trips() {
    assert_eq!(SortDirection::Asc.toggle().toggle(), SortDirection::Asc);
}

#[test]
fn tokenizer_examples() {
    assert_eq!(
        tokenize_quoted(r#"foo "bar baz" 'qux'"#),
        vec!["foo", "bar baz", "qux"]
    );
    assert_eq!(tokenize_quoted(r#"foo "bar"#), vec!["foo", "bar"]);
}

#[test]
fn unknown_parameters_never_reach_the_query() {
    let cfg = config();
    let raw = parse_query_string("password=hunter2&sort=password&state[]=CA");
    let params = RequestParameters::parse(&raw, &cfg);

    assert!(params.sort_column.is_none());
    assert_eq!(params.facet_selections.len(), 1);
    let sql = FacetQueryBuilder::new(&cfg, &params)
        .main_statement()
        .to_string(PostgresQueryBuilder);
    assert!(!sql.contains("password"), "{sql}");
    assert!(!sql.contains("hunter2"), "{sql}");
}

// -------------------------------------------------------------------------
// Rendering
// -------------------------------------------------------------------------

#[test]
fn empty_results_render_message_not_table() {
    let cfg = config();
    let html = render_results(&[], &cfg, &RequestParameters::default(), "/");
    assert_eq!(html, "<p>Nothing matched your search.</p>\n");
}

#[test]
fn facet_links_round_trip_parameters() {
    let cfg = config();
    let params = RequestParameters::from_query_string("program=Water&sort=title&page=1", &cfg);
    let counts = vec![FacetCounts {
        column: "state".to_string(),
        label: "State".to_string(),
        entries: vec![FacetCountEntry {
            facet_column: "state".to_string(),
            value: "CA".to_string(),
            count: 2,
        }],
    }];

    let html = render_facets(&counts, &params, "/grants");
    assert!(
        html.contains(
            "href=\"/grants?program%5B%5D=Water&amp;sort=title&amp;state%5B%5D=CA\""
        ),
        "{html}"
    );
}

#[test]
fn pager_keeps_filters() {
    let cfg = config();
    let params = RequestParameters::from_query_string("state=CA", &cfg);
    let html = render_pager(5, &cfg, &params, "/");

    assert!(html.contains("href=\"/?page=1&amp;state%5B%5D=CA\""), "{html}");
    assert!(html.contains("href=\"/?page=2&amp;state%5B%5D=CA\""), "{html}");
}

#[test]
fn explain_covers_each_facet() {
    let out = explain(&config(), "keys=water");
    assert!(out.contains("-- facet counts: state"));
    assert!(out.contains("-- facet counts: program"));
    assert!(out.contains("websearch_to_tsquery"));
}
