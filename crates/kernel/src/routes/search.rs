//! Search route handlers.

use axum::{
    Json, Router,
    extract::{OriginalUri, RawQuery, State},
    response::Html,
    routing::get,
};
use tracing::debug;

use crate::error::AppResult;
use crate::facets::{RequestParameters, SearchOutcome};
use crate::render;
use crate::state::AppState;
use crate::theme::PageContext;

/// Create the search router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_html))
        .route("/api/search", get(search_json))
}

/// Parse the query string and run one search pass.
async fn run_search(
    state: &AppState,
    query: Option<&str>,
) -> AppResult<(RequestParameters, SearchOutcome)> {
    let config = state.facet_config();
    let params = RequestParameters::from_query_string(query.unwrap_or_default(), config);
    debug!(?params, "search parameters");

    let outcome = state.facets().search(&params).await?;
    Ok((params, outcome))
}

/// HTML search page.
async fn search_html(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
) -> AppResult<Html<String>> {
    let (params, outcome) = run_search(&state, query.as_deref()).await?;
    let config = state.facet_config();
    let base_url = uri.path();

    let page = PageContext {
        title: config.database_table.clone(),
        styles: render::render_styles(config),
        javascript: render::render_javascript(config),
        keyword_search: render::render_keyword_search(&params, base_url),
        facets: render::render_facets(&outcome.facets, &params, base_url),
        results: render::render_results(&outcome.rows, config, &params, base_url),
        pager: render::render_pager(outcome.total, config, &params, base_url),
        total: outcome.total,
    };

    Ok(Html(state.theme().render_page(&page)?))
}

/// JSON search API.
async fn search_json(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<SearchOutcome>> {
    let (_, outcome) = run_search(&state, query.as_deref()).await?;
    Ok(Json(outcome))
}
