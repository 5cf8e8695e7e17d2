//! Faceted search over a single table.
//!
//! This module provides:
//! - FacetConfig: static description of the faceted table
//! - RequestParameters: validated per-request parameters
//! - FacetQueryBuilder: SeaQuery-based SQL generation
//! - FacetService: concurrent execution of a render pass
//! - keyword tokenizing for the search box

mod definition;
mod facet_service;
pub mod keywords;
mod params;
mod query_builder;
pub mod types;

pub use definition::{FacetConfig, RESERVED_PARAMETERS, is_safe_identifier};
pub use facet_service::{ExecutionLimits, FacetService, bind_values};
pub use params::{QueryValue, RawParams, RequestParameters, parse_page, parse_query_string};
pub use query_builder::{BuiltQuery, FACET_COUNT, FACET_VALUE, FacetQueryBuilder, quoted};
pub use types::{
    FacetColumn, FacetCountEntry, FacetCounts, ResultColumn, ResultRow, SearchOutcome,
    SortDirection,
};
