//! Table Facets Kernel Library
//!
//! Faceted search over a single PostgreSQL table: parameter parsing, query
//! building, facet counting, HTML rendering and the HTTP surface.
//! The main entry point for running the server is the `tablefacets` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod explain;
pub mod facets;
pub mod render;
pub mod routes;
pub mod state;
pub mod theme;
