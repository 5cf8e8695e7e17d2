//! Facet query builder using SeaQuery.
//!
//! Generates the three statements of a render pass:
//! - the page of matching rows, with relevance while keyword searching
//! - the total number of matching rows
//! - per-facet value counts, ignoring that facet's own selection
//!
//! Values are always bound; identifiers come from a validated
//! [`FacetConfig`].

use sea_query::{
    Alias, Asterisk, Cond, Expr, Order, PostgresQueryBuilder, Query, SelectStatement, SimpleExpr,
    UnionType, Values,
};

use super::definition::FacetConfig;
use super::params::RequestParameters;
use super::types::SortDirection;

/// Output column of the facet count query holding the value.
pub const FACET_VALUE: &str = "facet_value";

/// Output column of the facet count query holding the count.
pub const FACET_COUNT: &str = "facet_count";

/// SQL text with its bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub values: Values,
}

impl BuiltQuery {
    fn from_statement(statement: &SelectStatement) -> Self {
        let (sql, values) = statement.build(PostgresQueryBuilder);
        Self { sql, values }
    }
}

/// Query builder for one request against one faceted table.
pub struct FacetQueryBuilder<'a> {
    config: &'a FacetConfig,
    params: &'a RequestParameters,
    keyword_query: Option<String>,
}

impl<'a> FacetQueryBuilder<'a> {
    pub fn new(config: &'a FacetConfig, params: &'a RequestParameters) -> Self {
        Self {
            config,
            params,
            keyword_query: params.keyword_query(config),
        }
    }

    /// Build the page-of-rows query.
    pub fn build(&self) -> BuiltQuery {
        BuiltQuery::from_statement(&self.main_statement())
    }

    /// Build a COUNT query for total results.
    pub fn build_count(&self) -> BuiltQuery {
        BuiltQuery::from_statement(&self.count_statement())
    }

    /// Build the value count query for one facet.
    pub fn build_facet_counts(&self, facet: &str) -> BuiltQuery {
        BuiltQuery::from_statement(&self.facet_count_statement(facet))
    }

    /// Whether a keyword clause (and the relevance column) is part of the
    /// main query.
    pub fn keywords_active(&self) -> bool {
        self.keyword_query.is_some()
    }

    /// SELECT * (plus relevance) with filters, ordering and paging.
    pub fn main_statement(&self) -> SelectStatement {
        let mut query = Query::select();
        query.column(Asterisk);

        if let Some(rank) = self.relevance_expr() {
            query.expr_as(rank, Alias::new(&self.config.relevance_column));
        }

        query
            .from(Alias::new(&self.config.database_table))
            .cond_where(self.conditions(None));

        if let Some((column, direction)) = self.effective_sort() {
            query.order_by(Alias::new(&column), Order::from(direction));
        }

        let page_size = self.config.page_size;
        query
            .limit(page_size)
            .offset(self.params.page.saturating_mul(page_size));

        query
    }

    pub fn count_statement(&self) -> SelectStatement {
        let mut query = Query::select();
        query
            .expr(Expr::col(Asterisk).count())
            .from(Alias::new(&self.config.database_table))
            .cond_where(self.conditions(None));
        query
    }

    /// Distinct values of `facet` and its aliases with their row counts.
    ///
    /// Every column to check contributes one UNION ALL branch. A branch for
    /// an alias skips rows where the alias repeats a value already taken
    /// from an earlier column, so each row counts at most once per value.
    pub fn facet_count_statement(&self, facet: &str) -> SelectStatement {
        let columns = self.config.columns_to_check(facet);
        let mut branches = columns.iter().enumerate().map(|(i, column)| {
            let mut condition = self.conditions(Some(facet));
            for earlier in &columns[..i] {
                condition = condition.add(Expr::cust(format!(
                    "CAST({} AS TEXT) IS DISTINCT FROM CAST({} AS TEXT)",
                    quoted(column),
                    quoted(earlier)
                )));
            }

            let mut branch = Query::select();
            branch
                .expr_as(as_text(column), Alias::new(FACET_VALUE))
                .from(Alias::new(&self.config.database_table))
                .cond_where(condition);
            branch
        });

        let mut values = branches.next().unwrap_or_else(Query::select);
        for branch in branches {
            values.union(UnionType::All, branch);
        }

        let mut query = Query::select();
        query
            .column(Alias::new(FACET_VALUE))
            .expr_as(Expr::col(Asterisk).count(), Alias::new(FACET_COUNT))
            .from_subquery(values, Alias::new("facet_values"))
            .and_where(Expr::col(Alias::new(FACET_VALUE)).is_not_null())
            .and_where(Expr::col(Alias::new(FACET_VALUE)).ne(""))
            .group_by_col(Alias::new(FACET_VALUE))
            .order_by(Alias::new(FACET_COUNT), Order::Desc)
            .order_by(Alias::new(FACET_VALUE), Order::Asc);
        query
    }

    /// WHERE conditions shared by every statement.
    ///
    /// Keywords, then one OR-group per selected facet in configuration
    /// order, then the required columns. `skip_facet` leaves that facet's
    /// selection out, which is what its own value counts need.
    pub fn conditions(&self, skip_facet: Option<&str>) -> Cond {
        let mut cond = Cond::all();

        if let Some(matches) = self.keyword_match_expr() {
            cond = cond.add(matches);
        }

        for facet in self.config.facet_columns() {
            if skip_facet == Some(facet) {
                continue;
            }
            let Some(selected) = self.params.facet_selections.get(facet) else {
                continue;
            };
            if selected.is_empty() {
                continue;
            }

            let mut any = Cond::any();
            for column in self.config.columns_to_check(facet) {
                any = any.add(Expr::expr(as_text(column)).is_in(selected.iter().cloned()));
            }
            cond = cond.add(any);
        }

        for column in &self.config.required_columns {
            cond = cond
                .add(Expr::col(Alias::new(column)).is_not_null())
                .add(Expr::expr(as_text(column)).ne(""));
        }

        cond
    }

    /// Sort actually applied to the main query.
    ///
    /// Relevance only exists while keyword searching, so a relevance sort
    /// without keywords is dropped.
    pub fn effective_sort(&self) -> Option<(String, SortDirection)> {
        self.params
            .effective_sort(self.config)
            .filter(|(column, _)| *column != self.config.relevance_column || self.keywords_active())
    }

    fn document_sql(&self) -> String {
        let columns = self
            .config
            .keyword_columns
            .iter()
            .map(|c| quoted(c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "to_tsvector('{}', concat_ws(' ', {columns}))",
            self.config.text_search_config
        )
    }

    fn keyword_match_expr(&self) -> Option<SimpleExpr> {
        let query = self.keyword_query.clone()?;
        Some(Expr::cust_with_values(
            format!(
                "{} @@ websearch_to_tsquery('{}', $1)",
                self.document_sql(),
                self.config.text_search_config
            ),
            [query],
        ))
    }

    fn relevance_expr(&self) -> Option<SimpleExpr> {
        let query = self.keyword_query.clone()?;
        Some(Expr::cust_with_values(
            format!(
                "ts_rank({}, websearch_to_tsquery('{}', $1))",
                self.document_sql(),
                self.config.text_search_config
            ),
            [query],
        ))
    }
}

/// `CAST("column" AS TEXT)`.
fn as_text(column: &str) -> SimpleExpr {
    Expr::col(Alias::new(column)).cast_as(Alias::new("TEXT"))
}

/// Double-quote an identifier for raw SQL fragments.
pub fn quoted(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
