//! Facet search execution.
//!
//! Runs the statements of one render pass against PostgreSQL. The page of
//! rows, the total and every facet's counts are independent, so they run
//! concurrently; the pass either completes as a whole or fails.

use std::sync::Arc;
use std::time::Duration;

use sea_query::{Value, Values};
use sqlx::postgres::{PgArguments, PgPool};
use sqlx::{Arguments, Postgres};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::definition::FacetConfig;
use super::params::RequestParameters;
use super::query_builder::{BuiltQuery, FacetQueryBuilder};
use super::types::{FacetCountEntry, FacetCounts, ResultRow, SearchOutcome};
use crate::error::FacetError;

/// Limits applied to query execution.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionLimits {
    /// Per-statement `statement_timeout`.
    pub statement_timeout: Duration,

    /// Deadline for a whole render pass.
    pub pass_deadline: Duration,

    /// Extra attempts for a statement that failed transiently.
    pub retries: u32,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            statement_timeout: Duration::from_secs(10),
            pass_deadline: Duration::from_secs(15),
            retries: 1,
        }
    }
}

/// Service for executing facet searches.
#[derive(Clone)]
pub struct FacetService {
    runner: QueryRunner,
    config: Arc<FacetConfig>,
    pass_deadline: Duration,
}

/// One finished piece of a render pass.
enum PassPart {
    Rows(Vec<ResultRow>),
    Total(u64),
    Facet(usize, Vec<FacetCountEntry>),
}

impl FacetService {
    pub fn new(pool: PgPool, config: Arc<FacetConfig>, limits: ExecutionLimits) -> Self {
        Self {
            runner: QueryRunner {
                pool,
                statement_timeout: limits.statement_timeout,
                retries: limits.retries,
            },
            config,
            pass_deadline: limits.pass_deadline,
        }
    }

    pub fn config(&self) -> &FacetConfig {
        &self.config
    }

    /// Execute one render pass: a page of rows, the total and the counts of
    /// every configured facet.
    ///
    /// Dropping the returned future (client gone, deadline hit) aborts all
    /// statements still in flight.
    pub async fn search(&self, params: &RequestParameters) -> Result<SearchOutcome, FacetError> {
        match tokio::time::timeout(self.pass_deadline, self.run_pass(params)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    table = %self.config.database_table,
                    deadline = ?self.pass_deadline,
                    "search pass exceeded its deadline"
                );
                Err(FacetError::DeadlineExceeded(self.pass_deadline))
            }
        }
    }

    /// Value counts of a single facet under the current selection.
    ///
    /// A column that is not a configured facet has no counts.
    pub async fn count_facet(
        &self,
        params: &RequestParameters,
        facet: &str,
    ) -> Result<Vec<FacetCountEntry>, FacetError> {
        if !self.config.is_facet(facet) {
            debug!(facet = %facet, "not a configured facet; no counts");
            return Ok(Vec::new());
        }
        let query = FacetQueryBuilder::new(&self.config, params).build_facet_counts(facet);
        self.runner.clone().facet_counts(facet.to_string(), query).await
    }

    async fn run_pass(&self, params: &RequestParameters) -> Result<SearchOutcome, FacetError> {
        let builder = FacetQueryBuilder::new(&self.config, params);
        let mut tasks = JoinSet::new();

        let runner = self.runner.clone();
        let query = builder.build();
        debug!(sql = %query.sql, values = ?query.values, "main query");
        tasks.spawn(async move { runner.rows(query).await.map(PassPart::Rows) });

        let runner = self.runner.clone();
        let query = builder.build_count();
        tasks.spawn(async move { runner.total(query).await.map(PassPart::Total) });

        for (index, facet) in self.config.facet_columns().enumerate() {
            let runner = self.runner.clone();
            let query = builder.build_facet_counts(facet);
            let facet = facet.to_string();
            tasks.spawn(async move {
                runner
                    .facet_counts(facet, query)
                    .await
                    .map(|entries| PassPart::Facet(index, entries))
            });
        }

        let mut rows = Vec::new();
        let mut total = 0;
        let mut counts: Vec<Option<Vec<FacetCountEntry>>> = vec![None; self.config.facets.len()];

        // Returning early drops the set, which aborts the remaining tasks.
        while let Some(joined) = tasks.join_next().await {
            match joined?? {
                PassPart::Rows(r) => rows = r,
                PassPart::Total(t) => total = t,
                PassPart::Facet(index, entries) => counts[index] = Some(entries),
            }
        }

        let facets = self
            .config
            .facets
            .iter()
            .zip(counts)
            .map(|(facet, entries)| FacetCounts {
                column: facet.column.clone(),
                label: facet.label.clone(),
                entries: entries.unwrap_or_default(),
            })
            .collect();

        debug!(
            table = %self.config.database_table,
            total,
            rows = rows.len(),
            page = params.page,
            "search pass complete"
        );

        Ok(SearchOutcome::new(
            rows,
            total,
            params.page,
            self.config.page_size,
            facets,
        ))
    }
}

/// Executes built statements with a statement timeout and bounded retries.
#[derive(Clone)]
struct QueryRunner {
    pool: PgPool,
    statement_timeout: Duration,
    retries: u32,
}

impl QueryRunner {
    async fn rows(self, query: BuiltQuery) -> Result<Vec<ResultRow>, FacetError> {
        let sql = format!("SELECT row_to_json(t) FROM ({}) t", query.sql);

        let rows: Vec<serde_json::Value> = self
            .retrying("failed to execute main query", || async {
                let mut tx = self.begin().await?;
                let rows = sqlx::query_scalar_with::<Postgres, serde_json::Value, _>(
                    &sql,
                    arguments(&query.values)?,
                )
                .fetch_all(&mut *tx)
                .await?;
                tx.commit().await?;
                Ok::<_, sqlx::Error>(rows)
            })
            .await?;

        Ok(rows.into_iter().map(ResultRow::from_json).collect())
    }

    async fn total(self, query: BuiltQuery) -> Result<u64, FacetError> {
        let total: i64 = self
            .retrying("failed to execute count query", || async {
                let mut tx = self.begin().await?;
                let total = sqlx::query_scalar_with::<Postgres, i64, _>(
                    &query.sql,
                    arguments(&query.values)?,
                )
                .fetch_one(&mut *tx)
                .await?;
                tx.commit().await?;
                Ok::<_, sqlx::Error>(total)
            })
            .await?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn facet_counts(
        self,
        facet: String,
        query: BuiltQuery,
    ) -> Result<Vec<FacetCountEntry>, FacetError> {
        let counted: Vec<(String, i64)> = self
            .retrying("failed to execute facet count query", || async {
                let mut tx = self.begin().await?;
                let counted = sqlx::query_as_with::<Postgres, (String, i64), _>(
                    &query.sql,
                    arguments(&query.values)?,
                )
                .fetch_all(&mut *tx)
                .await?;
                tx.commit().await?;
                Ok::<_, sqlx::Error>(counted)
            })
            .await?;

        debug!(facet = %facet, values = counted.len(), "facet counts loaded");

        Ok(counted
            .into_iter()
            .map(|(value, count)| FacetCountEntry {
                facet_column: facet.clone(),
                value,
                count: u64::try_from(count).unwrap_or_default(),
            })
            .collect())
    }

    /// Begin a transaction so SET LOCAL applies only to this statement.
    async fn begin(&self) -> Result<sqlx::Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let millis = self.statement_timeout.as_millis().max(1);
        sqlx::query(&format!("SET LOCAL statement_timeout = '{millis}ms'"))
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn retrying<T, F, Fut>(
        &self,
        context: &'static str,
        mut attempt: F,
    ) -> Result<T, FacetError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let mut retried = 0;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) && retried < self.retries => {
                    retried += 1;
                    warn!(error = %e, attempt = retried, "{context}; retrying");
                }
                Err(source) => return Err(FacetError::QueryExecution { context, source }),
            }
        }
    }
}

/// Connection-level failures worth another attempt.
fn is_transient(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}

fn arguments(values: &Values) -> Result<PgArguments, sqlx::Error> {
    bind_values(values).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// Convert SeaQuery values into PostgreSQL arguments.
pub fn bind_values(values: &Values) -> Result<PgArguments, FacetError> {
    let mut args = PgArguments::default();

    for value in &values.0 {
        let added = match value {
            Value::String(s) => args.add(s.as_deref().cloned()),
            Value::Bool(b) => args.add(*b),
            Value::Int(i) => args.add(*i),
            Value::BigInt(i) => args.add(*i),
            Value::Unsigned(u) => args.add(u.map(i64::from)),
            Value::BigUnsigned(u) => {
                args.add(u.map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            }
            other => return Err(FacetError::UnsupportedBindValue(format!("{other:?}"))),
        };
        added.map_err(|e| FacetError::UnsupportedBindValue(e.to_string()))?;
    }

    Ok(args)
}
