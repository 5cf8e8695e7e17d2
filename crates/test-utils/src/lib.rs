//! Table Facets test utilities.
//!
//! Helpers for integration testing: a sample facet configuration, a row
//! builder and helpers that create and seed a PostgreSQL table matching it.

use std::sync::atomic::{AtomicU64, Ordering};

use sqlx::PgPool;

static TABLE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A table name unique to this process and call, so tests can run in
/// parallel against one database.
pub fn unique_table_name(prefix: &str) -> String {
    let n = TABLE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{}_{n}", std::process::id())
}

/// Facet configuration (TOML) for a table created by [`create_table`].
pub fn sample_config(table: &str) -> String {
    format!(
        r#"
database_table = "{table}"
page_size = 2
keyword_columns = ["title", "summary"]
required_columns = ["title"]
no_results_message = "Nothing matched your search."

[[facets]]
column = "state"
label = "State"

[[facets]]
column = "program"
label = "Program"

[additional_columns]
secondary_state = "state"

[sort_directions]
title = "ASC"
amount = "DESC"
relevance = "DESC"

[[result_columns]]
column = "title"
label = "Title"
min_width = "12em"
link_column = "url"

[[result_columns]]
column = "amount"
label = "Amount"

[[result_columns]]
column = "relevance"
label = "Relevance"
"#
    )
}

/// Create a test row with default values.
pub fn test_row(title: &str) -> TestRow {
    TestRow {
        title: title.to_string(),
        summary: String::new(),
        state: None,
        secondary_state: None,
        program: None,
        amount: 0,
        url: String::new(),
    }
}

/// A test row builder for creating fixtures.
#[derive(Debug, Clone)]
pub struct TestRow {
    pub title: String,
    pub summary: String,
    pub state: Option<String>,
    pub secondary_state: Option<String>,
    pub program: Option<String>,
    pub amount: i32,
    pub url: String,
}

impl TestRow {
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    pub fn with_secondary_state(mut self, state: &str) -> Self {
        self.secondary_state = Some(state.to_string());
        self
    }

    pub fn with_program(mut self, program: &str) -> Self {
        self.program = Some(program.to_string());
        self
    }

    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }
}

/// Rows used by the storage-backed tests.
///
/// | title                | state | secondary | program | amount |
/// |----------------------|-------|-----------|---------|--------|
/// | Clean Water Access   | CA    | NV        | Water   | 500    |
/// | River Restoration    | NV    |           | Water   | 300    |
/// | Rural Broadband      | CA    | CA        | Tech    | 900    |
/// | Coastal Resilience   | OR    |           | Climate | 700    |
/// | (empty title)        | CA    |           | Water   | 100    |
pub fn sample_rows() -> Vec<TestRow> {
    vec![
        test_row("Clean Water Access")
            .with_summary("Drinking water systems for small towns")
            .with_state("CA")
            .with_secondary_state("NV")
            .with_program("Water")
            .with_amount(500)
            .with_url("/grants/1"),
        test_row("River Restoration")
            .with_summary("Restoring river habitat and water quality")
            .with_state("NV")
            .with_program("Water")
            .with_amount(300),
        test_row("Rural Broadband")
            .with_summary("Internet access for rural communities")
            .with_state("CA")
            .with_secondary_state("CA")
            .with_program("Tech")
            .with_amount(900)
            .with_url("/grants/3"),
        test_row("Coastal Resilience")
            .with_summary("Protecting coastal towns from storms")
            .with_state("OR")
            .with_program("Climate")
            .with_amount(700),
        test_row("")
            .with_summary("Row hidden by the required title column")
            .with_state("CA")
            .with_program("Water")
            .with_amount(100),
    ]
}

/// Create (or recreate) a table matching [`sample_config`].
pub async fn create_table(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\""))
        .execute(pool)
        .await?;
    sqlx::query(&format!(
        "CREATE TABLE \"{table}\" (
            id SERIAL PRIMARY KEY,
            title TEXT,
            summary TEXT,
            state TEXT,
            secondary_state TEXT,
            program TEXT,
            amount INTEGER NOT NULL DEFAULT 0,
            url TEXT
        )"
    ))
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert rows into a table created by [`create_table`].
pub async fn insert_rows(pool: &PgPool, table: &str, rows: &[TestRow]) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO \"{table}\" (title, summary, state, secondary_state, program, amount, url)
         VALUES ($1, $2, $3, $4, $5, $6, $7)"
    );
    for row in rows {
        sqlx::query(&sql)
            .bind(&row.title)
            .bind(&row.summary)
            .bind(&row.state)
            .bind(&row.secondary_state)
            .bind(&row.program)
            .bind(row.amount)
            .bind(&row.url)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Drop a table created by [`create_table`].
pub async fn drop_table(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\""))
        .execute(pool)
        .await?;
    Ok(())
}
