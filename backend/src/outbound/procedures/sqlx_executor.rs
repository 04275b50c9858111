//! `ProcedureExecutor` adapter running PostgreSQL functions through sqlx.
//!
//! Each call runs in its own transaction: the function call is declared as a
//! cursor with bound arguments, then read with `FETCH ALL`. When it hands
//! back a single `refcursor` column, each named cursor is fetched in turn.
//! The transaction commits only after every set was read, so a failure
//! anywhere rolls the procedure's writes back.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgColumn, PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Executor, Postgres, Row, Statement, Transaction, TypeInfo, ValueRef};
use tracing::debug;

use crate::domain::ports::{ProcedureExecutor, ProcedureExecutorError};
use crate::domain::{CellValue, ProcedureCall, RawResultSet};

use super::sql::{
    CALL_CURSOR, SqlArg, arguments, decode_text_cell, is_cursor_type, is_identifier,
    render_declare, render_fetch,
};

/// Connect a sqlx pool for procedure calls or advisory locks.
///
/// Statement caching is off: cursor names repeat across calls whose result
/// shapes differ, so a cached description of a `FETCH` would go stale.
///
/// # Errors
///
/// Returns [`ProcedureExecutorError::Connection`] when the URL is malformed
/// or the server cannot be reached.
pub async fn connect_procedure_pool(
    database_url: &str,
    max_size: u32,
) -> Result<PgPool, ProcedureExecutorError> {
    let options = database_url
        .parse::<PgConnectOptions>()
        .map_err(|err| ProcedureExecutorError::connection(err.to_string()))?
        .statement_cache_capacity(0);
    PgPoolOptions::new()
        .max_connections(max_size.max(1))
        .acquire_timeout(Duration::from_secs(15))
        .connect_with(options)
        .await
        .map_err(|err| ProcedureExecutorError::connection(err.to_string()))
}

/// Executes procedures living in one schema.
#[derive(Clone)]
pub struct SqlxProcedureExecutor {
    pool: PgPool,
    schema: String,
}

impl SqlxProcedureExecutor {
    /// Executor for procedures in `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcedureExecutorError::InvalidCall`] when `schema` is not a
    /// plain identifier.
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Result<Self, ProcedureExecutorError> {
        let schema = schema.into();
        if !is_identifier(&schema) {
            return Err(ProcedureExecutorError::invalid_call(format!(
                "procedure schema is not a plain identifier: {schema:?}"
            )));
        }
        Ok(Self { pool, schema })
    }
}

fn map_sqlx_error(error: sqlx::Error) -> ProcedureExecutorError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ProcedureExecutorError::connection(error.to_string())
        }
        sqlx::Error::Database(db) => ProcedureExecutorError::execution(db.message().to_owned()),
        other => ProcedureExecutorError::execution(other.to_string()),
    }
}

fn decode_cell(row: &PgRow, index: usize, type_name: &str) -> CellValue {
    match row.try_get_raw(index) {
        Ok(value) if value.is_null() => CellValue::Null,
        Ok(value) => match value.as_str() {
            Ok(text) => decode_text_cell(type_name, Some(text)),
            Err(_) => value
                .as_bytes()
                .map_or(CellValue::Null, |bytes| CellValue::Other(hex::encode(bytes))),
        },
        Err(_) => CellValue::Null,
    }
}

/// Rows read from one cursor together with its column description.
struct Fetched {
    columns: Vec<(String, String)>,
    rows: Vec<PgRow>,
}

fn column_types<'a>(columns: impl IntoIterator<Item = &'a PgColumn>) -> Vec<(String, String)> {
    columns
        .into_iter()
        .map(|column| {
            (
                column.name().to_owned(),
                column.type_info().name().to_owned(),
            )
        })
        .collect()
}

/// Turn fetched rows into one raw result set.
///
/// The column description survives an empty fetch, so an empty primary set
/// still counts as the primary set.
fn to_result_set(fetched: &Fetched) -> RawResultSet {
    let values = fetched
        .rows
        .iter()
        .map(|row| {
            fetched
                .columns
                .iter()
                .enumerate()
                .map(|(index, (_, type_name))| decode_cell(row, index, type_name))
                .collect()
        })
        .collect();
    RawResultSet::positional(
        fetched.columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    )
}

/// Cursor names when the set is a single `refcursor` column.
fn cursor_names(fetched: &Fetched) -> Option<Vec<String>> {
    let [(_, type_name)] = fetched.columns.as_slice() else {
        return None;
    };
    if !is_cursor_type(type_name) {
        return None;
    }
    Some(
        fetched
            .rows
            .iter()
            .filter_map(|row| row.try_get_raw(0).ok())
            .filter(|value| !value.is_null())
            .filter_map(|value| value.as_str().ok().map(str::to_owned))
            .collect(),
    )
}

async fn declare_call(
    tx: &mut Transaction<'static, Postgres>,
    schema: &str,
    call: &ProcedureCall,
) -> Result<(), ProcedureExecutorError> {
    let sql = render_declare(schema, call)?;
    let query = arguments(call)?
        .into_iter()
        .fold(sqlx::query::<Postgres>(&sql), |query, arg| match arg {
            SqlArg::Int4(value) => query.bind(value),
            SqlArg::Int8(value) => query.bind(value),
            SqlArg::Text(value) => query.bind(value),
        });
    (&mut **tx).execute(query).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// `FETCH ALL` from `cursor`, describing the cursor when no row arrives.
async fn fetch_cursor(
    tx: &mut Transaction<'static, Postgres>,
    cursor: &str,
) -> Result<Fetched, ProcedureExecutorError> {
    let sql = render_fetch(cursor);
    let rows = (&mut **tx)
        .fetch_all(sqlx::raw_sql(&sql))
        .await
        .map_err(map_sqlx_error)?;
    let columns = match rows.first() {
        Some(first) => column_types(first.columns()),
        None => {
            let statement = (&mut **tx).prepare(&sql).await.map_err(map_sqlx_error)?;
            column_types(statement.columns())
        }
    };
    Ok(Fetched { columns, rows })
}

#[async_trait]
impl ProcedureExecutor for SqlxProcedureExecutor {
    async fn run(&self, call: &ProcedureCall) -> Result<Vec<RawResultSet>, ProcedureExecutorError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        declare_call(&mut tx, &self.schema, call).await?;
        let direct = fetch_cursor(&mut tx, CALL_CURSOR).await?;
        let sets = match cursor_names(&direct) {
            Some(cursors) => {
                let mut sets = Vec::with_capacity(cursors.len());
                for cursor in cursors {
                    sets.push(to_result_set(&fetch_cursor(&mut tx, &cursor).await?));
                }
                sets
            }
            None => vec![to_result_set(&direct)],
        };

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(
            procedure = call.procedure(),
            sets = sets.len(),
            "procedure call committed"
        );
        Ok(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://captura@localhost/captura")
            .expect("lazy pool")
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_unsafe_schema() {
        let result = SqlxProcedureExecutor::new(lazy_pool(), "dbo\"; --");
        assert!(matches!(
            result,
            Err(ProcedureExecutorError::InvalidCall { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn accepts_plain_schema() {
        assert!(SqlxProcedureExecutor::new(lazy_pool(), "dbo").is_ok());
    }

    #[rstest]
    fn pool_timeouts_are_connection_errors() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            ProcedureExecutorError::Connection { .. }
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            ProcedureExecutorError::Execution { .. }
        ));
    }

    fn columns(names: &[(&str, &str)]) -> Vec<(String, String)> {
        names
            .iter()
            .map(|(name, type_name)| ((*name).to_owned(), (*type_name).to_owned()))
            .collect()
    }

    #[rstest]
    fn empty_fetch_keeps_its_columns() {
        let fetched = Fetched {
            columns: columns(&[("Semestre", "VARCHAR"), ("Id_Semaforo", "INT4")]),
            rows: Vec::new(),
        };

        let set = to_result_set(&fetched);

        assert_eq!(set.column_count(), Some(2));
        assert_eq!(set.row_count(), 0);
    }

    #[rstest]
    fn empty_cursor_column_yields_no_cursors() {
        let fetched = Fetched {
            columns: columns(&[("Resultado", "REFCURSOR")]),
            rows: Vec::new(),
        };
        assert_eq!(cursor_names(&fetched), Some(Vec::new()));
    }

    #[rstest]
    fn wide_sets_are_not_cursor_lists() {
        let fetched = Fetched {
            columns: columns(&[("A", "REFCURSOR"), ("B", "REFCURSOR")]),
            rows: Vec::new(),
        };
        assert_eq!(cursor_names(&fetched), None);
    }
}
