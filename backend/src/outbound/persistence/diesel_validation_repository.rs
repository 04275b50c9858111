//! PostgreSQL-backed `ValidationRepository` implementation using Diesel ORM.
//!
//! Records are unique per `(id_periodo, id_usuario, id_formato)`. A
//! rejection replaces every record for its period and form inside one
//! transaction, so earlier approvals cannot survive it.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ValidationRepository, ValidationRepositoryError};
use crate::domain::{FormKind, ValidationRecord};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewValidationRow, ValidationRow};
use super::pool::{DbPool, PoolError};
use super::schema::validacion;

/// Diesel-backed implementation of the validation repository port.
#[derive(Clone)]
pub struct DieselValidationRepository {
    pool: DbPool,
}

impl DieselValidationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ValidationRepositoryError {
    map_basic_pool_error(error, |message| ValidationRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> ValidationRepositoryError {
    map_basic_diesel_error(
        error,
        ValidationRepositoryError::query,
        ValidationRepositoryError::connection,
    )
}

#[async_trait]
impl ValidationRepository for DieselValidationRepository {
    async fn find(
        &self,
        period_id: i32,
        user_id: i32,
        form: FormKind,
    ) -> Result<Option<ValidationRecord>, ValidationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = validacion::table
            .filter(validacion::id_periodo.eq(period_id))
            .filter(validacion::id_usuario.eq(user_id))
            .filter(validacion::id_formato.eq(form.format_id()))
            .select(ValidationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|row| row.into_record(form)))
    }

    async fn latest_rejection(
        &self,
        period_id: i32,
        form: FormKind,
    ) -> Result<Option<ValidationRecord>, ValidationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = validacion::table
            .filter(validacion::id_periodo.eq(period_id))
            .filter(validacion::id_formato.eq(form.format_id()))
            .filter(validacion::validado.eq(false))
            .order(validacion::fecha.desc())
            .select(ValidationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|row| row.into_record(form)))
    }

    async fn upsert(&self, record: &ValidationRecord) -> Result<(), ValidationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(validacion::table)
            .values(NewValidationRow::from(record))
            .on_conflict((
                validacion::id_periodo,
                validacion::id_usuario,
                validacion::id_formato,
            ))
            .do_update()
            .set((
                validacion::validado.eq(excluded(validacion::validado)),
                validacion::nota.eq(excluded(validacion::nota)),
                validacion::fecha.eq(excluded(validacion::fecha)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn replace_all(&self, record: &ValidationRecord) -> Result<(), ValidationRepositoryError> {
        let row = NewValidationRow::from(record);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    validacion::table
                        .filter(validacion::id_periodo.eq(row.id_periodo))
                        .filter(validacion::id_formato.eq(row.id_formato)),
                )
                .execute(conn)
                .await?;
                diesel::insert_into(validacion::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok::<(), diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn clear(&self, period_id: i32, form: FormKind) -> Result<u64, ValidationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            validacion::table
                .filter(validacion::id_periodo.eq(period_id))
                .filter(validacion::id_formato.eq(form.format_id())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(u64::try_from(removed).unwrap_or_default())
    }
}
