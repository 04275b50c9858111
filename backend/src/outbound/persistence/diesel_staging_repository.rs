//! PostgreSQL-backed `StagingRepository` implementation using Diesel ORM.
//!
//! Figures are merged with `INSERT .. ON CONFLICT (natural key) DO UPDATE`,
//! so resubmitting a key overwrites its count instead of adding to it. A key
//! repeated within one batch keeps its last figure. One batch runs in one
//! transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{StagingRepository, StagingRepositoryError};
use crate::domain::{FormKind, StagedFigure, last_per_key};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{EnrollmentRow, PerformanceRow, StagingRows};
use super::pool::{DbPool, PoolError};
use super::schema::{temp_aprovechamiento, temp_matricula};

/// Diesel-backed implementation of the staging repository port.
#[derive(Clone)]
pub struct DieselStagingRepository {
    pool: DbPool,
}

impl DieselStagingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> StagingRepositoryError {
    map_basic_pool_error(error, |message| StagingRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> StagingRepositoryError {
    map_basic_diesel_error(
        error,
        StagingRepositoryError::query,
        StagingRepositoryError::connection,
    )
}

fn to_count(rows: i64) -> u64 {
    u64::try_from(rows).unwrap_or_default()
}

#[async_trait]
impl StagingRepository for DieselStagingRepository {
    async fn upsert_batch(&self, figures: &[StagedFigure]) -> Result<usize, StagingRepositoryError> {
        if figures.is_empty() {
            return Ok(0);
        }
        let figures = last_per_key(figures.to_vec());
        let rows = StagingRows::split(&figures);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let merged = conn
            .transaction(|conn| {
                async move {
                    let mut merged = 0;
                    if !rows.enrollment.is_empty() {
                        merged += diesel::insert_into(temp_matricula::table)
                            .values(&rows.enrollment)
                            .on_conflict((
                                temp_matricula::periodo,
                                temp_matricula::sigla,
                                temp_matricula::nombre_programa,
                                temp_matricula::nombre_rama,
                                temp_matricula::nivel,
                                temp_matricula::modalidad,
                                temp_matricula::turno,
                                temp_matricula::semestre,
                                temp_matricula::grupo_edad,
                                temp_matricula::tipo_ingreso,
                                temp_matricula::sexo,
                            ))
                            .do_update()
                            .set((
                                temp_matricula::matricula.eq(excluded(temp_matricula::matricula)),
                                temp_matricula::salones.eq(excluded(temp_matricula::salones)),
                                temp_matricula::updated_at.eq(diesel::dsl::now),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    if !rows.performance.is_empty() {
                        merged += diesel::insert_into(temp_aprovechamiento::table)
                            .values(&rows.performance)
                            .on_conflict((
                                temp_aprovechamiento::periodo,
                                temp_aprovechamiento::sigla,
                                temp_aprovechamiento::nombre_programa,
                                temp_aprovechamiento::nombre_rama,
                                temp_aprovechamiento::nivel,
                                temp_aprovechamiento::modalidad,
                                temp_aprovechamiento::turno,
                                temp_aprovechamiento::semestre,
                                temp_aprovechamiento::aprovechamiento,
                                temp_aprovechamiento::sexo,
                            ))
                            .do_update()
                            .set((
                                temp_aprovechamiento::cantidad
                                    .eq(excluded(temp_aprovechamiento::cantidad)),
                                temp_aprovechamiento::updated_at.eq(diesel::dsl::now),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    Ok::<usize, diesel::result::Error>(merged)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(merged, "staging batch merged");
        Ok(merged)
    }

    async fn count(&self, form: FormKind) -> Result<u64, StagingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = match form {
            FormKind::Enrollment => {
                temp_matricula::table
                    .count()
                    .get_result::<i64>(&mut conn)
                    .await
            }
            FormKind::Performance => {
                temp_aprovechamiento::table
                    .count()
                    .get_result::<i64>(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(to_count(rows))
    }

    async fn count_for(
        &self,
        form: FormKind,
        period: &str,
        unit_code: &str,
    ) -> Result<u64, StagingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = match form {
            FormKind::Enrollment => {
                temp_matricula::table
                    .filter(temp_matricula::periodo.eq(period))
                    .filter(temp_matricula::sigla.eq(unit_code))
                    .count()
                    .get_result::<i64>(&mut conn)
                    .await
            }
            FormKind::Performance => {
                temp_aprovechamiento::table
                    .filter(temp_aprovechamiento::periodo.eq(period))
                    .filter(temp_aprovechamiento::sigla.eq(unit_code))
                    .count()
                    .get_result::<i64>(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(to_count(rows))
    }

    async fn list(&self, form: FormKind) -> Result<Vec<StagedFigure>, StagingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let figures = match form {
            FormKind::Enrollment => temp_matricula::table
                .order(temp_matricula::id)
                .select(EnrollmentRow::as_select())
                .load::<EnrollmentRow>(&mut conn)
                .await
                .map(|rows| rows.into_iter().map(StagedFigure::from).collect()),
            FormKind::Performance => temp_aprovechamiento::table
                .order(temp_aprovechamiento::id)
                .select(PerformanceRow::as_select())
                .load::<PerformanceRow>(&mut conn)
                .await
                .map(|rows| rows.into_iter().map(StagedFigure::from).collect()),
        }
        .map_err(map_diesel_error)?;
        Ok(figures)
    }

    async fn truncate(&self, form: FormKind) -> Result<u64, StagingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = match form {
            FormKind::Enrollment => {
                diesel::delete(temp_matricula::table)
                    .execute(&mut conn)
                    .await
            }
            FormKind::Performance => {
                diesel::delete(temp_aprovechamiento::table)
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        debug!(form = %form, removed, "staging table cleared");
        Ok(u64::try_from(removed).unwrap_or_default())
    }
}
