//! PostgreSQL-backed `CatalogRepository` implementation using Diesel ORM.
//!
//! Read-only: every method is a single SELECT against the `cat_*` tables or
//! `usuario`. Staging joins match literal names exactly, as the
//! consolidation procedures do.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CatalogRepository, CatalogRepositoryError};
use crate::domain::{CatalogEntry, CatalogKind, PeriodRef, ProgramInfo, StagingJoin, StatusLight};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{StatusLightRow, UserNameRow};
use super::pool::{DbPool, PoolError};
use super::schema::{
    cat_aprovechamiento, cat_grupo_edad, cat_modalidad, cat_nivel, cat_periodo, cat_programa,
    cat_rama, cat_semaforo, cat_semestre, cat_tipo_ingreso, cat_turno, cat_unidad_academica,
    usuario,
};

/// Diesel-backed implementation of the catalog repository port.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogRepositoryError {
    map_basic_pool_error(error, |message| CatalogRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogRepositoryError {
    map_basic_diesel_error(
        error,
        CatalogRepositoryError::query,
        CatalogRepositoryError::connection,
    )
}

type ProgramTuple = (i32, String, Option<String>, i32);

fn program_from_tuple((id, name, branch, level_id): ProgramTuple) -> ProgramInfo {
    ProgramInfo {
        id,
        name,
        branch,
        level_id,
    }
}

/// Select `(id, label)` pairs from one of the simple catalogs.
///
/// Each arm names a different table, so the query is expanded per kind.
macro_rules! catalog_query {
    ($conn:expr, $kind:expr, |$table:ident, $id:ident, $label:ident| $query:expr) => {
        match $kind {
            CatalogKind::AgeGroup => {
                use cat_grupo_edad::{id_grupo_edad as $id, grupo_edad as $label, table as $table};
                $query.load::<(i32, String)>($conn).await
            }
            CatalogKind::AdmissionType => {
                use cat_tipo_ingreso::{
                    id_tipo_ingreso as $id, table as $table, tipo_de_ingreso as $label,
                };
                $query.load::<(i32, String)>($conn).await
            }
            CatalogKind::Modality => {
                use cat_modalidad::{id_modalidad as $id, modalidad as $label, table as $table};
                $query.load::<(i32, String)>($conn).await
            }
            CatalogKind::Semester => {
                use cat_semestre::{id_semestre as $id, semestre as $label, table as $table};
                $query.load::<(i32, String)>($conn).await
            }
            CatalogKind::Shift => {
                use cat_turno::{id_turno as $id, table as $table, turno as $label};
                $query.load::<(i32, String)>($conn).await
            }
            CatalogKind::PerformanceCategory => {
                use cat_aprovechamiento::{
                    aprovechamiento as $label, id_aprovechamiento as $id, table as $table,
                };
                $query.load::<(i32, String)>($conn).await
            }
        }
    };
}

fn into_entries(rows: Vec<(i32, String)>) -> Vec<CatalogEntry> {
    rows.into_iter()
        .map(|(id, label)| CatalogEntry::new(id, label))
        .collect()
}

#[async_trait]
impl CatalogRepository for DieselCatalogRepository {
    async fn find_period_by_id(
        &self,
        id: i32,
    ) -> Result<Option<PeriodRef>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let literal = cat_periodo::table
            .filter(cat_periodo::id_periodo.eq(id))
            .select(cat_periodo::periodo)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(literal.map(|literal| PeriodRef::new(id, literal)))
    }

    async fn find_period_by_literal(
        &self,
        literal: &str,
    ) -> Result<Option<PeriodRef>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = cat_periodo::table
            .filter(cat_periodo::periodo.eq(literal))
            .select((cat_periodo::id_periodo, cat_periodo::periodo))
            .first::<(i32, String)>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|(id, literal)| PeriodRef::new(id, literal)))
    }

    async fn find_unit_code(&self, unit_id: i32) -> Result<Option<String>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        cat_unidad_academica::table
            .filter(cat_unidad_academica::id_unidad_academica.eq(unit_id))
            .select(cat_unidad_academica::sigla)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn find_level_name(
        &self,
        level_id: i32,
    ) -> Result<Option<String>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        cat_nivel::table
            .filter(cat_nivel::id_nivel.eq(level_id))
            .select(cat_nivel::nivel)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn find_program(
        &self,
        program_id: i32,
    ) -> Result<Option<ProgramInfo>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = cat_programa::table
            .left_join(cat_rama::table)
            .filter(cat_programa::id_programa.eq(program_id))
            .select((
                cat_programa::id_programa,
                cat_programa::nombre_programa,
                cat_rama::nombre_rama.nullable(),
                cat_programa::id_nivel,
            ))
            .first::<ProgramTuple>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(program_from_tuple))
    }

    async fn list_programs(
        &self,
        level_id: i32,
    ) -> Result<Vec<ProgramInfo>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = cat_programa::table
            .left_join(cat_rama::table)
            .filter(cat_programa::id_nivel.eq(level_id))
            .order(cat_programa::nombre_programa.asc())
            .select((
                cat_programa::id_programa,
                cat_programa::nombre_programa,
                cat_rama::nombre_rama.nullable(),
                cat_programa::id_nivel,
            ))
            .load::<ProgramTuple>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(program_from_tuple).collect())
    }

    async fn find_entry(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogEntry>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = catalog_query!(&mut conn, kind, |table, id_col, label_col| table
            .filter(id_col.eq(id))
            .select((id_col, label_col))
            .limit(1))
        .map_err(map_diesel_error)?;
        Ok(into_entries(rows).into_iter().next())
    }

    async fn list_entries(
        &self,
        kind: CatalogKind,
    ) -> Result<Vec<CatalogEntry>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = catalog_query!(&mut conn, kind, |table, id_col, label_col| table
            .order(id_col.asc())
            .select((id_col, label_col)))
        .map_err(map_diesel_error)?;
        Ok(into_entries(rows))
    }

    async fn list_status_lights(&self) -> Result<Vec<StatusLight>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = cat_semaforo::table
            .filter(cat_semaforo::id_semaforo.between(1, 3))
            .order(cat_semaforo::id_semaforo.asc())
            .select(StatusLightRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| StatusLight::new(row.id_semaforo, row.descripcion, row.color))
            .collect())
    }

    async fn find_user_name(&self, user_id: i32) -> Result<Option<String>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = usuario::table
            .filter(usuario::id_usuario.eq(user_id))
            .select(UserNameRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.and_then(|row| row.full_name()))
    }

    async fn find_join_id(
        &self,
        join: StagingJoin,
        label: &str,
    ) -> Result<Option<i32>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        match join {
            StagingJoin::Period => {
                cat_periodo::table
                    .filter(cat_periodo::periodo.eq(label))
                    .select(cat_periodo::id_periodo)
                    .first::<i32>(&mut conn)
                    .await
            }
            StagingJoin::Unit => {
                cat_unidad_academica::table
                    .filter(cat_unidad_academica::sigla.eq(label))
                    .select(cat_unidad_academica::id_unidad_academica)
                    .first::<i32>(&mut conn)
                    .await
            }
            StagingJoin::Program => {
                cat_programa::table
                    .filter(cat_programa::nombre_programa.eq(label))
                    .select(cat_programa::id_programa)
                    .first::<i32>(&mut conn)
                    .await
            }
            StagingJoin::Branch => {
                cat_rama::table
                    .filter(cat_rama::nombre_rama.eq(label))
                    .select(cat_rama::id_rama)
                    .first::<i32>(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(map_diesel_error)
    }
}
