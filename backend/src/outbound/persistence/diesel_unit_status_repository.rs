//! PostgreSQL-backed `UnitStatusRepository` reading
//! `semaforo_unidad_academica`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::FormKind;
use crate::domain::ports::{UnitStatusRepository, UnitStatusRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::semaforo_unidad_academica;

/// Diesel-backed implementation of the unit status port.
#[derive(Clone)]
pub struct DieselUnitStatusRepository {
    pool: DbPool,
}

impl DieselUnitStatusRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UnitStatusRepositoryError {
    map_basic_pool_error(error, |message| UnitStatusRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> UnitStatusRepositoryError {
    map_basic_diesel_error(
        error,
        UnitStatusRepositoryError::query,
        UnitStatusRepositoryError::connection,
    )
}

#[async_trait]
impl UnitStatusRepository for DieselUnitStatusRepository {
    async fn find_unit_status(
        &self,
        period_id: i32,
        unit_id: i32,
        form: FormKind,
    ) -> Result<Option<i32>, UnitStatusRepositoryError> {
        use semaforo_unidad_academica::dsl;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        dsl::semaforo_unidad_academica
            .filter(dsl::id_periodo.eq(period_id))
            .filter(dsl::id_unidad_academica.eq(unit_id))
            .filter(dsl::id_formato.eq(form.format_id()))
            .select(dsl::id_semaforo)
            .first::<i32>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }
}
