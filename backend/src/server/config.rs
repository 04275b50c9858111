//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use captura::domain::PortalSettings;
use captura::outbound::persistence::DbPool;
use sqlx::PgPool;

/// sqlx pools and schema used for stored-procedure calls.
pub(crate) struct ProcedureBackend {
    pub(crate) pool: PgPool,
    /// Separate pool for advisory-lock transactions.
    pub(crate) lock_pool: PgPool,
    pub(crate) schema: String,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) settings: PortalSettings,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) procedures: Option<ProcedureBackend>,
}

impl ServerConfig {
    /// Configuration serving fixture ports until pools are attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, settings: PortalSettings) -> Self {
        Self {
            bind_addr,
            settings,
            db_pool: None,
            procedures: None,
        }
    }

    /// Attach the Diesel pool backing catalogs, staging, status lights and
    /// reviewer decisions.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the sqlx pools backing procedure calls and the finalize lock.
    ///
    /// `lock_pool` must be distinct from `pool`: lock holders keep their
    /// connection while the guarded procedures run on `pool`.
    #[must_use]
    pub fn with_procedure_pools(
        mut self,
        pool: PgPool,
        lock_pool: PgPool,
        schema: impl Into<String>,
    ) -> Self {
        self.procedures = Some(ProcedureBackend {
            pool,
            lock_pool,
            schema: schema.into(),
        });
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
