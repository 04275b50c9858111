//! Application configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `CAPTURA_*` environment variables over a
//! configuration file. Every field is optional; accessors supply defaults.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{PeriodRef, PortalSettings};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PERIOD_LITERAL: &str = "2025-2026/1";
const DEFAULT_PERIOD_ID: i32 = 7;
const DEFAULT_PROCEDURE_SCHEMA: &str = "dbo";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_LOCK_POOL_MAX_SIZE: u32 = 4;

/// Settings for the capture portal process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAPTURA")]
pub struct AppConfig {
    /// PostgreSQL connection string. Without it the server runs on fixtures.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// Literal of the period used when a request names none.
    pub default_period_literal: Option<String>,
    /// Catalog id of the default period.
    pub default_period_id: Option<i32>,
    /// Schema holding the stored procedures.
    pub procedure_schema: Option<String>,
    /// Upper bound on pooled connections per pool.
    pub pool_max_size: Option<u32>,
    /// Upper bound on connections held by finalize-lock holders.
    pub lock_pool_max_size: Option<u32>,
    /// Apply embedded migrations at startup.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
}

impl AppConfig {
    /// Connection string, if one was configured and is not blank.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }

    /// Default period used by the orchestrator.
    pub fn default_period(&self) -> PeriodRef {
        PeriodRef::new(
            self.default_period_id.unwrap_or(DEFAULT_PERIOD_ID),
            self.default_period_literal
                .as_deref()
                .unwrap_or(DEFAULT_PERIOD_LITERAL),
        )
    }

    /// Schema holding the stored procedures.
    pub fn procedure_schema(&self) -> &str {
        self.procedure_schema
            .as_deref()
            .unwrap_or(DEFAULT_PROCEDURE_SCHEMA)
    }

    /// Pool size, never below one.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE).max(1)
    }

    /// Lock pool size, never below one.
    pub fn lock_pool_max_size(&self) -> u32 {
        self.lock_pool_max_size
            .unwrap_or(DEFAULT_LOCK_POOL_MAX_SIZE)
            .max(1)
    }

    /// Settings threaded into the domain services.
    pub fn portal_settings(&self) -> PortalSettings {
        PortalSettings::new(self.default_period())
    }
}
