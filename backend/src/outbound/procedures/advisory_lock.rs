//! `WorkflowLock` adapter built on PostgreSQL transaction-level advisory
//! locks.
//!
//! Acquiring opens a transaction on a pooled connection and runs
//! `pg_advisory_xact_lock(hashtextextended(key, 0))`. The lock lives as long
//! as that transaction: committing on release, or rolling back when the
//! guard is dropped, frees it. Other processes sharing the database wait on
//! the same key.
//!
//! The pool must not be the one procedures run on. A holder keeps its lock
//! connection while the guarded work draws from the procedure pool, so
//! sharing one pool lets waiting holders starve the work they wait for.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::domain::ports::{LockGuard, WorkflowLock, WorkflowLockError};

const DEFAULT_WAIT: Duration = Duration::from_secs(30);

/// Advisory-lock implementation of [`WorkflowLock`].
#[derive(Clone)]
pub struct PgAdvisoryLock {
    pool: PgPool,
    wait: Duration,
}

impl PgAdvisoryLock {
    /// Lock over a dedicated `pool`, waiting at most 30 seconds per
    /// acquisition.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            wait: DEFAULT_WAIT,
        }
    }
}

struct AdvisoryGuard {
    key: String,
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LockGuard for AdvisoryGuard {
    async fn release(self: Box<Self>) -> Result<(), WorkflowLockError> {
        let Self { key, tx } = *self;
        tx.commit()
            .await
            .map_err(|err| WorkflowLockError::lock(err.to_string()))?;
        debug!(key, "workflow lock released");
        Ok(())
    }
}

#[async_trait]
impl WorkflowLock for PgAdvisoryLock {
    async fn acquire(&self, key: &str) -> Result<Box<dyn LockGuard>, WorkflowLockError> {
        let mut tx = tokio::time::timeout(self.wait, self.pool.begin())
            .await
            .map_err(|_| WorkflowLockError::connection("timed out opening lock transaction"))?
            .map_err(|err| WorkflowLockError::connection(err.to_string()))?;

        tokio::time::timeout(
            self.wait,
            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                .bind(key)
                .execute(&mut *tx),
        )
        .await
        .map_err(|_| WorkflowLockError::lock(format!("timed out waiting for {key}")))?
        .map_err(|err| WorkflowLockError::lock(err.to_string()))?;

        debug!(key, "workflow lock acquired");
        Ok(Box::new(AdvisoryGuard {
            key: key.to_owned(),
            tx,
        }))
    }
}
