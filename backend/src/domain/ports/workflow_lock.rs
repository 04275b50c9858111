//! Port for serialising the finalize decision per period, unit and form.

use async_trait::async_trait;

use crate::domain::FormKind;

use super::define_port_error;

define_port_error! {
    /// Errors raised by workflow lock adapters.
    pub enum WorkflowLockError {
        /// No connection could be obtained to take the lock.
        Connection { message: String } =>
            "workflow lock connection failed: {message}",
        /// Acquiring or releasing the lock failed.
        Lock { message: String } =>
            "workflow lock failed: {message}",
    }
}

/// Key of the read-decide-act section: `period|unit|form`.
///
/// # Examples
/// ```
/// use captura::domain::FormKind;
/// use captura::domain::ports::lock_key;
///
/// assert_eq!(lock_key("2025-2026/1", "ESCOM", FormKind::Enrollment), "2025-2026/1|ESCOM|matricula");
/// ```
pub fn lock_key(period: &str, unit_code: &str, form: FormKind) -> String {
    format!("{period}|{unit_code}|{form}")
}

/// A held lock. Dropping it without [`LockGuard::release`] also releases it.
#[async_trait]
pub trait LockGuard: Send {
    /// Release the lock.
    async fn release(self: Box<Self>) -> Result<(), WorkflowLockError>;
}

/// Mutual exclusion across requests and processes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowLock: Send + Sync {
    /// Block until the lock for `key` is held.
    async fn acquire(&self, key: &str) -> Result<Box<dyn LockGuard>, WorkflowLockError>;
}

/// Lock that is always free; for single-process fixture runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWorkflowLock;

struct FixtureGuard;

#[async_trait]
impl LockGuard for FixtureGuard {
    async fn release(self: Box<Self>) -> Result<(), WorkflowLockError> {
        Ok(())
    }
}

#[async_trait]
impl WorkflowLock for FixtureWorkflowLock {
    async fn acquire(&self, _key: &str) -> Result<Box<dyn LockGuard>, WorkflowLockError> {
        Ok(Box::new(FixtureGuard))
    }
}
