//! Execution-scoped storage for the active tenant.
//!
//! The active tenant lives in a `tokio::task_local!` cell, so it is bound to the
//! logical request being polled and never to the worker thread polling it. A
//! worker that interleaves requests for tenants A and B sees A's value only
//! while A's future is being polled.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use scopeguard::ScopeGuard;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task_local;
use utoipa::ToSchema;
use uuid::Uuid;

task_local! {
    static ACTIVE_TENANT: RefCell<Option<TenantId>>;
}

/// Opaque tenant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TenantId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<TenantId> for Uuid {
    fn from(value: TenantId) -> Self {
        value.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TenantId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("no tenant execution scope is active on this task")]
    NoExecutionScope,
}

/// Accessor for the current task's tenant.
///
/// `get` outside of [`TenantContext::scope`] is empty rather than an error;
/// only `set`/`enter` require a scope, because writing a tenant that nothing
/// will ever clear is the failure this type exists to prevent.
pub struct TenantContext;

impl TenantContext {
    /// Runs `future` inside a fresh, empty tenant scope.
    pub async fn scope<F>(future: F) -> F::Output
    where
        F: Future,
    {
        ACTIVE_TENANT.scope(RefCell::new(None), future).await
    }

    /// Runs `future` in a new scope that starts with the caller's tenant.
    ///
    /// Task-locals do not follow `tokio::spawn`; wrap spawned work with this
    /// so background subtasks keep the request's tenant.
    pub fn propagate<F>(future: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        ACTIVE_TENANT.scope(RefCell::new(Self::get()), future)
    }

    pub fn set(tenant: TenantId) -> Result<(), ContextError> {
        ACTIVE_TENANT
            .try_with(|cell| {
                *cell.borrow_mut() = Some(tenant);
            })
            .map_err(|_| ContextError::NoExecutionScope)
    }

    pub fn get() -> Option<TenantId> {
        ACTIVE_TENANT.try_with(|cell| *cell.borrow()).ok().flatten()
    }

    /// Empties the current scope. Idempotent, and a no-op outside a scope.
    pub fn clear() {
        let _ = ACTIVE_TENANT.try_with(|cell| cell.borrow_mut().take());
    }

    pub fn is_scoped() -> bool {
        ACTIVE_TENANT.try_with(|_| ()).is_ok()
    }

    /// Sets (or explicitly empties) the tenant and returns a guard that clears
    /// it again when dropped, whether the caller returns, errors, panics or is
    /// cancelled.
    pub fn enter(tenant: Option<TenantId>) -> Result<ContextGuard, ContextError> {
        match tenant {
            Some(id) => Self::set(id)?,
            None if Self::is_scoped() => Self::clear(),
            None => return Err(ContextError::NoExecutionScope),
        }

        let release: fn(()) = |()| TenantContext::clear();
        Ok(ContextGuard {
            _release: scopeguard::guard((), release),
        })
    }
}

/// Clears the tenant context on drop.
#[must_use = "the tenant is cleared as soon as the guard is dropped"]
pub struct ContextGuard {
    _release: ScopeGuard<(), fn(())>,
}

impl fmt::Debug for ContextGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextGuard")
            .field("tenant", &TenantContext::get())
            .finish()
    }
}
