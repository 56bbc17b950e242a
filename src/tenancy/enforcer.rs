//! Row filter enforcement at the data-access boundary.
//!
//! Data access for tenant-aware collections goes through [`ScopedConn`]. Every
//! call asks the [`ScopeEnforcer`] to arm the session's tenant filter from the
//! *current* [`TenantContext`] before the statement is built, so a pooled
//! session that still carries an earlier request's filter is re-armed rather
//! than trusted.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, DeleteMany, IntoActiveModel, PaginatorTrait, QueryFilter, QuerySelect, Select,
    TransactionTrait, UpdateMany,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::context::{TenantContext, TenantId};
use super::entity::{
    FilterActivation, TenantAware, guard_tenant_immutable, stamp_tenant, value_as_uuid,
};
use super::error::ScopeError;

/// Kind of data operation about to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
        }
    }
}

/// What happens to a tenant-aware read that runs with no active tenant.
///
/// Writes are always rejected without a tenant, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscopedPolicy {
    /// Reject with [`ScopeError::Unscoped`].
    #[default]
    FailClosed,
    /// Run the read across all tenants and log it.
    Permit,
}

impl UnscopedPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            UnscopedPolicy::FailClosed => "fail_closed",
            UnscopedPolicy::Permit => "permit",
        }
    }
}

impl fmt::Display for UnscopedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnscopedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_closed" | "fail-closed" | "deny" => Ok(UnscopedPolicy::FailClosed),
            "permit" | "allow" => Ok(UnscopedPolicy::Permit),
            other => Err(other.to_string()),
        }
    }
}

/// A pooled data-store session.
///
/// Sessions outlive requests. The filter a session carries is whatever the
/// last operation armed on it, possibly for a different tenant.
pub struct DataSession {
    id: usize,
    db: DatabaseConnection,
    armed: Mutex<Option<FilterActivation>>,
}

impl DataSession {
    pub fn new(id: usize, db: DatabaseConnection) -> Self {
        Self {
            id,
            db,
            armed: Mutex::new(None),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// The filter currently armed on this session.
    pub fn armed(&self) -> Option<FilterActivation> {
        self.lock().clone()
    }

    /// Arms `activation`, returning whatever was armed before.
    fn arm(&self, activation: FilterActivation) -> Option<FilterActivation> {
        self.lock().replace(activation)
    }

    fn disarm(&self) -> Option<FilterActivation> {
        self.lock().take()
    }

    fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn lock(&self) -> MutexGuard<'_, Option<FilterActivation>> {
        self.armed
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl fmt::Debug for DataSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSession")
            .field("id", &self.id)
            .field("armed", &self.armed())
            .finish()
    }
}

/// Fixed set of sessions handed out round-robin.
#[derive(Debug)]
pub struct SessionPool {
    sessions: Vec<Arc<DataSession>>,
    next: AtomicUsize,
}

impl SessionPool {
    /// Creates `size` sessions sharing `db`. A size of zero is raised to one.
    pub fn new(db: DatabaseConnection, size: usize) -> Self {
        let sessions = (0..size.max(1))
            .map(|id| Arc::new(DataSession::new(id, db.clone())))
            .collect();
        Self {
            sessions,
            next: AtomicUsize::new(0),
        }
    }

    pub fn size(&self) -> usize {
        self.sessions.len()
    }

    pub fn checkout(&self) -> Arc<DataSession> {
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        Arc::clone(&self.sessions[slot])
    }
}

/// Outcome of arming a session for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Armed {
    Tenant(FilterActivation),
    /// No tenant and the policy allows an unscoped read.
    Unrestricted,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeEnforcer {
    policy: UnscopedPolicy,
}

impl ScopeEnforcer {
    pub fn new(policy: UnscopedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnscopedPolicy {
        self.policy
    }

    /// Arms `session` for one operation on `E` from the current tenant context.
    ///
    /// Must be called once per operation. The returned activation is the one
    /// the operation has to apply; it is never read back from the session,
    /// which another task may re-arm in the meantime.
    pub fn activate<E: TenantAware>(
        &self,
        session: &DataSession,
        access: Access,
    ) -> Result<Armed, ScopeError> {
        let collection = E::collection();

        let Some(tenant) = TenantContext::get() else {
            session.disarm();
            return self.unscoped(collection, access);
        };

        let activation = FilterActivation::new::<E>(tenant);
        if let Some(stale) = session.arm(activation.clone())
            && stale.tenant_id != tenant
        {
            tracing::debug!(
                session = session.id(),
                stale_tenant = %stale.tenant_id,
                tenant_id = %tenant,
                collection,
                "Re-armed pooled session for a new tenant"
            );
        }
        counter!("tenant_filter_activations_total", "collection" => collection).increment(1);

        Ok(Armed::Tenant(activation))
    }

    /// Like [`ScopeEnforcer::activate`], but an unrestricted result is an error.
    pub fn require_tenant<E: TenantAware>(
        &self,
        session: &DataSession,
        access: Access,
    ) -> Result<FilterActivation, ScopeError> {
        match self.activate::<E>(session, access)? {
            Armed::Tenant(activation) => Ok(activation),
            Armed::Unrestricted => Err(ScopeError::Unscoped {
                collection: E::collection(),
                access: access.as_str(),
            }),
        }
    }

    fn unscoped(&self, collection: &'static str, access: Access) -> Result<Armed, ScopeError> {
        if access == Access::Write || self.policy == UnscopedPolicy::FailClosed {
            counter!(
                "tenant_unscoped_access_total",
                "collection" => collection,
                "outcome" => "rejected"
            )
            .increment(1);
            tracing::warn!(
                collection,
                access = access.as_str(),
                "Rejected tenant-aware operation without an active tenant"
            );
            return Err(ScopeError::Unscoped {
                collection,
                access: access.as_str(),
            });
        }

        counter!(
            "tenant_unscoped_access_total",
            "collection" => collection,
            "outcome" => "permitted"
        )
        .increment(1);
        tracing::warn!(
            collection,
            policy = %self.policy,
            "Unscoped read across all tenants"
        );
        Ok(Armed::Unrestricted)
    }
}

/// Tenant-agnostic operations that may bypass the row filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    ListTenants,
    RegisterTenant,
    ResolveTenantBySubdomain,
}

impl Exemption {
    pub fn as_str(self) -> &'static str {
        match self {
            Exemption::ListTenants => "list_tenants",
            Exemption::RegisterTenant => "register_tenant",
            Exemption::ResolveTenantBySubdomain => "resolve_tenant_by_subdomain",
        }
    }
}

/// Data access bound to one pooled session, scoped on every call.
///
/// `C` is the connection statements run on: the shared pool, or a
/// transaction opened with [`ScopedConn::begin`]. Both arm the same session.
#[derive(Clone)]
pub struct ScopedConn<C = DatabaseConnection> {
    session: Arc<DataSession>,
    enforcer: ScopeEnforcer,
    conn: C,
}

impl ScopedConn {
    pub fn new(session: Arc<DataSession>, enforcer: ScopeEnforcer) -> Self {
        let conn = session.connection().clone();
        Self {
            session,
            enforcer,
            conn,
        }
    }

    /// Connection for one of the enumerated tenant-agnostic operations.
    ///
    /// Any filter the session still carries is disarmed first.
    pub fn exempt(&self, exemption: Exemption) -> ExemptConn<'_> {
        if let Some(stale) = self.session.disarm() {
            tracing::debug!(
                session = self.session.id(),
                stale_tenant = %stale.tenant_id,
                "Disarmed tenant filter for exempt operation"
            );
        }
        tracing::debug!(
            exemption = exemption.as_str(),
            tenant_id = ?TenantContext::get(),
            "Running tenant-agnostic operation"
        );
        ExemptConn {
            session: &self.session,
            exemption,
        }
    }
}

impl ScopedConn<DatabaseTransaction> {
    /// Commits the transaction. Dropping it uncommitted rolls back.
    pub async fn commit(self) -> Result<(), ScopeError> {
        Ok(self.conn.commit().await?)
    }
}

impl<C> ScopedConn<C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn session(&self) -> &DataSession {
        &self.session
    }

    /// Opens a transaction on the same session. Scoping still happens per
    /// statement, from the tenant context current at that statement.
    pub async fn begin(&self) -> Result<ScopedConn<DatabaseTransaction>, ScopeError> {
        let txn = self.conn.begin().await?;
        Ok(ScopedConn {
            session: Arc::clone(&self.session),
            enforcer: self.enforcer,
            conn: txn,
        })
    }

    fn scoped<E: TenantAware>(&self, select: Select<E>) -> Result<Select<E>, ScopeError> {
        Ok(match self.enforcer.activate::<E>(&self.session, Access::Read)? {
            Armed::Tenant(activation) => select.filter(activation.condition::<E>()),
            Armed::Unrestricted => select,
        })
    }

    /// Tenant a write on `E` will be stamped with. Arms the session.
    pub fn writing_tenant<E: TenantAware>(&self) -> Result<TenantId, ScopeError> {
        self.enforcer
            .require_tenant::<E>(&self.session, Access::Write)
            .map(|activation| activation.tenant_id)
    }

    pub async fn find_all<E: TenantAware>(
        &self,
        select: Select<E>,
    ) -> Result<Vec<E::Model>, ScopeError> {
        let select = self.scoped(select)?;
        Ok(select.all(&self.conn).await?)
    }

    pub async fn find_one<E: TenantAware>(
        &self,
        select: Select<E>,
    ) -> Result<Option<E::Model>, ScopeError> {
        let select = self.scoped(select)?;
        Ok(select.one(&self.conn).await?)
    }

    /// Loads one row by primary key; rows of other tenants are `NotFound`.
    pub async fn find_by_id<E: TenantAware>(&self, id: Uuid) -> Result<E::Model, ScopeError> {
        self.find_one(E::find().filter(E::id_column().eq(id)))
            .await?
            .ok_or(ScopeError::NotFound {
                collection: E::collection(),
                id,
            })
    }

    /// Like [`ScopedConn::find_by_id`], holding a row lock until the
    /// transaction ends. Backends without row locks (SQLite) ignore the lock.
    pub async fn lock_by_id<E: TenantAware>(&self, id: Uuid) -> Result<E::Model, ScopeError> {
        self.find_one(E::find().filter(E::id_column().eq(id)).lock_exclusive())
            .await?
            .ok_or(ScopeError::NotFound {
                collection: E::collection(),
                id,
            })
    }

    pub async fn count<E>(&self, select: Select<E>) -> Result<u64, ScopeError>
    where
        E: TenantAware,
        E::Model: Sync,
    {
        let select = self.scoped(select)?;
        Ok(select.count(&self.conn).await?)
    }

    /// Inserts a new row stamped with the active tenant.
    pub async fn insert<E>(&self, mut active_model: E::ActiveModel) -> Result<E::Model, ScopeError>
    where
        E: TenantAware,
        E::ActiveModel: Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        let activation = self
            .enforcer
            .require_tenant::<E>(&self.session, Access::Write)?;
        stamp_tenant(&mut active_model, activation.tenant_id)?;
        Ok(active_model.insert(&self.conn).await?)
    }

    /// Updates one row inside the active tenant. The primary key must be set;
    /// the tenant column must be unset or unchanged.
    pub async fn update<E>(&self, active_model: E::ActiveModel) -> Result<E::Model, ScopeError>
    where
        E: TenantAware,
        E::ActiveModel: Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        let activation = self
            .enforcer
            .require_tenant::<E>(&self.session, Access::Write)?;
        guard_tenant_immutable(&active_model, activation.tenant_id)?;

        let id = active_model
            .get(E::id_column())
            .into_value()
            .as_ref()
            .and_then(value_as_uuid)
            .ok_or(ScopeError::Invalid("primary key is required for update"))?;

        E::update(active_model)
            .filter(activation.condition::<E>())
            .exec(&self.conn)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => ScopeError::NotFound {
                    collection: E::collection(),
                    id,
                },
                other => ScopeError::Db(other),
            })
    }

    /// Bulk update restricted to the active tenant's rows.
    pub async fn update_many<E: TenantAware>(
        &self,
        update: UpdateMany<E>,
    ) -> Result<u64, ScopeError> {
        let activation = self
            .enforcer
            .require_tenant::<E>(&self.session, Access::Write)?;
        let result = update
            .filter(activation.condition::<E>())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Bulk delete restricted to the active tenant's rows.
    pub async fn delete_many<E: TenantAware>(
        &self,
        delete: DeleteMany<E>,
    ) -> Result<u64, ScopeError> {
        let activation = self
            .enforcer
            .require_tenant::<E>(&self.session, Access::Write)?;
        let result = delete
            .filter(activation.condition::<E>())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_id<E: TenantAware>(&self, id: Uuid) -> Result<(), ScopeError> {
        let deleted = self
            .delete_many(E::delete_many().filter(E::id_column().eq(id)))
            .await?;
        if deleted == 0 {
            return Err(ScopeError::NotFound {
                collection: E::collection(),
                id,
            });
        }
        Ok(())
    }
}

impl<C> fmt::Debug for ScopedConn<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedConn")
            .field("session", &self.session)
            .field("enforcer", &self.enforcer)
            .finish_non_exhaustive()
    }
}

/// Unfiltered connection, only reachable through [`ScopedConn::exempt`].
#[derive(Debug)]
pub struct ExemptConn<'a> {
    session: &'a DataSession,
    exemption: Exemption,
}

impl ExemptConn<'_> {
    pub fn exemption(&self) -> Exemption {
        self.exemption
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.session.connection()
    }
}
