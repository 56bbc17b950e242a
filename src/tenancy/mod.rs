//! # Tenant Isolation
//!
//! Shared-schema multi-tenancy: every tenant-aware table carries a `tenant_id`
//! column and every data operation on such a table is restricted to the
//! tenant active for the current request.
//!
//! - [`context`]: execution-scoped active tenant.
//! - [`middleware`]: HTTP boundary that sets and clears the context.
//! - [`enforcer`]: per-operation row filter on pooled sessions.
//! - [`entity`]: the tenant-aware entity contract and cross-entity checks.

pub mod context;
pub mod enforcer;
pub mod entity;
pub mod error;
pub mod middleware;

pub use context::{ContextError, ContextGuard, TenantContext, TenantId};
pub use enforcer::{
    Access, Armed, DataSession, ExemptConn, Exemption, ScopeEnforcer, ScopedConn, SessionPool,
    UnscopedPolicy,
};
pub use entity::{
    FilterActivation, TENANT_FILTER, TenantAware, TenantLinks, guard_tenant_immutable,
    stamp_tenant, tenant_of,
};
pub use error::ScopeError;
pub use middleware::{
    HeaderResolution, RequireTenant, TenantHeader, TenantHeaderName, resolve_tenant_header,
    tenant_boundary, with_tenant_boundary,
};
