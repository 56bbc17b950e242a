use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use super::context::TenantId;

/// Isolation violations raised by the scoped data-access layer.
///
/// None of these are swallowed inside the tenancy module: every variant is
/// returned to the caller and mapped to a client or internal error at the
/// HTTP edge.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// A tenant-aware operation ran with no active tenant and no exemption.
    #[error("{access} on '{collection}' requires an active tenant")]
    Unscoped {
        collection: &'static str,
        access: &'static str,
    },

    /// A record links to another record owned by a different tenant.
    #[error("{field} belongs to tenant {found}, expected tenant {expected}")]
    CrossTenantReference {
        field: &'static str,
        expected: TenantId,
        found: TenantId,
    },

    /// A caller tried to write a tenant id that differs from the active one.
    #[error("record in '{collection}' is stamped for tenant {supplied}, active tenant is {active}")]
    TenantMismatch {
        collection: &'static str,
        active: TenantId,
        supplied: TenantId,
    },

    #[error("tenant_id of '{collection}' rows is immutable")]
    ImmutableTenant { collection: &'static str },

    /// Record does not exist, or belongs to another tenant. Both report the same.
    #[error("{collection} {id} not found")]
    NotFound { collection: &'static str, id: Uuid },

    #[error("invalid scoped operation: {0}")]
    Invalid(&'static str),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl ScopeError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unscoped { .. } | Self::CrossTenantReference { .. } | Self::NotFound { .. }
        )
    }
}
