//! Contract shared by every tenant-aware entity.
//!
//! A tenant-aware collection declares its tenant column once through
//! [`TenantAware`]; the row filter, the insert stamp and the immutability
//! check are all derived from that declaration.

use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, EntityTrait, ModelTrait, Value,
};
use uuid::Uuid;

use super::context::TenantId;
use super::error::ScopeError;

/// Name of the row filter shared by all tenant-aware collections.
pub const TENANT_FILTER: &str = "tenant_filter";

pub trait TenantAware: EntityTrait {
    const FILTER_NAME: &'static str = TENANT_FILTER;

    /// Collection name used in filters, errors and metrics labels. Matches
    /// the table name.
    const COLLECTION: &'static str;

    fn tenant_column() -> Self::Column;

    fn id_column() -> Self::Column;

    fn collection() -> &'static str {
        Self::COLLECTION
    }
}

/// The row filter as armed on a data session: filter name plus parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterActivation {
    pub filter: &'static str,
    pub collection: &'static str,
    pub tenant_id: TenantId,
}

impl FilterActivation {
    pub fn new<E: TenantAware>(tenant_id: TenantId) -> Self {
        Self {
            filter: E::FILTER_NAME,
            collection: E::collection(),
            tenant_id,
        }
    }

    /// `tenant_id = :tenant` for the given collection.
    pub fn condition<E: TenantAware>(&self) -> Condition {
        Condition::all().add(E::tenant_column().eq(self.tenant_id.into_uuid()))
    }
}

pub(crate) fn value_as_uuid(value: &Value) -> Option<Uuid> {
    match value {
        Value::Uuid(Some(u)) => Some(**u),
        Value::String(Some(s)) => Uuid::parse_str(s).ok(),
        _ => None,
    }
}

/// Tenant of a loaded row.
pub fn tenant_of<M>(model: &M) -> Result<TenantId, ScopeError>
where
    M: ModelTrait,
    M::Entity: TenantAware,
{
    value_as_uuid(&model.get(<M::Entity as TenantAware>::tenant_column()))
        .map(TenantId)
        .ok_or(ScopeError::Invalid("tenant_id has unexpected type"))
}

/// Stamps the active tenant onto a new record.
///
/// An unset tenant column takes the active tenant. A column that was already
/// populated (for instance by deserializing a request body into a model) is
/// accepted only if it names the active tenant.
pub fn stamp_tenant<A>(active_model: &mut A, tenant: TenantId) -> Result<(), ScopeError>
where
    A: ActiveModelTrait,
    A::Entity: TenantAware,
{
    let column = <A::Entity as TenantAware>::tenant_column();
    match active_model.get(column) {
        ActiveValue::NotSet => {
            active_model.set(column, tenant.into_uuid().into());
            Ok(())
        }
        ActiveValue::Set(value) | ActiveValue::Unchanged(value) => {
            let supplied = value_as_uuid(&value)
                .map(TenantId)
                .ok_or(ScopeError::Invalid("tenant_id is required"))?;
            if supplied == tenant {
                Ok(())
            } else {
                Err(ScopeError::TenantMismatch {
                    collection: <A::Entity as TenantAware>::collection(),
                    active: tenant,
                    supplied,
                })
            }
        }
    }
}

/// Rejects an update whose active model carries a different tenant id.
pub fn guard_tenant_immutable<A>(active_model: &A, stored: TenantId) -> Result<(), ScopeError>
where
    A: ActiveModelTrait,
    A::Entity: TenantAware,
{
    let column = <A::Entity as TenantAware>::tenant_column();
    match active_model.get(column) {
        ActiveValue::NotSet => Ok(()),
        ActiveValue::Set(value) | ActiveValue::Unchanged(value) => match value_as_uuid(&value) {
            Some(incoming) if incoming == stored.into_uuid() => Ok(()),
            Some(_) => Err(ScopeError::ImmutableTenant {
                collection: <A::Entity as TenantAware>::collection(),
            }),
            None => Err(ScopeError::Invalid("tenant_id is required")),
        },
    }
}

/// Cross-entity tenant agreement check.
///
/// Runs on the assembled record before it is written, independently of the
/// row filter:
///
/// ```
/// # use leagueos::tenancy::{TenantId, TenantLinks};
/// # let tenant = TenantId(uuid::Uuid::new_v4());
/// TenantLinks::owned_by(tenant)
///     .link("season_id", tenant)
///     .link("home_team_id", tenant)
///     .verify()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TenantLinks {
    owner: TenantId,
    links: Vec<(&'static str, TenantId)>,
}

impl TenantLinks {
    pub fn owned_by(owner: TenantId) -> Self {
        Self {
            owner,
            links: Vec::new(),
        }
    }

    pub fn link(mut self, field: &'static str, tenant: TenantId) -> Self {
        self.links.push((field, tenant));
        self
    }

    /// Returns the shared tenant, or the first link that disagrees with it.
    pub fn verify(self) -> Result<TenantId, ScopeError> {
        for (field, found) in self.links {
            if found != self.owner {
                counter!("tenant_cross_reference_rejections_total", "field" => field)
                    .increment(1);
                tracing::warn!(
                    field,
                    expected = %self.owner,
                    found = %found,
                    "Rejected cross-tenant reference"
                );
                return Err(ScopeError::CrossTenantReference {
                    field,
                    expected: self.owner,
                    found,
                });
            }
        }
        Ok(self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::team;
    use chrono::Utc;
    use sea_orm::{IntoActiveModel, Set};

    fn tenant() -> TenantId {
        TenantId(Uuid::new_v4())
    }

    fn team_row(tenant_id: TenantId) -> team::Model {
        team::Model {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into_uuid(),
            name: "Eagles".to_string(),
            logo_url: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn collection_names_match_tables() {
        use crate::models::{fixture, match_event, player, season, tenant_settings};
        use sea_orm::EntityName;

        fn same_as_table<E: TenantAware>() {
            assert_eq!(E::collection(), E::default().table_name());
        }

        assert_eq!(team::Entity::collection(), "teams");
        assert_eq!(team::Entity::FILTER_NAME, TENANT_FILTER);
        same_as_table::<team::Entity>();
        same_as_table::<season::Entity>();
        same_as_table::<player::Entity>();
        same_as_table::<fixture::Entity>();
        same_as_table::<match_event::Entity>();
        same_as_table::<tenant_settings::Entity>();
    }

    #[test]
    fn stamp_fills_unset_tenant() {
        let active = tenant();
        let mut am = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Eagles".into()),
            ..Default::default()
        };

        stamp_tenant(&mut am, active).unwrap();
        assert_eq!(am.tenant_id, Set(active.into_uuid()));
    }

    #[test]
    fn stamp_rejects_foreign_tenant_from_payload() {
        let mut am = team::ActiveModel {
            tenant_id: Set(Uuid::new_v4()),
            ..Default::default()
        };

        let err = stamp_tenant(&mut am, tenant()).unwrap_err();
        assert!(matches!(err, ScopeError::TenantMismatch { collection: "teams", .. }));
    }

    #[test]
    fn tenant_cannot_change_after_creation() {
        let owner = tenant();
        let mut am = team_row(owner).into_active_model();
        assert!(guard_tenant_immutable(&am, owner).is_ok());

        am.tenant_id = Set(Uuid::new_v4());
        assert!(matches!(
            guard_tenant_immutable(&am, owner),
            Err(ScopeError::ImmutableTenant { .. })
        ));
    }

    #[test]
    fn tenant_of_reads_model_column() {
        let owner = tenant();
        assert_eq!(tenant_of(&team_row(owner)).unwrap(), owner);
    }

    #[test]
    fn links_with_one_foreign_tenant_are_rejected() {
        let a = tenant();
        let b = tenant();

        let err = TenantLinks::owned_by(a)
            .link("season_id", a)
            .link("home_team_id", a)
            .link("away_team_id", b)
            .verify()
            .unwrap_err();

        match err {
            ScopeError::CrossTenantReference {
                field,
                expected,
                found,
            } => {
                assert_eq!(field, "away_team_id");
                assert_eq!(expected, a);
                assert_eq!(found, b);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn condition_targets_tenant_column() {
        use sea_orm::{DbBackend, QueryFilter, QueryTrait};

        let owner = tenant();
        let activation = FilterActivation::new::<team::Entity>(owner);
        let sql = team::Entity::find()
            .filter(activation.condition::<team::Entity>())
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""teams"."tenant_id""#));
        assert!(sql.contains(&owner.to_string()));
    }
}
