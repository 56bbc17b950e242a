//! # Data Models
//!
//! SeaORM entities for the league store. Every collection except
//! [`tenant`] is tenant-aware and implements
//! [`TenantAware`](crate::tenancy::TenantAware).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod fixture;
pub mod match_event;
pub mod player;
pub mod season;
pub mod team;
pub mod tenant;
pub mod tenant_settings;

pub use fixture::Entity as Fixture;
pub use match_event::Entity as MatchEvent;
pub use player::Entity as Player;
pub use season::Entity as Season;
pub use team::Entity as Team;
pub use tenant::Entity as Tenant;
pub use tenant_settings::Entity as TenantSettings;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "leagueos".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
