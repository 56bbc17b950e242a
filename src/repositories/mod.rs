//! # Repository Layer
//!
//! Repositories wrap SeaORM operations for one collection each. Tenant-aware
//! repositories only ever talk to the database through a
//! [`ScopedConn`](crate::tenancy::ScopedConn), so none of them takes a tenant
//! id as an argument.

pub mod fixture;
pub mod player;
pub mod season;
pub mod team;
pub mod tenant;
pub mod tenant_settings;

pub use fixture::{
    FixtureRepository, MatchReport, ReportEvent, ScheduleMatchRequest, round_robin_rounds,
};
pub use player::{PlayerRepository, RegisterPlayerRequest};
pub use season::{CreateSeasonRequest, SeasonRepository};
pub use team::{CreateTeamRequest, TeamRepository};
pub use tenant::{CreateTenantRequest, TenantRepository};
pub use tenant_settings::TenantSettingsRepository;
