//! # LeagueOS Library
//!
//! Multi-tenant sports league backend. All leagues share one schema; the
//! [`tenancy`] module keeps each request's reads and writes inside the league
//! named by its tenant header.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub mod tenancy;
pub use migration;
