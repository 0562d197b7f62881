//! `warden-service`: authorization usecase, seeding and configuration.
//!
//! Transport adapters call into [`AuthorizationUsecase`]; nothing here knows
//! about wire formats.

pub mod bootstrap;
pub mod config;
pub mod usecase;

pub use bootstrap::{BootstrapReport, SeedPlan, bootstrap};
pub use config::WardenConfig;
pub use usecase::AuthorizationUsecase;
