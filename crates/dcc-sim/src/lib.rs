//! Campaign engine for DCC.
//!
//! Owns the hecs-backed campaign registry, creates campaigns from the data
//! store, generates air-tasking packages, advances the campaign clock and
//! produces `CampaignStateView`s and resumable snapshots for the host.

pub mod campaign;
pub mod engine;
pub mod error;
pub mod packages;
pub mod resolution;
pub mod serialization;
pub mod systems;
pub mod world;
pub mod world_setup;

pub use dcc_core as core;
pub use engine::CampaignEngine;
pub use error::CampaignError;
pub use world::World;
