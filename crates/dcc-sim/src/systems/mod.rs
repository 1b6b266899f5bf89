//! Campaign systems run by the engine each tick and round.
//!
//! Systems are free functions over the `World` plus whatever campaign
//! state they need. They hold no state of their own.

pub mod capture;
pub mod cleanup;
pub mod deployment;
pub mod flights;
pub mod movement;
pub mod planning;
pub mod reinforcement;
pub mod scores;
pub mod snapshot;
