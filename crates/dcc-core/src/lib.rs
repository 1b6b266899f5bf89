//! Core types and definitions for the campaign engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! entity components, commands, state views, mission reports, constants,
//! tunable configuration and the static reference data store.
//! It has no dependency on the registry or any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod data;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
