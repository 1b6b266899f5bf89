//! Worker host for the campaign engine.
//!
//! The engine lives on its own thread and is reached only through
//! request/response messages; the `dcc-worker` binary carries the same
//! messages as JSON lines over stdin/stdout.

pub mod error;
pub mod ipc;
pub mod state;
pub mod worker;

pub use dcc_sim as sim;
