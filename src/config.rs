//! Configuration loader and schema types.
//!
//! This module exposes the settings that drive the player, the library
//! scanner and the HTTP server, plus helpers to load them from disk.

mod load;
mod schema;

pub use schema::*;
