//! Incremental CS2 demo/replay state reconstruction: turns a stream of
//! entity/property deltas into a typed domain model and a synchronous event
//! stream. See [`parser::Parser`] for the entry point.

pub mod binders;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod model;
pub mod parser;
pub mod state;

#[cfg(test)]
pub mod testutil;

pub use config::ParserConfig;
pub use entity::{Entity, EntityId, EntitySource};
pub use error::ParseError;
pub use event::Event;
pub use parser::Parser;
pub use state::GameState;
