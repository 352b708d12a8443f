//! The binding layer: one module per server class, each exposing plain
//! functions that mutate [`crate::state::GameState`] and emit
//! [`crate::event::Event`]s in response to a single property update or
//! lifecycle callback.
//!
//! These are written as ordinary functions rather than as closures
//! subscribed directly against [`crate::entity::Entity`] so they can be unit
//! tested without a real entity source (see [`crate::testutil`]); the
//! façade (`crate::parser`) is what actually wires them up to property
//! callbacks on a live entity source.

pub mod bomb;
pub mod controller;
pub mod defusekit;
pub mod equipment;
pub mod grenade;
pub mod hostage;
pub mod inferno;
pub mod netmsg;
pub mod pawn;
pub mod rules;
pub mod smoke;
pub mod team;
pub mod weapons;
