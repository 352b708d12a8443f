//! The durable domain model: plain data records describing the match as
//! reconstructed tick by tick. `GameState` (see [`crate::state`]) is the sole
//! owner of every value here; everything else holds a non-owning reference
//! (an entity id, user id, or [`UniqueId2`]) and resolves through it.

pub mod bomb;
pub mod equipment;
pub mod grenade;
pub mod hostage;
pub mod inferno;
pub mod player;
pub mod rules;
pub mod smoke;
pub mod team;

use std::sync::atomic::{AtomicU64, Ordering};

/// A process-unique, monotonically increasing id. Entity ids are reused
/// across a demo (the wire format recycles indices), so anything that needs
/// real identity stability — distinguishing "the AK-47 picked up in round 3"
/// from "the AK-47 picked up in round 9" even though both happened to land
/// on entity id 118 — keys on this instead.
///
/// The original implementation this crate is based on additionally produces
/// a legacy 64-bit random id for backwards compatibility; see
/// [`legacy_unique_id`]. Internal bookkeeping here never uses that one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct UniqueId2(u64);

static NEXT_UNIQUE_ID2: AtomicU64 = AtomicU64::new(1);

impl UniqueId2 {
    pub fn next() -> Self {
        UniqueId2(NEXT_UNIQUE_ID2.fetch_add(1, Ordering::Relaxed))
    }
}

/// A collision-prone legacy identifier, kept only for ABI compatibility with
/// consumers that expect one. Never used internally for correctness — see
/// the open-questions section of the design docs.
pub fn legacy_unique_id(entity_id: crate::entity::EntityId, salt: u64) -> i64 {
    // A small splitmix-style mix; good enough to avoid obviously-correlated
    // ids across consecutive entities without pulling in a RNG crate for a
    // field nothing here relies on.
    let mut x = (entity_id as u64) ^ salt.wrapping_mul(0x9E3779B97F4A7C15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^= x >> 31;
    x as i64
}

/// A position sample tagged with the tick it was observed at, used for the
/// two-slot current/previous ring each player pawn keeps.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TickPosition {
    pub position: nalgebra::Vector3<f32>,
    pub tick: i32,
}

impl Default for TickPosition {
    fn default() -> Self {
        TickPosition {
            position: nalgebra::Vector3::zeros(),
            tick: -1,
        }
    }
}
