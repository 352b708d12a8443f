use serde::Serialize;

use crate::entity::EntityId;

/// Smoke grenades stay opaque for this many ticks after activation.
pub const SMOKE_LIFETIME_TICKS: i32 = 1412;

/// A smoke cloud. `Voxel` occupancy is read lazily and only tracked at all
/// when [`crate::config::ParserConfig::track_smoke_voxels`] is enabled.
#[derive(Debug, Clone, Serialize)]
pub struct Smoke {
    pub entity_id: EntityId,
    pub thrower: Option<EntityId>,
    pub is_active: bool,
    pub activation_tick: i32,
    pub voxel_frame_data: Vec<u8>,
}

impl Smoke {
    pub fn new(entity_id: EntityId, thrower: Option<EntityId>) -> Self {
        Smoke {
            entity_id,
            thrower,
            is_active: false,
            activation_tick: -1,
            voxel_frame_data: Vec::new(),
        }
    }

    pub fn expiration_tick(&self) -> i32 {
        if !self.is_active {
            return -1;
        }
        self.activation_tick + SMOKE_LIFETIME_TICKS
    }
}
