use nalgebra::Vector3;
use serde::Serialize;

use crate::entity::EntityId;

#[derive(Debug, Clone, Serialize)]
pub struct Fire {
    pub position: Vector3<f32>,
    pub is_burning: bool,
}

/// A burning area created by a molotov/incendiary, up to 16 concurrent fire
/// slots.
#[derive(Debug, Clone, Serialize)]
pub struct Inferno {
    pub entity_id: EntityId,
    pub thrower: Option<EntityId>,
    pub fire_count: i32,
    pub fires: [Option<Fire>; 16],
}

impl Inferno {
    pub fn new(entity_id: EntityId) -> Self {
        Inferno {
            entity_id,
            thrower: None,
            fire_count: 0,
            fires: Default::default(),
        }
    }
}
