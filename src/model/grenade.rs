use nalgebra::Vector3;
use serde::Serialize;

use crate::entity::EntityId;
use crate::model::equipment::EquipmentType;

/// A live thrown grenade, tracked from creation to destruction.
#[derive(Debug, Clone, Serialize)]
pub struct GrenadeProjectile {
    pub entity_id: EntityId,
    pub ty: EquipmentType,
    pub thrower: Option<EntityId>,
    pub owner: Option<EntityId>,
    /// The inventory `Equipment` it was thrown from, if still tracked.
    pub weapon_instance: Option<EntityId>,
    pub initial_position: Vector3<f32>,
    pub initial_velocity: Vector3<f32>,
    pub bounces: i32,
}

impl GrenadeProjectile {
    pub fn new(entity_id: EntityId) -> Self {
        GrenadeProjectile {
            entity_id,
            ty: EquipmentType::Unknown,
            thrower: None,
            owner: None,
            weapon_instance: None,
            initial_position: Vector3::zeros(),
            initial_velocity: Vector3::zeros(),
            bounces: 0,
        }
    }
}

/// An in-flight flashbang tracked separately so subsequent
/// `m_flFlashDuration` increases can be attributed to the thrower.
#[derive(Debug, Clone, Serialize)]
pub struct FlyingFlashbang {
    pub projectile_entity_id: EntityId,
    pub flashed_entity_ids: Vec<EntityId>,
    pub exploded_frame: Option<i32>,
}
