//! `CSmokeGrenadeProjectile` once detonated — see design docs §4.2.9.

use crate::config::ParserConfig;
use crate::entity::EntityId;
use crate::model::smoke::Smoke;
use crate::state::GameState;

pub fn on_create(state: &mut GameState, entity_id: EntityId, thrower: Option<EntityId>) {
    state.smokes.insert(entity_id, Smoke::new(entity_id, thrower));
}

pub fn on_detonate(state: &mut GameState, entity_id: EntityId, tick: i32) {
    if let Some(smoke) = state.smokes.get_mut(&entity_id) {
        smoke.is_active = true;
        smoke.activation_tick = tick;
    }
}

/// Only retained when [`ParserConfig::track_smoke_voxels`] is set.
pub fn on_voxel_update(state: &mut GameState, config: &ParserConfig, entity_id: EntityId, frame: &[u8]) {
    if !config.track_smoke_voxels {
        return;
    }
    if let Some(smoke) = state.smokes.get_mut(&entity_id) {
        smoke.voxel_frame_data.clear();
        smoke.voxel_frame_data.extend_from_slice(frame);
    }
}

/// Called once `current_tick >= smoke.expiration_tick()`, or when the
/// entity is destroyed early.
pub fn on_expire_or_destroy(state: &mut GameState, entity_id: EntityId) {
    state.smokes.remove(&entity_id);
}
