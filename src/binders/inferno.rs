//! `CInferno` — see design docs §4.2.8.

use nalgebra::Vector3;

use crate::entity::EntityId;
use crate::event::{Event, EventBus};
use crate::model::inferno::{Fire, Inferno};
use crate::state::GameState;

pub fn on_create(state: &mut GameState, bus: &mut EventBus, entity_id: EntityId, thrower: Option<EntityId>) {
    let mut inferno = Inferno::new(entity_id);
    inferno.thrower = thrower;
    state.infernos.insert(entity_id, inferno);
    bus.dispatch(Event::InfernoStart { entity_id });
}

/// Applies one of the 16 `m_bFireIsBurning` / `m_Origin` fire-slot updates.
pub fn on_fire_slot_update(
    state: &mut GameState,
    bus: &mut EventBus,
    entity_id: EntityId,
    slot: usize,
    position: Vector3<f32>,
    is_burning: bool,
) {
    let Some(inferno) = state.infernos.get_mut(&entity_id) else { return };
    if slot >= inferno.fires.len() {
        return;
    }
    let was_burning = inferno.fires[slot].as_ref().map(|f| f.is_burning).unwrap_or(false);
    inferno.fires[slot] = Some(Fire { position, is_burning });
    inferno.fire_count = inferno.fires.iter().filter(|f| f.as_ref().map(|f| f.is_burning).unwrap_or(false)).count() as i32;

    if is_burning && !was_burning {
        bus.dispatch(Event::InfernoFireStart { entity_id, slot });
    }
}

pub fn on_destroy(state: &mut GameState, bus: &mut EventBus, entity_id: EntityId) {
    if state.infernos.remove(&entity_id).is_some() {
        bus.dispatch(Event::InfernoExpired { entity_id });
    }
}
