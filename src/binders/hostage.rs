//! `CHostage` — see design docs §4.2.11.

use crate::entity::EntityId;
use crate::event::{Event, EventBus};
use crate::model::hostage::{Hostage, HostageState};
use crate::state::GameState;

pub fn on_create(state: &mut GameState, entity_id: EntityId) {
    state.hostages.entry(entity_id).or_insert_with(|| Hostage::new(entity_id));
}

pub fn on_state_update(state: &mut GameState, bus: &mut EventBus, entity_id: EntityId, state_raw: i64) {
    let new_state = HostageState::from_wire(state_raw);
    let hostage = state.hostages.entry(entity_id).or_insert_with(|| Hostage::new(entity_id));
    if hostage.state == new_state {
        return;
    }
    hostage.state = new_state;
    bus.dispatch(Event::HostageStateChanged { entity_id });
}

pub fn on_destroy(state: &mut GameState, entity_id: EntityId) {
    state.hostages.remove(&entity_id);
}
