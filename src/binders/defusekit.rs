//! `CCSGameRulesProxy`-tracked defuse kit spawns on the ground — see design
//! docs §4.2.12. Kits carried by a player are handled in [`crate::binders::pawn`].

use crate::entity::EntityId;
use crate::state::GameState;

pub fn on_create(state: &mut GameState, entity_id: EntityId) {
    state.defuse_kits.insert(entity_id);
}

pub fn on_destroy(state: &mut GameState, entity_id: EntityId) {
    state.defuse_kits.remove(&entity_id);
}
