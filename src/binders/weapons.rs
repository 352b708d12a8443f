//! *m_hMyWeapons* — the per-pawn 64-slot weapon array. See design docs §4.2.5.

use crate::entity::EntityId;
use crate::event::{Event, EventBus};
use crate::model::equipment::{Equipment, EquipmentType};
use crate::state::GameState;

/// Applies a full 64-slot snapshot of a pawn's weapon handles, diffing
/// against the owning player's cached `inventory` and dispatching
/// `ItemNewOwner`/`ItemDroped` for slots that changed.
pub fn on_weapon_array_update(
    state: &mut GameState,
    bus: &mut EventBus,
    pawn_entity_id: EntityId,
    slots: &[Option<EntityId>],
) {
    let Some(controller_entity_id) = state.player_by_pawn_handle(pawn_entity_id).and_then(|p| p.entity_id) else {
        return;
    };

    let previous: std::collections::HashSet<EntityId> = state
        .players_by_entity_id
        .get(&controller_entity_id)
        .map(|p| p.inventory.keys().copied().collect())
        .unwrap_or_default();

    let current: std::collections::HashSet<EntityId> = slots.iter().filter_map(|s| *s).collect();

    for &dropped_id in previous.difference(&current) {
        if let Some(eq) = state.weapons.get_mut(&dropped_id) {
            if eq.owner == Some(controller_entity_id) {
                eq.owner = None;
                bus.dispatch(Event::ItemDroped { equipment_entity_id: dropped_id });
            }
        }
    }

    for &added_id in current.difference(&previous) {
        if let Some(eq) = state.weapons.get_mut(&added_id) {
            eq.owner = Some(controller_entity_id);
            bus.dispatch(Event::ItemNewOwner {
                equipment_entity_id: added_id,
                owner_entity_id: controller_entity_id,
            });
        }
    }

    if let Some(p) = state.players_by_entity_id.get_mut(&controller_entity_id) {
        p.inventory.retain(|id, _| current.contains(id));
        for &id in &current {
            if !p.inventory.contains_key(&id) {
                if let Some(eq) = state.weapons.get(&id) {
                    p.inventory.insert(id, eq.ty);
                }
            }
        }
    }
}

/// Registers a freshly-seen weapon entity before its owner handle is known.
pub fn on_weapon_entity_created(state: &mut GameState, entity_id: EntityId, ty: EquipmentType) {
    state.weapons.entry(entity_id).or_insert_with(|| Equipment::new(ty, entity_id));
}
