//! *CCSPlayerPawn* — see design docs §4.2.4.

use nalgebra::Vector3;

use crate::entity::EntityId;
use crate::event::{Event, EventBus};
use crate::model::equipment::EquipmentType;
use crate::model::player::{PlayerFlags, ViewAngle};
use crate::model::TickPosition;
use crate::state::GameState;

pub fn on_controller_handle_update(state: &mut GameState, pawn_entity_id: EntityId, controller_entity_id: EntityId) {
    if let Some(p) = state.players_by_entity_id.get_mut(&controller_entity_id) {
        p.pawn_entity_id = Some(pawn_entity_id);
    }
}

pub fn on_position_update(state: &mut GameState, bus: &mut EventBus, pawn_entity_id: EntityId, position: Vector3<f32>, tick: i32) {
    let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) else { return };
    p.prev_position = p.curr_position;
    p.curr_position = TickPosition { position, tick };
    let entity_id = pawn_entity_id;
    bus.dispatch(Event::PlayerMove { entity_id });
}

pub fn on_view_angle_update(state: &mut GameState, bus: &mut EventBus, pawn_entity_id: EntityId, pitch: f32, yaw: f32) {
    let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) else { return };
    p.view_angle = ViewAngle { pitch, yaw };
    bus.dispatch(Event::PlayerViewAngleChange { entity_id: pawn_entity_id });
}

pub fn on_flags_update(state: &mut GameState, pawn_entity_id: EntityId, raw: u32) {
    if let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) {
        p.flags = PlayerFlags::from_bits_truncate(raw);
    }
}

pub fn on_defuse_kit_update(state: &mut GameState, bus: &mut EventBus, pawn_entity_id: EntityId, has_kit: bool) {
    if let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) {
        p.has_defuse_kit = has_kit;
    }
    bus.dispatch(Event::DefuseKitUpdate { entity_id: pawn_entity_id, has_kit });
}

pub fn on_helmet_update(state: &mut GameState, bus: &mut EventBus, pawn_entity_id: EntityId, has_helmet: bool) {
    if let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) {
        p.has_helmet = has_helmet;
    }
    bus.dispatch(Event::HelmetUpdate { entity_id: pawn_entity_id, has_helmet });
}

pub fn on_armor_update(state: &mut GameState, bus: &mut EventBus, pawn_entity_id: EntityId, new_armor: i32) {
    let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) else { return };
    let old = p.armor;
    if old == new_armor {
        return;
    }
    p.armor = new_armor;
    bus.dispatch(Event::ArmorUpdate { entity_id: pawn_entity_id, old, new: new_armor });
}

/// `m_flFlashDuration`. `current_tick` is the tick this update was observed
/// on; flash attribution appends to the oldest in-flight flashbang.
pub fn on_flash_duration_update(
    state: &mut GameState,
    pawn_entity_id: EntityId,
    new_duration: f32,
    current_tick: i32,
) {
    let old_duration = state
        .player_by_pawn_handle(pawn_entity_id)
        .map(|p| p.flash_duration)
        .unwrap_or(0.0);

    if let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) {
        p.flash_duration = new_duration;
        p.flash_tick = if new_duration == 0.0 { 0 } else { current_tick };
    }

    if old_duration == 0.0 && new_duration > 0.0 {
        if let Some(oldest) = state.flying_flashbangs.first_mut() {
            oldest.flashed_entity_ids.push(pawn_entity_id);
        }
    }
}

/// `m_pWeaponServices.m_hActiveWeapon` update.
pub fn on_active_weapon_update(
    state: &mut GameState,
    bus: &mut EventBus,
    pawn_entity_id: EntityId,
    new_weapon_entity_id: Option<EntityId>,
) {
    use crate::model::equipment::EquipmentState;

    let Some(controller_entity_id) = state.player_by_pawn_handle(pawn_entity_id).and_then(|p| p.entity_id) else {
        return;
    };

    let previous = state
        .players_by_entity_id
        .get(&controller_entity_id)
        .and_then(|p| p.active_weapon_entity_id);

    if let Some(prev_id) = previous {
        if let Some(eq) = state.weapons.get_mut(&prev_id) {
            if eq.state != EquipmentState::Destroyed && eq.owner == Some(controller_entity_id) {
                eq.state = EquipmentState::Holstered;
                bus.dispatch(Event::ItemStateUpdate { equipment_entity_id: prev_id, state: 1 });
            }
        }
    }

    if let Some(new_id) = new_weapon_entity_id {
        if let Some(eq) = state.weapons.get_mut(&new_id) {
            eq.state = EquipmentState::Active;
            bus.dispatch(Event::ItemStateUpdate { equipment_entity_id: new_id, state: 2 });
        }
    }

    if let Some(p) = state.players_by_entity_id.get_mut(&controller_entity_id) {
        p.active_weapon_entity_id = new_weapon_entity_id;
    }
    bus.dispatch(Event::ActiveWeaponUpdate { entity_id: pawn_entity_id });
}

/// `m_bInBuyZone`, read by the equipment binder's refund detection.
pub fn on_buy_zone_update(state: &mut GameState, pawn_entity_id: EntityId, in_buy_zone: bool) {
    if let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) {
        p.is_in_buy_zone = in_buy_zone;
    }
}

pub fn on_is_defusing_update(state: &mut GameState, pawn_entity_id: EntityId, defusing: bool) {
    if let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) {
        p.is_defusing = defusing;
    }
}

pub fn on_health_or_life_state_update(
    state: &mut GameState,
    pawn_entity_id: EntityId,
    health: i32,
    life_state_raw: i32,
) {
    use crate::model::player::LifeState;
    if let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) {
        p.health = health;
        p.life_state = if health <= 0 || life_state_raw != 0 {
            LifeState::Dead
        } else {
            LifeState::Alive
        };
    }
}

/// `m_bLeftHanded`. Skipped on the very first tick (`ingame_tick == 0`) to
/// avoid a spurious event for the initial-value echo.
pub fn on_left_handed_update(
    state: &mut GameState,
    bus: &mut EventBus,
    pawn_entity_id: EntityId,
    left_handed: bool,
    ingame_tick: i32,
) {
    if ingame_tick == 0 {
        return;
    }
    if let Some(p) = state.player_by_pawn_handle_mut(pawn_entity_id) {
        p.left_handed = left_handed;
    }
    bus.dispatch(Event::HandSwitch { entity_id: pawn_entity_id, left_handed });
}

/// The 32-bit spotted-by mask, split across `m_bSpottedByMask.0000/.0001`.
pub fn on_spotted_by_mask_update(bus: &mut EventBus, pawn_entity_id: EntityId) {
    bus.dispatch(Event::PlayerSpottersChanged { entity_id: pawn_entity_id });
}

/// Grenade ammo slots 13..17: HE, Flash, Smoke, molotov-or-incendiary, Decoy.
pub fn on_grenade_ammo_update(
    state: &mut GameState,
    bus: &mut EventBus,
    pawn_entity_id: EntityId,
    slot_index: u32,
    quantity: i32,
    thrower_team_is_terrorist: bool,
) {
    let Some(controller_entity_id) = state.player_by_pawn_handle(pawn_entity_id).and_then(|p| p.entity_id) else {
        return;
    };
    let Some(p) = state.players_by_entity_id.get_mut(&controller_entity_id) else { return };

    let (slot, ty) = match slot_index {
        13 => (0usize, EquipmentType::He),
        14 => (1, EquipmentType::Flash),
        15 => (2, EquipmentType::Smoke),
        16 => {
            // 3-step fallback: inventory lookup -> team default -> zero.
            let ty = if p.inventory.values().any(|t| *t == EquipmentType::Molotov) {
                EquipmentType::Molotov
            } else if p.inventory.values().any(|t| *t == EquipmentType::Incendiary) {
                EquipmentType::Incendiary
            } else if thrower_team_is_terrorist {
                EquipmentType::Molotov
            } else {
                EquipmentType::Incendiary
            };
            (3, ty)
        }
        17 => (4, EquipmentType::Decoy),
        _ => return,
    };
    p.grenade_ammo[slot] = quantity;
    bus.dispatch(Event::GrenadeUpdate { entity_id: pawn_entity_id, ty, quantity });
}
