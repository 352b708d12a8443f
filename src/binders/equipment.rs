//! Weapon/equipment entities (`CWeapon*`, `CC4`, `CEconEntity`) — resolving
//! the concrete [`EquipmentType`], model-hash caching, money-refund
//! detection and jump-throw/fake-fire reporting. See design docs §4.2.6.

use crate::config::ParserConfig;
use crate::entity::EntityId;
use crate::event::{Event, EventBus};
use crate::model::equipment::{equipment_index_mapping, map_equipment, EquipmentState, EquipmentType};
use crate::state::GameState;

/// Resolves a model's precache string to an `EquipmentType`, memoizing the
/// result against `model_index` so repeated entities sharing a model only
/// pay the string-matching cost once. A model that maps to nothing
/// recognized is the "silent tolerance" tier: logged at
/// [`ParserConfig::silent_fallback_log_level`] rather than surfaced as a
/// [`crate::event::Event::ParserWarn`].
pub fn resolve_equipment_type(
    state: &mut GameState,
    config: &ParserConfig,
    model_index: u64,
    model_path: &str,
) -> EquipmentType {
    if let Some(ty) = state.model_equipment_cache.get(&model_index) {
        return *ty;
    }
    let ty = map_equipment(model_path);
    if ty == EquipmentType::Unknown {
        log::log!(config.silent_fallback_log_level, "unrecognized equipment model path {model_path}");
    }
    state.model_equipment_cache.insert(model_index, ty);
    ty
}

/// `m_iItemDefinitionIndex` present on the entity: prefer it over the model
/// path, falling back and emitting a warning when the index is unmapped.
pub fn resolve_equipment_type_from_item_index(
    state: &GameState,
    bus: &mut EventBus,
    item_def_index: Option<u64>,
) -> EquipmentType {
    let _ = state;
    match item_def_index {
        Some(idx) => equipment_index_mapping(idx).unwrap_or_else(|| {
            bus.dispatch(Event::ParserWarn {
                warn_type: crate::event::WarnType::UnknownEquipmentIndex,
                detail: format!("unmapped item definition index {idx}"),
            });
            EquipmentType::Unknown
        }),
        None => {
            bus.dispatch(Event::ParserWarn {
                warn_type: crate::event::WarnType::MissingItemDefinitionIndex,
                detail: "entity has no m_iItemDefinitionIndex".to_string(),
            });
            EquipmentType::Unknown
        }
    }
}

/// `m_hOwnerEntity` update. A transition to no owner is a drop (state `0`);
/// a transition to a new owner starts holstered (state `1`) unless that
/// owner's active weapon handle already points at this entity — in which
/// case `on_active_weapon_update` (§4.2.4) owns the `Active` transition.
pub fn on_owner_update(
    state: &mut GameState,
    bus: &mut EventBus,
    equipment_entity_id: EntityId,
    new_owner: Option<EntityId>,
) {
    let Some(eq) = state.weapons.get(&equipment_entity_id) else { return };
    let previous = eq.owner;
    let ty = eq.ty;

    if let Some(prev) = previous {
        if new_owner != Some(prev) {
            if let Some(p) = state.players_by_entity_id.get_mut(&prev) {
                p.inventory.remove(&equipment_entity_id);
            }
        }
    }

    match new_owner {
        Some(owner) => {
            let is_active = state
                .players_by_entity_id
                .get(&owner)
                .and_then(|p| p.active_weapon_entity_id)
                == Some(equipment_entity_id);

            if let Some(eq) = state.weapons.get_mut(&equipment_entity_id) {
                eq.owner = Some(owner);
                if !is_active {
                    eq.state = EquipmentState::Holstered;
                }
            }
            if let Some(p) = state.players_by_entity_id.get_mut(&owner) {
                p.inventory.insert(equipment_entity_id, ty);
            }
            bus.dispatch(Event::ItemNewOwner { equipment_entity_id, owner_entity_id: owner });
            if !is_active {
                bus.dispatch(Event::ItemStateUpdate {
                    equipment_entity_id,
                    state: EquipmentState::Holstered.as_wire(),
                });
            }
        }
        None => {
            if let Some(eq) = state.weapons.get_mut(&equipment_entity_id) {
                eq.owner = None;
                eq.state = EquipmentState::Dropped;
            }
            bus.dispatch(Event::ItemDroped { equipment_entity_id });
            bus.dispatch(Event::ItemStateUpdate {
                equipment_entity_id,
                state: EquipmentState::Dropped.as_wire(),
            });
        }
    }
}

/// `m_bIsJumpThrow` goes true-then-false around a single grenade attack.
pub fn on_jump_throw(bus: &mut EventBus, equipment_entity_id: EntityId, is_jump_throw: bool) {
    if is_jump_throw {
        bus.dispatch(Event::JumpThrow { equipment_entity_id });
    }
}

/// A `weapon_fire` game-event whose owning pawn has no matching live
/// `CCSPlayerPawn` (simulated shots, replay-only traces).
pub fn on_fake_weapon_fire(bus: &mut EventBus, shooter_entity_id: EntityId, weapon_entity_id: EntityId) {
    bus.dispatch(Event::FakeWeaponFire { shooter_entity_id, weapon_entity_id });
}

/// Entity destroyed: always ends the equipment's lifecycle with state `-1`.
/// If the owner was standing in a buy zone and their money increased on
/// this exact tick, the destroy is a buy-menu refund rather than a genuine
/// drop-then-destroy (datatables.go's `m_iAccount` + `IsInBuyZone` check).
pub fn on_destroy(state: &mut GameState, bus: &mut EventBus, equipment_entity_id: EntityId, current_tick: i32) {
    let Some(eq) = state.weapons.remove(&equipment_entity_id) else { return };
    for p in state.players_by_entity_id.values_mut() {
        p.inventory.remove(&equipment_entity_id);
    }

    bus.dispatch(Event::ItemStateUpdate {
        equipment_entity_id,
        state: EquipmentState::Destroyed.as_wire(),
    });

    let is_refund = eq
        .owner
        .and_then(|owner| state.players_by_entity_id.get(&owner))
        .map(|owner| owner.is_in_buy_zone && owner.last_money_increased && owner.last_money_update_tick == current_tick)
        .unwrap_or(false);

    if is_refund {
        if let Some(owner) = eq.owner {
            bus.dispatch(Event::ItemRefund { equipment_entity_id, owner_entity_id: owner });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::equipment::Equipment;
    use crate::model::player::Player;

    #[test]
    fn resolve_equipment_type_memoizes_by_model_index() {
        let mut state = GameState::new();
        let config = ParserConfig::default();
        let ty = resolve_equipment_type(&mut state, &config, 42, "weapons/models/weapon_ak47.vmdl");
        assert_eq!(ty, EquipmentType::Ak47);
        assert_eq!(state.model_equipment_cache.get(&42), Some(&EquipmentType::Ak47));

        // Same index, unrelated path: the cached value wins.
        let ty2 = resolve_equipment_type(&mut state, &config, 42, "weapons/models/weapon_deagle.vmdl");
        assert_eq!(ty2, EquipmentType::Ak47);
    }

    #[test]
    fn resolve_equipment_type_falls_back_silently_on_unknown_model_and_logs() {
        use crate::testutil::CapturingLogger;
        static LOGGER: std::sync::OnceLock<CapturingLogger> = std::sync::OnceLock::new();
        let logger = LOGGER.get_or_init(CapturingLogger::new);
        let _ = log::set_logger(logger);
        log::set_max_level(log::LevelFilter::Debug);

        let mut state = GameState::new();
        let config = ParserConfig::default();
        resolve_equipment_type(&mut state, &config, 1234, "props/some_unrelated_prop.vmdl");

        assert!(logger
            .records()
            .iter()
            .any(|(level, msg)| *level == log::Level::Debug && msg.contains("props/some_unrelated_prop.vmdl")));
    }

    #[test]
    fn resolve_equipment_type_falls_back_silently_on_unknown_model() {
        let mut state = GameState::new();
        let config = ParserConfig::default();
        let ty = resolve_equipment_type(&mut state, &config, 7, "props/some_unrelated_prop.vmdl");
        assert_eq!(ty, EquipmentType::Unknown);
        assert_eq!(state.model_equipment_cache.get(&7), Some(&EquipmentType::Unknown));
    }

    #[test]
    fn owner_update_to_new_non_active_owner_holsters_and_emits_state_update() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        let mut owner = Player::new_unknown(1);
        owner.entity_id = Some(10);
        state.players_by_entity_id.insert(10, owner);
        state.weapons.insert(55, Equipment::new(EquipmentType::Ak47, 55));

        let states = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let states_clone = states.clone();
        bus.on(move |e| {
            if let Event::ItemStateUpdate { state, .. } = e {
                states_clone.borrow_mut().push(*state);
            }
        });
        on_owner_update(&mut state, &mut bus, 55, Some(10));

        assert_eq!(*states.borrow(), vec![EquipmentState::Holstered.as_wire()]);
        assert_eq!(state.weapons[&55].state, EquipmentState::Holstered);
        assert!(state.players_by_entity_id[&10].inventory.contains_key(&55));
    }

    #[test]
    fn owner_update_to_no_owner_drops_and_emits_state_update() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        let mut owner = Player::new_unknown(1);
        owner.entity_id = Some(10);
        owner.inventory.insert(55, EquipmentType::Ak47);
        state.players_by_entity_id.insert(10, owner);
        let mut eq = Equipment::new(EquipmentType::Ak47, 55);
        eq.owner = Some(10);
        state.weapons.insert(55, eq);

        let states = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let states_clone = states.clone();
        bus.on(move |e| {
            if let Event::ItemStateUpdate { state, .. } = e {
                states_clone.borrow_mut().push(*state);
            }
        });
        on_owner_update(&mut state, &mut bus, 55, None);

        assert_eq!(*states.borrow(), vec![EquipmentState::Dropped.as_wire()]);
        assert_eq!(state.weapons[&55].state, EquipmentState::Dropped);
        assert!(!state.players_by_entity_id[&10].inventory.contains_key(&55));
    }

    #[test]
    fn destroy_in_buy_zone_same_tick_as_money_increase_is_a_refund() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        let mut owner = Player::new_unknown(1);
        owner.entity_id = Some(10);
        owner.inventory.insert(55, EquipmentType::Ak47);
        owner.is_in_buy_zone = true;
        owner.last_money_increased = true;
        owner.last_money_update_tick = 100;
        state.players_by_entity_id.insert(10, owner);
        let mut eq = Equipment::new(EquipmentType::Ak47, 55);
        eq.owner = Some(10);
        state.weapons.insert(55, eq);

        let refunds = std::rc::Rc::new(std::cell::Cell::new(0));
        let refunds_clone = refunds.clone();
        bus.on(move |e| if matches!(e, Event::ItemRefund { .. }) { refunds_clone.set(refunds_clone.get() + 1) });
        on_destroy(&mut state, &mut bus, 55, 100);

        assert_eq!(refunds.get(), 1);
        assert!(!state.players_by_entity_id[&10].inventory.contains_key(&55));
    }

    #[test]
    fn destroy_a_tick_after_money_increase_is_not_a_refund() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        let mut owner = Player::new_unknown(1);
        owner.entity_id = Some(10);
        owner.inventory.insert(55, EquipmentType::Ak47);
        owner.is_in_buy_zone = true;
        owner.last_money_increased = true;
        owner.last_money_update_tick = 100;
        state.players_by_entity_id.insert(10, owner);
        let mut eq = Equipment::new(EquipmentType::Ak47, 55);
        eq.owner = Some(10);
        state.weapons.insert(55, eq);

        let refunds = std::rc::Rc::new(std::cell::Cell::new(0));
        let refunds_clone = refunds.clone();
        bus.on(move |e| if matches!(e, Event::ItemRefund { .. }) { refunds_clone.set(refunds_clone.get() + 1) });
        on_destroy(&mut state, &mut bus, 55, 101);

        assert_eq!(refunds.get(), 0);
    }

    #[test]
    fn destroy_outside_buy_zone_is_not_a_refund() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        let mut owner = Player::new_unknown(1);
        owner.entity_id = Some(10);
        owner.inventory.insert(55, EquipmentType::Ak47);
        owner.is_in_buy_zone = false;
        owner.last_money_increased = true;
        owner.last_money_update_tick = 100;
        state.players_by_entity_id.insert(10, owner);
        let mut eq = Equipment::new(EquipmentType::Ak47, 55);
        eq.owner = Some(10);
        state.weapons.insert(55, eq);

        let refunds = std::rc::Rc::new(std::cell::Cell::new(0));
        let refunds_clone = refunds.clone();
        bus.on(move |e| if matches!(e, Event::ItemRefund { .. }) { refunds_clone.set(refunds_clone.get() + 1) });
        on_destroy(&mut state, &mut bus, 55, 100);

        assert_eq!(refunds.get(), 0);
    }

    #[test]
    fn destroy_always_emits_state_update_destroyed() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        state.weapons.insert(55, Equipment::new(EquipmentType::Ak47, 55));

        let destroyed = std::rc::Rc::new(std::cell::Cell::new(false));
        let destroyed_clone = destroyed.clone();
        bus.on(move |e| {
            if let Event::ItemStateUpdate { equipment_entity_id, state } = e {
                if *equipment_entity_id == 55 && *state == -1 {
                    destroyed_clone.set(true);
                }
            }
        });
        on_destroy(&mut state, &mut bus, 55, 1);

        assert!(destroyed.get());
    }
}
