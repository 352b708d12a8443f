//! *CCSPlayerController* — see design docs §4.2.3 and the player
//! reconciliation rules in §4.3.

use crate::entity::EntityId;
use crate::event::{Event, EventBus};
use crate::model::player::{LifeState, Player};
use crate::model::team::Team;
use crate::state::{steam_id_to_32, GameState, RawPlayerInfo};

/// Ensures a `Player` record exists for `entity_id`/`user_id`, synthesizing
/// one (possibly an "unknown" placeholder) if needed. See §4.3.
pub fn get_or_create_player<'a>(
    state: &'a mut GameState,
    entity_id: EntityId,
    user_id: u32,
) -> &'a mut Player {
    if state.players_by_entity_id.contains_key(&entity_id) {
        return state.players_by_entity_id.get_mut(&entity_id).unwrap();
    }

    if let Some(&existing_entity_id) = state.players_by_user_id.get(&user_id) {
        // Re-key: the controller entity changed but the player persists.
        if let Some(mut player) = state.players_by_entity_id.remove(&existing_entity_id) {
            player.entity_id = Some(entity_id);
            state.players_by_entity_id.insert(entity_id, player);
            state.players_by_user_id.insert(user_id, entity_id);
            return state.players_by_entity_id.get_mut(&entity_id).unwrap();
        }
    }

    let mut player = if let Some(raw) = state.raw_players_by_user_id.get(&user_id).cloned() {
        let mut p = Player::new_unknown(user_id);
        p.steam_id64 = raw.steam_id64;
        p.name = raw.name;
        p.is_bot = raw.is_bot;
        p.is_unknown = false;
        p
    } else {
        Player::new_unknown(user_id)
    };
    player.entity_id = Some(entity_id);

    state.players_by_user_id.insert(user_id, entity_id);
    if player.steam_id64 != 0 {
        state
            .players_by_steam_id32
            .insert(steam_id_to_32(player.steam_id64), entity_id);
    }
    state.players_by_entity_id.insert(entity_id, player);
    state.players_by_entity_id.get_mut(&entity_id).unwrap()
}

fn recompute_life_state(player: &mut Player) {
    player.life_state = if player.connected && player.pawn_entity_id.is_some() && player.health > 0 {
        LifeState::Alive
    } else {
        LifeState::Dead
    };
}

pub fn on_pawn_handle_update(state: &mut GameState, entity_id: EntityId, pawn_entity_id: Option<EntityId>) {
    if let Some(p) = state.players_by_entity_id.get_mut(&entity_id) {
        p.pawn_entity_id = pawn_entity_id;
        recompute_life_state(p);
    }
}

/// `m_iConnected`: 0 = connected, 8 = disconnected.
pub fn on_connected_update(
    state: &mut GameState,
    bus: &mut EventBus,
    entity_id: EntityId,
    user_id: u32,
    raw_state: i32,
    steam_id64: u64,
) {
    let Some(player) = state.players_by_entity_id.get_mut(&entity_id) else { return };
    match raw_state {
        0 => {
            let first_transition = !player.connected;
            player.connected = true;
            recompute_life_state(player);
            if first_transition {
                if player.is_bot {
                    state
                        .raw_players_by_user_id
                        .insert(user_id, RawPlayerInfo { steam_id64: 0, name: player.name.clone(), is_bot: true });
                    bus.dispatch(Event::BotConnect { user_id });
                } else if steam_id64 != 0 {
                    bus.dispatch(Event::PlayerConnect { user_id });
                }
            }
        }
        8 => {
            player.connected = false;
            recompute_life_state(player);
            let steam_id = player.steam_id64;
            state.players_by_steam_id32.remove(&steam_id_to_32(steam_id));
            bus.dispatch(Event::PlayerDisconnected { user_id });
        }
        _ => {}
    }
}

pub fn on_team_update(state: &mut GameState, entity_id: EntityId, team: Team) {
    if let Some(p) = state.players_by_entity_id.get_mut(&entity_id) {
        p.team = team;
        recompute_life_state(p);
    }
}

pub fn on_original_controller_update(
    state: &GameState,
    bus: &mut EventBus,
    entity_id: EntityId,
    taker_user_id: u32,
) {
    if let Some(p) = state.players_by_entity_id.get(&entity_id) {
        if p.is_bot {
            bus.dispatch(Event::BotTakenOver { taker_user_id });
        }
    }
}

/// `m_pInGameMoneyServices.m_iAccount` update. Records the tick and direction
/// of the change, not just the new total, so the equipment binder's refund
/// detection (§4.2.6) can tell a buy-menu refund from an unrelated drop.
pub fn on_money_update(state: &mut GameState, bus: &mut EventBus, entity_id: EntityId, new_money: i32, tick: i32) {
    let Some(p) = state.players_by_entity_id.get_mut(&entity_id) else { return };
    let old = p.money;
    if old == new_money {
        return;
    }
    p.money = new_money;
    p.last_money_update_tick = tick;
    p.last_money_increased = new_money > old;
    bus.dispatch(Event::MoneyUpdate { entity_id, old, new: new_money });
}

pub fn on_kills_update(state: &mut GameState, bus: &mut EventBus, entity_id: EntityId, new_kills: i32) {
    let Some(p) = state.players_by_entity_id.get_mut(&entity_id) else { return };
    let old = p.kills;
    if old == new_kills {
        return;
    }
    p.kills = new_kills;
    bus.dispatch(Event::KillsUpdate { entity_id, old, new: new_kills });
}

pub fn on_deaths_update(state: &mut GameState, bus: &mut EventBus, entity_id: EntityId, new_deaths: i32) {
    let Some(p) = state.players_by_entity_id.get_mut(&entity_id) else { return };
    let old = p.deaths;
    if old == new_deaths {
        return;
    }
    p.deaths = new_deaths;
    bus.dispatch(Event::DeathsUpdate { entity_id, old, new: new_deaths });
}

pub fn on_destroy(state: &mut GameState, entity_id: EntityId) {
    if let Some(mut p) = state.players_by_entity_id.remove(&entity_id) {
        p.connected = false;
        p.life_state = LifeState::Dead;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;

    #[test]
    fn get_or_create_player_synthesizes_unknown() {
        let mut state = GameState::new();
        let p = get_or_create_player(&mut state, 5, 100);
        assert!(p.is_unknown);
        assert_eq!(p.user_id, 100);
        assert_eq!(state.players_by_user_id[&100], 5);
    }

    #[test]
    fn get_or_create_player_rekeys_on_new_controller_entity() {
        let mut state = GameState::new();
        get_or_create_player(&mut state, 5, 100);
        let p = get_or_create_player(&mut state, 9, 100);
        assert_eq!(p.entity_id, Some(9));
        assert!(!state.players_by_entity_id.contains_key(&5));
        assert_eq!(state.players_by_user_id[&100], 9);
    }

    #[test]
    fn connected_transition_dispatches_player_connect_once() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut state = GameState::new();
        get_or_create_player(&mut state, 5, 100);
        let mut bus = EventBus::new();
        let connects = Rc::new(Cell::new(0));
        let connects_clone = connects.clone();
        bus.on(move |e| {
            if matches!(e, Event::PlayerConnect { .. }) {
                connects_clone.set(connects_clone.get() + 1);
            }
        });

        on_connected_update(&mut state, &mut bus, 5, 100, 0, 76561197960287930);
        on_connected_update(&mut state, &mut bus, 5, 100, 0, 76561197960287930);

        assert_eq!(connects.get(), 1);
        assert!(state.players_by_entity_id[&5].connected);
    }

    #[test]
    fn disconnect_purges_steam_id_index() {
        let mut state = GameState::new();
        get_or_create_player(&mut state, 5, 100);
        let mut bus = EventBus::new();
        on_connected_update(&mut state, &mut bus, 5, 100, 0, 76561197960287930);
        assert!(state.players_by_steam_id32.contains_key(&steam_id_to_32(76561197960287930)));

        on_connected_update(&mut state, &mut bus, 5, 100, 8, 76561197960287930);
        assert!(!state.players_by_entity_id[&5].connected);
        assert!(!state.players_by_steam_id32.contains_key(&steam_id_to_32(76561197960287930)));
    }

    #[test]
    fn money_update_suppressed_when_unchanged() {
        let mut state = GameState::new();
        get_or_create_player(&mut state, 5, 100);
        state.players_by_entity_id.get_mut(&5).unwrap().money = 800;
        let mut bus = EventBus::new();
        on_money_update(&mut state, &mut bus, 5, 800, 10);
        assert_eq!(state.players_by_entity_id[&5].money, 800);
    }
}
