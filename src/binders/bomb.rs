//! *CC4* / *CPlantedC4* — see design docs §4.2.1.

use nalgebra::Vector3;

use crate::entity::EntityId;
use crate::event::{Event, EventBus};
use crate::model::bomb::{BombSite, BombState};
use crate::state::GameState;

pub fn on_position_update(state: &mut GameState, position: Vector3<f32>) {
    if !state.bomb.planted() {
        state.bomb.last_on_ground_position = position;
    }
}

pub fn on_owner_update(state: &mut GameState, bus: &mut EventBus, owner_pawn_entity_id: Option<EntityId>) {
    let new_carrier = owner_pawn_entity_id
        .and_then(|pawn| state.player_by_pawn_handle(pawn))
        .map(|p| p.entity_id)
        .flatten();
    let prev = state.bomb.carrier;
    state.bomb.carrier = new_carrier;
    if new_carrier.is_some() {
        state.bomb.state = BombState::Carried;
    }
    bus.dispatch(Event::BombOwnerUpdate { prev, new: new_carrier });
}

/// `m_bStartedArming` update.
pub fn on_started_arming(
    state: &mut GameState,
    bus: &mut EventBus,
    started: bool,
    planter_entity_id: EntityId,
    which_bomb_zone: i32,
    planter_position: Vector3<f32>,
) {
    if started {
        let already_planting = state
            .players_by_entity_id
            .get(&planter_entity_id)
            .map(|p| p.is_planting)
            .unwrap_or(false);
        if already_planting {
            return;
        }
        if let Some(p) = state.players_by_entity_id.get_mut(&planter_entity_id) {
            p.is_planting = true;
        }
        state.bomb.current_planter = Some(planter_entity_id);

        let site = match which_bomb_zone {
            1 => BombSite::A,
            2 => BombSite::B,
            _ => state.closest_bombsite(planter_position).unwrap_or(BombSite::A),
        };
        state.bomb.state = BombState::Arming { site };
        bus.dispatch(Event::BombPlantBegin { planter_entity_id, site });
    } else {
        let Some(planter) = state.bomb.current_planter else { return };
        let was_planting = state
            .players_by_entity_id
            .get(&planter)
            .map(|p| p.is_planting)
            .unwrap_or(false);
        if !was_planting {
            return;
        }
        if let Some(p) = state.players_by_entity_id.get_mut(&planter) {
            p.is_planting = false;
        }
        state.bomb.current_planter = None;
        state.bomb.state = BombState::Carried;
        bus.dispatch(Event::BombPlantAborted { planter_entity_id: planter });
    }
}

/// *CPlantedC4* entity creation.
pub fn on_planted_c4_created(
    state: &mut GameState,
    bus: &mut EventBus,
    _owner_pawn_entity_id: Option<EntityId>,
    bomb_site_raw: i32,
) {
    state.bomb.carrier = None;
    if let Some(planter) = state.bomb.current_planter.take() {
        if let Some(p) = state.players_by_entity_id.get_mut(&planter) {
            p.is_planting = false;
        }
    }

    let site = if bomb_site_raw == 0 { BombSite::A } else { BombSite::B };
    state.bomb.state = BombState::Planted { site };
    bus.dispatch(Event::BombPlanted { site });
}

/// `m_bBombTicking` update on the planted bomb.
pub fn on_bomb_ticking(state: &mut GameState, bus: &mut EventBus, ticking: bool) {
    if ticking {
        return;
    }
    if state.bomb.current_defuser.is_none() {
        if let BombState::Planted { site } | BombState::Defusing { site, .. } = state.bomb.state {
            state.bomb.state = BombState::Exploded { site };
            bus.dispatch(Event::BombExplode { site });
        }
    }
}

/// `m_hBombDefuser` update.
pub fn on_bomb_defuser_update(
    state: &mut GameState,
    bus: &mut EventBus,
    defuser_entity_id: Option<EntityId>,
    has_kit: bool,
) {
    let site = match state.bomb.state {
        BombState::Planted { site } | BombState::Defusing { site, .. } => site,
        _ => return,
    };

    match defuser_entity_id {
        Some(defuser) if state.bomb.current_defuser.is_none() => {
            state.bomb.current_defuser = Some(defuser);
            state.bomb.state = BombState::Defusing { site, has_kit };
            bus.dispatch(Event::BombDefuseStart { has_kit });
        }
        None if state.bomb.current_defuser.is_some() && !state.bomb.defused() => {
            state.bomb.current_defuser = None;
            state.bomb.state = BombState::Planted { site };
            bus.dispatch(Event::BombDefuseAborted);
        }
        _ => {}
    }
}

/// `m_bBombDefused` update.
pub fn on_bomb_defused(state: &mut GameState, bus: &mut EventBus, defused: bool) {
    if !defused || state.bomb.defused() {
        return;
    }
    let site = match state.bomb.state {
        BombState::Defusing { site, .. } | BombState::Planted { site } => site,
        _ => return,
    };
    state.bomb.state = BombState::Defused { site };
    bus.dispatch(Event::BombDefused { site });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::Player;

    fn player_at(state: &mut GameState, entity_id: EntityId) {
        let mut p = Player::new_unknown(entity_id);
        p.entity_id = Some(entity_id);
        state.players_by_entity_id.insert(entity_id, p);
    }

    #[test]
    fn plant_begin_then_planted() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        player_at(&mut state, 1);

        on_started_arming(&mut state, &mut bus, true, 1, 1, Vector3::zeros());
        assert_eq!(state.bomb.state, BombState::Arming { site: BombSite::A });
        assert!(state.players_by_entity_id[&1].is_planting);

        on_planted_c4_created(&mut state, &mut bus, None, 0);
        assert_eq!(state.bomb.state, BombState::Planted { site: BombSite::A });
        assert!(!state.players_by_entity_id[&1].is_planting);
    }

    #[test]
    fn plant_defuse_then_defused() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        state.bomb.state = BombState::Planted { site: BombSite::B };

        on_bomb_defuser_update(&mut state, &mut bus, Some(2), true);
        assert_eq!(state.bomb.state, BombState::Defusing { site: BombSite::B, has_kit: true });

        on_bomb_defused(&mut state, &mut bus, true);
        assert_eq!(state.bomb.state, BombState::Defused { site: BombSite::B });
        assert!(state.bomb.defused());

        // A second defused=true after the fact must not re-dispatch or change state.
        on_bomb_defused(&mut state, &mut bus, true);
        assert_eq!(state.bomb.state, BombState::Defused { site: BombSite::B });
    }

    #[test]
    fn plant_then_explode_without_defuser() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        state.bomb.state = BombState::Planted { site: BombSite::A };

        on_bomb_ticking(&mut state, &mut bus, false);
        assert_eq!(state.bomb.state, BombState::Exploded { site: BombSite::A });
    }

    #[test]
    fn ticking_false_with_active_defuser_does_not_explode() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        state.bomb.state = BombState::Defusing { site: BombSite::A, has_kit: false };
        state.bomb.current_defuser = Some(9);

        on_bomb_ticking(&mut state, &mut bus, false);
        assert_eq!(state.bomb.state, BombState::Defusing { site: BombSite::A, has_kit: false });
    }

    #[test]
    fn defuse_aborted_reverts_to_planted() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        state.bomb.state = BombState::Defusing { site: BombSite::A, has_kit: false };
        state.bomb.current_defuser = Some(3);

        on_bomb_defuser_update(&mut state, &mut bus, None, false);
        assert_eq!(state.bomb.state, BombState::Planted { site: BombSite::A });
        assert!(state.bomb.current_defuser.is_none());
    }
}
