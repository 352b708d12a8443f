//! `GameState`: the single owner of every live domain object. Everything
//! else (back-references in `Equipment.owner`, `GrenadeProjectile.thrower`,
//! etc.) holds only an [`EntityId`] and resolves through here.

use std::collections::HashMap;

use crate::entity::EntityId;
use crate::model::bomb::Bomb;
use crate::model::equipment::Equipment;
use crate::model::grenade::{FlyingFlashbang, GrenadeProjectile};
use crate::model::hostage::Hostage;
use crate::model::inferno::Inferno;
use crate::model::player::Player;
use crate::model::rules::GameRules;
use crate::model::smoke::Smoke;
use crate::model::team::{Team, TeamState};

/// A player record seen only through net-message/user-info channels before
/// (or instead of) a controller entity existing for them. Used to
/// reconcile controller entities against previously known identity — see
/// the player-reconciliation design notes.
#[derive(Debug, Clone, Default)]
pub struct RawPlayerInfo {
    pub steam_id64: u64,
    pub name: String,
    pub is_bot: bool,
}

#[derive(Debug, Default)]
pub struct GameState {
    pub players_by_entity_id: HashMap<EntityId, Player>,
    pub players_by_user_id: HashMap<u32, EntityId>,
    pub players_by_steam_id32: HashMap<u32, EntityId>,
    pub raw_players_by_user_id: HashMap<u32, RawPlayerInfo>,

    pub weapons: HashMap<EntityId, Equipment>,
    pub grenade_projectiles: HashMap<EntityId, GrenadeProjectile>,
    pub flying_flashbangs: Vec<FlyingFlashbang>,
    pub infernos: HashMap<EntityId, Inferno>,
    pub smokes: HashMap<EntityId, Smoke>,
    pub defuse_kits: std::collections::HashSet<EntityId>,
    pub hostages: HashMap<EntityId, Hostage>,

    pub bomb: Bomb,
    pub ct_state: TeamState,
    pub t_state: TeamState,
    pub rules: GameRules,

    pub bombsite_a_center: Option<nalgebra::Vector3<f32>>,
    pub bombsite_b_center: Option<nalgebra::Vector3<f32>>,

    /// `model precache index -> EquipmentType`, resolved once per index and
    /// reused for every entity sharing that model.
    pub model_equipment_cache: HashMap<u64, crate::model::equipment::EquipmentType>,
}

pub fn steam_id_to_32(steam_id64: u64) -> u32 {
    (steam_id64 & 0xFFFF_FFFF) as u32
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            ct_state: TeamState::new(Team::CounterTerrorist),
            t_state: TeamState::new(Team::Terrorist),
            ..Default::default()
        }
    }

    pub fn team_state(&self, team: Team) -> Option<&TeamState> {
        match team {
            Team::CounterTerrorist => Some(&self.ct_state),
            Team::Terrorist => Some(&self.t_state),
            _ => None,
        }
    }

    pub fn team_state_mut(&mut self, team: Team) -> Option<&mut TeamState> {
        match team {
            Team::CounterTerrorist => Some(&mut self.ct_state),
            Team::Terrorist => Some(&mut self.t_state),
            _ => None,
        }
    }

    pub fn team_members(&self, team: Team) -> impl Iterator<Item = &Player> {
        self.players_by_entity_id.values().filter(move |p| p.team == team)
    }

    pub fn player_weapons(&self, player: &Player) -> impl Iterator<Item = &Equipment> + '_ {
        player.inventory.keys().filter_map(move |id| self.weapons.get(id))
    }

    pub fn main_weapon(&self, player: &Player) -> Option<&Equipment> {
        player
            .main_weapon_type()
            .and_then(|ty| self.player_weapons(player).find(|e| e.ty == ty))
    }

    pub fn player_by_pawn_handle(&self, pawn_entity_id: EntityId) -> Option<&Player> {
        self.players_by_entity_id
            .values()
            .find(|p| p.pawn_entity_id == Some(pawn_entity_id))
    }

    pub fn player_by_pawn_handle_mut(&mut self, pawn_entity_id: EntityId) -> Option<&mut Player> {
        self.players_by_entity_id
            .values_mut()
            .find(|p| p.pawn_entity_id == Some(pawn_entity_id))
    }

    /// Closest bombsite to `position` by squared distance to the cached site
    /// centers. Mirrors the reference implementation's `getClosestBombsite`
    /// helper, which (despite its name) never actually takes a square root.
    pub fn closest_bombsite(
        &self,
        position: nalgebra::Vector3<f32>,
    ) -> Option<crate::model::bomb::BombSite> {
        use crate::model::bomb::BombSite;
        match (self.bombsite_a_center, self.bombsite_b_center) {
            (Some(a), Some(b)) => {
                let da = (position - a).norm_squared();
                let db = (position - b).norm_squared();
                Some(if da <= db { BombSite::A } else { BombSite::B })
            }
            (Some(_), None) => Some(BombSite::A),
            (None, Some(_)) => Some(BombSite::B),
            (None, None) => None,
        }
    }

    /// Checks every invariant listed in the testable-properties section.
    /// Intended for test assertions at tick boundaries, not for production
    /// use on a hot path.
    #[cfg(test)]
    pub fn check_invariants(&self) -> Result<(), String> {
        for (id, p) in &self.players_by_entity_id {
            if p.steam_id64 != 0 {
                let steam32 = steam_id_to_32(p.steam_id64);
                if self.players_by_steam_id32.get(&steam32) != Some(id) {
                    return Err(format!("player {id} missing from steam-id index"));
                }
            }
        }
        for (id, e) in &self.weapons {
            if let Some(owner_id) = e.owner {
                if let Some(owner) = self.players_by_entity_id.get(&owner_id) {
                    if !owner.inventory.contains_key(id) {
                        return Err(format!("equipment {id} not in owner's inventory"));
                    }
                }
            }
        }
        if self.bomb.planted() && self.bomb.carrier.is_some() {
            return Err("planted bomb still has a carrier".to_string());
        }
        let any_planting = self.players_by_entity_id.values().any(|p| p.is_planting);
        if self.bomb.current_planter.is_some() != any_planting {
            return Err("current_planter / is_planting mismatch".to_string());
        }
        Ok(())
    }
}
