use std::collections::HashMap;

use bitflags::bitflags;
use nalgebra::Vector3;
use serde::Serialize;

use crate::entity::EntityId;
use crate::model::equipment::EquipmentType;
use crate::model::team::Team;
use crate::model::TickPosition;

bitflags! {
    /// Raw `m_fFlags` bitset. Bit positions are ABI-visible.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct PlayerFlags: u32 {
        const ON_GROUND     = 0x1;
        const DUCKING       = 0x2;
        const ANIM_DUCKING  = 0x4;
    }
}

impl PlayerFlags {
    pub fn on_ground(self) -> bool {
        self.contains(PlayerFlags::ON_GROUND)
    }

    pub fn ducking(self) -> bool {
        self.contains(PlayerFlags::DUCKING)
    }

    pub fn anim_ducking(self) -> bool {
        self.contains(PlayerFlags::ANIM_DUCKING)
    }
}

/// Indices into `Player::grenade_ammo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrenadeSlot {
    He = 0,
    Flash = 1,
    Smoke = 2,
    MolotovOrIncendiary = 3,
    Decoy = 4,
}

/// View angles in degrees.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ViewAngle {
    pub pitch: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifeState {
    Alive,
    Dying,
    Dead,
}

/// One participant or bot.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub entity_id: Option<EntityId>,
    pub pawn_entity_id: Option<EntityId>,
    pub steam_id64: u64,
    pub user_id: u32,
    pub name: String,
    pub name_history: Vec<String>,
    pub is_bot: bool,
    pub is_unknown: bool,
    pub connected: bool,

    pub team: Team,

    pub curr_position: TickPosition,
    pub prev_position: TickPosition,
    pub view_angle: ViewAngle,
    pub flags: PlayerFlags,

    pub flash_duration: f32,
    pub flash_tick: i32,

    /// Slot → equipment type cache. The owning [`crate::model::equipment::Equipment`]
    /// values themselves live in `GameState::weapons`, keyed by the same
    /// entity id; this map exists so cheap inventory queries don't need a
    /// `GameState` borrow.
    pub inventory: HashMap<EntityId, EquipmentType>,
    pub active_weapon_entity_id: Option<EntityId>,
    pub grenade_ammo: [i32; 5],

    pub kills: i32,
    pub deaths: i32,
    pub money: i32,
    /// Tick of the last `MoneyUpdate` and whether it was an increase, used by
    /// the equipment binder's buy-menu refund detection.
    pub last_money_update_tick: i32,
    pub last_money_increased: bool,
    pub armor: i32,
    pub has_defuse_kit: bool,
    pub has_helmet: bool,

    pub is_planting: bool,
    pub is_defusing: bool,

    pub health: i32,
    pub life_state: LifeState,

    pub left_handed: bool,
    pub is_in_buy_zone: bool,
    pub is_in_bomb_zone: bool,

    // Persona / per-match statistics, sourced from the player-resource entity.
    pub clan_tag: String,
    pub ping: i32,
    pub score: i32,
    pub assists: i32,
    pub mvps: i32,
    pub total_damage: i32,
    pub utility_damage: i32,
    pub money_spent_total: i32,
    pub money_spent_this_round: i32,
    pub rank: i32,
    pub competitive_wins: i32,
    pub ranking_predicted_win: i32,
    pub ranking_predicted_loss: i32,
    pub ranking_predicted_tie: i32,
    pub equipment_value_current: i32,
    pub equipment_value_round_start: i32,
    pub equipment_value_freeze_time_end: i32,
}

impl Player {
    pub fn new_unknown(user_id: u32) -> Self {
        Player {
            entity_id: None,
            pawn_entity_id: None,
            steam_id64: 0,
            user_id,
            name: "unknown".to_string(),
            name_history: Vec::new(),
            is_bot: false,
            is_unknown: true,
            connected: false,
            team: Team::Unassigned,
            curr_position: TickPosition::default(),
            prev_position: TickPosition::default(),
            view_angle: ViewAngle::default(),
            flags: PlayerFlags::empty(),
            flash_duration: 0.0,
            flash_tick: 0,
            inventory: HashMap::new(),
            active_weapon_entity_id: None,
            grenade_ammo: [0; 5],
            kills: 0,
            deaths: 0,
            money: 0,
            last_money_update_tick: -1,
            last_money_increased: false,
            armor: 0,
            has_defuse_kit: false,
            has_helmet: false,
            is_planting: false,
            is_defusing: false,
            health: 0,
            life_state: LifeState::Dead,
            left_handed: false,
            is_in_buy_zone: false,
            is_in_bomb_zone: false,
            clan_tag: String::new(),
            ping: 0,
            score: 0,
            assists: 0,
            mvps: 0,
            total_damage: 0,
            utility_damage: 0,
            money_spent_total: 0,
            money_spent_this_round: 0,
            rank: 0,
            competitive_wins: 0,
            ranking_predicted_win: 0,
            ranking_predicted_loss: 0,
            ranking_predicted_tie: 0,
            equipment_value_current: 0,
            equipment_value_round_start: 0,
            equipment_value_freeze_time_end: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life_state == LifeState::Alive
    }

    /// The first non-grenade, non-knife, non-equipment weapon type held,
    /// preferring rifles/heavy over pistols and SMGs, matching the original's
    /// "main weapon" selection priority. Resolving the full `Equipment`
    /// record requires a `GameState` lookup; see `GameState::main_weapon`.
    pub fn main_weapon_type(&self) -> Option<EquipmentType> {
        use crate::model::equipment::EquipmentClass::*;
        self.inventory
            .values()
            .filter(|ty| matches!(ty.class(), Rifle | Heavy | Smg))
            .max_by_key(|ty| match ty.class() {
                Rifle => 3,
                Heavy => 2,
                Smg => 1,
                _ => 0,
            })
            .copied()
    }

    pub fn grenade_ammo_for(&self, ty: EquipmentType) -> i32 {
        let slot = match ty {
            EquipmentType::He => GrenadeSlot::He,
            EquipmentType::Flash => GrenadeSlot::Flash,
            EquipmentType::Smoke => GrenadeSlot::Smoke,
            EquipmentType::Molotov | EquipmentType::Incendiary => GrenadeSlot::MolotovOrIncendiary,
            EquipmentType::Decoy => GrenadeSlot::Decoy,
            _ => return 0,
        };
        self.grenade_ammo[slot as usize]
    }

    pub fn is_blinded(&self) -> bool {
        self.flash_duration > 0.0
    }

    /// Remaining flash duration in seconds. `tick_rate == 0` (unknown tick
    /// rate) is treated as "no decay": the full stored duration is returned.
    pub fn flash_duration_time_remaining(&self, current_tick: i32, tick_rate: f64) -> f32 {
        if self.flash_duration <= 0.0 || tick_rate <= 0.0 {
            return self.flash_duration;
        }
        let elapsed_ticks = (current_tick - self.flash_tick).max(0) as f64;
        let remaining = self.flash_duration as f64 - elapsed_ticks / tick_rate;
        remaining.max(0.0) as f32
    }

    /// Eye position: feet position plus a fixed vertical offset depending on
    /// stance. Constants are ABI-visible.
    pub fn position_eyes(&self) -> Vector3<f32> {
        let offset = if self.flags.ducking() { 47.839996 } else { 63.839996 };
        self.curr_position.position + Vector3::new(0.0, 0.0, offset)
    }

    /// `(CurrPos - PrevPos) * 64`, or zero if the two samples don't straddle
    /// exactly one tick of `current_tick`.
    pub fn velocity(&self, current_tick: i32) -> Vector3<f32> {
        if current_tick - self.curr_position.tick > 1
            || self.curr_position.tick == self.prev_position.tick
        {
            return Vector3::zeros();
        }
        (self.curr_position.position - self.prev_position.position) * 64.0
    }

    /// Squared distance from this player's eye ray to the segment between
    /// `other`'s feet and eyes. Zero if the segment touches the ray.
    pub fn distance_sq_to_view_ray_segment(&self, other: &Player) -> f32 {
        let origin = self.position_eyes();
        let dir = forward_vector(self.view_angle).normalize();

        let seg_a = other.curr_position.position;
        let seg_b = other.position_eyes();
        let seg_dir = seg_b - seg_a;

        // Closest point between a ray (origin, dir) and a segment (seg_a, seg_b).
        let w0 = origin - seg_a;
        let a = dir.dot(&dir);
        let b = dir.dot(&seg_dir);
        let c = seg_dir.dot(&seg_dir);
        let d = dir.dot(&w0);
        let e = seg_dir.dot(&w0);
        let denom = a * c - b * b;

        let (mut sc, mut tc) = if denom.abs() < f32::EPSILON {
            (0.0, d / b.max(f32::EPSILON))
        } else {
            ((b * e - c * d) / denom, (a * e - b * d) / denom)
        };
        sc = sc.max(0.0);
        tc = tc.clamp(0.0, 1.0);

        let closest_on_ray = origin + dir * sc;
        let closest_on_segment = seg_a + seg_dir * tc;
        (closest_on_ray - closest_on_segment).norm_squared()
    }

    pub fn is_looking_at_enemy(&self, enemies: &[&Player]) -> bool {
        const THRESHOLD_SQ: f32 = 32.0 * 32.0;
        enemies
            .iter()
            .filter(|p| p.is_alive())
            .any(|p| self.distance_sq_to_view_ray_segment(p) < THRESHOLD_SQ)
    }
}

fn forward_vector(angle: ViewAngle) -> Vector3<f32> {
    let pitch = angle.pitch.to_radians();
    let yaw = angle.yaw.to_radians();
    Vector3::new(
        yaw.cos() * pitch.cos(),
        yaw.sin() * pitch.cos(),
        -pitch.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_duration_zero_tick_rate_does_not_decay() {
        let mut p = Player::new_unknown(1);
        p.flash_duration = 2.0;
        p.flash_tick = 100;
        assert_eq!(p.flash_duration_time_remaining(200, 0.0), 2.0);
    }

    #[test]
    fn flash_duration_decays_with_tick_rate() {
        let mut p = Player::new_unknown(1);
        p.flash_duration = 2.0;
        p.flash_tick = 0;
        let remaining = p.flash_duration_time_remaining(64, 64.0);
        assert!((remaining - 1.0).abs() < 1e-6);
    }

    #[test]
    fn velocity_zero_across_tick_gap() {
        let mut p = Player::new_unknown(1);
        p.curr_position = TickPosition { position: Vector3::new(10.0, 0.0, 0.0), tick: 10 };
        p.prev_position = TickPosition { position: Vector3::zeros(), tick: 5 };
        assert_eq!(p.velocity(11), Vector3::zeros());
    }

    #[test]
    fn velocity_nonzero_for_consecutive_ticks() {
        let mut p = Player::new_unknown(1);
        p.curr_position = TickPosition { position: Vector3::new(1.0, 0.0, 0.0), tick: 10 };
        p.prev_position = TickPosition { position: Vector3::zeros(), tick: 9 };
        assert_eq!(p.velocity(10), Vector3::new(64.0, 0.0, 0.0));
    }

    #[test]
    fn main_weapon_type_prefers_rifle_over_pistol() {
        let mut p = Player::new_unknown(1);
        p.inventory.insert(1, EquipmentType::Glock);
        p.inventory.insert(2, EquipmentType::Ak47);
        assert_eq!(p.main_weapon_type(), Some(EquipmentType::Ak47));
    }

    #[test]
    fn main_weapon_type_none_when_only_grenades() {
        let mut p = Player::new_unknown(1);
        p.inventory.insert(1, EquipmentType::He);
        assert_eq!(p.main_weapon_type(), None);
    }

    #[test]
    fn eye_position_offset_depends_on_ducking() {
        let mut p = Player::new_unknown(1);
        p.curr_position.position = Vector3::zeros();
        assert_eq!(p.position_eyes().z, 63.839996);
        p.flags = PlayerFlags::DUCKING;
        assert_eq!(p.position_eyes().z, 47.839996);
    }

    #[test]
    fn is_looking_at_enemy_true_when_segment_touches_ray() {
        let mut shooter = Player::new_unknown(1);
        shooter.curr_position.position = Vector3::zeros();
        shooter.view_angle = ViewAngle { pitch: 0.0, yaw: 0.0 };

        let mut target = Player::new_unknown(2);
        target.team = Team::Terrorist;
        target.health = 100;
        target.life_state = LifeState::Alive;
        target.curr_position.position = Vector3::new(100.0, 0.0, -63.839996);

        assert!(shooter.is_looking_at_enemy(&[&target]));
    }

    #[test]
    fn is_looking_at_enemy_false_for_dead_target() {
        let shooter = Player::new_unknown(1);
        let mut target = Player::new_unknown(2);
        target.life_state = LifeState::Dead;
        target.curr_position.position = Vector3::new(100.0, 0.0, 0.0);
        assert!(!shooter.is_looking_at_enemy(&[&target]));
    }
}
