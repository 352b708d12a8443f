//! The public façade: drives an [`EntitySource`] frame by frame, diffs each
//! entity's properties against the previous frame, and dispatches the
//! binder functions in `crate::binders` for whatever changed.
//!
//! The property paths read here are a representative subset (grounded in
//! the datatable naming the original implementation reads) rather than a
//! byte-exact schema — see `crate::entity`'s module doc: the wire decoder
//! itself is out of scope for this crate.
//!
//! Game events and net/user messages (round lifecycle, timeouts, chat,
//! rank updates) travel on a separate channel from entity property deltas
//! in the demo format; the `notify_*` methods below are where a decoder
//! feeds those in, independent of [`Parser::parse_next_frame`].

use std::collections::HashMap;

use crate::binders;
use crate::config::ParserConfig;
use crate::entity::{handle_to_entity_id, Entity, EntityId, EntitySource, PropertyValue};
use crate::error::ParseError;
use crate::event::{Event, EventBus};
use crate::model::player::Player;
use crate::model::team::Team;
use crate::state::GameState;

type PropSnapshot = HashMap<String, PropertyValue>;

/// Drives demo playback and reconstructs [`GameState`] incrementally.
///
/// A [`ParseError`] returned from [`Parser::parse_next_frame`] or
/// [`Parser::parse_to_end`] is sticky: once parsing fails, the parser must
/// not be driven further; `game_state()` still reflects the last
/// successfully applied frame.
pub struct Parser<S: EntitySource> {
    source: S,
    state: GameState,
    bus: EventBus,
    config: ParserConfig,
    previous: HashMap<EntityId, PropSnapshot>,
    failed: bool,
}

impl<S: EntitySource> Parser<S> {
    pub fn new(source: S, config: ParserConfig) -> Self {
        Parser {
            source,
            state: GameState::new(),
            bus: EventBus::new(),
            config,
            previous: HashMap::new(),
            failed: false,
        }
    }

    pub fn register_event_handler<F: FnMut(&Event) + 'static>(&mut self, handler: F) {
        self.bus.on(handler);
    }

    pub fn game_state(&self) -> &GameState {
        &self.state
    }

    pub fn tick_rate(&self) -> f64 {
        self.source.tick_rate()
    }

    pub fn tick_time(&self) -> f64 {
        self.source.tick_interval()
    }

    pub fn current_frame(&self) -> i32 {
        self.source.current_frame()
    }

    pub fn current_tick(&self) -> i32 {
        self.source.current_tick()
    }

    pub fn participants(&self) -> impl Iterator<Item = &Player> {
        self.state.players_by_entity_id.values().filter(|p| !p.is_unknown)
    }

    /// Decodes and applies the next frame. Returns `Ok(false)` at end of
    /// stream. Once this returns `Err`, the parser is considered poisoned
    /// and must not be called again.
    pub fn parse_next_frame(&mut self) -> Result<bool, ParseError> {
        if self.failed {
            return Err(ParseError::MalformedStream("parser already failed".to_string()));
        }
        match self.advance_and_apply() {
            Ok(more) => Ok(more),
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    pub fn parse_to_end(&mut self) -> Result<(), ParseError> {
        while self.parse_next_frame()? {}
        Ok(())
    }

    // Game events and net/user messages arrive on a channel separate from
    // entity property deltas (the per-frame diff loop above); a real wire
    // decoder hands them to the matching `notify_*` call as it demuxes the
    // demo's message stream. These binders have no property path to diff
    // against, so `advance_and_apply` can't reach them on its own.

    pub fn notify_round_start(&mut self, time_limit: i32, frag_limit: i32) {
        let current_tick = self.source.current_tick();
        binders::rules::dispatch_round_start(&mut self.state, &mut self.bus, time_limit, frag_limit, current_tick);
    }

    pub fn notify_round_end_official(&mut self) {
        binders::rules::dispatch_round_end_official(&mut self.bus);
    }

    pub fn notify_team_side_switch(&mut self) {
        binders::rules::dispatch_team_side_switch(&mut self.state, &mut self.bus);
    }

    pub fn notify_game_half_ended(&mut self) {
        binders::rules::dispatch_game_half_ended(&mut self.bus);
    }

    pub fn notify_timeout(&mut self, team: Option<Team>, new_remaining: i32, tech: bool) {
        binders::rules::on_timeout_update(&mut self.state, &mut self.bus, team, new_remaining, tech);
    }

    pub fn notify_has_bomb_target(&mut self, has_bomb_target: bool) {
        binders::rules::on_has_bomb_target_update(&mut self.state, has_bomb_target);
    }

    pub fn notify_has_rescue_zone(&mut self, has_rescue_zone: bool) {
        binders::rules::on_has_rescue_zone_update(&mut self.state, has_rescue_zone);
    }

    pub fn notify_tick_rate_info(&mut self, tick_interval: f64) -> Result<(), ParseError> {
        binders::netmsg::on_tick_rate_info(&mut self.bus, tick_interval)
    }

    pub fn notify_con_vars_update(&mut self, updates: HashMap<String, String>) {
        binders::netmsg::on_con_vars_update(&mut self.state, &mut self.bus, updates);
    }

    pub fn notify_say_text(&mut self, text: String) {
        binders::netmsg::on_say_text(&mut self.bus, text);
    }

    pub fn notify_say_text2(&mut self, message_name: String, params: Vec<String>) {
        binders::netmsg::on_say_text2(&mut self.bus, message_name, params);
    }

    pub fn notify_chat_message(&mut self, entity_id: Option<EntityId>, text: String) {
        binders::netmsg::on_chat_message(&mut self.bus, entity_id, text);
    }

    pub fn notify_rank_update(&mut self, steam_id64: u64, rank: i32, wins: i32) {
        binders::netmsg::on_rank_update(&mut self.state, &mut self.bus, steam_id64, rank, wins);
    }

    pub fn notify_encrypted_message_undecryptable(&mut self, have_key: bool) {
        binders::netmsg::on_encrypted_message_undecryptable(&mut self.bus, have_key);
    }

    /// A smoke's `m_VoxelFrameData.NNNN` array, up to 10000 slots, is too
    /// large to enumerate as literal `tracked_paths` entries; a decoder that
    /// wants voxel occupancy reads it directly and hands it here.
    pub fn notify_smoke_voxel_frame(&mut self, smoke_entity_id: EntityId, frame: &[u8]) {
        binders::smoke::on_voxel_update(&mut self.state, &self.config, smoke_entity_id, frame);
    }

    fn advance_and_apply(&mut self) -> Result<bool, ParseError> {
        if !self.source.advance()? {
            return Ok(false);
        }

        let tick = self.source.current_tick();
        let frame = self.source.current_frame();
        let entities: Vec<&dyn Entity> = self.source.entities();
        let mut next_snapshot: HashMap<EntityId, PropSnapshot> = HashMap::new();

        for entity in &entities {
            let class = entity.server_class_name().to_string();
            let id = entity.id();
            let prev = self.previous.get(&id);
            self.dispatch_entity(*entity, &class, prev, tick, frame)?;
            next_snapshot.insert(id, Self::snapshot(*entity, &class));
        }

        let gone: Vec<EntityId> = self
            .previous
            .keys()
            .filter(|id| !next_snapshot.contains_key(id))
            .copied()
            .collect();
        for id in gone {
            self.dispatch_destroy(id);
        }

        self.previous = next_snapshot;
        Ok(true)
    }

    fn snapshot(entity: &dyn Entity, class: &str) -> PropSnapshot {
        let paths = Self::tracked_paths(class);
        paths
            .iter()
            .filter_map(|p| entity.property_value(p).map(|v| (p.to_string(), v)))
            .collect()
    }

    fn tracked_paths(class: &str) -> &'static [&'static str] {
        match class {
            "CCSPlayerController" => &[
                "m_hPlayerPawn",
                "m_iConnected",
                "m_steamID",
                "m_iTeamNum",
                "m_hOriginalControllerOfCurrentPawn",
                "m_iCompetitiveRankType",
                "m_pInGameMoneyServices.m_iAccount",
                "m_pActionTrackingServices.m_iKills",
                "m_pActionTrackingServices.m_iDeaths",
            ][..],
            "CCSPlayerPawn" => &[
                "m_hController",
                "m_vOldOrigin",
                "m_angEyeAngles.x",
                "m_angEyeAngles.y",
                "m_fFlags",
                "m_bHasDefuser",
                "m_bHasHelmet",
                "m_ArmorValue",
                "m_flFlashDuration",
                "m_pWeaponServices.m_hActiveWeapon",
                "m_bIsDefusing",
                "m_iHealth",
                "m_lifeState",
                "m_bLeftHanded",
                "m_bSpottedByMask.0000",
                "m_bSpottedByMask.0001",
                "m_pWeaponServices.m_iAmmo.0013",
                "m_pWeaponServices.m_iAmmo.0014",
                "m_pWeaponServices.m_iAmmo.0015",
                "m_pWeaponServices.m_iAmmo.0016",
                "m_pWeaponServices.m_iAmmo.0017",
                "m_hMyWeapons",
                "m_bInBuyZone",
            ][..],
            "CCSTeam" => &["m_iScore", "m_szClanTeamname", "m_szTeamname"][..],
            "CC4" => &["m_hOwnerEntity", "m_bStartedArming", "m_bBeingDefused", "m_nWhichBombZone"][..],
            "CPlantedC4" => &["m_bBombTicking", "m_hBombDefuser", "m_bBombDefused", "m_nBombSite"][..],
            "CCSGameRulesProxy" => &[
                "m_bFreezePeriod",
                "m_bWarmupPeriod",
                "m_gamePhase",
                "m_eRoundWinReason",
                "m_totalRoundsPlayed",
                "m_nOvertimePlaying",
                "m_bHasMatchStarted",
            ][..],
            "CHostage" => &["m_nHostageState"][..],
            "CInferno" => &[
                "m_bFireIsBurning.0000",
                "m_bFireIsBurning.0001",
                "m_bFireIsBurning.0002",
                "m_bFireIsBurning.0003",
                "m_bFireIsBurning.0004",
                "m_bFireIsBurning.0005",
                "m_bFireIsBurning.0006",
                "m_bFireIsBurning.0007",
                "m_bFireIsBurning.0008",
                "m_bFireIsBurning.0009",
                "m_bFireIsBurning.0010",
                "m_bFireIsBurning.0011",
                "m_bFireIsBurning.0012",
                "m_bFireIsBurning.0013",
                "m_bFireIsBurning.0014",
                "m_bFireIsBurning.0015",
            ][..],
            "CSmokeGrenadeProjectile" => &["m_bDidSmokeEffect"][..],
            other if other.contains("GrenadeProjectile") => &["m_nBounces"][..],
            other if other.starts_with("CCSWeapon") || other.starts_with("CWeapon") => {
                &["m_hOwnerEntity", "m_bJumpThrow", "m_fLastShotTime"][..]
            }
            _ => &[][..],
        }
    }

    fn changed<'a>(prev: Option<&'a PropSnapshot>, cur: &dyn Entity, path: &str) -> Option<PropertyValue> {
        let new = cur.property_value(path)?;
        match prev.and_then(|p| p.get(path)) {
            Some(old) if *old == new => None,
            _ => Some(new),
        }
    }

    fn dispatch_entity(
        &mut self,
        entity: &dyn Entity,
        class: &str,
        prev: Option<&PropSnapshot>,
        tick: i32,
        _frame: i32,
    ) -> Result<(), ParseError> {
        let id = entity.id();
        match class {
            "CCSPlayerController" => {
                let user_id = id;
                if let Some(v) = Self::changed(prev, entity, "m_iTeamNum") {
                    let team = Team::from_wire(v.int());
                    binders::controller::get_or_create_player(&mut self.state, id, user_id);
                    binders::controller::on_team_update(&mut self.state, id, team);
                }
                if let Some(v) = Self::changed(prev, entity, "m_iConnected") {
                    let steam_id64 = entity.property_value("m_steamID").map(|p| p.s2_u64()).unwrap_or(0);
                    binders::controller::get_or_create_player(&mut self.state, id, user_id);
                    binders::controller::on_connected_update(&mut self.state, &mut self.bus, id, user_id, v.int() as i32, steam_id64);
                }
                if let Some(v) = Self::changed(prev, entity, "m_hPlayerPawn") {
                    binders::controller::on_pawn_handle_update(&mut self.state, id, handle_to_entity_id(v.handle()));
                }
                if let Some(v) = Self::changed(prev, entity, "m_hOriginalControllerOfCurrentPawn") {
                    if let Some(taker) = handle_to_entity_id(v.handle()) {
                        binders::controller::on_original_controller_update(&self.state, &mut self.bus, id, taker);
                    }
                }
                if let Some(v) = Self::changed(prev, entity, "m_pInGameMoneyServices.m_iAccount") {
                    binders::controller::on_money_update(&mut self.state, &mut self.bus, id, v.int() as i32, tick);
                }
                if let Some(v) = Self::changed(prev, entity, "m_pActionTrackingServices.m_iKills") {
                    binders::controller::on_kills_update(&mut self.state, &mut self.bus, id, v.int() as i32);
                }
                if let Some(v) = Self::changed(prev, entity, "m_pActionTrackingServices.m_iDeaths") {
                    binders::controller::on_deaths_update(&mut self.state, &mut self.bus, id, v.int() as i32);
                }
            }
            "CCSPlayerPawn" => {
                if let Some(v) = Self::changed(prev, entity, "m_hController") {
                    if let Some(controller_id) = handle_to_entity_id(v.handle()) {
                        binders::pawn::on_controller_handle_update(&mut self.state, id, controller_id);
                    }
                }
                if let Some(v) = Self::changed(prev, entity, "m_vOldOrigin") {
                    binders::pawn::on_position_update(&mut self.state, &mut self.bus, id, v.r3_vec(), tick);
                }
                let pitch = entity.property_value("m_angEyeAngles.x").map(|v| v.float());
                let yaw = entity.property_value("m_angEyeAngles.y").map(|v| v.float());
                if Self::changed(prev, entity, "m_angEyeAngles.x").is_some()
                    || Self::changed(prev, entity, "m_angEyeAngles.y").is_some()
                {
                    binders::pawn::on_view_angle_update(&mut self.state, &mut self.bus, id, pitch.unwrap_or(0.0), yaw.unwrap_or(0.0));
                }
                if let Some(v) = Self::changed(prev, entity, "m_fFlags") {
                    binders::pawn::on_flags_update(&mut self.state, id, v.s2_u32());
                }
                if let Some(v) = Self::changed(prev, entity, "m_bHasDefuser") {
                    binders::pawn::on_defuse_kit_update(&mut self.state, &mut self.bus, id, v.bool_val());
                }
                if let Some(v) = Self::changed(prev, entity, "m_bHasHelmet") {
                    binders::pawn::on_helmet_update(&mut self.state, &mut self.bus, id, v.bool_val());
                }
                if let Some(v) = Self::changed(prev, entity, "m_ArmorValue") {
                    binders::pawn::on_armor_update(&mut self.state, &mut self.bus, id, v.int() as i32);
                }
                if let Some(v) = Self::changed(prev, entity, "m_flFlashDuration") {
                    binders::pawn::on_flash_duration_update(&mut self.state, id, v.float(), tick);
                }
                if let Some(v) = Self::changed(prev, entity, "m_pWeaponServices.m_hActiveWeapon") {
                    binders::pawn::on_active_weapon_update(&mut self.state, &mut self.bus, id, handle_to_entity_id(v.handle()));
                }
                if let Some(v) = Self::changed(prev, entity, "m_bIsDefusing") {
                    binders::pawn::on_is_defusing_update(&mut self.state, id, v.bool_val());
                }
                if Self::changed(prev, entity, "m_iHealth").is_some() || Self::changed(prev, entity, "m_lifeState").is_some() {
                    let health = entity.property_value("m_iHealth").map(|v| v.int() as i32).unwrap_or(0);
                    let life_state = entity.property_value("m_lifeState").map(|v| v.int() as i32).unwrap_or(0);
                    binders::pawn::on_health_or_life_state_update(&mut self.state, id, health, life_state);
                }
                if let Some(v) = Self::changed(prev, entity, "m_bLeftHanded") {
                    binders::pawn::on_left_handed_update(&mut self.state, &mut self.bus, id, v.bool_val(), tick);
                }
                if let Some(v) = Self::changed(prev, entity, "m_bInBuyZone") {
                    binders::pawn::on_buy_zone_update(&mut self.state, id, v.bool_val());
                }
                if let Some(v) = Self::changed(prev, entity, "m_hMyWeapons") {
                    let slots: Vec<Option<EntityId>> =
                        v.array().iter().map(|h| handle_to_entity_id(h.handle())).collect();
                    binders::weapons::on_weapon_array_update(&mut self.state, &mut self.bus, id, &slots);
                }
                if Self::changed(prev, entity, "m_bSpottedByMask.0000").is_some()
                    || Self::changed(prev, entity, "m_bSpottedByMask.0001").is_some()
                {
                    binders::pawn::on_spotted_by_mask_update(&mut self.bus, id);
                }
                for (slot, path) in [
                    (13u32, "m_pWeaponServices.m_iAmmo.0013"),
                    (14, "m_pWeaponServices.m_iAmmo.0014"),
                    (15, "m_pWeaponServices.m_iAmmo.0015"),
                    (16, "m_pWeaponServices.m_iAmmo.0016"),
                    (17, "m_pWeaponServices.m_iAmmo.0017"),
                ] {
                    if let Some(v) = Self::changed(prev, entity, path) {
                        let thrower_team_is_terrorist = self
                            .state
                            .player_by_pawn_handle(id)
                            .map(|p| p.team == Team::Terrorist)
                            .unwrap_or(false);
                        binders::pawn::on_grenade_ammo_update(
                            &mut self.state,
                            &mut self.bus,
                            id,
                            slot,
                            v.int() as i32,
                            thrower_team_is_terrorist,
                        );
                    }
                }
            }
            "CCSTeam" => {
                let team_name = entity.property_value("m_szTeamname").map(|v| v.str().to_string()).unwrap_or_default();
                let Some(team) = binders::team::resolve_team_name(&team_name)? else {
                    return Ok(());
                };
                if let Some(v) = Self::changed(prev, entity, "m_iScore") {
                    binders::team::on_score_update(&mut self.state, &mut self.bus, team, v.int() as i32);
                }
                if let Some(v) = Self::changed(prev, entity, "m_szClanTeamname") {
                    binders::team::on_clan_name_update(&mut self.state, &mut self.bus, team, v.str().to_string());
                }
            }
            "CC4" => {
                if let Some(v) = Self::changed(prev, entity, "m_hOwnerEntity") {
                    binders::bomb::on_owner_update(&mut self.state, &mut self.bus, handle_to_entity_id(v.handle()));
                }
                if let Some(v) = Self::changed(prev, entity, "m_bStartedArming") {
                    let planter_pawn = entity
                        .property_value("m_hOwnerEntity")
                        .and_then(|h| handle_to_entity_id(h.handle()));
                    let planter = planter_pawn
                        .and_then(|pawn| self.state.player_by_pawn_handle(pawn))
                        .and_then(|p| p.entity_id);
                    if let Some(planter) = planter {
                        let which_bomb_zone = entity.property_value("m_nWhichBombZone").map(|v| v.int() as i32).unwrap_or(0);
                        binders::bomb::on_started_arming(&mut self.state, &mut self.bus, v.bool_val(), planter, which_bomb_zone, entity.position());
                    }
                }
                binders::bomb::on_position_update(&mut self.state, entity.position());
            }
            "CPlantedC4" => {
                if prev.is_none() {
                    let site_raw = entity.property_value("m_nBombSite").map(|v| v.int() as i32).unwrap_or(0);
                    binders::bomb::on_planted_c4_created(&mut self.state, &mut self.bus, None, site_raw);
                }
                if let Some(v) = Self::changed(prev, entity, "m_bBombTicking") {
                    binders::bomb::on_bomb_ticking(&mut self.state, &mut self.bus, v.bool_val());
                }
                if let Some(v) = Self::changed(prev, entity, "m_hBombDefuser") {
                    let pawn = handle_to_entity_id(v.handle());
                    let defuser = pawn.and_then(|pawn| self.state.player_by_pawn_handle(pawn)).and_then(|p| p.entity_id);
                    let has_kit = pawn
                        .and_then(|pawn| self.state.player_by_pawn_handle(pawn))
                        .map(|p| p.has_defuse_kit)
                        .unwrap_or(false);
                    binders::bomb::on_bomb_defuser_update(&mut self.state, &mut self.bus, defuser, has_kit);
                }
                if let Some(v) = Self::changed(prev, entity, "m_bBombDefused") {
                    binders::bomb::on_bomb_defused(&mut self.state, &mut self.bus, v.bool_val());
                }
            }
            "CCSGameRulesProxy" => {
                if let Some(v) = Self::changed(prev, entity, "m_bFreezePeriod") {
                    binders::rules::on_freeze_period_update(&mut self.state, &mut self.bus, v.bool_val());
                }
                if let Some(v) = Self::changed(prev, entity, "m_bWarmupPeriod") {
                    binders::rules::on_warmup_period_update(&mut self.state, &mut self.bus, v.bool_val());
                }
                if let Some(v) = Self::changed(prev, entity, "m_gamePhase") {
                    binders::rules::on_game_phase_update(&mut self.state, &mut self.bus, v.int());
                }
                if let Some(v) = Self::changed(prev, entity, "m_eRoundWinReason") {
                    // Skip the first callback: it reports whatever value the
                    // entity was created with, not a genuine transition.
                    if prev.is_some() {
                        binders::rules::on_round_end_reason_update(&mut self.state, &mut self.bus, v.int(), tick);
                    }
                }
                if let Some(v) = Self::changed(prev, entity, "m_nOvertimePlaying") {
                    binders::rules::on_overtime_count_update(&mut self.state, &mut self.bus, v.int() as i32);
                }
                if let Some(v) = Self::changed(prev, entity, "m_bHasMatchStarted") {
                    binders::rules::on_match_started_update(&mut self.state, &mut self.bus, v.bool_val(), tick);
                }
            }
            "CHostage" => {
                if prev.is_none() {
                    binders::hostage::on_create(&mut self.state, id);
                }
                if let Some(v) = Self::changed(prev, entity, "m_nHostageState") {
                    binders::hostage::on_state_update(&mut self.state, &mut self.bus, id, v.int());
                }
            }
            other if other.starts_with("CCSWeapon") || other.starts_with("CWeapon") => {
                if prev.is_none() {
                    let item_def_index = entity.property_value("m_iItemDefinitionIndex").map(|v| v.s2_u64());
                    let ty = binders::equipment::resolve_equipment_type_from_item_index(&self.state, &mut self.bus, item_def_index);
                    binders::weapons::on_weapon_entity_created(&mut self.state, id, ty);
                }
                if let Some(v) = Self::changed(prev, entity, "m_hOwnerEntity") {
                    let new_owner = handle_to_entity_id(v.handle())
                        .and_then(|pawn| self.state.player_by_pawn_handle(pawn))
                        .and_then(|p| p.entity_id);
                    binders::equipment::on_owner_update(&mut self.state, &mut self.bus, id, new_owner);
                }
                if let Some(v) = Self::changed(prev, entity, "m_bJumpThrow") {
                    binders::equipment::on_jump_throw(&mut self.bus, id, v.bool_val());
                }
                if let Some(v) = Self::changed(prev, entity, "m_fLastShotTime") {
                    let is_grenade = self
                        .state
                        .weapons
                        .get(&id)
                        .map(|e| e.ty.class() == crate::model::equipment::EquipmentClass::Grenade)
                        .unwrap_or(false);
                    if v.float() > 0.0 && !is_grenade {
                        let shooter = self.state.weapons.get(&id).and_then(|e| e.owner).unwrap_or(0);
                        binders::equipment::on_fake_weapon_fire(&mut self.bus, shooter, id);
                    }
                }
            }
            "CSmokeGrenadeProjectile" => {
                if prev.is_none() {
                    let thrower = entity
                        .property_value("m_hThrower")
                        .and_then(|h| handle_to_entity_id(h.handle()))
                        .and_then(|pawn| self.state.player_by_pawn_handle(pawn))
                        .and_then(|p| p.entity_id);
                    binders::smoke::on_create(&mut self.state, id, thrower);
                }
                if let Some(v) = Self::changed(prev, entity, "m_bDidSmokeEffect") {
                    if v.bool_val() {
                        binders::smoke::on_detonate(&mut self.state, id, tick);
                        binders::grenade::on_fake_smoke_start(&mut self.bus, id);
                    }
                }
            }
            other if other.contains("GrenadeProjectile") => {
                if prev.is_none() {
                    let is_incendiary = entity.property_value("m_bIsIncGrenade").map(|v| v.bool_val()).unwrap_or(false);
                    let ty = crate::model::equipment::equipment_type_from_server_class(other, is_incendiary)
                        .unwrap_or(crate::model::equipment::EquipmentType::Unknown);
                    let thrower = entity
                        .property_value("m_hThrower")
                        .and_then(|h| handle_to_entity_id(h.handle()))
                        .and_then(|pawn| self.state.player_by_pawn_handle(pawn))
                        .and_then(|p| p.entity_id);
                    binders::grenade::on_create(
                        &mut self.state,
                        &mut self.bus,
                        id,
                        ty,
                        thrower,
                        thrower,
                        None,
                        entity.position(),
                        nalgebra::Vector3::zeros(),
                    );
                }
                if let Some(v) = Self::changed(prev, entity, "m_nBounces") {
                    if v.int() > 0 {
                        binders::grenade::on_bounce(&mut self.state, &mut self.bus, id);
                    }
                }
            }
            "CBaseAnimGraph" => {
                if prev.is_none() {
                    binders::defusekit::on_create(&mut self.state, id);
                }
            }
            "CInferno" => {
                if prev.is_none() {
                    binders::inferno::on_create(&mut self.state, &mut self.bus, id, None);
                }
                for slot in 0..16usize {
                    let burning_path = format!("m_bFireIsBurning.{slot:04}");
                    if let Some(v) = Self::changed(prev, entity, &burning_path) {
                        let position = entity
                            .property_value(&format!("m_firePositions.{slot:04}"))
                            .map(|p| p.r3_vec())
                            .unwrap_or_else(nalgebra::Vector3::zeros);
                        binders::inferno::on_fire_slot_update(&mut self.state, &mut self.bus, id, slot, position, v.bool_val());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn dispatch_destroy(&mut self, id: EntityId) {
        binders::controller::on_destroy(&mut self.state, id);
        binders::equipment::on_destroy(&mut self.state, &mut self.bus, id, self.source.current_tick());
        binders::grenade::on_destroy(&mut self.state, &mut self.bus, id, self.source.current_frame());
        binders::inferno::on_destroy(&mut self.state, &mut self.bus, id);
        binders::smoke::on_expire_or_destroy(&mut self.state, id);
        binders::hostage::on_destroy(&mut self.state, id);
        binders::defusekit::on_destroy(&mut self.state, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::PropertyValue;
    use crate::testutil::{FakeEntity, FakeEntitySource};

    fn controller(id: EntityId, team: i64, connected: i64) -> FakeEntity {
        FakeEntity::new(id, "CCSPlayerController")
            .with_prop("m_iTeamNum", PropertyValue::Int(team))
            .with_prop("m_iConnected", PropertyValue::Int(connected))
            .with_prop("m_steamID", PropertyValue::U64(76561197960287930 + id as u64))
    }

    #[test]
    fn round_trip_connects_a_player_and_tracks_team() {
        let mut source = FakeEntitySource::new(64.0);
        source.push_frame(vec![controller(1, 2, 0)]);
        source.push_frame(vec![controller(1, 3, 0)]);

        let mut parser = Parser::new(source, ParserConfig::default());
        assert!(parser.parse_next_frame().unwrap());
        assert_eq!(parser.game_state().players_by_entity_id[&1].team, Team::Terrorist);

        assert!(parser.parse_next_frame().unwrap());
        assert_eq!(parser.game_state().players_by_entity_id[&1].team, Team::CounterTerrorist);

        assert!(!parser.parse_next_frame().unwrap());
    }

    #[test]
    fn destroyed_entity_removes_player() {
        let mut source = FakeEntitySource::new(64.0);
        source.push_frame(vec![controller(1, 2, 0)]);
        source.push_frame(vec![]);

        let mut parser = Parser::new(source, ParserConfig::default());
        parser.parse_next_frame().unwrap();
        assert!(parser.game_state().players_by_entity_id.contains_key(&1));

        parser.parse_next_frame().unwrap();
        assert!(!parser.game_state().players_by_entity_id.contains_key(&1));
    }

    #[test]
    fn tick_rate_info_rejects_non_positive_interval() {
        let mut bus = EventBus::new();
        assert!(binders::netmsg::on_tick_rate_info(&mut bus, 0.0).is_err());
        assert!(binders::netmsg::on_tick_rate_info(&mut bus, 1.0 / 64.0).is_ok());
    }

    #[test]
    fn parser_is_poisoned_after_a_failure() {
        let source = FakeEntitySource::new(64.0);
        let mut parser = Parser::new(source, ParserConfig::default());
        parser.failed = true;
        assert!(parser.parse_next_frame().is_err());
    }

    #[test]
    fn round_cycle_notifications_reset_bomb_and_planting_state() {
        let source = FakeEntitySource::new(64.0);
        let mut parser = Parser::new(source, ParserConfig::default());
        parser
            .state
            .players_by_entity_id
            .insert(1, crate::model::player::Player::new_unknown(100));
        parser.state.players_by_entity_id.get_mut(&1).unwrap().entity_id = Some(1);
        parser.state.players_by_entity_id.get_mut(&1).unwrap().is_planting = true;
        parser.state.bomb.state = crate::model::bomb::BombState::Planted { site: crate::model::bomb::BombSite::A };

        parser.notify_round_end_official();
        parser.notify_round_start(115, 0);

        assert!(!parser.game_state().players_by_entity_id[&1].is_planting);
        assert_eq!(parser.game_state().bomb.state, crate::model::bomb::BombState::Idle);
    }

    #[test]
    fn inferno_fire_slot_wiring_tracks_burn_state_through_the_diff_loop() {
        let mut source = FakeEntitySource::new(64.0);
        source.push_frame(vec![FakeEntity::new(50, "CInferno")]);
        let mut frame2 = FakeEntity::new(50, "CInferno")
            .with_prop("m_bFireIsBurning.0000", PropertyValue::Bool(true));
        frame2.properties.insert(
            "m_firePositions.0000".to_string(),
            PropertyValue::Vec3(nalgebra::Vector3::new(1.0, 2.0, 3.0)),
        );
        source.push_frame(vec![frame2]);

        let mut parser = Parser::new(source, ParserConfig::default());
        parser.parse_next_frame().unwrap();
        parser.parse_next_frame().unwrap();

        let inferno = &parser.game_state().infernos[&50];
        assert_eq!(inferno.fire_count, 1);
        assert!(inferno.fires[0].as_ref().unwrap().is_burning);
    }

    #[test]
    fn grenade_bounce_count_dispatched_through_the_diff_loop() {
        let mut source = FakeEntitySource::new(64.0);
        source.push_frame(vec![FakeEntity::new(60, "CHEGrenadeProjectile")]);
        source.push_frame(vec![
            FakeEntity::new(60, "CHEGrenadeProjectile").with_prop("m_nBounces", PropertyValue::Int(1))
        ]);

        let mut parser = Parser::new(source, ParserConfig::default());
        parser.parse_next_frame().unwrap();
        parser.parse_next_frame().unwrap();

        assert_eq!(parser.game_state().grenade_projectiles[&60].bounces, 1);
    }

    #[test]
    fn weapon_entity_resolves_type_from_item_definition_index() {
        let mut source = FakeEntitySource::new(64.0);
        source.push_frame(vec![
            FakeEntity::new(70, "CCSWeaponAK47").with_prop("m_iItemDefinitionIndex", PropertyValue::U32(7))
        ]);

        let mut parser = Parser::new(source, ParserConfig::default());
        parser.parse_next_frame().unwrap();

        assert_eq!(parser.game_state().weapons[&70].ty, crate::model::equipment::EquipmentType::Ak47);
    }

    #[test]
    fn grenade_projectile_falls_back_to_server_class_name_for_type() {
        let mut source = FakeEntitySource::new(64.0);
        source.push_frame(vec![FakeEntity::new(71, "CFlashbangProjectile")]);

        let mut parser = Parser::new(source, ParserConfig::default());
        parser.parse_next_frame().unwrap();

        assert_eq!(parser.game_state().grenade_projectiles[&71].ty, crate::model::equipment::EquipmentType::Flash);
    }

    #[test]
    fn weapon_owner_transfer_then_buy_zone_destroy_is_a_refund() {
        let mut source = FakeEntitySource::new(64.0);
        source.push_frame(vec![
            FakeEntity::new(1, "CCSPlayerController")
                .with_prop("m_iTeamNum", PropertyValue::Int(2))
                .with_prop("m_iConnected", PropertyValue::Int(0))
                .with_prop("m_steamID", PropertyValue::U64(76561197960287930)),
            FakeEntity::new(80, "CCSWeaponAK47").with_prop("m_iItemDefinitionIndex", PropertyValue::U32(7)),
        ]);
        source.push_frame(vec![
            FakeEntity::new(1, "CCSPlayerController")
                .with_prop("m_iTeamNum", PropertyValue::Int(2))
                .with_prop("m_iConnected", PropertyValue::Int(0))
                .with_prop("m_steamID", PropertyValue::U64(76561197960287930)),
            FakeEntity::new(80, "CCSWeaponAK47")
                .with_prop("m_iItemDefinitionIndex", PropertyValue::U32(7))
                .with_prop("m_hOwnerEntity", PropertyValue::Handle(1)),
        ]);
        source.push_frame(vec![
            FakeEntity::new(1, "CCSPlayerController")
                .with_prop("m_iTeamNum", PropertyValue::Int(2))
                .with_prop("m_iConnected", PropertyValue::Int(0))
                .with_prop("m_steamID", PropertyValue::U64(76561197960287930)),
        ]);

        let mut parser = Parser::new(source, ParserConfig::default());
        parser.parse_next_frame().unwrap();
        parser.state.players_by_entity_id.get_mut(&1).unwrap().pawn_entity_id = Some(1);
        parser.parse_next_frame().unwrap();
        assert_eq!(parser.game_state().weapons[&80].owner, Some(1));

        // The destroy frame lands on tick 2 (ticks start at -1 and advance
        // increments before dispatch); a buy-zone refund requires the
        // owner's last money bump to land on that same tick.
        let owner = parser.state.players_by_entity_id.get_mut(&1).unwrap();
        owner.is_in_buy_zone = true;
        owner.last_money_increased = true;
        owner.last_money_update_tick = 2;

        let refunds = std::rc::Rc::new(std::cell::Cell::new(0));
        let refunds_clone = refunds.clone();
        parser.bus.on(move |e| if matches!(e, Event::ItemRefund { .. }) { refunds_clone.set(refunds_clone.get() + 1) });
        parser.parse_next_frame().unwrap();

        assert_eq!(refunds.get(), 1);
        assert!(!parser.game_state().weapons.contains_key(&80));
    }

    #[test]
    fn ccs_team_unassigned_name_is_ignored_and_unknown_name_is_fatal() {
        let mut source = FakeEntitySource::new(64.0);
        source.push_frame(vec![
            FakeEntity::new(2, "CCSTeam").with_prop("m_szTeamname", PropertyValue::Str("Unassigned".to_string()))
        ]);
        let mut parser = Parser::new(source, ParserConfig::default());
        assert!(parser.parse_next_frame().unwrap());
        assert_eq!(parser.game_state().t_state.score, 0);

        let mut bad_source = FakeEntitySource::new(64.0);
        bad_source.push_frame(vec![
            FakeEntity::new(2, "CCSTeam").with_prop("m_szTeamname", PropertyValue::Str("FREE_FOR_ALL".to_string()))
        ]);
        let mut bad_parser = Parser::new(bad_source, ParserConfig::default());
        assert!(bad_parser.parse_next_frame().is_err());
    }
}
