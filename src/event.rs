//! The event bus: a closed sum-type of everything the binding layer can
//! report, dispatched synchronously and in emission order.

use crate::entity::EntityId;
use crate::model::bomb::BombSite;
use crate::model::equipment::EquipmentType;
use crate::model::rules::{GamePhase, RoundEndReason};
use crate::model::team::Team;

/// Discriminates [`Event::ParserWarn`] without being a fatal [`crate::error::ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnType {
    UnknownEquipmentIndex,
    MissingItemDefinitionIndex,
    RankUpdateUnknownSteamId,
    UnexpectedSayText2Name,
    UnreadableEncryptedNetMessage,
    MissingDecryptionKey,
    UnknownGrenadeModel,
}

/// One dispatched occurrence. Variants are grouped by subject to mirror the
/// grouping in the design docs; field names mirror the binder that emits
/// them.
#[derive(Debug, Clone)]
pub enum Event {
    TickRateInfoAvailable { tick_rate: f64, tick_interval: f64 },
    ConVarsUpdated,

    PlayerConnect { user_id: u32 },
    BotConnect { user_id: u32 },
    PlayerDisconnected { user_id: u32 },
    BotTakenOver { taker_user_id: u32 },

    PlayerMove { entity_id: EntityId },
    PlayerViewAngleChange { entity_id: EntityId },
    PlayerSpottersChanged { entity_id: EntityId },

    MoneyUpdate { entity_id: EntityId, old: i32, new: i32 },
    KillsUpdate { entity_id: EntityId, old: i32, new: i32 },
    DeathsUpdate { entity_id: EntityId, old: i32, new: i32 },
    ArmorUpdate { entity_id: EntityId, old: i32, new: i32 },
    DefuseKitUpdate { entity_id: EntityId, has_kit: bool },
    HelmetUpdate { entity_id: EntityId, has_helmet: bool },
    HandSwitch { entity_id: EntityId, left_handed: bool },

    ItemStateUpdate { equipment_entity_id: EntityId, state: i32 },
    ItemNewOwner { equipment_entity_id: EntityId, owner_entity_id: EntityId },
    ItemDroped { equipment_entity_id: EntityId },
    ItemRefund { equipment_entity_id: EntityId, owner_entity_id: EntityId },
    ActiveWeaponUpdate { entity_id: EntityId },
    GrenadeUpdate { entity_id: EntityId, ty: EquipmentType, quantity: i32 },
    JumpThrow { equipment_entity_id: EntityId },
    FakeWeaponFire { shooter_entity_id: EntityId, weapon_entity_id: EntityId },

    GrenadeProjectileThrow { projectile_entity_id: EntityId },
    GrenadeProjectileBounce { projectile_entity_id: EntityId, bounces: i32 },
    GrenadeProjectileDestroy { projectile_entity_id: EntityId },
    FakeSmokeStart { projectile_entity_id: EntityId },
    FlashExplode { projectile_entity_id: EntityId },

    InfernoStart { entity_id: EntityId },
    InfernoFireStart { entity_id: EntityId, slot: usize },
    InfernoExpired { entity_id: EntityId },

    BombOwnerUpdate { prev: Option<EntityId>, new: Option<EntityId> },
    BombPlantBegin { planter_entity_id: EntityId, site: BombSite },
    BombPlantAborted { planter_entity_id: EntityId },
    BombPlanted { site: BombSite },
    BombDefuseStart { has_kit: bool },
    BombDefuseAborted,
    BombDefused { site: BombSite },
    BombExplode { site: BombSite },

    RoundFreezetimeChanged { in_freezetime: bool },
    RoundStart { time_limit: i32, frag_limit: i32, objective: &'static str },
    RoundEnd {
        reason: RoundEndReason,
        message: &'static str,
        winner: Team,
    },
    RoundEndOfficial,
    MatchStartedChanged { started: bool },
    IsWarmupPeriodChanged { warmup: bool },
    GamePhaseChanged { phase: GamePhase },
    TeamSideSwitch,
    GameHalfEnded,
    OvertimeNumberChanged { count: i32 },
    ScoreUpdated { team: Team, old: i32, new: i32 },
    TeamClanNameUpdated { team: Team, name: String },
    Timeout { team: Option<Team>, tech: bool },
    RankUpdate { steam_id64: u64 },

    SayText { text: String },
    SayText2 { message_name: String, params: Vec<String> },
    ChatMessage { entity_id: Option<EntityId>, text: String },

    HostageStateChanged { entity_id: EntityId },

    ParserWarn { warn_type: WarnType, detail: String },
}

/// A synchronous, single-threaded, registration-order listener registry.
///
/// Dispatch is reentrant: a listener may call [`EventBus::dispatch`] itself
/// and the nested dispatch runs to completion before the outer one
/// continues, matching the "nests synchronously" requirement.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn FnMut(&Event)>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus { listeners: Vec::new() }
    }

    pub fn on<F: FnMut(&Event) + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    pub fn dispatch(&mut self, event: Event) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}
