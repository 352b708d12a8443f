//! `CBaseCSGrenadeProjectile` and friends — see design docs §4.2.7.

use nalgebra::Vector3;

use crate::entity::EntityId;
use crate::event::{Event, EventBus};
use crate::model::equipment::EquipmentType;
use crate::model::grenade::{FlyingFlashbang, GrenadeProjectile};
use crate::state::GameState;

pub fn on_create(
    state: &mut GameState,
    bus: &mut EventBus,
    entity_id: EntityId,
    ty: EquipmentType,
    thrower: Option<EntityId>,
    owner: Option<EntityId>,
    weapon_instance: Option<EntityId>,
    initial_position: Vector3<f32>,
    initial_velocity: Vector3<f32>,
) {
    let mut proj = GrenadeProjectile::new(entity_id);
    proj.ty = ty;
    proj.thrower = thrower;
    proj.owner = owner;
    proj.weapon_instance = weapon_instance;
    proj.initial_position = initial_position;
    proj.initial_velocity = initial_velocity;
    state.grenade_projectiles.insert(entity_id, proj);

    if ty == EquipmentType::Flash {
        state.flying_flashbangs.push(FlyingFlashbang {
            projectile_entity_id: entity_id,
            flashed_entity_ids: Vec::new(),
            exploded_frame: None,
        });
    }

    // The grenade's weapon-fire game-event is delegated here rather than
    // handled alongside other weapons (§4.2.6): its owning pawn is usually
    // long gone by the time the projectile entity appears.
    if let Some(shooter_entity_id) = thrower {
        bus.dispatch(Event::FakeWeaponFire {
            shooter_entity_id,
            weapon_entity_id: weapon_instance.unwrap_or(entity_id),
        });
    }
    bus.dispatch(Event::GrenadeProjectileThrow { projectile_entity_id: entity_id });
}

pub fn on_bounce(state: &mut GameState, bus: &mut EventBus, entity_id: EntityId) {
    let Some(proj) = state.grenade_projectiles.get_mut(&entity_id) else { return };
    proj.bounces += 1;
    let bounces = proj.bounces;
    bus.dispatch(Event::GrenadeProjectileBounce { projectile_entity_id: entity_id, bounces });
}

/// Entity removed from the world: either it detonated, or (molotov/HE)
/// simply despawned after its effect resolved elsewhere.
pub fn on_destroy(state: &mut GameState, bus: &mut EventBus, entity_id: EntityId, current_frame: i32) {
    let Some(proj) = state.grenade_projectiles.remove(&entity_id) else { return };

    if proj.ty == EquipmentType::Flash {
        if let Some(pos) = state.flying_flashbangs.iter().position(|f| f.projectile_entity_id == entity_id) {
            let mut flashbang = state.flying_flashbangs.remove(pos);
            flashbang.exploded_frame = Some(current_frame);
            bus.dispatch(Event::FlashExplode { projectile_entity_id: entity_id });
        }
    }
    bus.dispatch(Event::GrenadeProjectileDestroy { projectile_entity_id: entity_id });
}

/// A fake smoke: one whose `CSmokeGrenadeProjectile` entity never gets a
/// corresponding `on_create` (replay-reconstructed detonations).
pub fn on_fake_smoke_start(bus: &mut EventBus, projectile_entity_id: EntityId) {
    bus.dispatch(Event::FakeSmokeStart { projectile_entity_id });
}
