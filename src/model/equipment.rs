//! Weapons and items. `EquipmentType` and its supporting tables are
//! ABI-visible constants (see the design docs, external interfaces section):
//! the decimal discriminants below must not be renumbered.

use std::sync::LazyLock;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::Serialize;

use crate::entity::EntityId;
use crate::model::UniqueId2;

/// Coarse weapon category. `(EquipmentType as i32 + 99) / 100 == EquipmentClass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EquipmentClass {
    Unknown = 0,
    Pistols = 1,
    Smg = 2,
    Heavy = 3,
    Rifle = 4,
    Equipment = 5,
    Grenade = 6,
}

/// What weapon or item a player has equipped. Numeric values are
/// ABI-visible; see module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, Serialize)]
pub enum EquipmentType {
    Unknown = 0,

    P2000 = 1,
    Glock = 2,
    P250 = 3,
    Deagle = 4,
    FiveSeven = 5,
    DualBerettas = 6,
    Tec9 = 7,
    Cz = 8,
    Usp = 9,
    Revolver = 10,

    Mp7 = 101,
    Mp9 = 102,
    Bizon = 103,
    Mac10 = 104,
    Ump = 105,
    P90 = 106,
    Mp5 = 107,

    SawedOff = 201,
    Nova = 202,
    Swag7 = 203,
    Xm1014 = 204,
    M249 = 205,
    Negev = 206,

    Galil = 301,
    Famas = 302,
    Ak47 = 303,
    M4a4 = 304,
    M4a1 = 305,
    Scout = 306,
    Sg553 = 307,
    Aug = 308,
    Awp = 309,
    Scar20 = 310,
    G3sg1 = 311,

    Zeus = 401,
    Kevlar = 402,
    Helmet = 403,
    Bomb = 404,
    Knife = 405,
    DefuseKit = 406,
    World = 407,
    ZoneRepulsor = 408,
    Shield = 409,
    HeavyAssaultSuit = 410,
    NightVision = 411,
    HealthShot = 412,
    TacticalAwarenessGrenade = 413,
    Fists = 414,
    BreachCharge = 415,
    Tablet = 416,
    Axe = 417,
    Hammer = 418,
    Wrench = 419,
    Snowball = 420,
    BumpMine = 421,

    Decoy = 501,
    Molotov = 502,
    Incendiary = 503,
    Flash = 504,
    Smoke = 505,
    He = 506,
}

impl EquipmentType {
    pub fn class(self) -> EquipmentClass {
        let class = (self as i32 + 99) / 100;
        match class {
            1 => EquipmentClass::Pistols,
            2 => EquipmentClass::Smg,
            3 => EquipmentClass::Heavy,
            4 => EquipmentClass::Rifle,
            5 => EquipmentClass::Equipment,
            6 => EquipmentClass::Grenade,
            _ => EquipmentClass::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EquipmentType::Ak47 => "AK-47",
            EquipmentType::Aug => "AUG",
            EquipmentType::Awp => "AWP",
            EquipmentType::Bizon => "PP-Bizon",
            EquipmentType::Bomb => "C4",
            EquipmentType::Deagle => "Desert Eagle",
            EquipmentType::Decoy => "Decoy Grenade",
            EquipmentType::DualBerettas => "Dual Berettas",
            EquipmentType::Famas => "FAMAS",
            EquipmentType::FiveSeven => "Five-SeveN",
            EquipmentType::Flash => "Flashbang",
            EquipmentType::G3sg1 => "G3SG1",
            EquipmentType::Galil => "Galil AR",
            EquipmentType::Glock => "Glock-18",
            EquipmentType::He => "HE Grenade",
            EquipmentType::P2000 => "P2000",
            EquipmentType::Incendiary => "Incendiary Grenade",
            EquipmentType::M249 => "M249",
            EquipmentType::M4a4 => "M4A4",
            EquipmentType::Mac10 => "MAC-10",
            EquipmentType::Swag7 => "MAG-7",
            EquipmentType::Molotov => "Molotov",
            EquipmentType::Mp7 => "MP7",
            EquipmentType::Mp5 => "MP5-SD",
            EquipmentType::Mp9 => "MP9",
            EquipmentType::Negev => "Negev",
            EquipmentType::Nova => "Nova",
            EquipmentType::P250 => "P250",
            EquipmentType::P90 => "P90",
            EquipmentType::SawedOff => "Sawed-Off",
            EquipmentType::Scar20 => "SCAR-20",
            EquipmentType::Sg553 => "SG 553",
            EquipmentType::Smoke => "Smoke Grenade",
            EquipmentType::Scout => "SSG 08",
            EquipmentType::Zeus => "Zeus x27",
            EquipmentType::Tec9 => "Tec-9",
            EquipmentType::Ump => "UMP-45",
            EquipmentType::Xm1014 => "XM1014",
            EquipmentType::M4a1 => "M4A1",
            EquipmentType::Cz => "CZ75 Auto",
            EquipmentType::Usp => "USP-S",
            EquipmentType::World => "World",
            EquipmentType::Revolver => "R8 Revolver",
            EquipmentType::Kevlar => "Kevlar Vest",
            EquipmentType::Helmet => "Kevlar + Helmet",
            EquipmentType::DefuseKit => "Defuse Kit",
            EquipmentType::Knife => "Knife",
            _ => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// `weapon_<name>` / `<name>` → type lookup table, kept as an ordered list
/// rather than a `HashMap` so the "first prefix-or-suffix match wins"
/// ambiguity documented in the design notes is deterministic instead of
/// depending on hash-iteration order.
static EQ_NAME_TABLE: LazyLock<Vec<(&'static str, EquipmentType)>> = LazyLock::new(|| {
    vec![
        ("ak47", EquipmentType::Ak47),
        ("aug", EquipmentType::Aug),
        ("awp", EquipmentType::Awp),
        ("bizon", EquipmentType::Bizon),
        ("c4", EquipmentType::Bomb),
        ("planted_c4", EquipmentType::Bomb),
        ("deagle", EquipmentType::Deagle),
        ("decoy", EquipmentType::Decoy),
        ("decoygrenade", EquipmentType::Decoy),
        ("decoyprojectile", EquipmentType::Decoy),
        ("decoy_projectile", EquipmentType::Decoy),
        ("elite", EquipmentType::DualBerettas),
        ("famas", EquipmentType::Famas),
        ("fiveseven", EquipmentType::FiveSeven),
        ("flashbang", EquipmentType::Flash),
        ("g3sg1", EquipmentType::G3sg1),
        ("galil", EquipmentType::Galil),
        ("galilar", EquipmentType::Galil),
        ("glock", EquipmentType::Glock),
        ("hegrenade", EquipmentType::He),
        ("hkp2000", EquipmentType::P2000),
        ("incgrenade", EquipmentType::Incendiary),
        ("incendiarygrenade", EquipmentType::Incendiary),
        ("m249", EquipmentType::M249),
        ("m4a1", EquipmentType::M4a4),
        ("mac10", EquipmentType::Mac10),
        ("mag7", EquipmentType::Swag7),
        ("molotov", EquipmentType::Molotov),
        ("molotovgrenade", EquipmentType::Molotov),
        ("molotovprojectile", EquipmentType::Molotov),
        ("molotov_projectile", EquipmentType::Molotov),
        ("mp7", EquipmentType::Mp7),
        ("mp5sd", EquipmentType::Mp5),
        ("mp9", EquipmentType::Mp9),
        ("negev", EquipmentType::Negev),
        ("nova", EquipmentType::Nova),
        ("p250", EquipmentType::P250),
        ("p90", EquipmentType::P90),
        ("sawedoff", EquipmentType::SawedOff),
        ("scar20", EquipmentType::Scar20),
        ("sg556", EquipmentType::Sg553),
        ("smokegrenade", EquipmentType::Smoke),
        ("smokegrenadeprojectile", EquipmentType::Smoke),
        ("smokegrenade_projectile", EquipmentType::Smoke),
        ("ssg08", EquipmentType::Scout),
        ("taser", EquipmentType::Zeus),
        ("tec9", EquipmentType::Tec9),
        ("ump45", EquipmentType::Ump),
        ("xm1014", EquipmentType::Xm1014),
        ("m4a1_silencer", EquipmentType::M4a1),
        ("m4a1_silencer_off", EquipmentType::M4a1),
        ("cz75a", EquipmentType::Cz),
        ("usp", EquipmentType::Usp),
        ("usp_silencer", EquipmentType::Usp),
        ("usp_silencer_off", EquipmentType::Usp),
        ("world", EquipmentType::World),
        ("inferno", EquipmentType::Incendiary),
        ("revolver", EquipmentType::Revolver),
        ("vest", EquipmentType::Kevlar),
        ("vesthelm", EquipmentType::Helmet),
        ("defuser", EquipmentType::DefuseKit),
        // Names that don't exist / used to crash the game with `give`.
        ("scar17", EquipmentType::Unknown),
        ("sensorgrenade", EquipmentType::Unknown),
        ("mp5navy", EquipmentType::Unknown),
        ("p228", EquipmentType::Unknown),
        ("scout", EquipmentType::Unknown),
        ("sg550", EquipmentType::Unknown),
        ("sg552", EquipmentType::Unknown),
        ("tmp", EquipmentType::Unknown),
        ("worldspawn", EquipmentType::World),
    ]
});

/// Grenade-projectile fallback when no model-hash cache entry exists yet:
/// the literal server-class name. `is_incendiary_grenade` disambiguates
/// *CMolotovProjectile* (shared by both the incendiary and molotov grenades).
pub fn equipment_type_from_server_class(class: &str, is_incendiary_grenade: bool) -> Option<EquipmentType> {
    Some(match class {
        "CDecoyProjectile" => EquipmentType::Decoy,
        "CHEGrenadeProjectile" => EquipmentType::He,
        "CSmokeGrenadeProjectile" => EquipmentType::Smoke,
        "CFlashbangProjectile" => EquipmentType::Flash,
        "CMolotovProjectile" => {
            if is_incendiary_grenade {
                EquipmentType::Incendiary
            } else {
                EquipmentType::Molotov
            }
        }
        _ => return None,
    })
}

/// Maps a weapon/equipment name (optionally `weapon_`-prefixed) to its type.
/// Returns `EquipmentType::Unknown` if nothing matches.
pub fn map_equipment(name: &str) -> EquipmentType {
    let name = name.strip_prefix("weapon_").unwrap_or(name);

    if name.contains("knife") || name.contains("bayonet") {
        return EquipmentType::Knife;
    }
    if name.starts_with("m4a1_silencer") {
        return EquipmentType::M4a1;
    }
    if name.starts_with("vesthelm") {
        return EquipmentType::Helmet;
    }

    for (candidate, ty) in EQ_NAME_TABLE.iter() {
        if name.starts_with(candidate) || name.ends_with(candidate) {
            return *ty;
        }
    }
    EquipmentType::Unknown
}

/// `m_iItemDefinitionIndex` → type, from `scripts/items/items_game.txt`.
pub fn equipment_index_mapping(index: u64) -> Option<EquipmentType> {
    use EquipmentType::*;
    Some(match index {
        1 => Deagle,
        2 => DualBerettas,
        3 => FiveSeven,
        4 => Glock,
        7 => Ak47,
        8 => Aug,
        9 => Awp,
        10 => Famas,
        11 => G3sg1,
        13 => Galil,
        14 => M249,
        16 => M4a4,
        17 => Mac10,
        19 => P90,
        20 => ZoneRepulsor,
        23 => Mp5,
        24 => Ump,
        25 => Xm1014,
        26 => Bizon,
        27 => Swag7,
        28 => Negev,
        29 => SawedOff,
        30 => Tec9,
        31 => Zeus,
        32 => P2000,
        33 => Mp7,
        34 => Mp9,
        35 => Nova,
        36 => P250,
        37 => Shield,
        38 => Scar20,
        39 => Sg553,
        40 => Scout,
        41 | 42 | 59 | 80 => Knife,
        43 => Flash,
        44 => He,
        45 => Smoke,
        46 => Molotov,
        47 => Decoy,
        48 => Incendiary,
        49 | 81 => Bomb,
        50 => Kevlar,
        51 => Helmet,
        52 => HeavyAssaultSuit,
        54 => NightVision,
        55 | 56 => DefuseKit,
        57 => HealthShot,
        60 => M4a1,
        61 => Usp,
        63 => Cz,
        64 => Revolver,
        68 => TacticalAwarenessGrenade,
        69 | 74 => Fists,
        70 => BreachCharge,
        72 => Tablet,
        75 => Axe,
        76 => Hammer,
        78 => Wrench,
        82 => Decoy,
        83 => He,
        84 => Snowball,
        85 => BumpMine,
        500 | 503 | 505 | 506 | 507 | 508 | 509 | 512 | 514 | 515 | 516 | 517 | 518 | 519
        | 520 | 521 | 522 | 523 | 525 | 526 => Knife,
        _ => return None,
    })
}

/// One-directional default-to-alternative weapon mapping (e.g. P2000→USP).
/// Deliberately not invertible: Five-Seven and Tec-9 both map to the CZ-75.
pub fn equipment_alternative(eq: EquipmentType) -> Option<EquipmentType> {
    use EquipmentType::*;
    Some(match eq {
        P2000 => Usp,
        P250 => Cz,
        FiveSeven => Cz,
        Tec9 => Cz,
        Deagle => Revolver,
        Mp7 => Mp5,
        M4a4 => M4a1,
        _ => return None,
    })
}

pub fn equipment_max_speed(eq: EquipmentType) -> Option<i32> {
    use EquipmentType::*;
    Some(match eq {
        Deagle => 230,
        Revolver => 180,
        DualBerettas => 240,
        FiveSeven => 240,
        Glock => 240,
        P2000 => 240,
        Usp => 240,
        P250 => 240,
        Cz => 240,
        Tec9 => 240,
        Bizon => 240,
        Mac10 => 240,
        Mp7 => 220,
        Mp5 => 235,
        Mp9 => 240,
        P90 => 230,
        Ump => 230,
        Swag7 => 225,
        Nova => 220,
        SawedOff => 210,
        Xm1014 => 215,
        M249 => 195,
        Negev => 150,
        Ak47 => 215,
        Aug => 220,
        Famas => 220,
        Galil => 215,
        M4a4 => 225,
        M4a1 => 225,
        Sg553 => 210,
        Scout => 230,
        Awp => 200,
        Scar20 => 215,
        G3sg1 => 215,
        _ => return None,
    })
}

pub fn equipment_reload_time(eq: EquipmentType) -> Option<i32> {
    use EquipmentType::*;
    Some(match eq {
        Aug => 99,
        Awp => 129,
        Cz => 99,
        Deagle => 56,
        DualBerettas => 186,
        Famas => 105,
        FiveSeven => 60,
        G3sg1 => 167,
        Galil => 75,
        Glock => 60,
        M249 => 239,
        M4a1 => 88,
        M4a4 => 88,
        Mac10 => 82,
        Swag7 => 69,
        Mp5 => 129,
        Mp7 => 92,
        Mp9 => 56,
        Negev => 246,
        Nova => 78,
        P2000 => 62,
        P250 => 60,
        P90 => 126,
        Bizon => 75,
        Revolver => 126,
        Scar20 => 90,
        Scout => 126,
        SawedOff => 211,
        Tec9 => 86,
        Ump => 97,
        Usp => 62,
        Xm1014 => 203,
        _ => return None,
    })
}

/// Item skin descriptor, populated only when the attribute properties are
/// present on the entity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Skin {
    pub item_id: i32,
    pub paint_id: Option<u64>,
    pub pattern: Option<i32>,
    pub float: Option<f32>,
}

/// Runtime possession state of an `Equipment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EquipmentState {
    Destroyed,
    Dropped,
    Holstered,
    Active,
}

impl EquipmentState {
    pub fn as_wire(self) -> i32 {
        match self {
            EquipmentState::Destroyed => -1,
            EquipmentState::Dropped => 0,
            EquipmentState::Holstered => 1,
            EquipmentState::Active => 2,
        }
    }
}

/// A weapon or item belonging to a player (or lying on the ground).
#[derive(Debug, Clone, Serialize)]
pub struct Equipment {
    pub ty: EquipmentType,
    pub entity_id: EntityId,
    pub owner: Option<EntityId>,
    pub skin: Option<Skin>,
    pub state: EquipmentState,
    pub legacy_unique_id: i64,
    pub unique_id2: UniqueId2,
}

impl Equipment {
    pub fn new(ty: EquipmentType, entity_id: EntityId) -> Self {
        Equipment {
            ty,
            entity_id,
            owner: None,
            skin: None,
            state: EquipmentState::Holstered,
            legacy_unique_id: crate::model::legacy_unique_id(entity_id, UniqueId2::next().0),
            unique_id2: UniqueId2::next(),
        }
    }

    pub fn class(&self) -> EquipmentClass {
        self.ty.class()
    }
}

/// `speed` rounded to two decimal places as the original's `roundTo` helper
/// does before feeding it into the remap below.
fn round_to_2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn remap_val_clamped(val: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    if a == b {
        return if val >= b { d } else { c };
    }
    let t = ((val - a) / (b - a)).clamp(0.0, 1.0);
    c + (d - c) * t
}

/// Scales weapon inaccuracy from movement speed; a pure read-side helper.
pub fn movement_inaccuracy_scale(eq: EquipmentType, velocity_xy: (f32, f32)) -> f64 {
    const DUCK_SPEED_MODIFIER: f64 = 0.34;
    const MOVEMENT_CURVE01_EXPONENT: f64 = 0.25;

    let Some(max_speed) = equipment_max_speed(eq) else {
        return 0.0;
    };
    let max_speed = max_speed as f64;

    let speed = round_to_2(((velocity_xy.0 as f64).powi(2) + (velocity_xy.1 as f64).powi(2)).sqrt());

    let scale = remap_val_clamped(speed, max_speed * DUCK_SPEED_MODIFIER, max_speed * 0.95, 0.0, 1.0);
    if scale == 0.0 {
        return 0.0;
    }
    scale.powf(MOVEMENT_CURVE01_EXPONENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_from_discriminant() {
        assert_eq!(EquipmentType::Ak47.class(), EquipmentClass::Rifle);
        assert_eq!(EquipmentType::Glock.class(), EquipmentClass::Pistols);
        assert_eq!(EquipmentType::Mp7.class(), EquipmentClass::Smg);
        assert_eq!(EquipmentType::Negev.class(), EquipmentClass::Heavy);
        assert_eq!(EquipmentType::Smoke.class(), EquipmentClass::Grenade);
        assert_eq!(EquipmentType::Knife.class(), EquipmentClass::Equipment);
    }

    #[test]
    fn map_equipment_strips_weapon_prefix() {
        assert_eq!(map_equipment("weapon_ak47"), EquipmentType::Ak47);
        assert_eq!(map_equipment("ak47"), EquipmentType::Ak47);
    }

    #[test]
    fn map_equipment_handles_knife_variants() {
        assert_eq!(map_equipment("weapon_knife_karambit"), EquipmentType::Knife);
        assert_eq!(map_equipment("weapon_bayonet"), EquipmentType::Knife);
    }

    #[test]
    fn map_equipment_unknown_for_garbage() {
        assert_eq!(map_equipment("weapon_nonexistent_thing"), EquipmentType::Unknown);
    }

    #[test]
    fn equipment_alternative_is_one_directional() {
        assert_eq!(equipment_alternative(EquipmentType::P2000), Some(EquipmentType::Usp));
        assert_eq!(equipment_alternative(EquipmentType::Usp), None);
        assert_eq!(equipment_alternative(EquipmentType::FiveSeven), Some(EquipmentType::Cz));
        assert_eq!(equipment_alternative(EquipmentType::Tec9), Some(EquipmentType::Cz));
    }

    #[test]
    fn equipment_index_mapping_known_and_unknown() {
        assert_eq!(equipment_index_mapping(7), Some(EquipmentType::Ak47));
        assert_eq!(equipment_index_mapping(9999), None);
    }

    #[test]
    fn movement_inaccuracy_scale_zero_at_rest() {
        assert_eq!(movement_inaccuracy_scale(EquipmentType::Ak47, (0.0, 0.0)), 0.0);
    }

    #[test]
    fn movement_inaccuracy_scale_positive_while_running() {
        let scale = movement_inaccuracy_scale(EquipmentType::Ak47, (200.0, 0.0));
        assert!(scale > 0.0 && scale <= 1.0);
    }

    #[test]
    fn movement_inaccuracy_scale_zero_for_equipment_without_max_speed() {
        assert_eq!(movement_inaccuracy_scale(EquipmentType::Knife, (200.0, 0.0)), 0.0);
    }
}
