use nalgebra::Vector3;
use serde::Serialize;

use crate::entity::EntityId;

/// Which bombsite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BombSite {
    A,
    B,
}

/// The bomb's finite state machine. Transitions are driven exclusively by
/// the property updates the bomb binder watches; see the bomb binder design
/// notes. Modeled as an explicit enum (rather than the scattered
/// planted/defused/in-defuse booleans of the reference implementation this
/// is based on) since the states are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BombState {
    Idle,
    Carried,
    Arming { site: BombSite },
    Planted { site: BombSite },
    Defusing { site: BombSite, has_kit: bool },
    Defused { site: BombSite },
    Exploded { site: BombSite },
}

/// Singleton bomb state.
#[derive(Debug, Clone, Serialize)]
pub struct Bomb {
    pub state: BombState,
    pub carrier: Option<EntityId>,
    pub last_on_ground_position: Vector3<f32>,
    pub current_planter: Option<EntityId>,
    pub current_defuser: Option<EntityId>,
}

impl Bomb {
    pub fn new() -> Self {
        Bomb {
            state: BombState::Idle,
            carrier: None,
            last_on_ground_position: Vector3::zeros(),
            current_planter: None,
            current_defuser: None,
        }
    }

    pub fn planted(&self) -> bool {
        matches!(
            self.state,
            BombState::Planted { .. } | BombState::Defusing { .. }
        )
    }

    pub fn defused(&self) -> bool {
        matches!(self.state, BombState::Defused { .. })
    }

    pub fn in_defuse(&self) -> bool {
        matches!(self.state, BombState::Defusing { .. })
    }

    pub fn reset(&mut self) {
        *self = Bomb::new();
    }
}

impl Default for Bomb {
    fn default() -> Self {
        Bomb::new()
    }
}
