use serde::Serialize;

use crate::entity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HostageState {
    Idle,
    GettingPicked,
    BeingCarried,
    Escaped,
    Rescued,
    Dead,
    Unknown(i32),
}

impl HostageState {
    pub fn from_wire(v: i64) -> Self {
        match v {
            0 => HostageState::Idle,
            1 => HostageState::GettingPicked,
            2 => HostageState::BeingCarried,
            3 => HostageState::Escaped,
            4 => HostageState::Rescued,
            5 => HostageState::Dead,
            other => HostageState::Unknown(other as i32),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Hostage {
    pub entity_id: EntityId,
    pub state: HostageState,
}

impl Hostage {
    pub fn new(entity_id: EntityId) -> Self {
        Hostage {
            entity_id,
            state: HostageState::Idle,
        }
    }
}
