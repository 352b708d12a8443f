use serde::Serialize;

/// In-game team assignment (`m_iTeamNum` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Team {
    Unassigned,
    Spectator,
    Terrorist,
    CounterTerrorist,
}

impl Team {
    pub fn from_wire(v: i64) -> Team {
        match v {
            1 => Team::Spectator,
            2 => Team::Terrorist,
            3 => Team::CounterTerrorist,
            _ => Team::Unassigned,
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::Terrorist => Team::CounterTerrorist,
            Team::CounterTerrorist => Team::Terrorist,
            other => other,
        }
    }
}

/// Per-team aggregate bound from a `CCSTeam` entity.
#[derive(Debug, Clone, Serialize)]
pub struct TeamState {
    pub team: Team,
    pub score: i32,
    pub clan_name: String,
    pub timeouts_remaining: i32,
}

impl TeamState {
    pub fn new(team: Team) -> Self {
        TeamState {
            team,
            score: 0,
            clan_name: String::new(),
            timeouts_remaining: 0,
        }
    }
}
