use std::collections::HashMap;

use serde::Serialize;

use crate::model::team::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    Init,
    Pregame,
    StartGamePhase,
    Teamintro,
    Warmup,
    Live,
    HalfTime,
    MatchEnded,
    GameEnded,
    Unknown(i32),
}

impl GamePhase {
    pub fn from_wire(v: i64) -> Self {
        match v {
            0 => GamePhase::Init,
            1 => GamePhase::Pregame,
            2 => GamePhase::StartGamePhase,
            3 => GamePhase::Teamintro,
            4 => GamePhase::Warmup,
            5 => GamePhase::Live,
            6 => GamePhase::HalfTime,
            7 => GamePhase::MatchEnded,
            8 => GamePhase::GameEnded,
            other => GamePhase::Unknown(other as i32),
        }
    }
}

/// `m_eRoundWinReason` values and their (winner, message) mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundEndReason {
    StillInProgress,
    TargetBombed,
    VipEscaped,
    VipKilled,
    TerroristsEscaped,
    CtStoppedEscape,
    TerroristsStopped,
    BombDefused,
    CtWin,
    TerroristWin,
    Draw,
    HostagesRescued,
    TargetSaved,
    HostagesNotRescued,
    TerroristsNotEscaped,
    VipNotEscaped,
    GameStart,
    TerroristsSurrender,
    CtSurrender,
    TerroristsPlanted,
    CtsReachedHostage,
    Unknown(i32),
}

impl RoundEndReason {
    pub fn from_wire(v: i64) -> Self {
        use RoundEndReason::*;
        match v {
            0 => StillInProgress,
            1 => TargetBombed,
            2 => VipEscaped,
            3 => VipKilled,
            4 => TerroristsEscaped,
            5 => CtStoppedEscape,
            6 => TerroristsStopped,
            7 => BombDefused,
            8 => CtWin,
            9 => TerroristWin,
            10 => Draw,
            11 => HostagesRescued,
            12 => TargetSaved,
            13 => HostagesNotRescued,
            14 => TerroristsNotEscaped,
            15 => VipNotEscaped,
            16 => GameStart,
            17 => TerroristsSurrender,
            18 => CtSurrender,
            19 => TerroristsPlanted,
            20 => CtsReachedHostage,
            other => Unknown(other as i32),
        }
    }

    /// (winner, localization message). `None` for `StillInProgress`.
    pub fn winner_and_message(self) -> Option<(Team, &'static str)> {
        use RoundEndReason::*;
        Some(match self {
            StillInProgress => return None,
            TargetBombed => (Team::Terrorist, "#SFUI_Notice_Target_Bombed"),
            VipEscaped => (Team::CounterTerrorist, "#SFUI_Notice_VIP_Escaped"),
            VipKilled => (Team::Terrorist, "#SFUI_Notice_VIP_Assassinated"),
            TerroristsEscaped => (Team::Terrorist, "#SFUI_Notice_Terrorists_Escaped"),
            CtStoppedEscape => (Team::CounterTerrorist, "#SFUI_Notice_CTs_PreventEscape"),
            TerroristsStopped => (Team::CounterTerrorist, "#SFUI_Notice_Escaping_Terrorists_Neutralized"),
            BombDefused => (Team::CounterTerrorist, "#SFUI_Notice_Bomb_Defused"),
            CtWin => (Team::CounterTerrorist, "#SFUI_Notice_CTs_Win"),
            TerroristWin => (Team::Terrorist, "#SFUI_Notice_Terrorists_Win"),
            Draw => (Team::Spectator, "#SFUI_Notice_Round_Draw"),
            HostagesRescued => (Team::CounterTerrorist, "#SFUI_Notice_All_Hostages_Rescued"),
            TargetSaved => (Team::CounterTerrorist, "#SFUI_Notice_Target_Saved"),
            HostagesNotRescued => (Team::Terrorist, "#SFUI_Notice_Hostages_Not_Rescued"),
            TerroristsNotEscaped => (Team::CounterTerrorist, "#SFUI_Notice_Terrorists_Not_Escaped"),
            VipNotEscaped => (Team::Terrorist, "#SFUI_Notice_VIP_Not_Escaped"),
            GameStart => (Team::Spectator, "#SFUI_Notice_Game_Commencing"),
            TerroristsSurrender => (Team::CounterTerrorist, "#SFUI_Notice_Terrorists_Surrender"),
            CtSurrender => (Team::Terrorist, "#SFUI_Notice_CTs_Surrender"),
            TerroristsPlanted => (Team::Terrorist, "#SFUI_Notice_Terrorists_Planted"),
            CtsReachedHostage => (Team::CounterTerrorist, "#SFUI_Notice_CTs_ReachedHostage"),
            Unknown(_) => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameRules {
    pub round_time: i32,
    pub freeze_period: bool,
    pub warmup_period: bool,
    pub match_started: bool,
    pub game_phase: GamePhase,
    pub total_rounds_played: i32,
    pub overtime_count: i32,
    pub last_round_end_reason: Option<RoundEndReason>,
    pub has_bomb_target: bool,
    pub has_rescue_zone: bool,
    pub terrorist_timeouts: i32,
    pub ct_timeouts: i32,
    pub con_vars: HashMap<String, String>,
}

impl GameRules {
    pub fn new() -> Self {
        GameRules {
            round_time: 0,
            freeze_period: false,
            warmup_period: false,
            match_started: false,
            game_phase: GamePhase::Init,
            total_rounds_played: 0,
            overtime_count: 0,
            last_round_end_reason: None,
            has_bomb_target: false,
            has_rescue_zone: false,
            terrorist_timeouts: 0,
            ct_timeouts: 0,
            con_vars: HashMap::new(),
        }
    }

    pub fn objective(&self) -> &'static str {
        if self.has_bomb_target {
            "BOMB TARGET"
        } else if self.has_rescue_zone {
            "HOSTAGE RESCUE"
        } else {
            "DEATHMATCH"
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules::new()
    }
}
