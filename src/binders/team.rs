//! *CCSTeam* — see design docs §4.2.2.

use crate::error::ParseError;
use crate::event::{Event, EventBus};
use crate::model::team::Team;
use crate::state::GameState;

/// Resolves `m_szTeamname` to a team, or `None` for names that are
/// intentionally ignored ("Unassigned", "Spectator").
pub fn resolve_team_name(name: &str) -> Result<Option<Team>, ParseError> {
    match name {
        "TERRORIST" => Ok(Some(Team::Terrorist)),
        "CT" => Ok(Some(Team::CounterTerrorist)),
        "Unassigned" | "Spectator" => Ok(None),
        other => Err(ParseError::UnknownTeamName(other.to_string())),
    }
}

pub fn on_score_update(state: &mut GameState, bus: &mut EventBus, team: Team, new_score: i32) {
    let Some(team_state) = state.team_state_mut(team) else { return };
    let old = team_state.score;
    if old == new_score {
        return;
    }
    team_state.score = new_score;
    bus.dispatch(Event::ScoreUpdated { team, old, new: new_score });
}

pub fn on_clan_name_update(state: &mut GameState, bus: &mut EventBus, team: Team, name: String) {
    if let Some(team_state) = state.team_state_mut(team) {
        team_state.clan_name = name.clone();
    }
    bus.dispatch(Event::TeamClanNameUpdated { team, name });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_team_name_known_values() {
        assert_eq!(resolve_team_name("TERRORIST"), Ok(Some(Team::Terrorist)));
        assert_eq!(resolve_team_name("CT"), Ok(Some(Team::CounterTerrorist)));
    }

    #[test]
    fn resolve_team_name_ignores_unassigned_and_spectator() {
        assert_eq!(resolve_team_name("Unassigned"), Ok(None));
        assert_eq!(resolve_team_name("Spectator"), Ok(None));
    }

    #[test]
    fn resolve_team_name_errors_on_garbage() {
        assert!(resolve_team_name("FREE_FOR_ALL").is_err());
    }

    #[test]
    fn score_update_suppressed_when_unchanged() {
        let mut state = GameState::new();
        let mut bus = EventBus::new();
        on_score_update(&mut state, &mut bus, Team::Terrorist, 0);
        assert_eq!(state.t_state.score, 0);
        on_score_update(&mut state, &mut bus, Team::Terrorist, 5);
        assert_eq!(state.t_state.score, 5);
    }
}
