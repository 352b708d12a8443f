//! Net-message handling: console var sync, tick-rate announcement, chat
//! messages, and rank updates. See design docs §4.2.13.

use std::collections::HashMap;

use crate::entity::EntityId;
use crate::error::ParseError;
use crate::event::{Event, EventBus, WarnType};
use crate::state::GameState;

pub fn on_tick_rate_info(bus: &mut EventBus, tick_interval: f64) -> Result<(), ParseError> {
    if tick_interval <= 0.0 {
        return Err(ParseError::MalformedStream(format!("non-positive tick interval {tick_interval}")));
    }
    bus.dispatch(Event::TickRateInfoAvailable { tick_rate: 1.0 / tick_interval, tick_interval });
    Ok(())
}

pub fn on_con_vars_update(state: &mut GameState, bus: &mut EventBus, updates: HashMap<String, String>) {
    state.rules.con_vars.extend(updates);
    bus.dispatch(Event::ConVarsUpdated);
}

pub fn on_say_text(bus: &mut EventBus, text: String) {
    bus.dispatch(Event::SayText { text });
}

/// `CUserMessageSayText2`. Only `"#Cstrike_Chat_All"`/`"#Cstrike_Chat_*"`-style
/// names are treated as chat; anything else logs a tolerant warning and is
/// still forwarded as a raw `SayText2` for callers that want it.
pub fn on_say_text2(bus: &mut EventBus, message_name: String, params: Vec<String>) {
    if !message_name.starts_with("#Cstrike_Chat") {
        bus.dispatch(Event::ParserWarn {
            warn_type: WarnType::UnexpectedSayText2Name,
            detail: message_name.clone(),
        });
    } else if let Some(text) = params.last() {
        bus.dispatch(Event::ChatMessage { entity_id: None, text: text.clone() });
    }
    bus.dispatch(Event::SayText2 { message_name, params });
}

pub fn on_chat_message(bus: &mut EventBus, entity_id: Option<EntityId>, text: String) {
    bus.dispatch(Event::ChatMessage { entity_id, text });
}

/// Competitive rank update delivered out-of-band by steam id; the pawn may
/// not (yet) have a resolved player record.
pub fn on_rank_update(state: &mut GameState, bus: &mut EventBus, steam_id64: u64, rank: i32, wins: i32) {
    let entity_id = state
        .players_by_steam_id32
        .get(&crate::state::steam_id_to_32(steam_id64))
        .copied();

    match entity_id {
        Some(id) => {
            if let Some(p) = state.players_by_entity_id.get_mut(&id) {
                p.rank = rank;
                p.competitive_wins = wins;
            }
            bus.dispatch(Event::RankUpdate { steam_id64 });
        }
        None => bus.dispatch(Event::ParserWarn {
            warn_type: WarnType::RankUpdateUnknownSteamId,
            detail: steam_id64.to_string(),
        }),
    }
}

/// Voice/chat net-messages are occasionally delivered still encrypted when
/// the demo lacks (or mis-keys) the decryption key; tolerate and warn.
pub fn on_encrypted_message_undecryptable(bus: &mut EventBus, have_key: bool) {
    bus.dispatch(Event::ParserWarn {
        warn_type: if have_key {
            WarnType::UnreadableEncryptedNetMessage
        } else {
            WarnType::MissingDecryptionKey
        },
        detail: String::new(),
    });
}
