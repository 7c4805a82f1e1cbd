use serde::{Deserialize, Serialize};

use crate::models::game_match::Match;

/// Push payload announcing a committed match to one participant.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchFoundNotice {
    pub action: String,
    pub match_id: String,
    pub partner_id: String,
    pub partner_name: String,
    pub game: String,
    pub region: String,
    pub game_mode: String,
}

impl MatchFoundNotice {
    pub fn for_participant(game_match: &Match, recipient_id: &str) -> Self {
        let (partner_id, partner_name) = if recipient_id == game_match.user1_id {
            (
                game_match.user2_id.clone(),
                game_match.user2_snapshot.display_name.clone(),
            )
        } else {
            (
                game_match.user1_id.clone(),
                game_match.user1_snapshot.display_name.clone(),
            )
        };

        MatchFoundNotice {
            action: "match_found".to_string(),
            match_id: game_match.id.clone(),
            partner_id,
            partner_name,
            game: game_match.game.clone(),
            region: game_match.region.clone(),
            game_mode: game_match.game_mode.clone(),
        }
    }
}
