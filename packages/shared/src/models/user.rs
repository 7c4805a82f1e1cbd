use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-game record counters carried in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct GameStats {
    pub matches_played: u32,
    pub wins: u32,
}

/// Profile fields as returned by the read-only profile lookup.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub per_game_stats: HashMap<String, GameStats>,
}

/// Denormalized profile copy owned by a ticket. Captured once at ticket
/// creation and never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct UserSnapshot {
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub per_game_stats: HashMap<String, GameStats>,
}

impl UserProfile {
    pub fn into_snapshot(self) -> UserSnapshot {
        UserSnapshot {
            username: self.username,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            per_game_stats: self.per_game_stats,
        }
    }
}
