use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ticket::{LanguagePref, SkillLevel, Ticket};
use crate::models::user::UserSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Matched,
    Scheduled,
    Completed,
    Disputed,
}

/// A durable pairing of exactly two tickets. Created once by the match
/// transaction; only the result-reporting flow mutates it afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Match {
    pub id: String,
    pub ticket1_id: String,
    pub ticket2_id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub user1_snapshot: UserSnapshot,
    pub user2_snapshot: UserSnapshot,
    pub game: String,
    pub region: String,
    pub game_mode: String,
    pub user1_skill: SkillLevel,
    pub user2_skill: SkillLevel,
    pub language: LanguagePref,
    pub status: MatchStatus,
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn new(first: &Ticket, second: &Ticket) -> Self {
        Match {
            id: Uuid::new_v4().to_string(),
            ticket1_id: first.id.clone(),
            ticket2_id: second.id.clone(),
            user1_id: first.user_id.clone(),
            user2_id: second.user_id.clone(),
            user1_snapshot: first.user_snapshot.clone(),
            user2_snapshot: second.user_snapshot.clone(),
            game: first.game.clone(),
            region: first.region.clone(),
            game_mode: first.game_mode.clone(),
            user1_skill: first.skill_level,
            user2_skill: second.skill_level,
            language: shared_language(first, second),
            status: MatchStatus::Matched,
            result: None,
            created_at: Utc::now(),
        }
    }
}

/// The concrete tag when either side named one; `Any` only when both sides
/// were wildcards. The compatibility predicate guarantees two specific tags
/// agree.
fn shared_language(first: &Ticket, second: &Ticket) -> LanguagePref {
    match (&first.language, &second.language) {
        (LanguagePref::Specific(tag), _) => LanguagePref::Specific(tag.clone()),
        (_, LanguagePref::Specific(tag)) => LanguagePref::Specific(tag.clone()),
        (LanguagePref::Any, LanguagePref::Any) => LanguagePref::Any,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::{RolePrefs, TicketCriteria};
    use crate::models::user::UserSnapshot;

    fn ticket(user_id: &str, skill: SkillLevel, language: LanguagePref) -> Ticket {
        Ticket::new(
            user_id,
            UserSnapshot {
                username: user_id.to_string(),
                display_name: user_id.to_uppercase(),
                avatar_url: None,
                per_game_stats: Default::default(),
            },
            TicketCriteria {
                game: "pubg".to_string(),
                region: "na".to_string(),
                game_mode: "squad".to_string(),
                skill_level: skill,
                preferred_roles: RolePrefs::none(),
                language,
                mic_required: false,
                max_wait_secs: 600,
            },
        )
    }

    #[test]
    fn test_new_match_records_both_sides() {
        let first = ticket("user1", SkillLevel::Gold, LanguagePref::Specific("en".into()));
        let second = ticket(
            "user2",
            SkillLevel::Platinum,
            LanguagePref::Specific("en".into()),
        );

        let game_match = Match::new(&first, &second);

        assert!(!game_match.id.is_empty());
        assert_eq!(game_match.ticket1_id, first.id);
        assert_eq!(game_match.ticket2_id, second.id);
        assert_eq!(game_match.user1_id, "user1");
        assert_eq!(game_match.user2_id, "user2");
        assert_eq!(game_match.user1_skill, SkillLevel::Gold);
        assert_eq!(game_match.user2_skill, SkillLevel::Platinum);
        assert_eq!(game_match.status, MatchStatus::Matched);
        assert!(game_match.result.is_none());
    }

    #[test]
    fn test_match_language_prefers_the_named_tag() {
        let named = ticket("user1", SkillLevel::Gold, LanguagePref::Specific("de".into()));
        let wildcard = ticket("user2", SkillLevel::Gold, LanguagePref::Any);

        let game_match = Match::new(&wildcard, &named);
        assert_eq!(game_match.language, LanguagePref::Specific("de".to_string()));

        let both_wild = Match::new(
            &ticket("user3", SkillLevel::Gold, LanguagePref::Any),
            &ticket("user4", SkillLevel::Gold, LanguagePref::Any),
        );
        assert_eq!(both_wild.language, LanguagePref::Any);
    }

    #[test]
    fn test_match_ids_are_unique() {
        let first = ticket("user1", SkillLevel::Gold, LanguagePref::Any);
        let second = ticket("user2", SkillLevel::Gold, LanguagePref::Any);

        let a = Match::new(&first, &second);
        let b = Match::new(&first, &second);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_match_serialization_round_trip() {
        let first = ticket("user1", SkillLevel::Gold, LanguagePref::Specific("en".into()));
        let second = ticket("user2", SkillLevel::Gold, LanguagePref::Any);
        let game_match = Match::new(&first, &second);

        let serialized = serde_json::to_string(&game_match).unwrap();
        let deserialized: Match = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.id, game_match.id);
        assert_eq!(deserialized.user1_id, game_match.user1_id);
        assert_eq!(deserialized.language, game_match.language);
        assert_eq!(deserialized.status, MatchStatus::Matched);
    }
}
