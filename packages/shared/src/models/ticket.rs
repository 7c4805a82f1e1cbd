use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserSnapshot;

/// Shortest wait a ticket may ask for before it expires.
pub const MIN_WAIT_SECS: i64 = 30;
/// Longest wait a ticket may ask for before it expires.
pub const MAX_WAIT_SECS: i64 = 86_400;

/// Ranked tiers used for pairing. Two tickets may only pair when their
/// tiers are at most one step apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Crown,
    Ace,
    Conqueror,
}

impl SkillLevel {
    /// Position on the 8-point ladder, bronze = 1 .. conqueror = 8.
    pub fn ordinal(&self) -> u8 {
        match self {
            SkillLevel::Bronze => 1,
            SkillLevel::Silver => 2,
            SkillLevel::Gold => 3,
            SkillLevel::Platinum => 4,
            SkillLevel::Diamond => 5,
            SkillLevel::Crown => 6,
            SkillLevel::Ace => 7,
            SkillLevel::Conqueror => 8,
        }
    }

    pub fn within_one_tier(&self, other: &SkillLevel) -> bool {
        (self.ordinal() as i16 - other.ordinal() as i16).abs() <= 1
    }
}

/// Voice/chat language preference. `Any` pairs with every language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguagePref {
    Any,
    Specific(String),
}

impl LanguagePref {
    pub fn matches(&self, other: &LanguagePref) -> bool {
        match (self, other) {
            (LanguagePref::Any, _) | (_, LanguagePref::Any) => true,
            (LanguagePref::Specific(a), LanguagePref::Specific(b)) => a == b,
        }
    }
}

/// Preferred in-game roles. The empty set means no preference and `Any` is
/// the explicit wildcard. Two specific sets pair only when they share no
/// role tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RolePrefs {
    Any,
    Roles(BTreeSet<String>),
}

impl RolePrefs {
    pub fn none() -> Self {
        RolePrefs::Roles(BTreeSet::new())
    }

    pub fn of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RolePrefs::Roles(roles.into_iter().map(Into::into).collect())
    }

    pub fn compatible_with(&self, other: &RolePrefs) -> bool {
        match (self, other) {
            (RolePrefs::Any, _) | (_, RolePrefs::Any) => true,
            (RolePrefs::Roles(a), RolePrefs::Roles(b)) => {
                a.is_empty() || b.is_empty() || a.is_disjoint(b)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Matched,
    Cancelled,
    Expired,
}

impl TicketStatus {
    /// Every status except `Active` is terminal; no transition leaves it.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TicketStatus::Active)
    }
}

/// What a player asks for when opening a ticket. Becomes a `Ticket` once
/// validated and stamped with a profile snapshot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketCriteria {
    pub game: String,
    pub region: String,
    pub game_mode: String,
    pub skill_level: SkillLevel,
    pub preferred_roles: RolePrefs,
    pub language: LanguagePref,
    pub mic_required: bool,
    pub max_wait_secs: i64,
}

impl TicketCriteria {
    pub fn validate(&self) -> Result<(), String> {
        if self.game.trim().is_empty() {
            return Err("game cannot be empty".to_string());
        }
        if self.region.trim().is_empty() {
            return Err("region cannot be empty".to_string());
        }
        if self.game_mode.trim().is_empty() {
            return Err("game_mode cannot be empty".to_string());
        }
        if !(MIN_WAIT_SECS..=MAX_WAIT_SECS).contains(&self.max_wait_secs) {
            return Err(format!(
                "max_wait_secs must be between {} and {}",
                MIN_WAIT_SECS, MAX_WAIT_SECS
            ));
        }
        if let RolePrefs::Roles(roles) = &self.preferred_roles {
            if roles.iter().any(|role| role.trim().is_empty()) {
                return Err("preferred role tags cannot be empty".to_string());
            }
        }
        if let LanguagePref::Specific(tag) = &self.language {
            if tag.trim().is_empty() {
                return Err("language tag cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

/// A single user's open request to be paired with a compatible partner.
/// Persisted as one DynamoDB item, with the composite bucket key as the
/// grouping attribute. Example bucket: "pubg#na#squad".
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ticket {
    pub id: String,
    pub user_id: String,
    pub user_snapshot: UserSnapshot,
    pub game: String,
    pub region: String,
    pub game_mode: String,
    pub bucket: String,
    pub skill_level: SkillLevel,
    pub preferred_roles: RolePrefs,
    pub language: LanguagePref,
    pub mic_required: bool,
    pub max_wait_secs: i64,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub match_id: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn new(user_id: &str, snapshot: UserSnapshot, criteria: TicketCriteria) -> Self {
        let created_at = Utc::now();
        let bucket = bucket_key(&criteria.game, &criteria.region, &criteria.game_mode);

        Ticket {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            user_snapshot: snapshot,
            bucket,
            expires_at: created_at + Duration::seconds(criteria.max_wait_secs),
            game: criteria.game,
            region: criteria.region,
            game_mode: criteria.game_mode,
            skill_level: criteria.skill_level,
            preferred_roles: criteria.preferred_roles,
            language: criteria.language,
            mic_required: criteria.mic_required,
            max_wait_secs: criteria.max_wait_secs,
            status: TicketStatus::Active,
            created_at,
            match_id: None,
            cancelled_at: None,
            expired_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TicketStatus::Active
    }
}

/// Composite grouping key, e.g. "pubg#na#squad".
pub fn bucket_key(game: &str, region: &str, game_mode: &str) -> String {
    format!("{}#{}#{}", game, region, game_mode)
}
