use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ticket::{Ticket, TicketStatus};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketResponse {
    pub ticket_id: String,
    pub status: TicketStatus,
    pub bucket: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub match_id: Option<String>,
}

impl From<&Ticket> for TicketResponse {
    fn from(ticket: &Ticket) -> Self {
        TicketResponse {
            ticket_id: ticket.id.clone(),
            status: ticket.status,
            bucket: ticket.bucket.clone(),
            created_at: ticket.created_at,
            expires_at: ticket.expires_at,
            match_id: ticket.match_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::{LanguagePref, RolePrefs, SkillLevel, TicketCriteria};
    use crate::models::user::UserSnapshot;

    #[test]
    fn test_response_mirrors_ticket() {
        let ticket = Ticket::new(
            "user1",
            UserSnapshot::default(),
            TicketCriteria {
                game: "pubg".to_string(),
                region: "na".to_string(),
                game_mode: "squad".to_string(),
                skill_level: SkillLevel::Gold,
                preferred_roles: RolePrefs::none(),
                language: LanguagePref::Any,
                mic_required: false,
                max_wait_secs: 600,
            },
        );

        let response = TicketResponse::from(&ticket);
        assert_eq!(response.ticket_id, ticket.id);
        assert_eq!(response.status, TicketStatus::Active);
        assert_eq!(response.bucket, "pubg#na#squad");
        assert!(response.match_id.is_none());
    }
}
