use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::models::ticket::{Ticket, TicketCriteria};
use crate::repositories::errors::profile_repository_errors::ProfileRepositoryError;
use crate::repositories::errors::ticket_repository_errors::TicketRepositoryError;
use crate::repositories::profile_repository::ProfileRepository;
use crate::repositories::ticket_repository::TicketRepository;
use crate::services::errors::ticket_service_errors::TicketServiceError;
use crate::services::match_service::MatchService;

/// Front door for ticket state: creation (with the one synchronous pairing
/// attempt) and cancellation. Everything else that mutates a ticket lives
/// behind the match service or the reaper.
pub struct TicketService {
    tickets: Arc<dyn TicketRepository>,
    profiles: Arc<dyn ProfileRepository>,
    match_service: Arc<MatchService>,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        profiles: Arc<dyn ProfileRepository>,
        match_service: Arc<MatchService>,
    ) -> Self {
        TicketService {
            tickets,
            profiles,
            match_service,
        }
    }

    /// Validates the criteria, snapshots the caller's profile, persists the
    /// ticket and runs one pairing attempt in its bucket. The ticket is
    /// returned to the caller whether or not the attempt matched; a match is
    /// announced by push notification.
    pub async fn create_ticket(
        &self,
        user_id: &str,
        criteria: TicketCriteria,
    ) -> Result<Ticket, TicketServiceError> {
        if user_id.is_empty() {
            return Err(TicketServiceError::InvalidCriteria(
                "user id cannot be empty".to_string(),
            ));
        }
        criteria
            .validate()
            .map_err(TicketServiceError::InvalidCriteria)?;

        let existing = self
            .tickets
            .find_active_for_user(user_id)
            .await
            .map_err(|e| TicketServiceError::RepositoryError(e.to_string()))?;
        if existing.is_some() {
            return Err(TicketServiceError::AlreadyActiveTicket);
        }

        let profile = self
            .profiles
            .get_profile(user_id)
            .await
            .map_err(|e| match e {
                ProfileRepositoryError::NotFound => {
                    TicketServiceError::ProfileLookup(format!("no profile for user {}", user_id))
                }
                _ => TicketServiceError::ProfileLookup(e.to_string()),
            })?;

        let ticket = Ticket::new(user_id, profile.into_snapshot(), criteria);
        self.tickets
            .put_ticket(&ticket)
            .await
            .map_err(|e| TicketServiceError::RepositoryError(e.to_string()))?;

        info!(
            "Created ticket {} for user {} in bucket {}",
            ticket.id, user_id, ticket.bucket
        );

        // One synchronous attempt; its outcome never changes what the
        // caller gets back.
        match self.match_service.match_new_ticket(&ticket).await {
            Ok(Some(game_match)) => {
                info!(
                    "Ticket {} matched immediately (match {})",
                    ticket.id, game_match.id
                );
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Immediate pairing attempt for ticket {} failed: {}", ticket.id, e);
            }
        }

        Ok(ticket)
    }

    pub async fn get_ticket(
        &self,
        ticket_id: &str,
        caller_id: &str,
    ) -> Result<Ticket, TicketServiceError> {
        let ticket = self.load_ticket(ticket_id).await?;
        if ticket.user_id != caller_id {
            return Err(TicketServiceError::NotOwner);
        }
        Ok(ticket)
    }

    /// Cancels the caller's active ticket. The status write is a
    /// compare-and-swap, so a cancel racing a concurrent match loses cleanly
    /// and reports `NotActive`.
    pub async fn cancel_ticket(
        &self,
        ticket_id: &str,
        caller_id: &str,
    ) -> Result<(), TicketServiceError> {
        let ticket = self.load_ticket(ticket_id).await?;
        if ticket.user_id != caller_id {
            return Err(TicketServiceError::NotOwner);
        }
        if !ticket.is_active() {
            return Err(TicketServiceError::NotActive);
        }

        let swapped = self
            .tickets
            .cancel_ticket(ticket_id, Utc::now())
            .await
            .map_err(|e| TicketServiceError::RepositoryError(e.to_string()))?;
        if !swapped {
            // Lost the race against a concurrent match or the reaper.
            return Err(TicketServiceError::NotActive);
        }

        info!("Cancelled ticket {} for user {}", ticket_id, caller_id);
        Ok(())
    }

    async fn load_ticket(&self, ticket_id: &str) -> Result<Ticket, TicketServiceError> {
        self.tickets.get_ticket(ticket_id).await.map_err(|e| match e {
            TicketRepositoryError::NotFound => TicketServiceError::NotFound,
            _ => TicketServiceError::RepositoryError(e.to_string()),
        })
    }
}
