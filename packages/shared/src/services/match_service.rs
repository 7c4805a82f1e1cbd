use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::matching::bucket::{bucket_tickets, find_pairs};
use crate::matching::compatibility::compatible;
use crate::models::game_match::Match;
use crate::models::notice::MatchFoundNotice;
use crate::models::ticket::Ticket;
use crate::repositories::errors::ticket_repository_errors::TicketRepositoryError;
use crate::repositories::match_repository::MatchRepository;
use crate::repositories::notification_repository::NotificationSink;
use crate::repositories::ticket_repository::TicketRepository;
use crate::services::errors::match_service_errors::MatchServiceError;

const DEFAULT_SWEEP_BATCH: usize = 100;
const DEFAULT_REAP_BATCH: usize = 100;

/// Outcome counters for one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub scanned: usize,
    pub pairs_attempted: usize,
    pub matches_created: usize,
}

/// The pairing engine: one immediate attempt on ticket creation, a periodic
/// sweep over the active pool, and the expiration reaper. Holds no state
/// between invocations; every racy write goes through the store's
/// compare-and-swap primitives.
pub struct MatchService {
    tickets: Arc<dyn TicketRepository>,
    matches: Arc<dyn MatchRepository>,
    notifier: Arc<dyn NotificationSink>,
    sweep_batch: usize,
    reap_batch: usize,
}

impl MatchService {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        matches: Arc<dyn MatchRepository>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        MatchService {
            tickets,
            matches,
            notifier,
            sweep_batch: DEFAULT_SWEEP_BATCH,
            reap_batch: DEFAULT_REAP_BATCH,
        }
    }

    pub fn with_batch_sizes(mut self, sweep_batch: usize, reap_batch: usize) -> Self {
        self.sweep_batch = sweep_batch;
        self.reap_batch = reap_batch;
        self
    }

    /// The match transaction. Re-reads both tickets fresh, verifies they are
    /// still active and still compatible, then commits the pair atomically.
    /// Every abort path returns `Ok(None)`: losing a race is a normal
    /// outcome, retried by the next sweep, never an error.
    pub async fn try_match(
        &self,
        first_id: &str,
        second_id: &str,
    ) -> Result<Option<Match>, MatchServiceError> {
        if first_id == second_id {
            return Ok(None);
        }

        let first = match self.tickets.get_ticket(first_id).await {
            Ok(ticket) => ticket,
            Err(TicketRepositoryError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let second = match self.tickets.get_ticket(second_id).await {
            Ok(ticket) => ticket,
            Err(TicketRepositoryError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !first.is_active() || !second.is_active() {
            return Ok(None);
        }
        if !compatible(&first, &second) {
            return Ok(None);
        }

        let game_match = Match::new(&first, &second);
        if !self.matches.commit_match(&game_match).await? {
            debug!(
                "Commit for tickets {} and {} lost the race, skipping",
                first_id, second_id
            );
            return Ok(None);
        }

        info!(
            "Matched {} with {} in bucket {} (match {})",
            first.user_id, second.user_id, first.bucket, game_match.id
        );
        self.notify_participants(&game_match).await;
        Ok(Some(game_match))
    }

    /// One pairing attempt for a freshly created ticket, scoped to its
    /// bucket: the first compatible candidate gets a single transaction
    /// attempt, then control returns to the caller either way.
    pub async fn match_new_ticket(
        &self,
        ticket: &Ticket,
    ) -> Result<Option<Match>, MatchServiceError> {
        let pool = self
            .tickets
            .list_active_in_bucket(&ticket.bucket, Utc::now())
            .await?;

        let candidate = pool
            .iter()
            .find(|other| other.id != ticket.id && compatible(ticket, other));

        match candidate {
            Some(other) => self.try_match(&ticket.id, &other.id).await,
            None => Ok(None),
        }
    }

    /// One sweep over the active pool: fetch a bounded oldest-first batch,
    /// bucket it, pair greedily, attempt every pair. Finding nothing is a
    /// normal outcome.
    pub async fn sweep_and_pair(&self) -> Result<SweepSummary, MatchServiceError> {
        let batch = self.tickets.list_active(Utc::now(), self.sweep_batch).await?;
        let mut summary = SweepSummary {
            scanned: batch.len(),
            ..Default::default()
        };

        for (bucket, group) in bucket_tickets(&batch) {
            if group.len() < 2 {
                continue;
            }
            debug!("Sweeping bucket {} with {} tickets", bucket, group.len());
            for (first, second) in find_pairs(&group) {
                summary.pairs_attempted += 1;
                if self.try_match(&first.id, &second.id).await?.is_some() {
                    summary.matches_created += 1;
                }
            }
        }

        info!(
            "Sweep scanned {} tickets, attempted {} pairs, created {} matches",
            summary.scanned, summary.pairs_attempted, summary.matches_created
        );
        Ok(summary)
    }

    /// Closes active tickets whose deadline has passed. A ticket that got
    /// matched between the fetch and the write is skipped by the
    /// compare-and-swap.
    pub async fn reap_expired(&self) -> Result<usize, MatchServiceError> {
        let now = Utc::now();
        let due = self.tickets.list_expired(now, self.reap_batch).await?;
        let mut expired = 0;

        for ticket in &due {
            if self.tickets.expire_ticket(&ticket.id, now).await? {
                expired += 1;
            } else {
                debug!("Ticket {} left the active state before expiry", ticket.id);
            }
        }

        if expired > 0 {
            info!("Expired {} stale tickets", expired);
        }
        Ok(expired)
    }

    async fn notify_participants(&self, game_match: &Match) {
        for user_id in [&game_match.user1_id, &game_match.user2_id] {
            let notice = MatchFoundNotice::for_participant(game_match, user_id);
            if let Err(e) = self.notifier.enqueue(user_id, &notice).await {
                warn!(
                    "Failed to notify player {} of match {}: {}",
                    user_id, game_match.id, e
                );
            }
        }
    }
}
