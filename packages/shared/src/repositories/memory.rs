//! In-memory store used as the repository fake in unit tests and local
//! development. The verify-then-write discipline the DynamoDB transaction
//! enforces server-side happens here under a single lock.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::game_match::Match;
use crate::models::notice::MatchFoundNotice;
use crate::models::ticket::{Ticket, TicketStatus};
use crate::repositories::errors::match_repository_errors::MatchRepositoryError;
use crate::repositories::errors::notification_errors::NotificationError;
use crate::repositories::errors::ticket_repository_errors::TicketRepositoryError;
use crate::repositories::match_repository::MatchRepository;
use crate::repositories::notification_repository::NotificationSink;
use crate::repositories::ticket_repository::TicketRepository;

#[derive(Default)]
struct StoreInner {
    tickets: HashMap<String, Ticket>,
    matches: HashMap<String, Match>,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self, ticket_id: &str) -> Option<Ticket> {
        self.lock().tickets.get(ticket_id).cloned()
    }

    pub fn match_count(&self) -> usize {
        self.lock().matches.len()
    }

    pub fn matches(&self) -> Vec<Match> {
        self.lock().matches.values().cloned().collect()
    }

    /// How many match records reference the given ticket.
    pub fn matches_referencing(&self, ticket_id: &str) -> usize {
        self.lock()
            .matches
            .values()
            .filter(|m| m.ticket1_id == ticket_id || m.ticket2_id == ticket_id)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("store lock poisoned")
    }

    fn sorted_by_creation(mut tickets: Vec<Ticket>) -> Vec<Ticket> {
        tickets.sort_by_key(|t| t.created_at);
        tickets
    }
}

#[async_trait]
impl TicketRepository for InMemoryStore {
    async fn put_ticket(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        self.lock().tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, TicketRepositoryError> {
        self.lock()
            .tickets
            .get(ticket_id)
            .cloned()
            .ok_or(TicketRepositoryError::NotFound)
    }

    async fn find_active_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        Ok(self
            .lock()
            .tickets
            .values()
            .find(|t| t.user_id == user_id && t.is_active())
            .cloned())
    }

    async fn list_active(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let active: Vec<Ticket> = self
            .lock()
            .tickets
            .values()
            .filter(|t| t.is_active() && t.expires_at > now)
            .cloned()
            .collect();
        let mut sorted = Self::sorted_by_creation(active);
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn list_active_in_bucket(
        &self,
        bucket: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let active: Vec<Ticket> = self
            .lock()
            .tickets
            .values()
            .filter(|t| t.bucket == bucket && t.is_active() && t.expires_at > now)
            .cloned()
            .collect();
        Ok(Self::sorted_by_creation(active))
    }

    async fn list_expired(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let due: Vec<Ticket> = self
            .lock()
            .tickets
            .values()
            .filter(|t| t.is_active() && t.expires_at <= now)
            .cloned()
            .collect();
        let mut sorted = Self::sorted_by_creation(due);
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn cancel_ticket(
        &self,
        ticket_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TicketRepositoryError> {
        let mut inner = self.lock();
        match inner.tickets.get_mut(ticket_id) {
            Some(ticket) if ticket.is_active() => {
                ticket.status = TicketStatus::Cancelled;
                ticket.cancelled_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn expire_ticket(
        &self,
        ticket_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TicketRepositoryError> {
        let mut inner = self.lock();
        match inner.tickets.get_mut(ticket_id) {
            Some(ticket) if ticket.is_active() => {
                ticket.status = TicketStatus::Expired;
                ticket.expired_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl MatchRepository for InMemoryStore {
    async fn get_match(&self, match_id: &str) -> Result<Match, MatchRepositoryError> {
        self.lock()
            .matches
            .get(match_id)
            .cloned()
            .ok_or(MatchRepositoryError::NotFound)
    }

    async fn commit_match(&self, game_match: &Match) -> Result<bool, MatchRepositoryError> {
        let mut inner = self.lock();

        let both_active = inner
            .tickets
            .get(&game_match.ticket1_id)
            .map(Ticket::is_active)
            .unwrap_or(false)
            && inner
                .tickets
                .get(&game_match.ticket2_id)
                .map(Ticket::is_active)
                .unwrap_or(false);
        if !both_active {
            return Ok(false);
        }

        for ticket_id in [&game_match.ticket1_id, &game_match.ticket2_id] {
            let ticket = inner
                .tickets
                .get_mut(ticket_id)
                .expect("ticket checked above");
            ticket.status = TicketStatus::Matched;
            ticket.match_id = Some(game_match.id.clone());
        }
        inner
            .matches
            .insert(game_match.id.clone(), game_match.clone());
        Ok(true)
    }
}

/// Captures notices instead of delivering them, so tests can assert on the
/// fan-out per committed match.
#[derive(Default)]
pub struct RecordingNotificationSink {
    sent: Mutex<Vec<(String, MatchFoundNotice)>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, MatchFoundNotice)> {
        self.sent.lock().expect("sink lock poisoned").clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn enqueue(
        &self,
        recipient_id: &str,
        notice: &MatchFoundNotice,
    ) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("sink lock poisoned")
            .push((recipient_id.to_string(), notice.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::{LanguagePref, RolePrefs, SkillLevel, TicketCriteria};
    use crate::models::user::UserSnapshot;
    use chrono::Duration;

    fn ticket(user_id: &str) -> Ticket {
        Ticket::new(
            user_id,
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
        )
    }

    #[tokio::test]
    async fn test_get_ticket_round_trip() {
        let store = InMemoryStore::new();
        let t = ticket("user1");
        store.put_ticket(&t).await.unwrap();

        let loaded = store.get_ticket(&t.id).await.unwrap();
        assert_eq!(loaded.user_id, "user1");

        let missing = store.get_ticket("nope").await;
        assert!(matches!(missing, Err(TicketRepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_active_for_user_ignores_terminal_tickets() {
        let store = InMemoryStore::new();
        let mut cancelled = ticket("user1");
        cancelled.status = TicketStatus::Cancelled;
        store.put_ticket(&cancelled).await.unwrap();

        assert!(store.find_active_for_user("user1").await.unwrap().is_none());

        let active = ticket("user1");
        store.put_ticket(&active).await.unwrap();
        let found = store.find_active_for_user("user1").await.unwrap().unwrap();
        assert_eq!(found.id, active.id);
    }

    #[tokio::test]
    async fn test_list_active_sorts_oldest_first_and_caps() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        for (i, user) in ["user1", "user2", "user3"].iter().enumerate() {
            let mut t = ticket(user);
            t.created_at = now - Duration::minutes(10 - i as i64);
            t.expires_at = now + Duration::minutes(10);
            store.put_ticket(&t).await.unwrap();
        }

        let listed = store.list_active(now, 2).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].user_id, "user1");
        assert_eq!(listed[1].user_id, "user2");
    }

    #[tokio::test]
    async fn test_list_active_excludes_past_deadline_tickets() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let mut due = ticket("user1");
        due.expires_at = now - Duration::seconds(1);
        store.put_ticket(&due).await.unwrap();

        assert!(store.list_active(now, 10).await.unwrap().is_empty());
        assert_eq!(store.list_expired(now, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_is_cas_on_active() {
        let store = InMemoryStore::new();
        let t = ticket("user1");
        store.put_ticket(&t).await.unwrap();

        assert!(store.cancel_ticket(&t.id, Utc::now()).await.unwrap());
        let cancelled = store.ticket(&t.id).unwrap();
        assert_eq!(cancelled.status, TicketStatus::Cancelled);
        assert!(cancelled.cancelled_at.is_some());

        // Second attempt observes the terminal state and does not write.
        assert!(!store.cancel_ticket(&t.id, Utc::now()).await.unwrap());
        assert!(!store.expire_ticket(&t.id, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_commit_match_flips_both_tickets() {
        let store = InMemoryStore::new();
        let first = ticket("user1");
        let second = ticket("user2");
        store.put_ticket(&first).await.unwrap();
        store.put_ticket(&second).await.unwrap();

        let game_match = Match::new(&first, &second);
        assert!(store.commit_match(&game_match).await.unwrap());

        for id in [&first.id, &second.id] {
            let t = store.ticket(id).unwrap();
            assert_eq!(t.status, TicketStatus::Matched);
            assert_eq!(t.match_id.as_deref(), Some(game_match.id.as_str()));
        }
        assert_eq!(store.match_count(), 1);
        assert!(store.get_match(&game_match.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_commit_match_aborts_when_either_side_is_not_active() {
        let store = InMemoryStore::new();
        let first = ticket("user1");
        let second = ticket("user2");
        store.put_ticket(&first).await.unwrap();
        store.put_ticket(&second).await.unwrap();
        store.cancel_ticket(&second.id, Utc::now()).await.unwrap();

        let game_match = Match::new(&first, &second);
        assert!(!store.commit_match(&game_match).await.unwrap());

        // Nothing was written: the first ticket is untouched and no match
        // record exists.
        assert_eq!(store.ticket(&first.id).unwrap().status, TicketStatus::Active);
        assert_eq!(store.match_count(), 0);
    }

    #[tokio::test]
    async fn test_recording_sink_captures_notices() {
        let sink = RecordingNotificationSink::new();
        let first = ticket("user1");
        let second = ticket("user2");
        let game_match = Match::new(&first, &second);
        let notice = MatchFoundNotice::for_participant(&game_match, "user1");

        sink.enqueue("user1", &notice).await.unwrap();

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "user1");
        assert_eq!(sent[0].1.partner_id, "user2");
    }
}
