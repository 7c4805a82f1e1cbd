use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use shared::services::match_service::MatchService;

use crate::config::SchedulerConfig;

/// Drives the periodic pairing sweep and the expiration reaper. Each job
/// runs on its own ticker; a run that finds nothing to do is a normal
/// outcome.
pub struct Scheduler {
    service: Arc<MatchService>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(service: Arc<MatchService>, config: SchedulerConfig) -> Self {
        Scheduler { service, config }
    }

    /// Spawns the sweep and reap loops and returns their handles. The first
    /// tick of each loop fires immediately.
    pub fn start(&self) -> (JoinHandle<()>, JoinHandle<()>) {
        let sweep_handle = {
            let service = self.service.clone();
            let period = self.config.sweep_interval;
            tokio::spawn(async move {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    sweep_once(&service).await;
                }
            })
        };

        let reap_handle = {
            let service = self.service.clone();
            let period = self.config.reap_interval;
            tokio::spawn(async move {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    reap_once(&service).await;
                }
            })
        };

        (sweep_handle, reap_handle)
    }
}

pub async fn sweep_once(service: &MatchService) {
    match service.sweep_and_pair().await {
        Ok(summary) => {
            if summary.matches_created > 0 {
                info!(
                    "Sweep created {} matches from {} scanned tickets",
                    summary.matches_created, summary.scanned
                );
            }
        }
        Err(e) => error!("Sweep run failed: {}", e),
    }
}

pub async fn reap_once(service: &MatchService) {
    match service.reap_expired().await {
        Ok(0) => {}
        Ok(expired) => info!("Reaper expired {} tickets", expired),
        Err(e) => error!("Reaper run failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared::models::ticket::{
        LanguagePref, RolePrefs, SkillLevel, Ticket, TicketCriteria, TicketStatus,
    };
    use shared::models::user::UserSnapshot;
    use shared::repositories::memory::{InMemoryStore, RecordingNotificationSink};
    use shared::repositories::ticket_repository::TicketRepository;

    fn ticket(user_id: &str, minutes_ago: i64) -> Ticket {
        let mut ticket = Ticket::new(
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
        );
        ticket.created_at = Utc::now() - Duration::minutes(minutes_ago);
        ticket.expires_at = ticket.created_at + Duration::seconds(ticket.max_wait_secs);
        ticket
    }

    fn engine(store: &Arc<InMemoryStore>) -> Arc<MatchService> {
        Arc::new(MatchService::new(
            store.clone(),
            store.clone(),
            Arc::new(RecordingNotificationSink::new()),
        ))
    }

    #[tokio::test]
    async fn test_sweep_once_pairs_waiting_tickets() {
        let store = Arc::new(InMemoryStore::new());
        let service = engine(&store);

        store.put_ticket(&ticket("user1", 5)).await.unwrap();
        store.put_ticket(&ticket("user2", 4)).await.unwrap();

        sweep_once(&service).await;

        assert_eq!(store.match_count(), 1);
    }

    #[tokio::test]
    async fn test_reap_once_expires_overdue_tickets() {
        let store = Arc::new(InMemoryStore::new());
        let service = engine(&store);

        // Past its deadline for a while already.
        let overdue = ticket("user1", 30);
        store.put_ticket(&overdue).await.unwrap();

        reap_once(&service).await;

        assert_eq!(
            store.ticket(&overdue.id).unwrap().status,
            TicketStatus::Expired
        );
    }

    #[tokio::test]
    async fn test_scheduler_start_spawns_both_loops() {
        let store = Arc::new(InMemoryStore::new());
        let service = engine(&store);

        store.put_ticket(&ticket("user1", 5)).await.unwrap();
        store.put_ticket(&ticket("user2", 4)).await.unwrap();

        let scheduler = Scheduler::new(service, SchedulerConfig::default());
        let (sweep_handle, reap_handle) = scheduler.start();

        // The first tick fires immediately; give the tasks a moment to run.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert_eq!(store.match_count(), 1);

        sweep_handle.abort();
        reap_handle.abort();
    }
}
