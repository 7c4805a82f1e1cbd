use std::sync::Arc;

use tracing::info;

mod config;
mod scheduler;

use shared::repositories::match_repository::DynamoDbMatchRepository;
use shared::repositories::notification_repository::WebSocketNotificationSink;
use shared::repositories::ticket_repository::DynamoDbTicketRepository;
use shared::services::match_service::MatchService;

use config::SchedulerConfig;
use scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let config = SchedulerConfig::from_env();
    info!(
        "Starting matchmaker: sweep every {:?} (batch {}), reap every {:?} (batch {})",
        config.sweep_interval, config.sweep_batch_size, config.reap_interval, config.reap_batch_size
    );

    let aws_config = aws_config::load_from_env().await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws_config);

    let ticket_repository = Arc::new(DynamoDbTicketRepository::new(dynamodb_client.clone()));
    let match_repository = Arc::new(DynamoDbMatchRepository::new(dynamodb_client.clone()));
    let notification_sink = Arc::new(WebSocketNotificationSink::new(dynamodb_client));

    let service = Arc::new(
        MatchService::new(ticket_repository, match_repository, notification_sink)
            .with_batch_sizes(config.sweep_batch_size, config.reap_batch_size),
    );

    let scheduler = Scheduler::new(service, config);
    let (_sweep_handle, _reap_handle) = scheduler.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down matchmaker");
    Ok(())
}
