use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use shared::repositories::match_repository::DynamoDbMatchRepository;
use shared::repositories::notification_repository::WebSocketNotificationSink;
use shared::repositories::profile_repository::DynamoDbProfileRepository;
use shared::repositories::ticket_repository::DynamoDbTicketRepository;
use shared::services::match_service::MatchService;
use shared::services::ticket_service::TicketService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    // Set up services
    let config = aws_config::load_from_env().await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&config);

    let ticket_repository = Arc::new(DynamoDbTicketRepository::new(dynamodb_client.clone()));
    let match_repository = Arc::new(DynamoDbMatchRepository::new(dynamodb_client.clone()));
    let profile_repository = Arc::new(DynamoDbProfileRepository::new(dynamodb_client.clone()));
    let notification_sink = Arc::new(WebSocketNotificationSink::new(dynamodb_client));

    let match_service = Arc::new(MatchService::new(
        ticket_repository.clone(),
        match_repository,
        notification_sink,
    ));
    let ticket_service = Arc::new(TicketService::new(
        ticket_repository,
        profile_repository,
        match_service,
    ));

    let jwt_secret =
        std::env::var("JWT_SECRET").expect("JWT_SECRET environment variable must be set");

    let app_state = state::AppState {
        ticket_service,
        jwt_secret: Arc::new(jwt_secret),
    };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Merge routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(routes::tickets::routes())
        .layer(cors)
        .with_state(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Matchmaking API listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
