use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::requests::CreateTicketRequest;
use shared::models::responses::TicketResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/matchmaking/tickets", post(create_ticket))
        .route("/matchmaking/tickets/{ticket_id}", get(get_ticket))
        .route("/matchmaking/tickets/{ticket_id}/cancel", post(cancel_ticket))
}

async fn create_ticket(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let ticket = state
        .ticket_service
        .create_ticket(&authenticated_user.user_id, payload.criteria)
        .await?;
    Ok((StatusCode::CREATED, Json(TicketResponse::from(&ticket))))
}

async fn get_ticket(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state
        .ticket_service
        .get_ticket(&ticket_id, &authenticated_user.user_id)
        .await?;
    Ok(Json(TicketResponse::from(&ticket)))
}

async fn cancel_ticket(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(ticket_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .ticket_service
        .cancel_ticket(&ticket_id, &authenticated_user.user_id)
        .await?;
    Ok(StatusCode::OK)
}
