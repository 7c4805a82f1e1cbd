use std::sync::Arc;

use shared::services::ticket_service::TicketService;

#[derive(Clone)]
pub struct AppState {
    pub ticket_service: Arc<TicketService>,
    pub jwt_secret: Arc<String>,
}
