use serde::{Deserialize, Serialize};

use crate::models::ticket::TicketCriteria;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateTicketRequest {
    #[serde(flatten)]
    pub criteria: TicketCriteria,
}
