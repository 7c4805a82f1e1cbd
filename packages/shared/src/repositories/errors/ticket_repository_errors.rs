#[derive(Debug)]
pub enum TicketRepositoryError {
    NotFound,
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for TicketRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketRepositoryError::NotFound => write!(f, "Ticket not found"),
            TicketRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            TicketRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for TicketRepositoryError {}
