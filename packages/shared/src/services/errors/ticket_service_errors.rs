#[derive(Debug)]
pub enum TicketServiceError {
    NotFound,
    NotOwner,
    NotActive,
    AlreadyActiveTicket,
    InvalidCriteria(String),
    ProfileLookup(String),
    RepositoryError(String),
}

impl std::fmt::Display for TicketServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketServiceError::NotFound => write!(f, "Ticket not found"),
            TicketServiceError::NotOwner => write!(f, "Ticket belongs to another user"),
            TicketServiceError::NotActive => write!(f, "Ticket is no longer active"),
            TicketServiceError::AlreadyActiveTicket => {
                write!(f, "User already has an active ticket")
            }
            TicketServiceError::InvalidCriteria(msg) => write!(f, "Invalid criteria: {}", msg),
            TicketServiceError::ProfileLookup(msg) => {
                write!(f, "Profile lookup failed: {}", msg)
            }
            TicketServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for TicketServiceError {}
