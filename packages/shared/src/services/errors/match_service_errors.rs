use crate::repositories::errors::match_repository_errors::MatchRepositoryError;
use crate::repositories::errors::ticket_repository_errors::TicketRepositoryError;

#[derive(Debug)]
pub enum MatchServiceError {
    RepositoryError(String),
}

impl std::fmt::Display for MatchServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for MatchServiceError {}

impl From<TicketRepositoryError> for MatchServiceError {
    fn from(error: TicketRepositoryError) -> Self {
        MatchServiceError::RepositoryError(error.to_string())
    }
}

impl From<MatchRepositoryError> for MatchServiceError {
    fn from(error: MatchRepositoryError) -> Self {
        MatchServiceError::RepositoryError(error.to_string())
    }
}
