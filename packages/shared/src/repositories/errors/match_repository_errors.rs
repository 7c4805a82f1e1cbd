#[derive(Debug)]
pub enum MatchRepositoryError {
    NotFound,
    Serialization(String),
    DynamoDb(String),
    TransactionError(String),
}

impl std::fmt::Display for MatchRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchRepositoryError::NotFound => write!(f, "Match not found"),
            MatchRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            MatchRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
            MatchRepositoryError::TransactionError(msg) => {
                write!(f, "Transaction error: {}", msg)
            }
        }
    }
}

impl std::error::Error for MatchRepositoryError {}
