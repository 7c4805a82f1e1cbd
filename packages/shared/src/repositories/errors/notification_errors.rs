#[derive(Debug)]
pub enum NotificationError {
    Serialization(String),
    DynamoDb(String),
    Delivery(String),
}

impl std::fmt::Display for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            NotificationError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
            NotificationError::Delivery(msg) => write!(f, "Delivery error: {}", msg),
        }
    }
}

impl std::error::Error for NotificationError {}
