pub mod match_repository_errors;
pub mod notification_errors;
pub mod profile_repository_errors;
pub mod ticket_repository_errors;
