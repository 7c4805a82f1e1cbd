pub mod match_service_errors;
pub mod ticket_service_errors;
