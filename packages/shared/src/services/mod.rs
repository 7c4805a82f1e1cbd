pub mod errors;
pub mod match_service;
pub mod ticket_service;
