pub mod errors;
pub mod match_repository;
pub mod memory;
pub mod notification_repository;
pub mod profile_repository;
pub mod ticket_repository;
