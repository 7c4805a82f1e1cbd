pub mod game_match;
pub mod notice;
pub mod requests;
pub mod responses;
pub mod ticket;
pub mod user;
