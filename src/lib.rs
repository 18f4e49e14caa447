pub mod access;
pub mod bidding;
pub mod database;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod query;
