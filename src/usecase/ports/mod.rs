pub mod api;
pub mod repo;
pub mod search;
