pub mod client;
pub mod search;
