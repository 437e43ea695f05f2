pub mod category_service;
pub mod error;
pub mod export_service;
pub mod ledger_service;
pub mod search_service;
pub mod session_service;
