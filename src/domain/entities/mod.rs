pub mod finance;
pub mod modal;
pub mod option;
pub mod session;
pub mod table;
