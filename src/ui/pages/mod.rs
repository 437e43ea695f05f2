pub mod audit_log;
pub mod categories;
pub mod category_admin;
pub mod expenses;
pub mod incomes;
pub mod login;
pub mod users;
