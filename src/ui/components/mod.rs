pub mod category_selector;
pub mod data_table;
pub mod modal;
pub mod search_select;
pub mod toast;
