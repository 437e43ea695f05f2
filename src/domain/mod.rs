pub mod category_groups;
pub mod entities;
pub mod format;
pub mod selector;
pub mod table_view;
