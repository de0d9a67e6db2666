//! Shared presentational pieces for admin screens.

pub mod data_table;
pub mod layout;

pub use data_table::{DataTableConfig, FilterOption, Pagination, TableColumn, TableFilter};
pub use layout::{AdminUserView, PageContext};
