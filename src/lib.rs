pub mod backends;
pub mod frontend;
pub mod table_view;
pub mod util;

pub use policy_grid_core;
pub use table_view::TableView;
