use policy_grid_core::dual_filter::FilterConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableViewConfig {
    /// Row height will not be lower that this value.
    pub minimum_row_height: f32,
    /// Show the filter button next to each column name.
    pub show_filters: bool,
    /// Settings for every column filter created by this view.
    pub filter: FilterConfig,
}

impl Default for TableViewConfig {
    fn default() -> Self {
        TableViewConfig {
            minimum_row_height: 18.0,
            show_filters: true,
            filter: FilterConfig::default(),
        }
    }
}

impl super::TableView {
    pub fn config_mut(&mut self) -> &mut TableViewConfig {
        &mut self.config
    }
}
