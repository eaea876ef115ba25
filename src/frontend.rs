use egui::{Id, Ui};
use egui_extras::Column as TableColumnConfig;
use policy_grid_core::{CellCoord, ColumnUid};

pub trait TableFrontend {
    fn show_cell_view(&self, coord: CellCoord, ui: &mut Ui, id: Id);

    /// Returns the rendering configuration for the column.
    fn column_render_config(&mut self, col_uid: ColumnUid) -> TableColumnConfig {
        let _ = col_uid;
        TableColumnConfig::auto().resizable(true)
    }

    /// Show tooltip on cell hover
    fn cell_tooltip(&self, _coord: CellCoord) -> Option<&str> {
        None
    }
}
