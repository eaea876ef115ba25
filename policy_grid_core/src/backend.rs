use crate::{CellCoord, ColumnUid, RowUid};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VisualRowIdx(pub usize);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendColumn {
    /// Header text
    pub name: String,
    /// Name of the field in server queries, e.g. `src_ips`
    pub field: String,
    /// Whether the column can be filtered by a list of values on the server
    pub is_value_searchable: bool,
    pub is_used: bool,
}

pub trait TableBackend {
    /// Clear all row data from memory, but leave the columns' info.
    fn clear(&mut self);

    fn persistent_flags(&self) -> &PersistentFlags;
    /// Flags raised since the last TableView::sync, which consumes and resets them.
    fn one_shot_flags(&self) -> &OneShotFlags;
    fn one_shot_flags_mut(&mut self) -> &mut OneShotFlags;

    /// Process requests, talk to backend, etc.
    /// Must be called periodically, for example each frame.
    /// Should not block or take too long on each run. `now` is the frame time, so delayed work
    /// can be driven deterministically.
    fn poll(&mut self, now: Instant) {
        let _ = now;
    }

    /// Returns all available columns.
    fn available_columns(&self) -> impl Iterator<Item = ColumnUid>;
    /// Returns actually used columns, in display order.
    fn used_columns(&self) -> impl Iterator<Item = ColumnUid>;
    fn column_info(&self, col_uid: ColumnUid) -> Option<&BackendColumn>;

    /// Returns row count, with server side filters applied.
    fn row_count(&self) -> usize;
    /// Map index from [0..row_count) range to unique row id.
    fn row_uid(&self, row_idx: VisualRowIdx) -> Option<RowUid>;

    /// Cell text, None if the cell holds no value.
    fn get(&self, coord: CellCoord) -> Option<&str>;

    /// Whether [TableBackend::apply_value_search] is implemented for this column.
    fn supports_value_search(&self, col_uid: ColumnUid) -> bool {
        self.column_info(col_uid)
            .is_some_and(|c| c.is_value_searchable)
    }

    /// Replace the server side exact-match query for one column, an empty list removes it.
    /// Repopulated rows are announced through [OneShotFlags::row_set_updated].
    fn apply_value_search(&mut self, col_uid: ColumnUid, values: &[String]) {
        let (_, _) = (col_uid, values);
    }
}

#[derive(Default)]
pub struct PersistentFlags {
    /// True while a value search is in flight
    pub search_in_flight: bool,
}

/// One shot flags: all flags are reset to false by TableView::sync
#[derive(Default, Copy, Clone)]
pub struct OneShotFlags {
    /// Set once data backend is created
    pub first_pass: bool,
    /// Set once column names and fields were loaded
    pub columns_reset: bool,
    /// Set once after row uid set was loaded or changed, including after a value search
    pub row_set_updated: bool,
    /// Set once when clear() is called.
    pub cleared: bool,
}
