use indexmap::IndexMap;
use policy_grid_core::backend::{TableBackend, VisualRowIdx};
use policy_grid_core::host::HostEventQueue;
use policy_grid_core::{ColumnUid, DualFilter, FilterModel, RowUid};
use std::collections::HashMap;

#[derive(Default)]
pub(super) struct State {
    /// One filter per used column, in column order.
    pub(super) filters: IndexMap<ColumnUid, DualFilter>,
    /// Whether the draft differs from the applied model, refreshed on state change.
    pub(super) apply_enabled: HashMap<ColumnUid, bool>,
    /// Models loaded before the column's filter existed.
    pub(super) pending_models: HashMap<ColumnUid, FilterModel>,
    pub(super) events: HostEventQueue,
    /// Backend rows that passed every text filter.
    pub(super) visible_rows: Vec<RowUid>,
    pub(super) visible_rows_dirty: bool,
}

/// Rows of the backend's current set passing all client-side filters.
pub(super) fn filter_rows<'a>(
    backend: &impl TableBackend,
    filters: impl IntoIterator<Item = (&'a ColumnUid, &'a DualFilter)>,
) -> Vec<RowUid> {
    let active: Vec<_> = filters
        .into_iter()
        .filter(|(_, f)| f.is_filter_active())
        .collect();
    (0..backend.row_count())
        .filter_map(|idx| backend.row_uid(VisualRowIdx(idx)))
        .filter(|row_uid| {
            active
                .iter()
                .all(|(col_uid, f)| f.does_filter_pass(backend.get((*row_uid, *col_uid).into())))
        })
        .collect()
}
