use crate::frontend::TableFrontend;
use egui::{Id, Ui};
use indexmap::IndexMap;
use log::{debug, trace};
use policy_grid_core::backend::{
    BackendColumn, OneShotFlags, PersistentFlags, TableBackend, VisualRowIdx,
};
use policy_grid_core::{CellCoord, ColumnUid, RowUid};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Exact-match search payload: field name to accepted values, e.g.
/// `{"src_ips":["10.0.0.1"],"services":["ssh","https"]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueQuery {
    pub fields: IndexMap<String, Vec<String>>,
}

impl ValueQuery {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// In-memory table of text cells. Holds the whole dataset like a server would, and only exposes
/// the rows matching the current value query.
pub struct StringBackend {
    cell_data: HashMap<CellCoord, String>,
    columns: IndexMap<ColumnUid, BackendColumn>,
    all_rows: Vec<RowUid>,
    row_order: Vec<RowUid>,
    next_row_uid: RowUid,
    query: IndexMap<ColumnUid, Vec<String>>,
    latency: Duration,
    search_requested: bool,
    search_due: Option<Instant>,
    persistent_flags: PersistentFlags,
    one_shot_flags: OneShotFlags,
}

impl StringBackend {
    /// Columns as (header name, query field name). All of them are value searchable.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = (S, S)>) -> Self {
        StringBackend {
            cell_data: Default::default(),
            columns: columns
                .into_iter()
                .enumerate()
                .map(|(idx, (name, field))| {
                    let backend_column = BackendColumn {
                        name: name.into(),
                        field: field.into(),
                        is_value_searchable: true,
                        is_used: true,
                    };
                    (ColumnUid(idx as u32), backend_column)
                })
                .collect(),
            all_rows: vec![],
            row_order: vec![],
            next_row_uid: RowUid(0),
            query: IndexMap::new(),
            latency: Duration::ZERO,
            search_requested: false,
            search_due: None,
            persistent_flags: PersistentFlags::default(),
            one_shot_flags: OneShotFlags {
                first_pass: true,
                columns_reset: true,
                row_set_updated: true,
                ..Default::default()
            },
        }
    }

    /// Delay value searches by `latency`, counted from the first [TableBackend::poll] after the
    /// request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_value_searchable(&mut self, col_uid: ColumnUid, searchable: bool) {
        if let Some(column) = self.columns.get_mut(&col_uid) {
            column.is_value_searchable = searchable;
        }
    }

    pub fn set_column_used(&mut self, col_uid: ColumnUid, is_used: bool) {
        if let Some(column) = self.columns.get_mut(&col_uid) {
            if column.is_used != is_used {
                column.is_used = is_used;
                self.one_shot_flags.columns_reset = true;
            }
        }
    }

    /// Append a row, cells given in column order, `None` leaves the cell empty.
    pub fn insert_row<S: Into<String>>(
        &mut self,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> RowUid {
        let row_uid = self.next_row_uid;
        for (col_uid, value) in self.columns.keys().zip(values) {
            if let Some(value) = value {
                self.cell_data.insert((row_uid, col_uid).into(), value.into());
            }
        }
        self.all_rows.push(row_uid);
        if self.row_matches_query(row_uid) {
            self.row_order.push(row_uid);
            self.one_shot_flags.row_set_updated = true;
        }
        self.next_row_uid = RowUid(row_uid.0 + 1);
        row_uid
    }

    /// Current server side query, keyed by field name.
    pub fn value_query(&self) -> ValueQuery {
        ValueQuery {
            fields: self
                .query
                .iter()
                .filter_map(|(col_uid, values)| {
                    let column = self.columns.get(col_uid)?;
                    Some((column.field.clone(), values.clone()))
                })
                .collect(),
        }
    }

    fn row_matches_query(&self, row_uid: RowUid) -> bool {
        self.query.iter().all(|(col_uid, values)| {
            let coord: CellCoord = (row_uid, col_uid).into();
            self.cell_data
                .get(&coord)
                .is_some_and(|cell| values.contains(cell))
        })
    }

    fn run_search(&mut self) {
        self.row_order = self
            .all_rows
            .iter()
            .copied()
            .filter(|row_uid| self.row_matches_query(*row_uid))
            .collect();
        self.search_requested = false;
        self.search_due = None;
        self.persistent_flags.search_in_flight = false;
        self.one_shot_flags.row_set_updated = true;
        debug!(
            "value search done: {} of {} rows",
            self.row_order.len(),
            self.all_rows.len()
        );
    }
}

impl TableBackend for StringBackend {
    fn clear(&mut self) {
        self.cell_data.clear();
        self.all_rows.clear();
        self.row_order.clear();
        self.one_shot_flags.row_set_updated = true;
        self.one_shot_flags.cleared = true;
        self.next_row_uid = RowUid(0);
    }

    fn persistent_flags(&self) -> &PersistentFlags {
        &self.persistent_flags
    }

    fn one_shot_flags(&self) -> &OneShotFlags {
        &self.one_shot_flags
    }

    fn one_shot_flags_mut(&mut self) -> &mut OneShotFlags {
        &mut self.one_shot_flags
    }

    fn poll(&mut self, now: Instant) {
        if !self.search_requested {
            return;
        }
        let due = *self.search_due.get_or_insert(now + self.latency);
        if now >= due {
            self.run_search();
        }
    }

    fn available_columns(&self) -> impl Iterator<Item = ColumnUid> {
        self.columns.keys().copied()
    }

    fn used_columns(&self) -> impl Iterator<Item = ColumnUid> {
        self.columns
            .iter()
            .filter(|(_, c)| c.is_used)
            .map(|(col_uid, _)| *col_uid)
    }

    fn column_info(&self, col_uid: ColumnUid) -> Option<&BackendColumn> {
        self.columns.get(&col_uid)
    }

    fn row_count(&self) -> usize {
        self.row_order.len()
    }

    fn row_uid(&self, row_idx: VisualRowIdx) -> Option<RowUid> {
        self.row_order.get(row_idx.0).copied()
    }

    fn get(&self, coord: CellCoord) -> Option<&str> {
        self.cell_data.get(&coord).map(String::as_str)
    }

    fn apply_value_search(&mut self, col_uid: ColumnUid, values: &[String]) {
        if values.is_empty() {
            self.query.shift_remove(&col_uid);
        } else {
            self.query.insert(col_uid, values.to_vec());
        }
        trace!("value query: {:?}", self.value_query());
        if self.latency.is_zero() {
            self.run_search();
        } else {
            // a newer query restarts the countdown
            self.persistent_flags.search_in_flight = true;
            self.search_requested = true;
            self.search_due = None;
        }
    }
}

impl TableFrontend for StringBackend {
    fn show_cell_view(&self, coord: CellCoord, ui: &mut Ui, _id: Id) {
        let Some(value) = self.cell_data.get(&coord) else {
            return;
        };
        ui.label(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policies() -> StringBackend {
        let mut backend = StringBackend::new([
            ("Rule", "rule_name"),
            ("Source", "src_ips"),
            ("Service", "services"),
        ]);
        backend.insert_row([Some("allow-web"), Some("10.0.0.1"), Some("https")]);
        backend.insert_row([Some("allow-ssh"), Some("10.0.0.2"), Some("ssh")]);
        backend.insert_row([Some("deny-all"), None, Some("any")]);
        backend
    }

    fn visible(backend: &StringBackend) -> Vec<RowUid> {
        (0..backend.row_count())
            .filter_map(|idx| backend.row_uid(VisualRowIdx(idx)))
            .collect()
    }

    #[test]
    fn insert_and_read_cells() {
        let backend = policies();
        assert_eq!(backend.row_count(), 3);
        assert_eq!(
            backend.get((RowUid(1), ColumnUid(2)).into()),
            Some("ssh")
        );
        assert_eq!(backend.get((RowUid(2), ColumnUid(1)).into()), None);
        assert!(backend.supports_value_search(ColumnUid(0)));
    }

    #[test]
    fn value_search_is_exact_membership() {
        let mut backend = policies();
        backend.one_shot_flags_mut().row_set_updated = false;

        backend.apply_value_search(ColumnUid(2), &["ssh".into(), "https".into()]);
        assert_eq!(visible(&backend), vec![RowUid(0), RowUid(1)]);
        assert!(backend.one_shot_flags().row_set_updated);

        // exact, not substring
        backend.apply_value_search(ColumnUid(0), &["allow".into()]);
        assert_eq!(backend.row_count(), 0);

        backend.apply_value_search(ColumnUid(0), &["allow-ssh".into()]);
        assert_eq!(visible(&backend), vec![RowUid(1)]);
        assert_eq!(
            serde_json::to_string(&backend.value_query()).unwrap(),
            r#"{"services":["ssh","https"],"rule_name":["allow-ssh"]}"#
        );

        backend.apply_value_search(ColumnUid(2), &[]);
        backend.apply_value_search(ColumnUid(0), &[]);
        assert_eq!(backend.row_count(), 3);
        assert!(backend.value_query().is_empty());
    }

    #[test]
    fn delayed_search_resolves_on_poll() {
        let start = Instant::now();
        let mut backend = policies().with_latency(Duration::from_millis(20));
        backend.poll(start);
        backend.apply_value_search(ColumnUid(1), &["10.0.0.2".into()]);
        assert!(backend.persistent_flags().search_in_flight);
        assert_eq!(backend.row_count(), 3);

        backend.poll(start + Duration::from_millis(5));
        backend.poll(start + Duration::from_millis(24));
        assert!(backend.persistent_flags().search_in_flight);
        assert_eq!(backend.row_count(), 3);

        backend.poll(start + Duration::from_millis(25));
        assert!(!backend.persistent_flags().search_in_flight);
        assert_eq!(visible(&backend), vec![RowUid(1)]);

        // a second query before the first resolves restarts the countdown
        backend.apply_value_search(ColumnUid(1), &["10.0.0.1".into()]);
        backend.poll(start + Duration::from_millis(30));
        backend.apply_value_search(ColumnUid(1), &[]);
        backend.poll(start + Duration::from_millis(40));
        assert_eq!(visible(&backend), vec![RowUid(1)]);
        backend.poll(start + Duration::from_millis(60));
        assert_eq!(backend.row_count(), 3);
    }

    #[test]
    fn rows_inserted_during_query_respect_it() {
        let mut backend = policies();
        backend.apply_value_search(ColumnUid(2), &["ssh".into()]);
        backend.insert_row([Some("allow-ssh-2"), Some("10.0.0.9"), Some("ssh")]);
        backend.insert_row([Some("allow-dns"), Some("10.0.0.9"), Some("dns")]);
        assert_eq!(visible(&backend), vec![RowUid(1), RowUid(3)]);
    }

    #[test]
    fn hidden_columns_are_not_used() {
        let mut backend = policies();
        backend.one_shot_flags_mut().columns_reset = false;
        backend.set_column_used(ColumnUid(1), false);
        assert_eq!(
            backend.used_columns().collect::<Vec<_>>(),
            vec![ColumnUid(0), ColumnUid(2)]
        );
        assert_eq!(backend.available_columns().count(), 3);
        assert!(backend.one_shot_flags().columns_reset);
    }
}
