mod config;
mod filter_popup;
mod state;

pub use config::TableViewConfig;

use crate::frontend::TableFrontend;
use egui::{Label, Response, RichText, ScrollArea, Ui, Widget};
use itertools::Itertools;
use log::{debug, trace};
use policy_grid_core::backend::{OneShotFlags, TableBackend};
use policy_grid_core::host::{HostEvent, QueuedHost};
use policy_grid_core::{CellCoord, ColumnUid, DualFilter, FilterModel, RowUid};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tap::Tap;

pub struct TableView {
    state: state::State,
    config: TableViewConfig,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

impl TableView {
    pub fn new() -> Self {
        TableView {
            state: state::State::default(),
            config: TableViewConfig::default(),
        }
    }

    pub fn with_config(config: TableViewConfig) -> Self {
        TableView {
            state: state::State::default(),
            config,
        }
    }

    /// Rows currently shown, in display order.
    pub fn visible_rows(&self) -> &[RowUid] {
        &self.state.visible_rows
    }

    pub fn filter(&self, col_uid: ColumnUid) -> Option<&DualFilter> {
        self.state.filters.get(&col_uid)
    }

    pub fn filter_mut(&mut self, col_uid: ColumnUid) -> Option<&mut DualFilter> {
        self.state.filters.get_mut(&col_uid)
    }

    pub fn is_apply_enabled(&self, col_uid: ColumnUid) -> bool {
        self.state
            .apply_enabled
            .get(&col_uid)
            .copied()
            .unwrap_or(false)
    }

    /// Applied filter models of all columns, for persisting grid state.
    pub fn save_filters(&self) -> BTreeMap<ColumnUid, FilterModel> {
        self.state
            .filters
            .iter()
            .filter_map(|(col_uid, f)| f.model().map(|m| (*col_uid, m.clone())))
            .collect()
    }

    /// Replace all filters with previously saved models. Value lists are sent to the backend
    /// right away.
    pub fn load_filters(
        &mut self,
        backend: &mut impl TableBackend,
        models: impl IntoIterator<Item = (ColumnUid, FilterModel)>,
    ) {
        self.clear_filters(backend);
        for (col_uid, model) in models {
            if let FilterModel::Values(v) = &model {
                if backend.supports_value_search(col_uid) {
                    backend.apply_value_search(col_uid, &v.values);
                }
            }
            match self.state.filters.get_mut(&col_uid) {
                Some(filter) => filter.set_model(Some(model)),
                None => {
                    self.state.pending_models.insert(col_uid, model);
                }
            }
        }
        self.state.visible_rows_dirty = true;
    }

    /// Drop every applied filter, including server side value searches.
    pub fn clear_filters(&mut self, backend: &mut impl TableBackend) {
        for (col_uid, filter) in self.state.filters.iter_mut() {
            if let Some(FilterModel::Values(_)) = filter.model() {
                backend.apply_value_search(*col_uid, &[]);
            }
            filter.set_model(None);
            self.state.apply_enabled.insert(*col_uid, false);
        }
        for (col_uid, model) in self.state.pending_models.drain() {
            if let FilterModel::Values(_) = model {
                backend.apply_value_search(col_uid, &[]);
            }
        }
        self.state.visible_rows_dirty = true;
    }

    /// Everything a frame does besides painting: debounce timers, filter callbacks, backend
    /// polling and client-side filtering.
    pub fn sync(&mut self, backend: &mut impl TableBackend, now: Instant) {
        for filter in self.state.filters.values_mut() {
            filter.poll(now);
        }
        self.dispatch_filter_events(backend);

        backend.poll(now);
        let flags = *backend.one_shot_flags();
        *backend.one_shot_flags_mut() = OneShotFlags::default();

        if flags.columns_reset || flags.first_pass || self.state.filters.is_empty() {
            self.sync_columns(backend);
        }
        if flags.row_set_updated || flags.cleared {
            self.state.visible_rows_dirty = true;
        }
        if self.state.visible_rows_dirty {
            self.state.visible_rows = state::filter_rows(&*backend, self.state.filters.iter());
            self.state.visible_rows_dirty = false;
            trace!("{} rows visible", self.state.visible_rows.len());
        }
    }

    /// Create filters for newly used columns and destroy the ones of columns that went away,
    /// together with their server side value searches.
    fn sync_columns(&mut self, backend: &mut impl TableBackend) {
        let used: Vec<ColumnUid> = backend.used_columns().collect();
        let used_set: HashSet<ColumnUid> = used.iter().copied().collect();

        let removed = self
            .state
            .filters
            .keys()
            .filter(|col_uid| !used_set.contains(col_uid))
            .copied()
            .collect_vec();
        for col_uid in removed {
            if let Some(mut filter) = self.state.filters.shift_remove(&col_uid) {
                debug!("dropping filter of column {}", col_uid.0);
                if let Some(FilterModel::Values(_)) = filter.model() {
                    backend.apply_value_search(col_uid, &[]);
                }
                filter.destroy();
                self.state.visible_rows_dirty = true;
            }
            self.state.apply_enabled.remove(&col_uid);
        }

        for col_uid in used {
            if self.state.filters.contains_key(&col_uid) {
                continue;
            }
            let host = QueuedHost::new(
                col_uid,
                self.state.events.clone(),
                backend.supports_value_search(col_uid),
            );
            let mut filter = DualFilter::new(self.config.filter.clone());
            filter.init(Box::new(host));
            if let Some(model) = self.state.pending_models.remove(&col_uid) {
                filter.set_model(Some(model));
                self.state.visible_rows_dirty = true;
            }
            self.state.filters.insert(col_uid, filter);
        }
    }

    fn dispatch_filter_events(&mut self, backend: &mut impl TableBackend) {
        let events = self.state.events.borrow_mut().drain(..).collect_vec();
        for (col_uid, event) in events {
            debug!("column {}: {event:?}", col_uid.0);
            match event {
                HostEvent::ModelChanged(_) | HostEvent::StateChanged => {
                    let enabled = self
                        .state
                        .filters
                        .get(&col_uid)
                        .is_some_and(DualFilter::has_pending_changes);
                    self.state.apply_enabled.insert(col_uid, enabled);
                }
                HostEvent::FilterChanged => {
                    self.state.visible_rows_dirty = true;
                }
                HostEvent::ValueSearch(values) => {
                    backend.apply_value_search(col_uid, &values);
                }
            }
        }
    }

    pub fn show<T: TableBackend + TableFrontend>(
        &mut self,
        backend: &mut T,
        ui: &mut Ui,
    ) -> Response {
        let ctx = ui.ctx().clone();
        let ui_id = ui.id();
        self.sync(backend, Instant::now());

        let used: Vec<ColumnUid> = backend.used_columns().collect();
        let show_filters = self.config.show_filters;
        let row_height = self.config.minimum_row_height;
        let state::State {
            filters,
            apply_enabled,
            visible_rows,
            ..
        } = &mut self.state;

        let resp = ScrollArea::horizontal()
            .drag_to_scroll(false)
            .show(ui, |ui| {
                let mut builder = egui_extras::TableBuilder::new(ui);
                for col_uid in &used {
                    builder = builder.column(backend.column_render_config(*col_uid));
                }
                builder
                    .striped(true)
                    .resizable(true)
                    .max_scroll_height(f32::MAX)
                    .header(20.0, |mut h| {
                        for col_uid in &used {
                            let Some(column) = backend.column_info(*col_uid) else {
                                continue;
                            };
                            let value_search = backend.supports_value_search(*col_uid);
                            h.col(|ui| {
                                ui.horizontal(|ui| {
                                    Label::new(RichText::new(column.name.as_str()).strong())
                                        .selectable(false)
                                        .ui(ui);
                                    if !show_filters {
                                        return;
                                    }
                                    let Some(filter) = filters.get_mut(col_uid) else {
                                        return;
                                    };
                                    let icon = if filter.is_filter_active() {
                                        RichText::new("🔎").color(ui.visuals().selection.bg_fill)
                                    } else {
                                        RichText::new("🔎").weak()
                                    };
                                    let enabled =
                                        apply_enabled.get(col_uid).copied().unwrap_or(false);
                                    let menu = ui.menu_button(icon, |ui| {
                                        let action = filter_popup::show_filter_popup(
                                            filter,
                                            enabled,
                                            value_search,
                                            ui,
                                            ui_id.with(col_uid.0),
                                        );
                                        if action.is_some() {
                                            ui.close_menu();
                                        }
                                    });
                                    if let Some(FilterModel::Values(v)) = filter.model() {
                                        menu.response.on_hover_text(format!(
                                            "In: {}",
                                            v.values.iter().join(", ")
                                        ));
                                    }
                                });
                            });
                        }
                    })
                    .tap_mut(|table| {
                        table.ui_mut().separator();
                    })
                    .body(|body| {
                        body.rows(row_height, visible_rows.len(), |mut row| {
                            let Some(row_uid) = visible_rows.get(row.index()).copied() else {
                                return;
                            };
                            for col_uid in &used {
                                let coord = CellCoord {
                                    row_uid,
                                    col_uid: *col_uid,
                                };
                                row.col(|ui| {
                                    let id = ui_id.with((row_uid.0, col_uid.0));
                                    backend.show_cell_view(coord, ui, id);
                                    if let Some(tooltip) = backend.cell_tooltip(coord) {
                                        if ui.ui_contains_pointer() {
                                            egui::popup::show_tooltip_text(
                                                ui.ctx(),
                                                ui.layer_id(),
                                                ui_id.with("_policy_grid_cell_tooltip"),
                                                tooltip,
                                            );
                                        }
                                    }
                                });
                            }
                        });
                    });
            })
            .inner_rect;

        if !self.state.events.borrow().is_empty() {
            ctx.request_repaint();
        }
        let next_deadline = self
            .state
            .filters
            .values()
            .filter_map(DualFilter::next_deadline)
            .min();
        if let Some(deadline) = next_deadline {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
        if backend.persistent_flags().search_in_flight {
            ctx.request_repaint();
        }
        ui.interact(resp, ui_id.with("_policy_grid_table"), egui::Sense::hover())
    }
}
