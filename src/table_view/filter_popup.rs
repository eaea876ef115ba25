use egui::{Button, ComboBox, Id, SelectableLabel, TextEdit, Ui, Widget};
use policy_grid_core::{DualFilter, FilterAction, FilterKind, TextCondition};
use std::time::Instant;
use strum::IntoEnumIterator;

/// Filter editor shown in the column header menu. Returns the action taken, if any.
pub(super) fn show_filter_popup(
    filter: &mut DualFilter,
    apply_enabled: bool,
    value_search: bool,
    ui: &mut Ui,
    id: Id,
) -> Option<FilterAction> {
    let Some(draft) = filter.gui().cloned() else {
        ui.weak("Filter unavailable");
        return None;
    };
    let now = Instant::now();
    ui.set_min_width(220.0);

    ui.horizontal(|ui| {
        for kind in FilterKind::iter() {
            let enabled = kind == FilterKind::Text || value_search;
            let resp = ui
                .add_enabled(
                    enabled,
                    SelectableLabel::new(draft.mode == kind, kind.to_string()),
                )
                .on_disabled_hover_text("Server side search is not available for this column");
            if resp.clicked() {
                filter.set_mode(kind);
            }
        }
    });
    ui.separator();

    match draft.mode {
        FilterKind::Text => {
            ComboBox::from_id_salt(id.with("_policy_grid_condition"))
                .selected_text(draft.condition.to_string())
                .width(200.0)
                .show_ui(ui, |ui| {
                    for condition in TextCondition::iter() {
                        if ui
                            .selectable_label(draft.condition == condition, condition.to_string())
                            .clicked()
                        {
                            filter.set_condition(condition);
                        }
                    }
                });
            if draft.condition.needs_value() {
                let mut text = draft.text;
                if TextEdit::singleline(&mut text)
                    .hint_text("Filter…")
                    .desired_width(200.0)
                    .ui(ui)
                    .changed()
                {
                    filter.edit_text(text, now);
                }
            }
        }
        FilterKind::Values => {
            let mut values_text = draft.values_text;
            if TextEdit::multiline(&mut values_text)
                .hint_text("One value per line")
                .desired_rows(5)
                .desired_width(200.0)
                .ui(ui)
                .changed()
            {
                filter.edit_values(values_text, now);
            }
        }
    }

    ui.separator();
    let mut action = None;
    ui.horizontal(|ui| {
        if ui.add_enabled(apply_enabled, Button::new("Apply")).clicked() {
            action = Some(FilterAction::Apply);
        }
        if ui.button("Reset").clicked() {
            action = Some(FilterAction::Reset);
        }
    });
    if let Some(action) = action {
        filter.on_action(action);
    }
    action
}
