use crate::debounce::{DEFAULT_DEBOUNCE, Debounce};
use crate::filter::{FilterKind, FilterModel, TextCondition, TextFilterModel, ValuesFilterModel};
use crate::host::FilterHost;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Delay between the last keystroke and the state change notification.
    pub debounce: Duration,
    /// Characters splitting the values textarea, in addition to new lines. Empty by default so
    /// that values containing them survive [DualFilter::set_model].
    pub value_separators: Vec<char>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            debounce: DEFAULT_DEBOUNCE,
            value_separators: vec![],
        }
    }
}

/// What the filter popup currently shows, not yet applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterDraft {
    pub mode: FilterKind,
    pub condition: TextCondition,
    pub text: String,
    pub values_text: String,
}

impl FilterDraft {
    fn from_model(model: Option<&FilterModel>) -> Self {
        match model {
            None => FilterDraft::default(),
            Some(FilterModel::Text(t)) => FilterDraft {
                mode: FilterKind::Text,
                condition: t.condition,
                text: t.value.clone(),
                values_text: String::new(),
            },
            Some(FilterModel::Values(v)) => FilterDraft {
                mode: FilterKind::Values,
                values_text: v.values.join("\n"),
                ..FilterDraft::default()
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterAction {
    Apply,
    Reset,
}

/// Column filter switchable between a client-side text condition and a server-side value list.
///
/// The host grid drives it: [DualFilter::init] with its callbacks, [DualFilter::poll] every
/// frame, [DualFilter::does_filter_pass] for each loaded row and [DualFilter::destroy] when the
/// column goes away.
pub struct DualFilter {
    config: FilterConfig,
    applied: Option<FilterModel>,
    draft: Option<FilterDraft>,
    host: Option<Box<dyn FilterHost>>,
    debounce: Debounce,
    destroyed: bool,
}

impl DualFilter {
    pub fn new(config: FilterConfig) -> Self {
        let debounce = Debounce::new(config.debounce);
        DualFilter {
            config,
            applied: None,
            draft: None,
            host: None,
            debounce,
            destroyed: false,
        }
    }

    pub fn init(&mut self, host: Box<dyn FilterHost>) {
        if self.destroyed {
            warn!("init called on a destroyed filter, ignoring");
            return;
        }
        self.draft = Some(FilterDraft::from_model(self.applied.as_ref()));
        self.host = Some(host);
    }

    pub fn gui(&self) -> Option<&FilterDraft> {
        self.draft.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_filter_active(&self) -> bool {
        self.applied.as_ref().is_some_and(FilterModel::is_active)
    }

    /// Client-side predicate. Value lists are resolved by the server, so rows always pass them.
    pub fn does_filter_pass(&self, cell: Option<&str>) -> bool {
        match &self.applied {
            Some(FilterModel::Text(t)) => t.passes(cell),
            Some(FilterModel::Values(_)) | None => true,
        }
    }

    pub fn model(&self) -> Option<&FilterModel> {
        self.applied.as_ref()
    }

    /// Candidate model built from the popup widgets, without applying it.
    pub fn model_from_ui(&self) -> Option<FilterModel> {
        let draft = self.draft.as_ref()?;
        let model = match draft.mode {
            FilterKind::Text => {
                FilterModel::Text(TextFilterModel::new(draft.condition, draft.text.as_str()))
            }
            FilterKind::Values => FilterModel::Values(ValuesFilterModel::parse(
                &draft.values_text,
                &self.config.value_separators,
            )),
        };
        Some(model)
    }

    /// Whether applying the popup now would change what filters the rows. Inactive models on
    /// either side count as no filter.
    pub fn has_pending_changes(&self) -> bool {
        let candidate = self.model_from_ui().filter(FilterModel::is_active);
        let applied = self.applied.as_ref().filter(|m| m.is_active());
        candidate.as_ref() != applied
    }

    /// Replace the applied model from outside, e.g. restoring saved grid state. Host callbacks
    /// are not invoked.
    pub fn set_model(&mut self, model: Option<FilterModel>) {
        trace!("set_model: {model:?}");
        self.debounce.cancel();
        if let Some(draft) = &mut self.draft {
            *draft = FilterDraft::from_model(model.as_ref());
        }
        self.applied = model;
    }

    pub fn on_action(&mut self, action: FilterAction) {
        if self.draft.is_none() {
            warn!("{action:?} on a filter without gui, ignoring");
            return;
        }
        self.debounce.cancel();
        match action {
            FilterAction::Apply => {
                let Some(model) = self.model_from_ui() else {
                    return;
                };
                trace!("apply: {model:?}");
                self.applied = Some(model);
                if let (Some(host), Some(model)) = (&mut self.host, &self.applied) {
                    host.on_model_change(Some(model));
                    match model {
                        FilterModel::Text(_) => host.on_filter_changed(),
                        FilterModel::Values(v) => refilter_values(&mut **host, &v.values),
                    }
                }
            }
            FilterAction::Reset => {
                let previous_kind = self.applied.take().map(|m| m.kind());
                trace!("reset, was {previous_kind:?}");
                self.draft = Some(FilterDraft::default());
                if let Some(host) = &mut self.host {
                    host.on_model_change(None);
                    match previous_kind {
                        Some(FilterKind::Values) => refilter_values(&mut **host, &[]),
                        Some(FilterKind::Text) | None => host.on_filter_changed(),
                    }
                }
            }
        }
    }

    pub fn set_mode(&mut self, mode: FilterKind) {
        let Some(draft) = &mut self.draft else {
            return;
        };
        if draft.mode != mode {
            draft.mode = mode;
            self.notify_state_change();
        }
    }

    pub fn set_condition(&mut self, condition: TextCondition) {
        let Some(draft) = &mut self.draft else {
            return;
        };
        if draft.condition != condition {
            draft.condition = condition;
            self.notify_state_change();
        }
    }

    pub fn edit_text(&mut self, text: impl Into<String>, now: Instant) {
        if let Some(draft) = &mut self.draft {
            draft.text = text.into();
            self.debounce.touch(now);
        }
    }

    pub fn edit_values(&mut self, raw: impl Into<String>, now: Instant) {
        if let Some(draft) = &mut self.draft {
            draft.values_text = raw.into();
            self.debounce.touch(now);
        }
    }

    /// Deliver a debounced state change. Call from the frame loop.
    pub fn poll(&mut self, now: Instant) {
        if self.debounce.fire(now) {
            self.notify_state_change();
        }
    }

    /// When the next [DualFilter::poll] has work to do, used to schedule a repaint.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        trace!("destroy");
        self.debounce.cancel();
        self.draft = None;
        self.host = None;
        self.destroyed = true;
    }

    fn notify_state_change(&mut self) {
        if let Some(host) = &mut self.host {
            host.on_state_change();
        }
    }
}

impl Default for DualFilter {
    fn default() -> Self {
        DualFilter::new(FilterConfig::default())
    }
}

fn refilter_values(host: &mut dyn FilterHost, values: &[String]) {
    if !host.apply_value_search(values) {
        host.on_filter_changed();
    }
}
