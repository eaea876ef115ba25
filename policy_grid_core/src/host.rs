use crate::ColumnUid;
use crate::filter::FilterModel;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Callbacks a grid hands to each column filter.
pub trait FilterHost {
    /// Applied model was replaced (None after reset).
    fn on_model_change(&mut self, model: Option<&FilterModel>);
    /// Draft changed, host may re-evaluate whether "Apply" should be enabled.
    fn on_state_change(&mut self);
    /// Client-side rows must be filtered again.
    fn on_filter_changed(&mut self);
    /// Forward a list of values to the server. Returns false if the host has no server-side
    /// search, the filter then falls back to [FilterHost::on_filter_changed].
    fn apply_value_search(&mut self, values: &[String]) -> bool {
        let _ = values;
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    ModelChanged(Option<FilterModel>),
    StateChanged,
    FilterChanged,
    ValueSearch(Vec<String>),
}

pub type HostEventQueue = Rc<RefCell<VecDeque<(ColumnUid, HostEvent)>>>;

/// Host that records callbacks into a queue shared by all columns of one grid, drained once per
/// frame.
pub struct QueuedHost {
    col_uid: ColumnUid,
    queue: HostEventQueue,
    value_search: bool,
}

impl QueuedHost {
    pub fn new(col_uid: ColumnUid, queue: HostEventQueue, value_search: bool) -> Self {
        QueuedHost {
            col_uid,
            queue,
            value_search,
        }
    }

    fn push(&self, event: HostEvent) {
        self.queue.borrow_mut().push_back((self.col_uid, event));
    }
}

impl FilterHost for QueuedHost {
    fn on_model_change(&mut self, model: Option<&FilterModel>) {
        self.push(HostEvent::ModelChanged(model.cloned()));
    }

    fn on_state_change(&mut self) {
        self.push(HostEvent::StateChanged);
    }

    fn on_filter_changed(&mut self) {
        self.push(HostEvent::FilterChanged);
    }

    fn apply_value_search(&mut self, values: &[String]) -> bool {
        if !self.value_search {
            return false;
        }
        self.push(HostEvent::ValueSearch(values.to_vec()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_host_tags_events_with_column() {
        let queue = HostEventQueue::default();
        let mut a = QueuedHost::new(ColumnUid(0), queue.clone(), true);
        let mut b = QueuedHost::new(ColumnUid(1), queue.clone(), false);

        a.on_filter_changed();
        assert!(a.apply_value_search(&["ssh".to_string()]));
        assert!(!b.apply_value_search(&["ssh".to_string()]));
        b.on_model_change(None);

        let events: Vec<_> = queue.borrow_mut().drain(..).collect();
        assert_eq!(
            events,
            vec![
                (ColumnUid(0), HostEvent::FilterChanged),
                (ColumnUid(0), HostEvent::ValueSearch(vec!["ssh".to_string()])),
                (ColumnUid(1), HostEvent::ModelChanged(None)),
            ]
        );
    }
}
