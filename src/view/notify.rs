use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::item::ModelIndex;

/// A change announced by a view.
///
/// Structural changes come as bracketed pairs (about-to / done) with
/// inclusive row ranges. Observers see the state before the change during
/// the about-to half and the state after it during the done half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    AboutToReset,
    Reset,
    RowsAboutToBeInserted {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    RowsInserted {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    RowsAboutToBeRemoved {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    RowsRemoved {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    /// One cell changed; the column is the index's column
    DataChanged { index: ModelIndex },
    /// Rows may have moved; any held index must be looked up again
    LayoutChanged,
}

/// Receives model events. Every method defaults to doing nothing.
pub trait ModelObserver {
    fn on_about_to_reset(&mut self) {}

    fn on_reset(&mut self) {}

    fn on_rows_about_to_be_inserted(&mut self, _parent: &ModelIndex, _first: usize, _last: usize) {}

    fn on_rows_inserted(&mut self, _parent: &ModelIndex, _first: usize, _last: usize) {}

    fn on_rows_about_to_be_removed(&mut self, _parent: &ModelIndex, _first: usize, _last: usize) {}

    fn on_rows_removed(&mut self, _parent: &ModelIndex, _first: usize, _last: usize) {}

    fn on_data_changed(&mut self, _index: &ModelIndex) {}

    fn on_layout_changed(&mut self) {}

    /// Dispatch to the specific handler
    fn on_event(&mut self, event: &ModelEvent) {
        match event {
            ModelEvent::AboutToReset => self.on_about_to_reset(),
            ModelEvent::Reset => self.on_reset(),
            ModelEvent::RowsAboutToBeInserted {
                parent,
                first,
                last,
            } => self.on_rows_about_to_be_inserted(parent, *first, *last),
            ModelEvent::RowsInserted {
                parent,
                first,
                last,
            } => self.on_rows_inserted(parent, *first, *last),
            ModelEvent::RowsAboutToBeRemoved {
                parent,
                first,
                last,
            } => self.on_rows_about_to_be_removed(parent, *first, *last),
            ModelEvent::RowsRemoved {
                parent,
                first,
                last,
            } => self.on_rows_removed(parent, *first, *last),
            ModelEvent::DataChanged { index } => self.on_data_changed(index),
            ModelEvent::LayoutChanged => self.on_layout_changed(),
        }
    }
}

/// Observer list owned by a model.
///
/// A model can also keep its own events for a downstream proxy to pick up
/// with [`Notifier::take_recorded`].
#[derive(Default)]
pub struct Notifier {
    observers: Vec<Box<dyn ModelObserver>>,
    recording: bool,
    recorded: Vec<ModelEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn ModelObserver>) {
        self.observers.push(observer);
    }

    pub fn emit(&mut self, event: ModelEvent) {
        tracing::trace!(?event, observers = self.observers.len(), "model event");
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
        if self.recording {
            self.recorded.push(event);
        }
    }

    pub fn set_recording(&mut self, on: bool) {
        self.recording = on;
        if !on {
            self.recorded.clear();
        }
    }

    /// Drain the events emitted since the last call
    pub fn take_recorded(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.recorded)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .field("recording", &self.recording)
            .field("recorded", &self.recorded.len())
            .finish()
    }
}

/// Observer that appends every event to a shared list.
///
/// Clones share the list, so keep one clone and subscribe another.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<ModelEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ModelEvent> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<ModelEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl ModelObserver for EventLog {
    fn on_event(&mut self, event: &ModelEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        resets: Rc<RefCell<usize>>,
        inserts: Rc<RefCell<Vec<(usize, usize)>>>,
    }

    impl ModelObserver for Counter {
        fn on_reset(&mut self) {
            *self.resets.borrow_mut() += 1;
        }

        fn on_rows_inserted(&mut self, _parent: &ModelIndex, first: usize, last: usize) {
            self.inserts.borrow_mut().push((first, last));
        }
    }

    #[test]
    fn test_emit_reaches_every_observer() {
        let mut notifier = Notifier::new();
        let a = EventLog::new();
        let b = EventLog::new();
        notifier.subscribe(Box::new(a.clone()));
        notifier.subscribe(Box::new(b.clone()));
        notifier.emit(ModelEvent::Reset);
        assert_eq!(a.events(), vec![ModelEvent::Reset]);
        assert_eq!(b.events(), vec![ModelEvent::Reset]);
    }

    #[test]
    fn test_default_dispatch_calls_specific_handlers() {
        let counter = Counter::default();
        let resets = counter.resets.clone();
        let inserts = counter.inserts.clone();
        let mut notifier = Notifier::new();
        notifier.subscribe(Box::new(counter));

        notifier.emit(ModelEvent::AboutToReset);
        notifier.emit(ModelEvent::Reset);
        notifier.emit(ModelEvent::RowsInserted {
            parent: ModelIndex::invalid(),
            first: 2,
            last: 4,
        });
        notifier.emit(ModelEvent::LayoutChanged);

        assert_eq!(*resets.borrow(), 1);
        assert_eq!(*inserts.borrow(), vec![(2, 4)]);
    }

    #[test]
    fn test_recording_is_opt_in() {
        let mut notifier = Notifier::new();
        notifier.emit(ModelEvent::Reset);
        assert!(notifier.take_recorded().is_empty());

        notifier.set_recording(true);
        notifier.emit(ModelEvent::AboutToReset);
        notifier.emit(ModelEvent::Reset);
        assert_eq!(
            notifier.take_recorded(),
            vec![ModelEvent::AboutToReset, ModelEvent::Reset]
        );
        assert!(notifier.take_recorded().is_empty());
    }

    #[test]
    fn test_event_log_take_drains() {
        let log = EventLog::new();
        let mut observer = log.clone();
        observer.on_event(&ModelEvent::LayoutChanged);
        assert_eq!(log.len(), 1);
        assert_eq!(log.take(), vec![ModelEvent::LayoutChanged]);
        assert!(log.is_empty());
    }
}
