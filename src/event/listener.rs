use super::{EventListener, EventType, ProcessEvent};
use crate::error::ListenerError;
use parking_lot::Mutex;

/// Collects every event it receives, in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ProcessEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProcessEvent> {
        self.events.lock().clone()
    }

    pub fn of_type(&self, event_type: EventType) -> Vec<ProcessEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }

    /// Ids of the nodes that started, in execution order.
    pub fn started_nodes(&self) -> Vec<String> {
        self.of_type(EventType::NodeStarted)
            .iter()
            .filter_map(|e| e.node_id().map(str::to_string))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventListener for EventLog {
    fn on_event(&self, event: &ProcessEvent) -> Result<(), ListenerError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Adapts a closure into an [`EventListener`].
pub struct FnListener<F> {
    callback: F,
}

impl<F> FnListener<F>
where
    F: Fn(&ProcessEvent) -> Result<(), ListenerError> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&ProcessEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_event(&self, event: &ProcessEvent) -> Result<(), ListenerError> {
        (self.callback)(event)
    }
}
