//! Process lifecycle events and their synchronous publisher.

mod listener;

pub use listener::{EventLog, FnListener};

use crate::error::ListenerError;
use crate::executor::NodeExecutionResult;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// The key listeners subscribe under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    ProcessStarted,
    ProcessCompleted,
    ProcessSuspended,
    ProcessTerminated,
    NodeStarted,
    NodeCompleted,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::ProcessStarted,
        EventType::ProcessCompleted,
        EventType::ProcessSuspended,
        EventType::ProcessTerminated,
        EventType::NodeStarted,
        EventType::NodeCompleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ProcessStarted => "processStarted",
            EventType::ProcessCompleted => "processCompleted",
            EventType::ProcessSuspended => "processSuspended",
            EventType::ProcessTerminated => "processTerminated",
            EventType::NodeStarted => "nodeStarted",
            EventType::NodeCompleted => "nodeCompleted",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    #[serde(rename_all = "camelCase")]
    ProcessStarted {
        definition_id: String,
        initial_variables: Map<String, JsonValue>,
    },

    #[serde(rename_all = "camelCase")]
    ProcessCompleted {
        final_variables: Map<String, JsonValue>,
    },

    /// A node reported failure and the instance is waiting to be resumed.
    #[serde(rename_all = "camelCase")]
    ProcessSuspended {
        node_id: String,
        reason: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    ProcessTerminated { error: String },

    #[serde(rename_all = "camelCase")]
    NodeStarted { node_id: String, node_label: String },

    #[serde(rename_all = "camelCase")]
    NodeCompleted {
        node_id: String,
        result: NodeExecutionResult,
    },
}

/// An event plus its envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEvent {
    pub event_id: String,
    pub instance_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl ProcessEvent {
    pub fn new(instance_id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            instance_id: instance_id.into(),
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn process_started(
        instance_id: &str,
        definition_id: &str,
        initial_variables: Map<String, JsonValue>,
    ) -> Self {
        Self::new(
            instance_id,
            EventKind::ProcessStarted {
                definition_id: definition_id.to_string(),
                initial_variables,
            },
        )
    }

    pub fn process_completed(instance_id: &str, final_variables: Map<String, JsonValue>) -> Self {
        Self::new(instance_id, EventKind::ProcessCompleted { final_variables })
    }

    pub fn process_suspended(instance_id: &str, node_id: &str, reason: Option<String>) -> Self {
        Self::new(
            instance_id,
            EventKind::ProcessSuspended {
                node_id: node_id.to_string(),
                reason,
            },
        )
    }

    pub fn process_terminated(instance_id: &str, error: impl Into<String>) -> Self {
        Self::new(
            instance_id,
            EventKind::ProcessTerminated {
                error: error.into(),
            },
        )
    }

    pub fn node_started(instance_id: &str, node_id: &str, node_label: &str) -> Self {
        Self::new(
            instance_id,
            EventKind::NodeStarted {
                node_id: node_id.to_string(),
                node_label: node_label.to_string(),
            },
        )
    }

    pub fn node_completed(instance_id: &str, node_id: &str, result: NodeExecutionResult) -> Self {
        Self::new(
            instance_id,
            EventKind::NodeCompleted {
                node_id: node_id.to_string(),
                result,
            },
        )
    }

    pub fn event_type(&self) -> EventType {
        match self.kind {
            EventKind::ProcessStarted { .. } => EventType::ProcessStarted,
            EventKind::ProcessCompleted { .. } => EventType::ProcessCompleted,
            EventKind::ProcessSuspended { .. } => EventType::ProcessSuspended,
            EventKind::ProcessTerminated { .. } => EventType::ProcessTerminated,
            EventKind::NodeStarted { .. } => EventType::NodeStarted,
            EventKind::NodeCompleted { .. } => EventType::NodeCompleted,
        }
    }

    /// The node this event concerns, if any.
    pub fn node_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::NodeStarted { node_id, .. }
            | EventKind::NodeCompleted { node_id, .. }
            | EventKind::ProcessSuspended { node_id, .. } => Some(node_id),
            _ => None,
        }
    }
}

/// Receives published events.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &ProcessEvent) -> Result<(), ListenerError>;
}

/// Fans events out to the listeners subscribed to their exact type.
///
/// A failing listener is logged and skipped; it never affects the publisher
/// or the other listeners.
#[derive(Default)]
pub struct EventPublisher {
    listeners: RwLock<AHashMap<EventType, Vec<Arc<dyn EventListener>>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, event_type: EventType, listener: Arc<dyn EventListener>) {
        self.listeners
            .write()
            .entry(event_type)
            .or_default()
            .push(listener);
    }

    /// Subscribes `listener` to every event type.
    pub fn subscribe_all(&self, listener: Arc<dyn EventListener>) {
        let mut listeners = self.listeners.write();
        for event_type in EventType::ALL {
            listeners
                .entry(event_type)
                .or_default()
                .push(Arc::clone(&listener));
        }
    }

    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners.read().get(&event_type).map_or(0, Vec::len)
    }

    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    pub fn publish(&self, event: &ProcessEvent) {
        let event_type = event.event_type();
        // Snapshot so listeners may subscribe while being notified.
        let listeners = match self.listeners.read().get(&event_type) {
            Some(listeners) => listeners.clone(),
            None => return,
        };

        for listener in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    event_type = %event_type,
                    instance_id = %event.instance_id,
                    error = %e,
                    "Event listener failed"
                ),
                Err(payload) => warn!(
                    event_type = %event_type,
                    instance_id = %event.instance_id,
                    panic = panic_message(&*payload),
                    "Event listener panicked"
                ),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
