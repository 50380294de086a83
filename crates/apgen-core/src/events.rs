use std::fmt;

use indexmap::IndexMap;

use crate::ir::{IrOperation, IrParameter, IrRequestBody, IrSchema, IrServer};

/// Event tags, in pipeline delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Before,
    Parameter,
    RequestBody,
    Schema,
    Server,
    Operation,
    After,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Before => "before",
            EventKind::Parameter => "parameter",
            EventKind::RequestBody => "requestBody",
            EventKind::Schema => "schema",
            EventKind::Server => "server",
            EventKind::Operation => "operation",
            EventKind::After => "after",
        };
        f.write_str(name)
    }
}

/// Pipeline event payloads.
#[derive(Debug, Clone)]
pub enum Event {
    Before,
    Parameter {
        ref_path: String,
        parameter: IrParameter,
    },
    RequestBody {
        ref_path: String,
        body: IrRequestBody,
    },
    Schema {
        ref_path: String,
        schema: IrSchema,
    },
    Server {
        server: IrServer,
    },
    Operation {
        operation: IrOperation,
    },
    After,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Before => EventKind::Before,
            Event::Parameter { .. } => EventKind::Parameter,
            Event::RequestBody { .. } => EventKind::RequestBody,
            Event::Schema { .. } => EventKind::Schema,
            Event::Server { .. } => EventKind::Server,
            Event::Operation { .. } => EventKind::Operation,
            Event::After => EventKind::After,
        }
    }
}

/// A registered subscription: which plugin, at which instantiation slot.
#[derive(Debug, Clone)]
pub struct SubscriberRecord {
    pub plugin: String,
    pub slot: usize,
}

/// Explicit mapping from event tag to subscriber records. Delivery is
/// sequential in subscription order, which equals plugin instantiation
/// order.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: IndexMap<EventKind, Vec<SubscriberRecord>>,
}

impl EventBus {
    pub fn subscribe(&mut self, kind: EventKind, slot: usize, plugin: &str) {
        self.subscribers.entry(kind).or_default().push(SubscriberRecord {
            plugin: plugin.to_string(),
            slot,
        });
    }

    pub fn subscribers(&self, kind: EventKind) -> &[SubscriberRecord] {
        self.subscribers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_fire_in_subscription_order() {
        let mut bus = EventBus::default();
        bus.subscribe(EventKind::Schema, 1, "second");
        bus.subscribe(EventKind::Schema, 0, "first");

        let names: Vec<_> = bus
            .subscribers(EventKind::Schema)
            .iter()
            .map(|record| record.plugin.as_str())
            .collect();
        assert_eq!(names, ["second", "first"]);
    }

    #[test]
    fn unsubscribed_event_has_no_records() {
        let bus = EventBus::default();
        assert!(bus.subscribers(EventKind::Operation).is_empty());
    }
}
