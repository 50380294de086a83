//! Plugin orchestration: dependency validation, instantiation order, and
//! the event replay that drives emission.

use crate::context::Context;
use crate::error::{BroadcastError, ConfigError, Error};
use crate::events::{Event, EventBus, EventKind};
use crate::ir::{IrComponent, IrModel};
use crate::Plugin;

/// Subscription handle passed to a plugin's `setup`; records which events
/// the plugin wants, bound to its instantiation slot.
pub struct Subscriptions<'a> {
    bus: &'a mut EventBus,
    slot: usize,
    plugin: &'a str,
}

impl Subscriptions<'_> {
    pub fn subscribe(&mut self, kind: EventKind) {
        self.bus.subscribe(kind, self.slot, self.plugin);
    }
}

struct PluginSlot {
    name: String,
    plugin: Box<dyn Plugin>,
}

/// Drives plugins over the read-only IR: setup in topological order, then
/// `before` → component events → `server` → `operation` → `after`, halting
/// on the first wrapped subscriber failure.
pub struct Orchestrator {
    slots: Vec<PluginSlot>,
    bus: EventBus,
}

impl Orchestrator {
    /// Build the orchestrator from plugins already sorted in plugin order.
    /// Every dependency must precede its dependent; a missing dependency is
    /// fatal before any plugin runs.
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Result<Self, ConfigError> {
        let mut seen: Vec<String> = Vec::with_capacity(plugins.len());
        for plugin in &plugins {
            for dependency in plugin.dependencies() {
                if !seen.iter().any(|name| name == &dependency) {
                    return Err(ConfigError::MissingDependency {
                        plugin: plugin.name().to_string(),
                        dependency,
                    });
                }
            }
            seen.push(plugin.name().to_string());
        }

        let slots = plugins
            .into_iter()
            .map(|plugin| PluginSlot {
                name: plugin.name().to_string(),
                plugin,
            })
            .collect();

        Ok(Orchestrator {
            slots,
            bus: EventBus::default(),
        })
    }

    /// Run every plugin's setup, then replay the IR as events.
    pub fn run(&mut self, ctx: &mut Context) -> Result<(), Error> {
        for slot_index in 0..self.slots.len() {
            let slot = &mut self.slots[slot_index];
            let mut subscriptions = Subscriptions {
                bus: &mut self.bus,
                slot: slot_index,
                plugin: &slot.name,
            };
            slot.plugin.setup(ctx, &mut subscriptions)?;
        }

        for event in event_sequence(&ctx.ir) {
            deliver(&mut self.slots, &self.bus, ctx, &event)?;
        }
        Ok(())
    }
}

/// Sequential delivery in subscription order; any failure wraps into a
/// `BroadcastError` and halts the pipeline.
fn deliver(
    slots: &mut [PluginSlot],
    bus: &EventBus,
    ctx: &mut Context,
    event: &Event,
) -> Result<(), Error> {
    for record in bus.subscribers(event.kind()) {
        let slot = &mut slots[record.slot];
        slot.plugin.on_event(ctx, event).map_err(|source| {
            Error::Broadcast(BroadcastError {
                event: event.kind(),
                plugin: slot.name.clone(),
                source: Box::new(source),
            })
        })?;
    }
    Ok(())
}

/// The pipeline's event order: `before`, component events grouped by kind
/// (parameters, request bodies, schemas) in spec insertion order, servers,
/// operations in path-then-method order, `after`. Filtered-out components
/// produce no events.
fn event_sequence(ir: &IrModel) -> Vec<Event> {
    let mut events = vec![Event::Before];

    for (ref_path, component) in &ir.components {
        if ir.excluded.contains(ref_path) {
            continue;
        }
        if let IrComponent::Parameter(parameter) = component {
            events.push(Event::Parameter {
                ref_path: ref_path.clone(),
                parameter: parameter.clone(),
            });
        }
    }
    for (ref_path, component) in &ir.components {
        if ir.excluded.contains(ref_path) {
            continue;
        }
        if let IrComponent::RequestBody(body) = component {
            events.push(Event::RequestBody {
                ref_path: ref_path.clone(),
                body: body.clone(),
            });
        }
    }
    for (ref_path, component) in &ir.components {
        if ir.excluded.contains(ref_path) {
            continue;
        }
        if let IrComponent::Schema(schema) = component {
            events.push(Event::Schema {
                ref_path: ref_path.clone(),
                schema: schema.clone(),
            });
        }
    }

    for server in &ir.servers {
        events.push(Event::Server {
            server: server.clone(),
        });
    }

    for methods in ir.paths.values() {
        for operation in methods.values() {
            events.push(Event::Operation {
                operation: operation.clone(),
            });
        }
    }

    events.push(Event::After);
    events
}
