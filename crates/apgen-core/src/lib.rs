pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod files;
pub mod ir;
pub mod naming;
pub mod orchestrator;
pub mod parse;
pub mod resolve;
pub mod spec;
pub mod transform;

pub use context::Context;
pub use error::Error;
pub use events::{Event, EventKind};
pub use orchestrator::{Orchestrator, Subscriptions};

/// A unit of emission driven by pipeline events.
///
/// `setup` runs once per plugin in plugin order and registers event
/// subscriptions; `on_event` receives each subscribed event with the shared
/// context. Plugins read the IR, and write through the file registry and
/// identifier tables.
pub trait Plugin {
    fn name(&self) -> &'static str;

    /// Names of plugins that must be instantiated before this one.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    fn setup(&mut self, ctx: &mut Context, subscriptions: &mut Subscriptions<'_>)
        -> Result<(), Error>;

    fn on_event(&mut self, ctx: &mut Context, event: &Event) -> Result<(), Error>;
}

/// Run the whole pipeline: parse the spec into the IR, apply transforms,
/// then drive the plugins. Plugins must already be sorted in plugin order
/// (see [`config::resolve_plugin_order`]).
pub fn run(ctx: &mut Context, plugins: Vec<Box<dyn Plugin>>) -> Result<(), Error> {
    parse::parse(ctx)?;
    transform::apply(ctx)?;

    let mut orchestrator = Orchestrator::new(plugins)?;
    orchestrator.run(ctx)
}
