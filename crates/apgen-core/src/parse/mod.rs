//! Dialect parsers. Each walks its dialect's document shape and populates
//! the IR: component kinds first (parameters, request bodies, schemas), then
//! paths, then servers. The orchestrator later replays the IR as events.

pub mod filter;

mod components;
mod paths;
mod v2;
mod v3_0;
mod v3_1;

use indexmap::IndexSet;
use serde_json::Value;

use crate::context::Context;
use crate::error::Error;
use crate::ir::{HttpMethod, IrModel, IrServer};
use crate::spec::Dialect;

pub use filter::Filters;

/// Parser-scoped state: compiled filters and the operation id ledger.
#[derive(Debug)]
pub struct ParserState {
    pub filters: Filters,
    operation_ids: IndexSet<String>,
}

impl ParserState {
    pub fn new(config: &crate::config::Config) -> Self {
        ParserState {
            filters: Filters::compile(&config.include, &config.exclude),
            operation_ids: IndexSet::new(),
        }
    }

    /// Synthesize a stable operation id: `operationId` when unseen, else a
    /// route-derived name, deduplicated with a counter.
    pub fn operation_id(&mut self, explicit: Option<&str>, method: HttpMethod, path: &str) -> String {
        if let Some(id) = explicit {
            if self.operation_ids.insert(id.to_string()) {
                return id.to_string();
            }
        }

        let base = route_id(method, path);
        if self.operation_ids.insert(base.clone()) {
            return base;
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{base}_{counter}");
            if self.operation_ids.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Derive `method_pathSegments` from an operation's route, stripping
/// parameter braces.
fn route_id(method: HttpMethod, path: &str) -> String {
    let mut id = method.as_str().to_string();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let segment = segment.trim_start_matches('{').trim_end_matches('}');
        id.push('_');
        id.push_str(segment);
    }
    id
}

/// Parse the spec into the IR, dispatching on the detected dialect.
pub fn parse(ctx: &mut Context) -> Result<(), Error> {
    let mut state = ParserState::new(&ctx.config);
    match ctx.spec.dialect {
        Dialect::V2 => v2::parse(ctx, &mut state),
        Dialect::V30 => v3_0::parse(ctx, &mut state),
        Dialect::V31 => v3_1::parse(ctx, &mut state),
    }
}

/// Populate the IR server list from a 3.x `servers` array.
pub(crate) fn parse_servers(root: &Value, ir: &mut IrModel) {
    let Some(servers) = root.get("servers").and_then(Value::as_array) else {
        return;
    };
    for server in servers {
        if let Some(url) = server.get("url").and_then(Value::as_str) {
            ir.servers.push(IrServer {
                url: url.to_string(),
                description: server
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn explicit_operation_id_used_once() {
        let mut state = ParserState::new(&Config::default());
        let first = state.operation_id(Some("listPets"), HttpMethod::Get, "/pets");
        assert_eq!(first, "listPets");

        // A second occurrence falls back to the route-derived id.
        let second = state.operation_id(Some("listPets"), HttpMethod::Get, "/pets");
        assert_eq!(second, "get_pets");
    }

    #[test]
    fn route_ids_strip_parameter_braces() {
        let mut state = ParserState::new(&Config::default());
        let id = state.operation_id(None, HttpMethod::Get, "/pets/{petId}/photos");
        assert_eq!(id, "get_pets_petId_photos");
    }

    #[test]
    fn duplicate_route_ids_get_counters() {
        let mut state = ParserState::new(&Config::default());
        assert_eq!(state.operation_id(None, HttpMethod::Get, "/pets"), "get_pets");
        assert_eq!(state.operation_id(None, HttpMethod::Get, "/pets"), "get_pets_2");
        assert_eq!(state.operation_id(None, HttpMethod::Get, "/pets"), "get_pets_3");
    }
}
