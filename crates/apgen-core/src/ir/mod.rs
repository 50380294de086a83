pub mod operation;
pub mod schema;

pub use operation::{
    HttpMethod, IrOperation, IrParameter, IrParameterGroups, IrRequestBody, IrResponse,
    IrSecurityRequirement, IrServer, ParameterLocation,
};
pub use schema::{AccessScope, IrSchema, IrSchemaKind, LogicalOperator};

use indexmap::{IndexMap, IndexSet};

/// A reusable top-level entity keyed by its canonical `$ref`.
#[derive(Debug, Clone, PartialEq)]
pub enum IrComponent {
    Schema(IrSchema),
    Parameter(IrParameter),
    RequestBody(IrRequestBody),
}

/// The normalized, dialect-independent model. Built during parse, mutated by
/// transforms, then read-only for plugins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrModel {
    /// Components keyed by canonical `$ref` in spec insertion order, grouped
    /// by kind (parameters, request bodies, schemas).
    pub components: IndexMap<String, IrComponent>,
    /// Refs parsed for resolution but rejected by include/exclude filters;
    /// these never produce component-level events.
    pub excluded: IndexSet<String>,
    /// Operations keyed by path, then by method in walk order.
    pub paths: IndexMap<String, IndexMap<HttpMethod, IrOperation>>,
    pub servers: Vec<IrServer>,
}

impl IrModel {
    pub fn schema(&self, ref_path: &str) -> Option<&IrSchema> {
        match self.components.get(ref_path) {
            Some(IrComponent::Schema(schema)) => Some(schema),
            _ => None,
        }
    }

    pub fn component(&self, ref_path: &str) -> Option<&IrComponent> {
        self.components.get(ref_path)
    }

    pub fn operations(&self) -> impl Iterator<Item = &IrOperation> {
        self.paths.values().flat_map(|methods| methods.values())
    }
}
