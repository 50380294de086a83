use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::ResolveError;
use crate::files::FileRegistry;
use crate::ir::{IrComponent, IrModel};
use crate::resolve;
use crate::spec::SpecDocument;

/// The shared handle exposed to parsers, transforms, and plugins.
///
/// Fields are public so callers can split borrows: reading the IR while
/// appending to a file is the common emission pattern.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    /// The raw document, immutable after load.
    pub spec: SpecDocument,
    /// Built during parse, rewritten by transforms, read-only for plugins.
    pub ir: IrModel,
    pub files: FileRegistry,
}

impl Context {
    pub fn new(config: Config, spec: SpecDocument) -> Self {
        Context {
            config,
            spec,
            ir: IrModel::default(),
            files: FileRegistry::default(),
        }
    }

    /// Resolve a `$ref` against the raw spec document.
    pub fn resolve_ref<T: DeserializeOwned>(&self, ref_path: &str) -> Result<T, ResolveError> {
        resolve::resolve_ref(&self.spec.root, ref_path)
    }

    /// Resolve a `$ref` against the raw spec document, returning the raw
    /// node.
    pub fn resolve_value(&self, ref_path: &str) -> Result<&Value, ResolveError> {
        resolve::resolve_value(&self.spec.root, ref_path)
    }

    /// Resolve a canonical `$ref` against the IR.
    pub fn resolve_ir_ref(&self, ref_path: &str) -> Option<&IrComponent> {
        self.ir.component(ref_path)
    }

    /// Shallow-merge the referent into the holder, stripping `$ref`.
    pub fn dereference(&self, holder: &Value) -> Result<Value, ResolveError> {
        resolve::dereference(&self.spec.root, holder)
    }
}
