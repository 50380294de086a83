use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// Whether a schema participates in reads, writes, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessScope {
    Read,
    Write,
    #[default]
    Unscoped,
}

/// How composite members combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// A normalized, dialect-independent schema node.
///
/// Fields common to every variant live on the struct; the discriminated
/// payload lives in [`IrSchemaKind`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrSchema {
    pub description: Option<String>,
    pub default: Option<Value>,
    pub access_scope: AccessScope,
    pub kind: IrSchemaKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum IrSchemaKind {
    String {
        format: Option<String>,
        min_length: Option<u64>,
        max_length: Option<u64>,
        pattern: Option<String>,
        const_value: Option<String>,
    },
    /// Covers both `integer` and `number`; `format: int64` routes emitters
    /// through big-integer coercion.
    Number {
        integer: bool,
        format: Option<String>,
        minimum: Option<f64>,
        maximum: Option<f64>,
        exclusive_minimum: Option<f64>,
        exclusive_maximum: Option<f64>,
        const_value: Option<serde_json::Number>,
    },
    Boolean {
        const_value: Option<bool>,
    },
    Null,
    Undefined,
    #[default]
    Unknown,
    Never,
    Void,
    Array {
        items: Vec<IrSchema>,
        min_items: Option<u64>,
        max_items: Option<u64>,
        logical_operator: LogicalOperator,
    },
    Tuple {
        items: Vec<IrSchema>,
        const_values: Option<Vec<Value>>,
    },
    /// Members are primitive-const schemas; a `Null` member toggles
    /// nullability at emission time.
    Enum {
        members: Vec<IrSchema>,
    },
    Object {
        properties: IndexMap<String, IrSchema>,
        required: IndexSet<String>,
        additional_properties: Option<Box<IrSchema>>,
    },
    /// Composite without a `type`: union (`or`) or intersection (`and`).
    Composite {
        items: Vec<IrSchema>,
        logical_operator: LogicalOperator,
    },
    /// Pointer to another schema; recursion terminates through the
    /// identifier service.
    Ref(String),
}

impl IrSchema {
    pub fn of(kind: IrSchemaKind) -> Self {
        IrSchema {
            kind,
            ..Default::default()
        }
    }

    pub fn unknown() -> Self {
        IrSchema::of(IrSchemaKind::Unknown)
    }

    pub fn null() -> Self {
        IrSchema::of(IrSchemaKind::Null)
    }

    pub fn never() -> Self {
        IrSchema::of(IrSchemaKind::Never)
    }

    pub fn reference(ref_path: impl Into<String>) -> Self {
        IrSchema::of(IrSchemaKind::Ref(ref_path.into()))
    }

    pub fn string_const(value: impl Into<String>) -> Self {
        IrSchema::of(IrSchemaKind::String {
            format: None,
            min_length: None,
            max_length: None,
            pattern: None,
            const_value: Some(value.into()),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, IrSchemaKind::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, IrSchemaKind::Object { .. })
    }

    pub fn is_ref(&self) -> bool {
        matches!(self.kind, IrSchemaKind::Ref(_))
    }

    pub fn as_ref_path(&self) -> Option<&str> {
        match &self.kind {
            IrSchemaKind::Ref(path) => Some(path),
            _ => None,
        }
    }
}
