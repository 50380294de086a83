//! Map IR schemas to TypeScript type syntax, emitting named declarations
//! for referenced components along the way.

use apgen_core::error::Error;
use apgen_core::files::GeneratedFile;
use apgen_core::ir::{IrModel, IrSchema, IrSchemaKind, LogicalOperator};
use apgen_core::naming::{IdentifierRequest, Namespace};

use crate::sanitize_property_key;

/// Emits `export type` declarations into the types file. References force
/// their target declarations first; cycles are fine in type position, so no
/// deferral is needed.
pub struct TypeEmitter<'a> {
    ir: &'a IrModel,
    file: &'a mut GeneratedFile,
    /// Prefix applied to referenced names (e.g. `models.` when rendering
    /// into another file that namespace-imports the types file).
    ref_prefix: &'a str,
    stack: Vec<String>,
}

impl<'a> TypeEmitter<'a> {
    pub fn new(ir: &'a IrModel, file: &'a mut GeneratedFile, ref_prefix: &'a str) -> Self {
        TypeEmitter {
            ir,
            file,
            ref_prefix,
            stack: Vec::new(),
        }
    }

    /// Emit the type declaration for a component ref, returning its bare
    /// name.
    pub fn emit_component(&mut self, ref_path: &str) -> Result<String, Error> {
        let identifier = self.file.identifier(IdentifierRequest {
            ref_path,
            namespace: Namespace::Type,
            create: true,
            case: None,
            transform: None,
        });
        if !identifier.created {
            return Ok(identifier.name);
        }

        let schema = self
            .ir
            .schema(ref_path)
            .cloned()
            .unwrap_or_else(IrSchema::unknown);

        self.stack.push(ref_path.to_string());
        let rendered = self.ts_type(&schema)?;
        self.stack.pop();

        let mut node = String::new();
        if let Some(description) = &schema.description {
            node.push_str(&format!("/**\n * {}\n */\n", description.replace("*/", "*\\/")));
        }
        node.push_str(&format!("export type {} = {};", identifier.name, rendered));
        self.file.add(node);

        Ok(identifier.name)
    }

    /// Render a schema as TypeScript type syntax.
    pub fn ts_type(&mut self, schema: &IrSchema) -> Result<String, Error> {
        Ok(match &schema.kind {
            IrSchemaKind::Ref(ref_path) => {
                let name = self.ts_ref(ref_path)?;
                format!("{}{}", self.ref_prefix, name)
            }
            IrSchemaKind::String { const_value, .. } => match const_value {
                Some(value) => format!("\"{value}\""),
                None => "string".to_string(),
            },
            IrSchemaKind::Number {
                format, const_value, ..
            } => {
                if format.as_deref() == Some("int64") {
                    "bigint".to_string()
                } else {
                    match const_value {
                        Some(value) => value.to_string(),
                        None => "number".to_string(),
                    }
                }
            }
            IrSchemaKind::Boolean { const_value } => match const_value {
                Some(value) => value.to_string(),
                None => "boolean".to_string(),
            },
            IrSchemaKind::Null => "null".to_string(),
            IrSchemaKind::Undefined => "undefined".to_string(),
            IrSchemaKind::Unknown => "unknown".to_string(),
            IrSchemaKind::Never => "never".to_string(),
            IrSchemaKind::Void => "void".to_string(),
            IrSchemaKind::Array { items, .. } => {
                let inner = match items.len() {
                    0 => "unknown".to_string(),
                    1 => self.ts_type(&items[0])?,
                    _ => {
                        let variants = self.type_list(items, " | ")?;
                        variants
                    }
                };
                if inner.contains('|') || inner.contains('&') || inner.contains(' ') {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            IrSchemaKind::Tuple { items, const_values } => match const_values {
                Some(values) => {
                    let rendered: Vec<String> =
                        values.iter().map(|v| v.to_string()).collect();
                    format!("[{}]", rendered.join(", "))
                }
                None => {
                    let rendered = self.type_list(items, ", ")?;
                    format!("[{rendered}]")
                }
            },
            IrSchemaKind::Enum { members } => {
                let mut variants: Vec<String> = Vec::new();
                for member in members {
                    variants.push(match &member.kind {
                        IrSchemaKind::String {
                            const_value: Some(value),
                            ..
                        } => format!("\"{value}\""),
                        IrSchemaKind::Null => "null".to_string(),
                        IrSchemaKind::Number {
                            const_value: Some(value),
                            ..
                        } => value.to_string(),
                        IrSchemaKind::Boolean {
                            const_value: Some(value),
                        } => value.to_string(),
                        _ => continue,
                    });
                }
                if variants.is_empty() {
                    "unknown".to_string()
                } else {
                    variants.join(" | ")
                }
            }
            IrSchemaKind::Object {
                properties,
                required,
                additional_properties,
            } => {
                if properties.is_empty() {
                    return Ok(match additional_properties {
                        Some(additional) => {
                            format!("Record<string, {}>", self.ts_type(additional)?)
                        }
                        None => "Record<string, unknown>".to_string(),
                    });
                }
                let mut fields: Vec<String> = Vec::with_capacity(properties.len());
                for (name, property) in properties {
                    let rendered = self.ts_type(property)?;
                    let key = sanitize_property_key(name);
                    if required.contains(name) {
                        fields.push(format!("{key}: {rendered}"));
                    } else {
                        fields.push(format!("{key}?: {rendered}"));
                    }
                }
                if let Some(additional) = additional_properties {
                    fields.push(format!("[key: string]: {}", self.ts_type(additional)?));
                }
                format!("{{ {} }}", fields.join("; "))
            }
            IrSchemaKind::Composite {
                items,
                logical_operator,
            } => {
                let separator = match logical_operator {
                    LogicalOperator::Or => " | ",
                    LogicalOperator::And => " & ",
                };
                match items.len() {
                    0 => "unknown".to_string(),
                    1 => self.ts_type(&items[0])?,
                    _ => self.type_list(items, separator)?,
                }
            }
        })
    }

    fn ts_ref(&mut self, ref_path: &str) -> Result<String, Error> {
        // Type aliases tolerate cycles; just use the in-flight name.
        if self.stack.iter().any(|entry| entry == ref_path) {
            let name = self
                .file
                .identifier(IdentifierRequest {
                    ref_path,
                    namespace: Namespace::Type,
                    create: false,
                    case: None,
                    transform: None,
                })
                .name;
            return Ok(name);
        }

        let existing = self.file.identifier(IdentifierRequest {
            ref_path,
            namespace: Namespace::Type,
            create: false,
            case: None,
            transform: None,
        });
        if existing.name.is_empty() {
            return self.emit_component(ref_path);
        }
        Ok(existing.name)
    }

    fn type_list(&mut self, items: &[IrSchema], separator: &str) -> Result<String, Error> {
        let mut rendered: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            let ts = self.ts_type(item)?;
            if !rendered.contains(&ts) {
                rendered.push(ts);
            }
        }
        Ok(rendered.join(separator))
    }
}
