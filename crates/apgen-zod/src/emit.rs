//! Translation of IR schema trees into Zod expressions, including lazy
//! handling of circular reference clusters.

use apgen_core::error::Error;
use apgen_core::files::GeneratedFile;
use apgen_core::ir::{AccessScope, IrModel, IrSchema, IrSchemaKind, LogicalOperator};
use apgen_core::naming::{IdentifierRequest, NameTransform, Namespace};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::expr::ZodExpr;

/// Emits component declarations into one file, forcing referenced
/// declarations ahead of their uses and deferring cycle back-edges with
/// `z.lazy`.
pub struct SchemaEmitter<'a> {
    ir: &'a IrModel,
    file: &'a mut GeneratedFile,
    transform: Option<NameTransform>,
    comments: bool,
    metadata: bool,
    /// Refs currently on the traversal stack.
    stack: Vec<String>,
    /// Refs that participate in a reference cycle; only their
    /// declarations carry an explicit schema type.
    circular: IndexSet<String>,
}

impl<'a> SchemaEmitter<'a> {
    pub fn new(
        ir: &'a IrModel,
        file: &'a mut GeneratedFile,
        transform: Option<NameTransform>,
        comments: bool,
        metadata: bool,
    ) -> Self {
        SchemaEmitter {
            ir,
            file,
            transform,
            comments,
            metadata,
            stack: Vec::new(),
            circular: IndexSet::new(),
        }
    }

    /// Emit the declaration for a component ref, returning its identifier
    /// name. Already-emitted components return their existing name without
    /// a second declaration.
    pub fn emit_component(&mut self, ref_path: &str) -> Result<String, Error> {
        let schema = self
            .ir
            .schema(ref_path)
            .cloned()
            .unwrap_or_else(IrSchema::unknown);
        let doc = schema.description.clone();
        self.declare(ref_path, &schema, doc, true)
    }

    /// Emit a declaration for a synthesized schema (operation bundles).
    pub fn emit_synthetic(
        &mut self,
        ref_path: &str,
        schema: &IrSchema,
        doc: Option<String>,
    ) -> Result<String, Error> {
        self.declare(ref_path, schema, doc, false)
    }

    fn declare(
        &mut self,
        ref_path: &str,
        schema: &IrSchema,
        doc: Option<String>,
        use_transform: bool,
    ) -> Result<String, Error> {
        let identifier = self.file.identifier(IdentifierRequest {
            ref_path,
            namespace: Namespace::Value,
            create: true,
            case: None,
            transform: if use_transform {
                self.transform.as_ref()
            } else {
                None
            },
        });
        if !identifier.created {
            return Ok(identifier.name);
        }

        self.stack.push(ref_path.to_string());
        let expr = self.emit(schema, false)?;
        self.stack.pop();

        // A declaration on a cycle gets an explicit schema type to break
        // the type inferer's cycle; acyclic siblings forced out of the
        // same cluster do not.
        let declaration = if self.circular.contains(ref_path) {
            let annotation = if schema.is_object() {
                "z.AnyZodObject"
            } else {
                "z.ZodTypeAny"
            };
            format!(
                "export const {}: {} = {};",
                identifier.name, annotation, expr
            )
        } else {
            format!("export const {} = {};", identifier.name, expr)
        };

        let node = match doc.filter(|_| self.comments) {
            Some(text) => format!("/**\n * {}\n */\n{}", escape_doc(&text), declaration),
            None => declaration,
        };
        self.file.add(node);

        Ok(identifier.name)
    }

    /// Emit one schema node. Dispatch: `$ref`, then typed schemas, then
    /// composites, then the unknown fallback; post-emission modifiers are
    /// applied in a fixed order.
    pub fn emit(&mut self, schema: &IrSchema, optional: bool) -> Result<ZodExpr, Error> {
        let mut expr = match &schema.kind {
            IrSchemaKind::Ref(ref_path) => self.emit_ref(ref_path)?,
            IrSchemaKind::String {
                format,
                min_length,
                max_length,
                pattern,
                const_value,
            } => string_expr(format, *min_length, *max_length, pattern, const_value),
            IrSchemaKind::Number {
                integer,
                format,
                minimum,
                maximum,
                exclusive_minimum,
                exclusive_maximum,
                const_value,
            } => number_expr(
                *integer,
                format,
                *minimum,
                *maximum,
                *exclusive_minimum,
                *exclusive_maximum,
                const_value,
            ),
            IrSchemaKind::Boolean { const_value } => match const_value {
                Some(value) => ZodExpr::literal(Value::Bool(*value)),
                None => ZodExpr::call0("boolean"),
            },
            IrSchemaKind::Null => ZodExpr::call0("null"),
            IrSchemaKind::Undefined => ZodExpr::call0("undefined"),
            IrSchemaKind::Unknown => ZodExpr::call0("unknown"),
            IrSchemaKind::Never => ZodExpr::call0("never"),
            IrSchemaKind::Void => ZodExpr::call0("void"),
            IrSchemaKind::Array {
                items,
                min_items,
                max_items,
                logical_operator,
            } => self.array_expr(items, *min_items, *max_items, *logical_operator)?,
            IrSchemaKind::Tuple { items, const_values } => self.tuple_expr(items, const_values)?,
            IrSchemaKind::Enum { members } => enum_expr(members),
            IrSchemaKind::Object {
                properties,
                required,
                additional_properties,
            } => self.object_expr(properties, required, additional_properties.as_deref())?,
            IrSchemaKind::Composite {
                items,
                logical_operator,
            } => self.composite_expr(items, *logical_operator)?,
        };

        if schema.access_scope == AccessScope::Read {
            expr = expr.chain0("readonly");
        }
        if optional {
            expr = expr.chain0("optional");
        }
        if let Some(default) = &schema.default {
            expr = expr.chain("default", vec![default_expr(schema, default)]);
        }
        if self.metadata {
            if let Some(description) = &schema.description {
                expr = expr.chain(
                    "describe",
                    vec![ZodExpr::Literal(Value::String(description.clone()))],
                );
            }
        }

        Ok(expr)
    }

    fn emit_ref(&mut self, ref_path: &str) -> Result<ZodExpr, Error> {
        // A ref already on the stack is a cycle back-edge: defer it. Every
        // declaration from the target up to the current one is on the
        // cycle.
        if let Some(position) = self.stack.iter().position(|entry| entry == ref_path) {
            for entry in &self.stack[position..] {
                self.circular.insert(entry.clone());
            }
            let name = self
                .file
                .identifier(IdentifierRequest {
                    ref_path,
                    namespace: Namespace::Value,
                    create: false,
                    case: None,
                    transform: None,
                })
                .name;
            return Ok(ZodExpr::lazy(&name));
        }

        let existing = self.file.identifier(IdentifierRequest {
            ref_path,
            namespace: Namespace::Value,
            create: false,
            case: None,
            transform: None,
        });
        if existing.name.is_empty() {
            // Not yet generated: force its declaration ahead of this use.
            let name = self.emit_component(ref_path)?;
            return Ok(ZodExpr::ident(name));
        }
        Ok(ZodExpr::ident(existing.name))
    }

    fn array_expr(
        &mut self,
        items: &[IrSchema],
        min_items: Option<u64>,
        max_items: Option<u64>,
        logical_operator: LogicalOperator,
    ) -> Result<ZodExpr, Error> {
        let rendered = self.emit_deduplicated(items)?;
        let inner = match rendered.len() {
            0 => ZodExpr::call0("unknown"),
            1 => rendered.into_iter().next().expect("length checked"),
            _ => match logical_operator {
                LogicalOperator::Or => ZodExpr::call("union", vec![ZodExpr::Array(rendered)]),
                LogicalOperator::And => intersection(rendered),
            },
        };

        let mut expr = ZodExpr::call("array", vec![inner]);
        match (min_items, max_items) {
            (Some(min), Some(max)) if min == max => {
                expr = expr.chain("length", vec![ZodExpr::Literal(min.into())]);
            }
            (min, max) => {
                if let Some(min) = min {
                    expr = expr.chain("min", vec![ZodExpr::Literal(min.into())]);
                }
                if let Some(max) = max {
                    expr = expr.chain("max", vec![ZodExpr::Literal(max.into())]);
                }
            }
        }
        Ok(expr)
    }

    fn tuple_expr(
        &mut self,
        items: &[IrSchema],
        const_values: &Option<Vec<Value>>,
    ) -> Result<ZodExpr, Error> {
        if let Some(values) = const_values {
            let literals = values.iter().cloned().map(ZodExpr::literal).collect();
            return Ok(ZodExpr::call("tuple", vec![ZodExpr::Array(literals)]));
        }

        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            rendered.push(self.emit(item, false)?);
        }
        Ok(ZodExpr::call("tuple", vec![ZodExpr::Array(rendered)]))
    }

    fn object_expr(
        &mut self,
        properties: &IndexMap<String, IrSchema>,
        required: &IndexSet<String>,
        additional_properties: Option<&IrSchema>,
    ) -> Result<ZodExpr, Error> {
        // A property-less object with additional properties is a map.
        if properties.is_empty() {
            if let Some(additional) = additional_properties {
                let value = self.emit(additional, false)?;
                return Ok(ZodExpr::call(
                    "record",
                    vec![ZodExpr::call0("string"), value],
                ));
            }
        }

        let mut entries = Vec::with_capacity(properties.len());
        for (name, property) in properties {
            let optional = !required.contains(name);
            entries.push((sanitize_key(name), self.emit(property, optional)?));
        }

        let mut expr = ZodExpr::call("object", vec![ZodExpr::Object(entries)]);
        if let Some(additional) = additional_properties {
            let value = self.emit(additional, false)?;
            expr = expr.chain("catchall", vec![value]);
        }
        Ok(expr)
    }

    fn composite_expr(
        &mut self,
        items: &[IrSchema],
        logical_operator: LogicalOperator,
    ) -> Result<ZodExpr, Error> {
        match logical_operator {
            LogicalOperator::Or => {
                // Two-member unions with null collapse to `.nullable()`.
                if items.len() == 2 {
                    if let Some(other) = nullable_partner(items) {
                        let expr = self.emit(other, false)?;
                        return Ok(expr.chain0("nullable"));
                    }
                }
                let rendered = self.emit_deduplicated(items)?;
                Ok(match rendered.len() {
                    0 => ZodExpr::call0("unknown"),
                    1 => rendered.into_iter().next().expect("length checked"),
                    _ => ZodExpr::call("union", vec![ZodExpr::Array(rendered)]),
                })
            }
            LogicalOperator::And => {
                let all_objects = items.iter().all(IrSchema::is_object);
                let rendered = self.emit_deduplicated(items)?;
                if rendered.len() <= 1 {
                    return Ok(rendered
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| ZodExpr::call0("unknown")));
                }
                if all_objects {
                    // Object intersections chain `.and()` so the merged
                    // shape stays an object schema.
                    let mut iter = rendered.into_iter();
                    let mut expr = iter.next().expect("length checked");
                    for item in iter {
                        expr = expr.chain("and", vec![item]);
                    }
                    Ok(expr)
                } else {
                    Ok(intersection(rendered))
                }
            }
        }
    }

    /// Emit items, dropping structural duplicates by rendered form.
    fn emit_deduplicated(&mut self, items: &[IrSchema]) -> Result<Vec<ZodExpr>, Error> {
        let mut seen: IndexSet<String> = IndexSet::new();
        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            let expr = self.emit(item, false)?;
            if seen.insert(expr.to_string()) {
                rendered.push(expr);
            }
        }
        Ok(rendered)
    }
}

fn string_expr(
    format: &Option<String>,
    min_length: Option<u64>,
    max_length: Option<u64>,
    pattern: &Option<String>,
    const_value: &Option<String>,
) -> ZodExpr {
    if let Some(value) = const_value {
        return ZodExpr::literal(Value::String(value.clone()));
    }

    let mut expr = ZodExpr::call0("string");

    // At most one recognized format refinement applies.
    if let Some(format) = format.as_deref() {
        expr = match format {
            "date-time" => expr.chain0("datetime"),
            "ipv4" | "ipv6" => expr.chain0("ip"),
            "uri" => expr.chain0("url"),
            "date" | "email" | "time" | "uuid" => expr.chain0(format),
            _ => expr,
        };
    }

    match (min_length, max_length) {
        (Some(min), Some(max)) if min == max => {
            expr = expr.chain("length", vec![ZodExpr::Literal(min.into())]);
        }
        (min, max) => {
            if let Some(min) = min {
                expr = expr.chain("min", vec![ZodExpr::Literal(min.into())]);
            }
            if let Some(max) = max {
                expr = expr.chain("max", vec![ZodExpr::Literal(max.into())]);
            }
        }
    }

    // `.regex()` applies last.
    if let Some(pattern) = pattern {
        expr = expr.chain("regex", vec![ZodExpr::Raw(regex_literal(pattern))]);
    }

    expr
}

fn number_expr(
    integer: bool,
    format: &Option<String>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    exclusive_minimum: Option<f64>,
    exclusive_maximum: Option<f64>,
    const_value: &Option<serde_json::Number>,
) -> ZodExpr {
    let bigint = format.as_deref() == Some("int64");

    if let Some(value) = const_value {
        if bigint {
            return ZodExpr::call("literal", vec![ZodExpr::Raw(format!("BigInt(\"{value}\")"))]);
        }
        return ZodExpr::literal(Value::Number(value.clone()));
    }

    let mut expr = if bigint {
        ZodExpr::coerce("bigint")
    } else if integer {
        ZodExpr::call0("number").chain0("int")
    } else {
        ZodExpr::call0("number")
    };

    let bound = |value: f64| -> ZodExpr {
        if bigint {
            ZodExpr::Raw(format!("{}n", value as i64))
        } else {
            ZodExpr::Literal(number_value(value))
        }
    };

    // Exclusive bounds win over inclusive ones.
    if let Some(value) = exclusive_minimum {
        expr = expr.chain("gt", vec![bound(value)]);
    } else if let Some(value) = minimum {
        expr = expr.chain("gte", vec![bound(value)]);
    }
    if let Some(value) = exclusive_maximum {
        expr = expr.chain("lt", vec![bound(value)]);
    } else if let Some(value) = maximum {
        expr = expr.chain("lte", vec![bound(value)]);
    }

    expr
}

fn enum_expr(members: &[IrSchema]) -> ZodExpr {
    let mut strings: Vec<ZodExpr> = Vec::new();
    let mut literals: Vec<ZodExpr> = Vec::new();
    let mut nullable = false;

    for member in members {
        match &member.kind {
            IrSchemaKind::String {
                const_value: Some(value),
                ..
            } => strings.push(ZodExpr::Literal(Value::String(value.clone()))),
            IrSchemaKind::Null => nullable = true,
            IrSchemaKind::Number {
                const_value: Some(value),
                ..
            } => literals.push(ZodExpr::literal(Value::Number(value.clone()))),
            IrSchemaKind::Boolean {
                const_value: Some(value),
            } => literals.push(ZodExpr::literal(Value::Bool(*value))),
            _ => {}
        }
    }

    let expr = if literals.is_empty() && !strings.is_empty() {
        ZodExpr::call("enum", vec![ZodExpr::Array(strings)])
    } else if !literals.is_empty() {
        // Mixed member types fall back to a union of literals.
        let mut all: Vec<ZodExpr> = strings
            .into_iter()
            .map(|s| ZodExpr::call("literal", vec![s]))
            .collect();
        all.extend(literals);
        if all.len() == 1 {
            all.into_iter().next().expect("length checked")
        } else {
            ZodExpr::call("union", vec![ZodExpr::Array(all)])
        }
    } else {
        // Empty enums degrade.
        return ZodExpr::call0("unknown");
    };

    if nullable {
        expr.chain0("nullable")
    } else {
        expr
    }
}

/// Fold members into nested binary `z.intersection` calls; the combinator
/// takes exactly two schemas, not an array.
fn intersection(exprs: Vec<ZodExpr>) -> ZodExpr {
    let mut iter = exprs.into_iter();
    let mut expr = iter.next().unwrap_or_else(|| ZodExpr::call0("unknown"));
    for item in iter {
        expr = ZodExpr::call("intersection", vec![expr, item]);
    }
    expr
}

fn default_expr(schema: &IrSchema, default: &Value) -> ZodExpr {
    // int64 defaults honor big-integer coercion.
    if let IrSchemaKind::Number { format, .. } = &schema.kind {
        if format.as_deref() == Some("int64") {
            return ZodExpr::Raw(format!("BigInt(\"{default}\")"));
        }
    }
    ZodExpr::Literal(default.clone())
}

/// When a two-member union contains null, return the non-null partner.
fn nullable_partner(items: &[IrSchema]) -> Option<&IrSchema> {
    match (items[0].is_null(), items[1].is_null()) {
        (false, true) => Some(&items[0]),
        (true, false) => Some(&items[1]),
        _ => None,
    }
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Number((value as i64).into())
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Render a JavaScript regex literal, escaping unescaped forward slashes.
fn regex_literal(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() + 2);
    escaped.push('/');
    let mut prev_backslash = false;
    for ch in pattern.chars() {
        if ch == '/' && !prev_backslash {
            escaped.push('\\');
        }
        prev_backslash = ch == '\\' && !prev_backslash;
        escaped.push(ch);
    }
    escaped.push('/');
    escaped
}

/// Sanitize an object property key for emission: fully numeric keys become
/// numeric literal keys (negatives become string literals), and keys that
/// start with a digit or contain non-word characters are quoted.
pub(crate) fn sanitize_key(key: &str) -> String {
    if !key.is_empty() && key.parse::<f64>().is_ok() {
        if key.starts_with('-') {
            return quote_key(key);
        }
        return key.to_string();
    }

    let starts_with_digit = key.chars().next().is_some_and(|c| c.is_ascii_digit());
    let has_non_word = key
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'));
    if starts_with_digit || has_non_word || key.is_empty() {
        return quote_key(key);
    }
    key.to_string()
}

fn quote_key(key: &str) -> String {
    format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
}

fn escape_doc(text: &str) -> String {
    text.replace("*/", "*\\/").replace('\n', "\n * ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_property_keys() {
        assert_eq!(sanitize_key("name"), "name");
        assert_eq!(sanitize_key("123"), "123");
        assert_eq!(sanitize_key("-1"), "\"-1\"");
        assert_eq!(sanitize_key("3dModel"), "\"3dModel\"");
        assert_eq!(sanitize_key("content-type"), "\"content-type\"");
        assert_eq!(sanitize_key("$ref"), "$ref");
    }

    #[test]
    fn regex_literal_escapes_slashes() {
        assert_eq!(regex_literal("^a/b$"), "/^a\\/b$/");
        assert_eq!(regex_literal("^\\d+$"), "/^\\d+$/");
    }

    #[test]
    fn enum_members_render() {
        let members = vec![
            IrSchema::string_const("red"),
            IrSchema::string_const("green"),
            IrSchema::null(),
        ];
        assert_eq!(
            enum_expr(&members).to_string(),
            "z.enum([\"red\", \"green\"]).nullable()"
        );
    }

    #[test]
    fn empty_enum_degrades() {
        assert_eq!(enum_expr(&[]).to_string(), "z.unknown()");
    }

    #[test]
    fn int64_coerces_bigint() {
        let expr = number_expr(true, &Some("int64".to_string()), None, None, None, None, &None);
        assert_eq!(expr.to_string(), "z.coerce.bigint()");
    }

    #[test]
    fn exclusive_bounds_win() {
        let expr = number_expr(false, &None, Some(0.0), None, Some(0.0), None, &None);
        assert_eq!(expr.to_string(), "z.number().gt(0)");
    }

    #[test]
    fn string_formats_refine_once() {
        let expr = string_expr(&Some("date-time".to_string()), None, None, &None, &None);
        assert_eq!(expr.to_string(), "z.string().datetime()");

        let expr = string_expr(&Some("ipv6".to_string()), None, None, &None, &None);
        assert_eq!(expr.to_string(), "z.string().ip()");
    }

    #[test]
    fn equal_length_bounds_collapse() {
        let expr = string_expr(&None, Some(3), Some(3), &None, &None);
        assert_eq!(expr.to_string(), "z.string().length(3)");
    }
}
