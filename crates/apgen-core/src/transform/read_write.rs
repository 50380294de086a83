//! Read/write bifurcation: object components with scoped properties get
//! `Readable` and `Writable` variants, and operation schemas are rewritten
//! to the variant matching their direction (request bodies write,
//! responses read).

use indexmap::IndexMap;

use crate::ir::{AccessScope, IrComponent, IrModel, IrSchema, IrSchemaKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Read,
    Write,
}

/// Split scoped object components and rewrite operation references.
/// Idempotent: variants are only synthesized when absent, and synthesized
/// variants carry no scope markers of their own.
pub fn split_read_write(ir: &mut IrModel) {
    let mut variants: IndexMap<String, (String, String)> = IndexMap::new();
    let mut synthesized: Vec<(String, IrSchema, bool)> = Vec::new();

    for (ref_path, component) in &ir.components {
        let IrComponent::Schema(schema) = component else {
            continue;
        };
        if !has_scoped_properties(schema) {
            continue;
        }

        let readable_ref = format!("{ref_path}Readable");
        let writable_ref = format!("{ref_path}Writable");
        variants.insert(ref_path.clone(), (readable_ref.clone(), writable_ref.clone()));

        // Variants of a filter-excluded component inherit the exclusion.
        let excluded = ir.excluded.contains(ref_path.as_str());
        if !ir.components.contains_key(&readable_ref) {
            synthesized.push((readable_ref, scoped_variant(schema, Direction::Read), excluded));
        }
        if !ir.components.contains_key(&writable_ref) {
            synthesized.push((writable_ref, scoped_variant(schema, Direction::Write), excluded));
        }
    }

    for (ref_path, schema, excluded) in synthesized {
        if excluded {
            ir.excluded.insert(ref_path.clone());
        }
        ir.components.insert(ref_path, IrComponent::Schema(schema));
    }

    if variants.is_empty() {
        return;
    }

    // Rewrite operation schemas by direction: request bodies write,
    // responses read.
    for methods in ir.paths.values_mut() {
        for operation in methods.values_mut() {
            if let Some(body) = &mut operation.body {
                if let Some(schema) = &mut body.schema {
                    rewrite(schema, &variants, Direction::Write);
                }
            }
            for response in operation.responses.values_mut() {
                if let Some(schema) = &mut response.schema {
                    rewrite(schema, &variants, Direction::Read);
                }
            }
        }
    }
}

fn has_scoped_properties(schema: &IrSchema) -> bool {
    match &schema.kind {
        IrSchemaKind::Object { properties, .. } => properties
            .values()
            .any(|p| p.access_scope != AccessScope::Unscoped),
        _ => false,
    }
}

/// Copy the schema, dropping properties invisible in the given direction
/// and stripping scope markers from the survivors.
fn scoped_variant(schema: &IrSchema, direction: Direction) -> IrSchema {
    let mut variant = schema.clone();
    if let IrSchemaKind::Object {
        properties,
        required,
        ..
    } = &mut variant.kind
    {
        let dropped: Vec<String> = properties
            .iter()
            .filter(|(_, p)| match direction {
                Direction::Read => p.access_scope == AccessScope::Write,
                Direction::Write => p.access_scope == AccessScope::Read,
            })
            .map(|(name, _)| name.clone())
            .collect();

        for name in &dropped {
            properties.shift_remove(name);
            required.shift_remove(name);
        }
        for property in properties.values_mut() {
            property.access_scope = AccessScope::Unscoped;
        }
    }
    variant
}

fn rewrite(schema: &mut IrSchema, variants: &IndexMap<String, (String, String)>, direction: Direction) {
    match &mut schema.kind {
        IrSchemaKind::Ref(ref_path) => {
            if let Some((readable, writable)) = variants.get(ref_path.as_str()) {
                *ref_path = match direction {
                    Direction::Read => readable.clone(),
                    Direction::Write => writable.clone(),
                };
            }
        }
        IrSchemaKind::Object { properties, additional_properties, .. } => {
            for property in properties.values_mut() {
                rewrite(property, variants, direction);
            }
            if let Some(additional) = additional_properties {
                rewrite(additional, variants, direction);
            }
        }
        IrSchemaKind::Array { items, .. }
        | IrSchemaKind::Composite { items, .. }
        | IrSchemaKind::Tuple { items, .. } => {
            for item in items.iter_mut() {
                rewrite(item, variants, direction);
            }
        }
        _ => {}
    }
}
