//! Enum lifting: inline enums nested inside component schemas move to
//! synthesized components, and the original site becomes a reference.

use heck::ToPascalCase;
use indexmap::IndexSet;

use crate::ir::{IrComponent, IrModel, IrSchema, IrSchemaKind};

/// Lift inline enums out of component schemas. Synthesized components are
/// named after their containing schema and property, with a numeric suffix
/// on collision. Running the transform twice is a no-op: lifted sites are
/// references, and top-level enum components are never re-lifted.
pub fn lift_enums(ir: &mut IrModel) {
    let mut used_names: IndexSet<String> = ir
        .components
        .keys()
        .filter_map(|ref_path| ref_path.rsplit('/').next())
        .map(str::to_string)
        .collect();

    let mut synthesized: Vec<(String, IrSchema)> = Vec::new();

    for (ref_path, component) in ir.components.iter_mut() {
        let IrComponent::Schema(schema) = component else {
            continue;
        };
        let parent = ref_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_pascal_case();
        let count_before = synthesized.len();
        // Only nested sites are lifted; a component that *is* an enum
        // already has a name.
        lift_children(schema, &parent, &mut used_names, &mut synthesized);

        // Enums lifted out of a filter-excluded component inherit the
        // exclusion; they still emit transitively when referenced.
        if ir.excluded.contains(ref_path.as_str()) {
            for (lifted_ref, _) in &synthesized[count_before..] {
                ir.excluded.insert(lifted_ref.clone());
            }
        }
    }

    for (ref_path, schema) in synthesized {
        ir.components.insert(ref_path, IrComponent::Schema(schema));
    }
}

fn lift_children(
    schema: &mut IrSchema,
    context_name: &str,
    used_names: &mut IndexSet<String>,
    synthesized: &mut Vec<(String, IrSchema)>,
) {
    match &mut schema.kind {
        IrSchemaKind::Object { properties, .. } => {
            for (property_name, property) in properties.iter_mut() {
                let site_name = format!("{context_name}{}", property_name.to_pascal_case());
                lift_site(property, &site_name, used_names, synthesized);
            }
        }
        IrSchemaKind::Array { items, .. }
        | IrSchemaKind::Composite { items, .. }
        | IrSchemaKind::Tuple { items, .. } => {
            for item in items.iter_mut() {
                lift_site(item, context_name, used_names, synthesized);
            }
        }
        _ => {}
    }
}

/// Replace an inline enum at this site with a reference to a synthesized
/// component; recurse otherwise.
fn lift_site(
    schema: &mut IrSchema,
    site_name: &str,
    used_names: &mut IndexSet<String>,
    synthesized: &mut Vec<(String, IrSchema)>,
) {
    if matches!(schema.kind, IrSchemaKind::Enum { .. }) {
        let name = unique_name(site_name, used_names);
        let ref_path = format!("#/components/schemas/{name}");
        let lifted = std::mem::replace(schema, IrSchema::reference(ref_path.clone()));
        synthesized.push((ref_path, lifted));
    } else {
        lift_children(schema, site_name, used_names, synthesized);
    }
}

fn unique_name(base: &str, used_names: &mut IndexSet<String>) -> String {
    if used_names.insert(base.to_string()) {
        return base.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}{counter}");
        if used_names.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
