use apgen_core::config::Config;
use apgen_core::ir::{AccessScope, HttpMethod, IrSchemaKind};
use apgen_core::parse;
use apgen_core::spec::SpecDocument;
use apgen_core::transform::{lift_enums, split_read_write};
use apgen_core::Context;

const PETSTORE_31: &str = include_str!("fixtures/petstore-31.yaml");

fn parsed(input: &str) -> Context {
    let spec = SpecDocument::from_yaml(input).expect("fixture should parse");
    let mut ctx = Context::new(Config::default(), spec);
    parse::parse(&mut ctx).expect("parse should succeed");
    ctx
}

#[test]
fn enum_lift_moves_inline_enums_to_components() {
    let mut ctx = parsed(PETSTORE_31);
    lift_enums(&mut ctx.ir);

    // The inline status enum becomes a component named after its site.
    let status = ctx
        .ir
        .schema("#/components/schemas/PetStatus")
        .expect("lifted enum component");
    match &status.kind {
        IrSchemaKind::Enum { members } => assert_eq!(members.len(), 3),
        other => panic!("expected enum, got {other:?}"),
    }

    // The original site now references it.
    let pet = ctx.ir.schema("#/components/schemas/Pet").unwrap();
    let IrSchemaKind::Object { properties, .. } = &pet.kind else {
        panic!("Pet should be an object");
    };
    assert_eq!(
        properties["status"].as_ref_path(),
        Some("#/components/schemas/PetStatus")
    );
}

#[test]
fn enum_lift_is_idempotent() {
    let mut ctx = parsed(PETSTORE_31);
    lift_enums(&mut ctx.ir);
    let once = ctx.ir.clone();
    lift_enums(&mut ctx.ir);
    assert_eq!(ctx.ir, once);
}

#[test]
fn read_write_split_synthesizes_variants() {
    let mut ctx = parsed(PETSTORE_31);
    split_read_write(&mut ctx.ir);

    let readable = ctx
        .ir
        .schema("#/components/schemas/PetReadable")
        .expect("readable variant");
    let IrSchemaKind::Object { properties, .. } = &readable.kind else {
        panic!("readable variant should be an object");
    };
    // Write-only properties are dropped; scope markers are stripped.
    assert!(!properties.contains_key("secret"));
    assert!(properties.contains_key("tag"));
    assert!(properties
        .values()
        .all(|p| p.access_scope == AccessScope::Unscoped));

    let writable = ctx
        .ir
        .schema("#/components/schemas/PetWritable")
        .expect("writable variant");
    let IrSchemaKind::Object { properties, .. } = &writable.kind else {
        panic!("writable variant should be an object");
    };
    assert!(!properties.contains_key("tag"));
    assert!(properties.contains_key("secret"));
}

#[test]
fn read_write_split_rewrites_operations_by_direction() {
    let mut ctx = parsed(PETSTORE_31);
    split_read_write(&mut ctx.ir);

    // Request bodies point at the writable variant.
    let post = &ctx.ir.paths["/pets"][&HttpMethod::Post];
    assert_eq!(
        post.body
            .as_ref()
            .and_then(|b| b.schema.as_ref())
            .and_then(|s| s.as_ref_path()),
        Some("#/components/schemas/PetWritable")
    );

    // Responses point at the readable variant, including nested sites.
    let created = &post.responses["201"];
    assert_eq!(
        created.schema.as_ref().and_then(|s| s.as_ref_path()),
        Some("#/components/schemas/PetReadable")
    );

    let list = &ctx.ir.paths["/pets"][&HttpMethod::Get];
    let ok = &list.responses["200"];
    match &ok.schema.as_ref().unwrap().kind {
        IrSchemaKind::Array { items, .. } => {
            assert_eq!(
                items[0].as_ref_path(),
                Some("#/components/schemas/PetReadable")
            );
        }
        other => panic!("expected array response, got {other:?}"),
    }
}

#[test]
fn read_write_split_is_idempotent() {
    let mut ctx = parsed(PETSTORE_31);
    split_read_write(&mut ctx.ir);
    let once = ctx.ir.clone();
    split_read_write(&mut ctx.ir);
    assert_eq!(ctx.ir, once);
}

#[test]
fn transforms_do_not_touch_the_source_spec() {
    let mut ctx = parsed(PETSTORE_31);
    let before = ctx.spec.root.clone();
    lift_enums(&mut ctx.ir);
    split_read_write(&mut ctx.ir);
    assert_eq!(ctx.spec.root, before);
}
