use apgen_core::config::Config;
use apgen_core::ir::{
    AccessScope, HttpMethod, IrComponent, IrSchemaKind, LogicalOperator,
};
use apgen_core::parse;
use apgen_core::spec::{Dialect, SpecDocument};
use apgen_core::Context;

const PETSTORE_31: &str = include_str!("fixtures/petstore-31.yaml");
const PETSTORE_30: &str = include_str!("fixtures/petstore-30.yaml");
const PETSTORE_20: &str = include_str!("fixtures/petstore-20.yaml");

fn parse_with_config(input: &str, config: Config) -> Context {
    let spec = SpecDocument::from_yaml(input).expect("fixture should parse");
    let mut ctx = Context::new(config, spec);
    parse::parse(&mut ctx).expect("parse should succeed");
    ctx
}

fn parsed(input: &str) -> Context {
    parse_with_config(input, Config::default())
}

#[test]
fn components_keep_insertion_order_grouped_by_kind() {
    let ctx = parsed(PETSTORE_31);
    let refs: Vec<&str> = ctx.ir.components.keys().map(String::as_str).collect();
    assert_eq!(
        refs,
        [
            "#/components/parameters/PageLimit",
            "#/components/requestBodies/PetBody",
            "#/components/schemas/Pet",
            "#/components/schemas/Petition",
            "#/components/schemas/Owner",
        ]
    );
}

#[test]
fn v31_schema_normalization() {
    let ctx = parsed(PETSTORE_31);
    let pet = ctx.ir.schema("#/components/schemas/Pet").expect("Pet");

    let IrSchemaKind::Object {
        properties,
        required,
        ..
    } = &pet.kind
    else {
        panic!("Pet should be an object");
    };

    assert!(required.contains("id"));
    assert!(!required.contains("name"));

    match &properties["id"].kind {
        IrSchemaKind::Number { integer, format, .. } => {
            assert!(integer);
            assert_eq!(format.as_deref(), Some("int64"));
        }
        other => panic!("id should be a number, got {other:?}"),
    }

    match &properties["name"].kind {
        IrSchemaKind::String { min_length, .. } => assert_eq!(*min_length, Some(1)),
        other => panic!("name should be a string, got {other:?}"),
    }

    assert_eq!(properties["tag"].access_scope, AccessScope::Read);
    assert_eq!(properties["secret"].access_scope, AccessScope::Write);

    match &properties["status"].kind {
        IrSchemaKind::Enum { members } => assert_eq!(members.len(), 3),
        other => panic!("status should be an enum, got {other:?}"),
    }
}

#[test]
fn v31_operations_and_bodies() {
    let ctx = parsed(PETSTORE_31);

    let post = &ctx.ir.paths["/pets"][&HttpMethod::Post];
    assert_eq!(post.id, "createPet");
    let body = post.body.as_ref().expect("createPet should have a body");
    assert!(body.required);
    assert_eq!(
        body.schema.as_ref().and_then(|s| s.as_ref_path()),
        Some("#/components/schemas/Pet")
    );

    let get = &ctx.ir.paths["/pets"][&HttpMethod::Get];
    assert_eq!(get.id, "listPets");
    assert!(get.parameters.query.contains_key("limit"));
}

#[test]
fn method_parameters_win_over_path_item_parameters() {
    let ctx = parsed(PETSTORE_31);
    let get = &ctx.ir.paths["/pets/{petId}"][&HttpMethod::Get];

    // The path item requires `version`; the method relaxes it.
    let version = &get.parameters.header["version"];
    assert!(!version.required);

    // Path-item-only parameters survive the merge.
    let pet_id = &get.parameters.path["petId"];
    assert!(pet_id.required);
}

#[test]
fn operation_ids_synthesize_when_missing() {
    let ctx = parsed(PETSTORE_31);
    let get = &ctx.ir.paths["/pets/{petId}"][&HttpMethod::Get];
    assert_eq!(get.id, "get_pets_petId");
}

#[test]
fn servers_are_ordered() {
    let ctx = parsed(PETSTORE_31);
    assert_eq!(ctx.ir.servers.len(), 1);
    assert_eq!(ctx.ir.servers[0].url, "https://petstore.example.com/v2");
    assert_eq!(ctx.ir.servers[0].description.as_deref(), Some("Production"));
}

#[test]
fn v30_nullable_widens_to_union_with_null() {
    let ctx = parsed(PETSTORE_30);
    let pet = ctx.ir.schema("#/components/schemas/Pet").expect("Pet");
    let IrSchemaKind::Object { properties, .. } = &pet.kind else {
        panic!("Pet should be an object");
    };

    match &properties["nickname"].kind {
        IrSchemaKind::Composite {
            items,
            logical_operator,
        } => {
            assert_eq!(*logical_operator, LogicalOperator::Or);
            assert_eq!(items.len(), 2);
            assert!(items.iter().any(|i| i.is_null()));
        }
        other => panic!("nickname should be a union with null, got {other:?}"),
    }
}

#[test]
fn v30_boolean_exclusive_bounds() {
    let ctx = parsed(PETSTORE_30);
    let pet = ctx.ir.schema("#/components/schemas/Pet").expect("Pet");
    let IrSchemaKind::Object { properties, .. } = &pet.kind else {
        panic!("Pet should be an object");
    };

    match &properties["age"].kind {
        IrSchemaKind::Number {
            minimum,
            exclusive_minimum,
            ..
        } => {
            assert_eq!(*minimum, None);
            assert_eq!(*exclusive_minimum, Some(0.0));
        }
        other => panic!("age should be a number, got {other:?}"),
    }
}

#[test]
fn v30_nullable_enum_gains_null_member() {
    let ctx = parsed(PETSTORE_30);
    let status = ctx.ir.schema("#/components/schemas/Status").expect("Status");
    match &status.kind {
        IrSchemaKind::Enum { members } => {
            assert_eq!(members.len(), 4);
            assert!(members.iter().any(|m| m.is_null()));
        }
        other => panic!("Status should be an enum, got {other:?}"),
    }
}

#[test]
fn v2_definitions_use_legacy_refs() {
    let ctx = parsed(PETSTORE_20);
    assert_eq!(ctx.spec.dialect, Dialect::V2);
    assert!(ctx.ir.schema("#/definitions/Pet").is_some());

    let pet = ctx.ir.schema("#/definitions/Pet").expect("Pet");
    let IrSchemaKind::Object { properties, .. } = &pet.kind else {
        panic!("Pet should be an object");
    };
    assert_eq!(
        properties["owner"].as_ref_path(),
        Some("#/definitions/Owner")
    );
}

#[test]
fn v2_servers_synthesized_from_host_and_schemes() {
    let ctx = parsed(PETSTORE_20);
    let urls: Vec<&str> = ctx.ir.servers.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(
        urls,
        ["https://petstore.example.com/v1", "http://petstore.example.com/v1"]
    );
}

#[test]
fn v2_body_parameter_becomes_request_body() {
    let ctx = parsed(PETSTORE_20);
    let post = &ctx.ir.paths["/pets"][&HttpMethod::Post];
    let body = post.body.as_ref().expect("createPet should have a body");
    assert!(body.required);
    assert_eq!(
        body.schema.as_ref().and_then(|s| s.as_ref_path()),
        Some("#/definitions/Pet")
    );

    // The body parameter must not appear in a parameter group.
    assert!(post.parameters.is_empty());
}

#[test]
fn v2_referenced_parameters_resolve() {
    let ctx = parsed(PETSTORE_20);
    let get = &ctx.ir.paths["/pets"][&HttpMethod::Get];
    assert!(get.parameters.query.contains_key("limit"));

    match ctx.ir.component("#/parameters/PageLimit") {
        Some(IrComponent::Parameter(p)) => assert_eq!(p.name, "limit"),
        other => panic!("expected parameter component, got {other:?}"),
    }
}

#[test]
fn include_filters_mark_components_excluded() {
    let config = Config {
        include: vec!["#/components/schemas/Pet*".to_string()],
        ..Config::default()
    };
    let ctx = parse_with_config(PETSTORE_31, config);

    // Everything is parsed so transitive references still resolve.
    assert!(ctx.ir.schema("#/components/schemas/Owner").is_some());

    assert!(!ctx.ir.excluded.contains("#/components/schemas/Pet"));
    assert!(!ctx.ir.excluded.contains("#/components/schemas/Petition"));
    assert!(ctx.ir.excluded.contains("#/components/schemas/Owner"));

    // The include list targets the schemas section only; other sections
    // stay accept-all.
    assert!(!ctx.ir.excluded.contains("#/components/parameters/PageLimit"));
}

#[test]
fn unknown_schema_entries_degrade_without_strict() {
    let yaml = r##"
openapi: "3.1.0"
info: { title: T, version: "1" }
components:
  schemas:
    Weird:
      type: 12
paths: {}
"##;
    let spec = SpecDocument::from_yaml(yaml).unwrap();
    let mut ctx = Context::new(Config::default(), spec);
    parse::parse(&mut ctx).expect("non-strict parse should succeed");

    let weird = ctx.ir.schema("#/components/schemas/Weird").expect("Weird");
    assert_eq!(weird.kind, IrSchemaKind::Unknown);
}

#[test]
fn strict_mode_escalates_degraded_entries() {
    let yaml = r##"
openapi: "3.1.0"
info: { title: T, version: "1" }
components:
  schemas:
    Weird:
      type: 12
paths: {}
"##;
    let spec = SpecDocument::from_yaml(yaml).unwrap();
    let mut config = Config::default();
    config.parser.strict = true;
    let mut ctx = Context::new(config, spec);
    assert!(parse::parse(&mut ctx).is_err());
}
