use apgen_core::config::Config;
use apgen_core::spec::SpecDocument;
use apgen_core::{Context, Plugin};
use apgen_typescript::{TypeScriptConfig, TypeScriptPlugin};
use apgen_zod::{ZodConfig, ZodPlugin};

const PETSTORE_31: &str = include_str!("../../apgen-core/tests/fixtures/petstore-31.yaml");

fn run_plugins(yaml: &str, config: Config, plugins: Vec<Box<dyn Plugin>>) -> Context {
    let spec = SpecDocument::from_yaml(yaml).expect("fixture should parse");
    let mut ctx = Context::new(config, spec);
    apgen_core::run(&mut ctx, plugins).expect("pipeline should succeed");
    ctx
}

fn run_typescript(yaml: &str) -> Context {
    run_plugins(
        yaml,
        Config::default(),
        vec![Box::new(TypeScriptPlugin::new(TypeScriptConfig::default()))],
    )
}

#[test]
fn emits_type_declarations_for_components() {
    let ctx = run_typescript(PETSTORE_31);
    let types = ctx.files.file("types").expect("types file").render();

    assert!(types.contains("export type Pet = {"));
    assert!(types.contains("id: bigint"));
    assert!(types.contains("name?: string"));
    assert!(types.contains("export type Owner = {"));
    assert!(types.contains("pets?: Pet[]"));
}

#[test]
fn lifted_enum_becomes_named_union_type() {
    let ctx = run_typescript(PETSTORE_31);
    let types = ctx.files.file("types").expect("types file").render();

    assert!(types.contains("export type PetStatus = \"available\" | \"pending\" | \"sold\";"));
    assert!(types.contains("status?: PetStatus"));
}

#[test]
fn client_renders_operations() {
    let ctx = run_typescript(PETSTORE_31);
    let client = ctx.files.file("client").expect("client file").render();

    assert!(client.contains("export class ApiClient"));
    assert!(client.contains("async listPets("));
    assert!(client.contains("async createPet("));
    assert!(client.contains("async getPetsPetId("));

    // Path parameters interpolate with bracket access.
    assert!(client.contains("`/pets/${params.path[\"petId\"]}`"));

    // The default base URL comes from the first server.
    assert!(client.contains("\"https://petstore.example.com/v2\""));

    // Referenced component types resolve through the namespace import.
    assert!(client.contains("import type * as models from \"./types.gen\";"));
    assert!(client.contains("models.PetWritable"));
    assert!(client.contains("Promise<models.PetReadable[]>"));
}

#[test]
fn void_responses_return_void() {
    let yaml = r##"
openapi: "3.1.0"
info: { title: T, version: "1" }
paths:
  /ping:
    get:
      operationId: ping
      responses:
        "204":
          description: no content
"##;
    let ctx = run_typescript(yaml);
    let client = ctx.files.file("client").expect("client file").render();
    assert!(client.contains("async ping(): Promise<void>"));
}

#[test]
fn type_and_value_namespaces_are_independent() {
    // Both plugins own files with the same base names for components; the
    // per-file namespace split keeps emission collision-free.
    let plugins: Vec<Box<dyn Plugin>> = vec![
        Box::new(TypeScriptPlugin::new(TypeScriptConfig::default())),
        Box::new(ZodPlugin::new(ZodConfig::default())),
    ];
    let ctx = run_plugins(PETSTORE_31, Config::default(), plugins);

    let types = ctx.files.file("types").expect("types file").render();
    let zod = ctx.files.file("zod").expect("zod file").render();

    assert!(types.contains("export type Pet ="));
    assert!(zod.contains("export const Pet ="));
}

#[test]
fn two_plugin_runs_are_byte_identical() {
    let render_all = || {
        let plugins: Vec<Box<dyn Plugin>> = vec![
            Box::new(TypeScriptPlugin::new(TypeScriptConfig::default())),
            Box::new(ZodPlugin::new(ZodConfig::default())),
        ];
        let ctx = run_plugins(PETSTORE_31, Config::default(), plugins);
        ctx.files
            .iter()
            .map(|file| format!("// {}\n{}", file.path, file.render()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let first = render_all();
    let second = render_all();
    assert_eq!(first, second);
    assert!(first.contains("types.gen.ts"));
    assert!(first.contains("zod.gen.ts"));
    assert!(first.contains("client.gen.ts"));
}
