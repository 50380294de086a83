use std::cell::RefCell;
use std::rc::Rc;

use apgen_core::config::Config;
use apgen_core::error::{ConfigError, Error};
use apgen_core::events::{Event, EventKind};
use apgen_core::spec::SpecDocument;
use apgen_core::{Context, Orchestrator, Plugin, Subscriptions};

const PETSTORE_31: &str = include_str!("fixtures/petstore-31.yaml");

/// Records every delivered event as `plugin:event[:ref]`.
struct Recorder {
    name: &'static str,
    log: Rc<RefCell<Vec<String>>>,
    fail_on: Option<EventKind>,
}

impl Recorder {
    fn new(name: &'static str, log: Rc<RefCell<Vec<String>>>) -> Self {
        Recorder {
            name,
            log,
            fail_on: None,
        }
    }

    fn failing(name: &'static str, log: Rc<RefCell<Vec<String>>>, fail_on: EventKind) -> Self {
        Recorder {
            name,
            log,
            fail_on: Some(fail_on),
        }
    }
}

impl Plugin for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn setup(
        &mut self,
        _ctx: &mut Context,
        subscriptions: &mut Subscriptions<'_>,
    ) -> Result<(), Error> {
        for kind in [
            EventKind::Before,
            EventKind::Parameter,
            EventKind::RequestBody,
            EventKind::Schema,
            EventKind::Server,
            EventKind::Operation,
            EventKind::After,
        ] {
            subscriptions.subscribe(kind);
        }
        Ok(())
    }

    fn on_event(&mut self, _ctx: &mut Context, event: &Event) -> Result<(), Error> {
        if self.fail_on == Some(event.kind()) {
            return Err(Error::Emission(
                apgen_core::error::EmissionError::UnknownFile("boom".to_string()),
            ));
        }
        let entry = match event {
            Event::Schema { ref_path, .. } => format!("{}:schema:{ref_path}", self.name),
            Event::Parameter { ref_path, .. } => format!("{}:parameter:{ref_path}", self.name),
            Event::RequestBody { ref_path, .. } => {
                format!("{}:requestBody:{ref_path}", self.name)
            }
            Event::Operation { operation } => format!("{}:operation:{}", self.name, operation.id),
            Event::Server { server } => format!("{}:server:{}", self.name, server.url),
            other => format!("{}:{}", self.name, other.kind()),
        };
        self.log.borrow_mut().push(entry);
        Ok(())
    }
}

fn run_pipeline(plugins: Vec<Box<dyn Plugin>>) -> Result<Context, Error> {
    let spec = SpecDocument::from_yaml(PETSTORE_31).expect("fixture should parse");
    let mut ctx = Context::new(Config::default(), spec);
    apgen_core::run(&mut ctx, plugins)?;
    Ok(ctx)
}

#[test]
fn events_arrive_in_pipeline_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    run_pipeline(vec![Box::new(Recorder::new("rec", log.clone()))]).unwrap();

    let entries = log.borrow();
    assert_eq!(
        entries.as_slice(),
        [
            "rec:before",
            "rec:parameter:#/components/parameters/PageLimit",
            "rec:requestBody:#/components/requestBodies/PetBody",
            "rec:schema:#/components/schemas/Pet",
            "rec:schema:#/components/schemas/Petition",
            "rec:schema:#/components/schemas/Owner",
            "rec:schema:#/components/schemas/PetStatus",
            "rec:schema:#/components/schemas/PetReadable",
            "rec:schema:#/components/schemas/PetWritable",
            "rec:server:https://petstore.example.com/v2",
            "rec:operation:listPets",
            "rec:operation:createPet",
            "rec:operation:get_pets_petId",
            "rec:after",
        ]
    );
}

#[test]
fn subscribers_fire_in_plugin_order_per_event() {
    let log = Rc::new(RefCell::new(Vec::new()));
    run_pipeline(vec![
        Box::new(Recorder::new("first", log.clone())),
        Box::new(Recorder::new("second", log.clone())),
    ])
    .unwrap();

    let entries = log.borrow();
    assert_eq!(entries[0], "first:before");
    assert_eq!(entries[1], "second:before");

    // Interleaving holds for every event, not just `before`.
    let first_positions: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.starts_with("first:"))
        .map(|(i, _)| i)
        .collect();
    for position in first_positions {
        assert!(entries[position + 1].starts_with("second:"));
    }
}

#[test]
fn filtered_components_produce_no_events() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let spec = SpecDocument::from_yaml(PETSTORE_31).unwrap();
    let config = Config {
        include: vec!["#/components/schemas/Pet*".to_string()],
        ..Config::default()
    };
    let mut ctx = Context::new(config, spec);
    apgen_core::run(&mut ctx, vec![Box::new(Recorder::new("rec", log.clone()))]).unwrap();

    let entries = log.borrow();
    assert!(entries.iter().any(|e| e.ends_with("schemas/Pet")));
    assert!(entries.iter().any(|e| e.ends_with("schemas/Petition")));
    assert!(!entries.iter().any(|e| e.contains("schemas/Owner")));
    assert!(!entries.iter().any(|e| e.contains("parameters/PageLimit")));
}

#[test]
fn subscriber_failure_halts_delivery() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let result = run_pipeline(vec![
        Box::new(Recorder::failing("fail", log.clone(), EventKind::Operation)),
        Box::new(Recorder::new("rec", log.clone())),
    ]);

    let err = result.expect_err("pipeline should halt");
    match err {
        Error::Broadcast(broadcast) => {
            assert_eq!(broadcast.event, EventKind::Operation);
            assert_eq!(broadcast.plugin, "fail");
        }
        other => panic!("expected broadcast error, got {other:?}"),
    }

    // The failure on the first operation prevents any later delivery: the
    // second plugin never observes an operation event.
    let entries = log.borrow();
    assert!(!entries.iter().any(|e| e.starts_with("rec:operation:")));
    assert!(!entries.iter().any(|e| e.ends_with(":after")));
}

#[test]
fn missing_dependency_fails_before_any_plugin_runs() {
    struct Dependent;
    impl Plugin for Dependent {
        fn name(&self) -> &'static str {
            "dependent"
        }
        fn dependencies(&self) -> Vec<String> {
            vec!["missing".to_string()]
        }
        fn setup(&mut self, _: &mut Context, _: &mut Subscriptions<'_>) -> Result<(), Error> {
            panic!("setup must not run");
        }
        fn on_event(&mut self, _: &mut Context, _: &Event) -> Result<(), Error> {
            unreachable!()
        }
    }

    let err = Orchestrator::new(vec![Box::new(Dependent)])
        .err()
        .expect("must fail");
    assert!(matches!(err, ConfigError::MissingDependency { .. }));
}

#[test]
fn dependency_satisfied_by_earlier_plugin() {
    struct Named(&'static str, Vec<String>);
    impl Plugin for Named {
        fn name(&self) -> &'static str {
            self.0
        }
        fn dependencies(&self) -> Vec<String> {
            self.1.clone()
        }
        fn setup(&mut self, _: &mut Context, _: &mut Subscriptions<'_>) -> Result<(), Error> {
            Ok(())
        }
        fn on_event(&mut self, _: &mut Context, _: &Event) -> Result<(), Error> {
            Ok(())
        }
    }

    let orchestrator = Orchestrator::new(vec![
        Box::new(Named("base", Vec::new())),
        Box::new(Named("dependent", vec!["base".to_string()])),
    ]);
    assert!(orchestrator.is_ok());
}
