mod common;

use std::sync::Arc;

use common::*;
use pretty_assertions::assert_eq;
use trellis::model::class::ClassDef;
use trellis::model::expr::{unwrap_value, Application, Expression, InstanceValue};
use trellis::model::types::{GenericType, Multiplicity};
use trellis::model::{NodeRef, Repository};

/// A `new` call whose first argument carries the static type
/// Class<Instantiated> the engine harvests bindings from.
fn new_call(
    repo: &Repository,
    class: &NodeRef,
    instantiated: GenericType,
    name: &str,
    key_expressions: Option<Vec<NodeRef>>,
) -> NodeRef {
    let signature = if key_expressions.is_some() {
        "new_Class_1__String_1__KeyExpression_MANY__T_1_"
    } else {
        "new_Class_1__String_1__T_1_"
    };
    let new_fn = native(repo, signature);
    let class_argument = repo.expression(
        Expression::Value(InstanceValue {
            values: vec![class.clone()],
            generic_type: GenericType::with_arguments(
                class.clone(),
                vec![instantiated],
                vec![],
            ),
            multiplicity: Multiplicity::ONE,
            executable: false,
        }),
        None,
    );
    let mut arguments = vec![class_argument, string(repo, name)];
    if let Some(key_expressions) = key_expressions {
        arguments.push(repo.value_specification(key_expressions));
    }
    repo.expression(
        Expression::Application(Application {
            function: new_fn,
            arguments,
            type_arguments: Vec::new(),
            multiplicity_arguments: Vec::new(),
            generic_type: GenericType::default(),
            multiplicity: Multiplicity::ZERO_MANY,
        }),
        None,
    )
}

#[test]
fn new_builds_a_named_instance() {
    let repo = Arc::new(Repository::new());
    let person = repo.class("Person", ClassDef::new());
    let call = new_call(
        &repo,
        &person,
        GenericType::of(person.clone()),
        "alice",
        None,
    );
    let main = defined(&repo, "main", vec![], vec![call]);
    let result = run(&repo, &main, vec![]).unwrap();
    let instance = unwrap_value(&result).unwrap();
    assert_eq!(instance.name.as_deref(), Some("alice"));
    assert_eq!(
        instance.classifier.as_ref().map(|c| c.id()),
        Some(person.id())
    );
}

#[test]
fn new_applies_key_expressions() {
    let repo = Arc::new(Repository::new());
    let person = repo.class("Person", ClassDef::new());
    let keys = vec![
        repo.key_value("name", vec![repo.string("Alice")]),
        repo.key_value("age", vec![repo.integer(30)]),
    ];
    let call = new_call(
        &repo,
        &person,
        GenericType::of(person.clone()),
        "alice",
        Some(keys),
    );
    let main = defined(&repo, "main", vec![], vec![call]);
    let result = run(&repo, &main, vec![]).unwrap();
    let instance = unwrap_value(&result).unwrap();
    assert_eq!(instance.get_to_many("name").len(), 1);
    assert_eq!(instance.get_to_many("age").len(), 1);
}

#[test]
fn new_records_the_instantiated_generic_type() {
    let repo = Arc::new(Repository::new());
    let box_class = repo.class(
        "Box",
        ClassDef::with_parameters(vec!["T".to_string()], vec![]),
    );
    let instantiated = GenericType::with_arguments(
        box_class.clone(),
        vec![GenericType::of(repo.integer_class.clone())],
        vec![],
    );
    let call = new_call(&repo, &box_class, instantiated, "b", None);
    let main = defined(&repo, "main", vec![], vec![call]);
    let result = run(&repo, &main, vec![]).unwrap();
    let instance = unwrap_value(&result).unwrap();
    let recorded = instance.classifier_generic_type.as_ref().unwrap();
    assert_eq!(
        recorded.type_arguments[0].raw_type.as_ref().map(|t| t.id()),
        Some(repo.integer_class.id())
    );
}

#[test]
fn copy_preserves_state_and_applies_overrides() {
    let repo = Arc::new(Repository::new());
    let person = repo.class("Person", ClassDef::new());
    let alice = repo.instance(&person);
    alice.set_values("name", vec![repo.string("Alice")]);
    alice.set_values("age", vec![repo.integer(30)]);

    let copy_fn = native(&repo, "copy_T_1__String_1__KeyExpression_MANY__T_1_");
    let overrides = repo.value_specification(vec![
        repo.key_value("name", vec![repo.string("Bob")]),
    ]);
    let call = apply(
        &repo,
        &copy_fn,
        vec![
            repo.value_specification(vec![alice.clone()]),
            string(&repo, "bob"),
            overrides,
        ],
    );
    let main = defined(&repo, "main", vec![], vec![call]);
    let result = run(&repo, &main, vec![]).unwrap();
    let copied = unwrap_value(&result).unwrap();

    assert_ne!(copied.id(), alice.id());
    assert_eq!(copied.name.as_deref(), Some("bob"));
    assert!(matches!(
        copied.get_to_one("name").unwrap().primitive_value(),
        Some(trellis::model::PrimitiveValue::String(s)) if s == "Bob"
    ));
    // Untouched properties carry over; the source is unchanged.
    assert_eq!(copied.get_to_many("age").len(), 1);
    assert!(matches!(
        alice.get_to_one("name").unwrap().primitive_value(),
        Some(trellis::model::PrimitiveValue::String(s)) if s == "Alice"
    ));
}

#[test]
fn instance_of_matches_the_classifier() {
    let repo = Arc::new(Repository::new());
    let person = repo.class("Person", ClassDef::new());
    let animal = repo.class("Animal", ClassDef::new());
    let alice = repo.instance(&person);

    let instance_of = native(&repo, "instanceOf_Any_1__Type_1__Boolean_1_");
    let yes = apply(
        &repo,
        &instance_of,
        vec![
            repo.value_specification(vec![alice.clone()]),
            repo.value_specification(vec![person.clone()]),
        ],
    );
    let no = apply(
        &repo,
        &instance_of,
        vec![
            repo.value_specification(vec![alice.clone()]),
            repo.value_specification(vec![animal]),
        ],
    );
    let any = apply(
        &repo,
        &instance_of,
        vec![
            repo.value_specification(vec![alice]),
            repo.value_specification(vec![repo.any_class.clone()]),
        ],
    );
    let main = defined(&repo, "main", vec![], vec![yes]);
    assert!(bool_result(&run(&repo, &main, vec![]).unwrap()));
    let main = defined(&repo, "main2", vec![], vec![no]);
    assert!(!bool_result(&run(&repo, &main, vec![]).unwrap()));
    let main = defined(&repo, "main3", vec![], vec![any]);
    assert!(bool_result(&run(&repo, &main, vec![]).unwrap()));
}
