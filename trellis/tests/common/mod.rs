#![allow(dead_code)]

use std::sync::Arc;

use trellis::model::expr::{unwrap_values, Application, Expression, InstanceValue};
use trellis::model::function::{
    Function, FunctionDefinition, LambdaFunction,
};
use trellis::model::node::{NodeRef, PrimitiveValue, SourceInfo};
use trellis::model::types::{FunctionType, GenericType, Multiplicity, Parameter};
use trellis::model::Repository;
use trellis::runtime::{Interpreter, RuntimeResult};

pub fn native(repo: &Repository, signature: &str) -> NodeRef {
    repo.function(
        None,
        Function::Native {
            signature: signature.to_string(),
            function_type: FunctionType::default(),
        },
    )
}

pub fn apply(repo: &Repository, function: &NodeRef, arguments: Vec<NodeRef>) -> NodeRef {
    repo.application(function.clone(), arguments, None)
}

pub fn apply_at(
    repo: &Repository,
    function: &NodeRef,
    arguments: Vec<NodeRef>,
    source: SourceInfo,
) -> NodeRef {
    repo.application(function.clone(), arguments, Some(source))
}

pub fn apply_generic(
    repo: &Repository,
    function: &NodeRef,
    arguments: Vec<NodeRef>,
    type_arguments: Vec<GenericType>,
) -> NodeRef {
    repo.expression(
        Expression::Application(Application {
            function: function.clone(),
            arguments,
            type_arguments,
            multiplicity_arguments: Vec::new(),
            generic_type: GenericType::default(),
            multiplicity: Multiplicity::ZERO_MANY,
        }),
        None,
    )
}

pub fn int(repo: &Repository, value: i64) -> NodeRef {
    repo.value_specification(vec![repo.integer(value)])
}

pub fn ints(repo: &Repository, values: &[i64]) -> NodeRef {
    repo.value_specification(values.iter().map(|v| repo.integer(*v)).collect())
}

pub fn boolean(repo: &Repository, value: bool) -> NodeRef {
    repo.value_specification(vec![repo.boolean(value)])
}

pub fn string(repo: &Repository, value: &str) -> NodeRef {
    repo.value_specification(vec![repo.string(value)])
}

/// An executable value carrier; lambdas placed in one capture their scope
/// when it evaluates.
pub fn executable_values(repo: &Repository, values: Vec<NodeRef>) -> NodeRef {
    repo.expression(
        Expression::Value(InstanceValue {
            values,
            generic_type: GenericType::default(),
            multiplicity: Multiplicity::ZERO_MANY,
            executable: true,
        }),
        None,
    )
}

pub fn parameter(name: &str) -> Parameter {
    Parameter::new(name, GenericType::default(), Multiplicity::ONE)
}

pub fn defined(
    repo: &Repository,
    name: &str,
    parameters: Vec<Parameter>,
    body: Vec<NodeRef>,
) -> NodeRef {
    repo.function(
        Some(name.to_string()),
        Function::Defined(FunctionDefinition {
            name: name.to_string(),
            function_type: FunctionType {
                parameters,
                ..FunctionType::default()
            },
            body,
            pre_constraints: Vec::new(),
            post_constraints: Vec::new(),
        }),
    )
}

pub fn generic_defined(
    repo: &Repository,
    name: &str,
    type_parameters: Vec<String>,
    parameters: Vec<Parameter>,
    body: Vec<NodeRef>,
) -> NodeRef {
    repo.function(
        Some(name.to_string()),
        Function::Defined(FunctionDefinition {
            name: name.to_string(),
            function_type: FunctionType {
                parameters,
                type_parameters,
                ..FunctionType::default()
            },
            body,
            pre_constraints: Vec::new(),
            post_constraints: Vec::new(),
        }),
    )
}

pub fn lambda(
    repo: &Repository,
    parameters: Vec<Parameter>,
    body: Vec<NodeRef>,
    open_variables: &[&str],
) -> NodeRef {
    repo.function(
        None,
        Function::Lambda(LambdaFunction {
            function_type: FunctionType {
                parameters,
                ..FunctionType::default()
            },
            body,
            open_variables: open_variables.iter().map(|v| v.to_string()).collect(),
        }),
    )
}

pub fn run(
    repo: &Arc<Repository>,
    function: &NodeRef,
    arguments: Vec<NodeRef>,
) -> RuntimeResult<NodeRef> {
    Interpreter::new(repo.clone()).start(function, arguments)
}

pub fn int_result(result: &NodeRef) -> i64 {
    match unwrap_values(result).as_slice() {
        [value] => match value.primitive_value() {
            Some(PrimitiveValue::Integer(i)) => *i,
            other => panic!("expected an integer, got {other:?}"),
        },
        other => panic!("expected one value, got {}", other.len()),
    }
}

pub fn ints_result(result: &NodeRef) -> Vec<i64> {
    unwrap_values(result)
        .iter()
        .map(|value| match value.primitive_value() {
            Some(PrimitiveValue::Integer(i)) => *i,
            other => panic!("expected an integer, got {other:?}"),
        })
        .collect()
}

pub fn bool_result(result: &NodeRef) -> bool {
    match unwrap_values(result).as_slice() {
        [value] => match value.primitive_value() {
            Some(PrimitiveValue::Boolean(b)) => *b,
            other => panic!("expected a boolean, got {other:?}"),
        },
        other => panic!("expected one value, got {}", other.len()),
    }
}

pub fn string_result(result: &NodeRef) -> String {
    match unwrap_values(result).as_slice() {
        [value] => match value.primitive_value() {
            Some(PrimitiveValue::String(s)) => s.clone(),
            other => panic!("expected a string, got {other:?}"),
        },
        other => panic!("expected one value, got {}", other.len()),
    }
}
