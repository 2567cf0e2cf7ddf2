// The native library. Each native is a unit struct implementing
// `NativeFunction`, registered under its full signature string. `install`
// wires the whole platform library into a registry map.

pub mod asserts;
pub mod boolean;
pub mod collection;
pub mod lang;
pub mod math;
pub mod string;

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::model::expr::{unwrap_value, unwrap_values};
use crate::model::node::{NodeRef, PrimitiveValue, SourceInfo};
use crate::runtime::context::VariableContext;
use crate::runtime::error::{ErrorKind, RuntimeError, RuntimeResult};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::resolution::ResolutionStacks;

pub trait NativeFunction: Send + Sync {
    /// How many arguments the registered signature(s) take. Dispatch rejects
    /// an application outside this range before `execute` runs, so
    /// implementations may index their parameters directly.
    fn arity(&self) -> RangeInclusive<usize>;

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        context: &Arc<VariableContext>,
        call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef>;

    /// When true the engine hands over the raw argument expressions instead
    /// of evaluating them first. Control-flow natives use this to evaluate
    /// lazily.
    fn defer_parameter_execution(&self) -> bool {
        false
    }
}

pub type NativeRegistry = HashMap<String, Arc<dyn NativeFunction>>;

pub fn install() -> NativeRegistry {
    let mut registry = NativeRegistry::new();
    boolean::install(&mut registry);
    math::install(&mut registry);
    collection::install(&mut registry);
    string::install(&mut registry);
    lang::install(&mut registry);
    asserts::install(&mut registry);
    log::debug!("installed {} platform natives", registry.len());
    registry
}

pub(crate) fn register(
    registry: &mut NativeRegistry,
    signature: &str,
    native: impl NativeFunction + 'static,
) {
    registry.insert(signature.to_string(), Arc::new(native));
}

// Argument extraction. Parameters arrive as value carriers; these unwrap one
// level and check the primitive payload.

pub(crate) fn one_value(parameter: &NodeRef, operation: &str) -> RuntimeResult<NodeRef> {
    unwrap_value(parameter).ok_or_else(|| {
        RuntimeError::new(ErrorKind::TypeError {
            expected: "exactly one value".to_string(),
            actual: "empty collection".to_string(),
            operation: operation.to_string(),
        })
    })
}

pub(crate) fn many_values(parameter: &NodeRef) -> Vec<NodeRef> {
    unwrap_values(parameter)
}

pub(crate) fn boolean_value(parameter: &NodeRef, operation: &str) -> RuntimeResult<bool> {
    let value = one_value(parameter, operation)?;
    match value.primitive_value() {
        Some(PrimitiveValue::Boolean(b)) => Ok(*b),
        _ => Err(type_error("Boolean", &value, operation)),
    }
}

pub(crate) fn integer_value(parameter: &NodeRef, operation: &str) -> RuntimeResult<i64> {
    let value = one_value(parameter, operation)?;
    match value.primitive_value() {
        Some(PrimitiveValue::Integer(i)) => Ok(*i),
        _ => Err(type_error("Integer", &value, operation)),
    }
}

pub(crate) fn string_value(parameter: &NodeRef, operation: &str) -> RuntimeResult<String> {
    let value = one_value(parameter, operation)?;
    match value.primitive_value() {
        Some(PrimitiveValue::String(s)) => Ok(s.clone()),
        _ => Err(type_error("String", &value, operation)),
    }
}

/// Numeric payload with Integer-to-Float promotion left to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Integer(i64),
    Float(f64),
}

impl Numeric {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Numeric::Integer(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }
}

pub(crate) fn numeric_of(value: &NodeRef, operation: &str) -> RuntimeResult<Numeric> {
    match value.primitive_value() {
        Some(PrimitiveValue::Integer(i)) => Ok(Numeric::Integer(*i)),
        Some(PrimitiveValue::Float(f)) => Ok(Numeric::Float(f.into_inner())),
        _ => Err(type_error("Number", value, operation)),
    }
}

pub(crate) fn numeric_value(parameter: &NodeRef, operation: &str) -> RuntimeResult<Numeric> {
    numeric_of(&one_value(parameter, operation)?, operation)
}

fn type_error(expected: &str, actual: &NodeRef, operation: &str) -> RuntimeError {
    RuntimeError::new(ErrorKind::TypeError {
        expected: expected.to_string(),
        actual: actual.describe(),
        operation: operation.to_string(),
    })
}
