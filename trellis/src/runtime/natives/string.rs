// String natives.

use std::ops::RangeInclusive;
use std::sync::Arc;

use itertools::Itertools;

use crate::model::node::{NodeRef, PrimitiveValue, SourceInfo};
use crate::runtime::context::VariableContext;
use crate::runtime::error::RuntimeResult;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::natives::{
    many_values, register, string_value, NativeFunction, NativeRegistry,
};
use crate::runtime::resolution::ResolutionStacks;

pub fn install(registry: &mut NativeRegistry) {
    register(registry, "toUpper_String_1__String_1_", ToUpper);
    register(registry, "toLower_String_1__String_1_", ToLower);
    register(registry, "length_String_1__Integer_1_", Length);
    register(
        registry,
        "joinStrings_String_MANY__String_1__String_1_",
        JoinStrings,
    );
}

fn string_result(interpreter: &Interpreter, value: String) -> NodeRef {
    interpreter
        .repository()
        .value_specification(vec![interpreter.repository().string(value)])
}

struct ToUpper;

impl NativeFunction for ToUpper {
    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let value = string_value(&parameters[0], "toUpper")?;
        Ok(string_result(interpreter, value.to_uppercase()))
    }
}

struct ToLower;

impl NativeFunction for ToLower {
    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let value = string_value(&parameters[0], "toLower")?;
        Ok(string_result(interpreter, value.to_lowercase()))
    }
}

/// Length in characters, not bytes.
struct Length;

impl NativeFunction for Length {
    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let value = string_value(&parameters[0], "length")?;
        let length = value.chars().count() as i64;
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().integer(length)]))
    }
}

struct JoinStrings;

impl NativeFunction for JoinStrings {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let separator = string_value(&parameters[1], "joinStrings")?;
        let joined = many_values(&parameters[0])
            .iter()
            .map(|value| match value.primitive_value() {
                Some(PrimitiveValue::String(s)) => s.clone(),
                _ => value.describe(),
            })
            .join(&separator);
        Ok(string_result(interpreter, joined))
    }
}
