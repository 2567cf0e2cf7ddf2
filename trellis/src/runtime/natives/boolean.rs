// Boolean natives. Conjunction and disjunction defer their arguments so the
// right operand only runs when it can still change the result.

use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::model::node::{NodeRef, SourceInfo};
use crate::runtime::context::VariableContext;
use crate::runtime::equality;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::natives::{
    boolean_value, many_values, one_value, register, NativeFunction, NativeRegistry,
};
use crate::runtime::resolution::ResolutionStacks;
use crate::runtime::error::RuntimeResult;

pub fn install(registry: &mut NativeRegistry) {
    register(registry, "and_Boolean_1__Boolean_1__Boolean_1_", And);
    register(registry, "or_Boolean_1__Boolean_1__Boolean_1_", Or);
    register(registry, "not_Boolean_1__Boolean_1_", Not);
    register(registry, "eq_Any_1__Any_1__Boolean_1_", Eq);
    register(registry, "equal_Any_MANY__Any_MANY__Boolean_1_", Equal);
    register(registry, "is_Any_1__Any_1__Boolean_1_", Is);
}

struct And;

impl NativeFunction for And {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn defer_parameter_execution(&self) -> bool {
        true
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let left = interpreter.execute_expression(&parameters[0], context, stacks)?;
        if !boolean_value(&left, "and")? {
            return Ok(interpreter.repository().value_specification(vec![
                interpreter.repository().boolean(false),
            ]));
        }
        let right = interpreter.execute_expression(&parameters[1], context, stacks)?;
        let result = boolean_value(&right, "and")?;
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(result)]))
    }
}

struct Or;

impl NativeFunction for Or {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn defer_parameter_execution(&self) -> bool {
        true
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let left = interpreter.execute_expression(&parameters[0], context, stacks)?;
        if boolean_value(&left, "or")? {
            return Ok(interpreter.repository().value_specification(vec![
                interpreter.repository().boolean(true),
            ]));
        }
        let right = interpreter.execute_expression(&parameters[1], context, stacks)?;
        let result = boolean_value(&right, "or")?;
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(result)]))
    }
}

struct Not;

impl NativeFunction for Not {
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
        let value = boolean_value(&parameters[0], "not")?;
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(!value)]))
    }
}

struct Eq;

impl NativeFunction for Eq {
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
        let left = one_value(&parameters[0], "eq")?;
        let right = one_value(&parameters[1], "eq")?;
        let result = equality::eq(&left, &right);
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(result)]))
    }
}

struct Equal;

impl NativeFunction for Equal {
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
        let left = many_values(&parameters[0]);
        let right = many_values(&parameters[1]);
        let result = equality::equal_many(&left, &right, None);
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(result)]))
    }
}

/// Strict identity, never structural.
struct Is;

impl NativeFunction for Is {
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
        let left = one_value(&parameters[0], "is")?;
        let right = one_value(&parameters[1], "is")?;
        let result = left.id() == right.id();
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(result)]))
    }
}
