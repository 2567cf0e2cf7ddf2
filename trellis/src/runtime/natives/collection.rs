// Collection natives. `map` and `filter` call back into the engine through
// `execute_lambda`, so closures passed to them see their captured scope.

use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::model::node::{NodeRef, SourceInfo};
use crate::runtime::context::VariableContext;
use crate::runtime::equality::NodeSet;
use crate::runtime::error::{ErrorKind, RuntimeError, RuntimeResult};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::natives::{
    boolean_value, integer_value, many_values, one_value, register, NativeFunction, NativeRegistry,
};
use crate::runtime::resolution::ResolutionStacks;

pub fn install(registry: &mut NativeRegistry) {
    register(registry, "size_Any_MANY__Integer_1_", Size);
    register(registry, "isEmpty_Any_MANY__Boolean_1_", IsEmpty);
    register(registry, "first_T_MANY__T_$0_1$_", First);
    register(registry, "at_T_MANY__Integer_1__T_1_", At);
    register(registry, "concatenate_T_MANY__T_MANY__T_MANY_", Concatenate);
    register(registry, "removeDuplicates_T_MANY__T_MANY_", RemoveDuplicates);
    register(registry, "contains_Any_MANY__Any_1__Boolean_1_", Contains);
    register(registry, "map_T_m__Function_1__V_m_", Map);
    register(registry, "filter_T_MANY__Function_1__T_MANY_", Filter);
}

struct Size;

impl NativeFunction for Size {
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
        let size = many_values(&parameters[0]).len() as i64;
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().integer(size)]))
    }
}

struct IsEmpty;

impl NativeFunction for IsEmpty {
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
        let empty = many_values(&parameters[0]).is_empty();
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(empty)]))
    }
}

/// First element, or an empty collection.
struct First;

impl NativeFunction for First {
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
        let values = many_values(&parameters[0]);
        let first = values.into_iter().next().into_iter().collect();
        Ok(interpreter.repository().value_specification(first))
    }
}

struct At;

impl NativeFunction for At {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let values = many_values(&parameters[0]);
        let index = integer_value(&parameters[1], "at")?;
        let element = usize::try_from(index)
            .ok()
            .and_then(|i| values.get(i).cloned())
            .ok_or_else(|| {
                RuntimeError::with_source(
                    ErrorKind::IndexOutOfBounds {
                        index,
                        size: values.len(),
                    },
                    call_site.cloned(),
                )
            })?;
        Ok(interpreter.repository().value_specification(vec![element]))
    }
}

struct Concatenate;

impl NativeFunction for Concatenate {
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
        let mut values = many_values(&parameters[0]);
        values.extend(many_values(&parameters[1]));
        Ok(interpreter.repository().value_specification(values))
    }
}

/// Keeps the first occurrence of each structurally distinct element.
struct RemoveDuplicates;

impl NativeFunction for RemoveDuplicates {
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
        let mut seen = NodeSet::new();
        let mut kept = Vec::new();
        for value in many_values(&parameters[0]) {
            if seen.insert(value.clone()) {
                kept.push(value);
            }
        }
        Ok(interpreter.repository().value_specification(kept))
    }
}

struct Contains;

impl NativeFunction for Contains {
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
        let mut set = NodeSet::new();
        for value in many_values(&parameters[0]) {
            set.insert(value);
        }
        let needle = one_value(&parameters[1], "contains")?;
        let result = set.contains(&needle);
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(result)]))
    }
}

struct Map;

impl NativeFunction for Map {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let function = one_value(&parameters[1], "map")?;
        let mut results = Vec::new();
        for value in many_values(&parameters[0]) {
            let argument = interpreter.repository().value_specification(vec![value]);
            let mapped = interpreter.execute_lambda(&function, vec![argument], stacks)?;
            results.extend(many_values(&mapped));
        }
        Ok(interpreter.repository().value_specification(results))
    }
}

struct Filter;

impl NativeFunction for Filter {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let function = one_value(&parameters[1], "filter")?;
        let mut kept = Vec::new();
        for value in many_values(&parameters[0]) {
            let argument = interpreter
                .repository()
                .value_specification(vec![value.clone()]);
            let verdict = interpreter.execute_lambda(&function, vec![argument], stacks)?;
            if boolean_value(&verdict, "filter")? {
                kept.push(value);
            }
        }
        Ok(interpreter.repository().value_specification(kept))
    }
}
