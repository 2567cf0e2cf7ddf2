// Language-level natives: conditional dispatch, instantiation, copy-with-
// overrides, dynamic evaluation, type tests and printing.

use std::ops::RangeInclusive;
use std::sync::Arc;

use itertools::Itertools;

use crate::model::expr::is_executable;
use crate::model::node::{NodeKind, NodeRef, SourceInfo};
use crate::model::types::GenericType;
use crate::runtime::context::VariableContext;
use crate::runtime::error::{ErrorKind, RuntimeError, RuntimeResult};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::natives::{
    boolean_value, many_values, one_value, register, string_value, NativeFunction, NativeRegistry,
};
use crate::runtime::resolution::ResolutionStacks;

pub fn install(registry: &mut NativeRegistry) {
    register(registry, "if_Boolean_1__Function_1__Function_1__T_m_", If);
    register(registry, "new_Class_1__String_1__T_1_", New);
    register(
        registry,
        "new_Class_1__String_1__KeyExpression_MANY__T_1_",
        New,
    );
    register(registry, "copy_T_1__String_1__T_1_", Copy);
    register(
        registry,
        "copy_T_1__String_1__KeyExpression_MANY__T_1_",
        Copy,
    );
    register(registry, "eval_Function_1__V_m_", Eval);
    register(registry, "eval_Function_1__T_n__V_m_", Eval);
    register(registry, "eval_Function_1__T_n__U_p__V_m_", Eval);
    register(registry, "instanceOf_Any_1__Type_1__Boolean_1_", InstanceOf);
    register(registry, "print_Any_MANY__Integer_1__Nil_0_", Print);
}

/// Branches are functions; only the taken one runs.
struct If;

impl NativeFunction for If {
    fn arity(&self) -> RangeInclusive<usize> {
        3..=3
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
        let condition = interpreter.execute_expression(&parameters[0], context, stacks)?;
        let branch = if boolean_value(&condition, "if")? {
            &parameters[1]
        } else {
            &parameters[2]
        };
        let evaluated = interpreter.execute_expression(branch, context, stacks)?;
        let function = one_value(&evaluated, "if")?;
        let function = interpreter.capture_if_open_lambda(&function, context);
        interpreter.execute_lambda(&function, Vec::new(), stacks)
    }
}

struct New;

impl NativeFunction for New {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=3
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        context: &Arc<VariableContext>,
        call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let class = one_value(&parameters[0], "new")?;
        let def = class.as_class().ok_or_else(|| {
            RuntimeError::with_source(
                ErrorKind::TypeError {
                    expected: "Class".to_string(),
                    actual: class.describe(),
                    operation: "new".to_string(),
                },
                call_site.cloned(),
            )
        })?;
        let name = string_value(&parameters[1], "new")?;
        let classifier_generic_type = instantiated_type(&class, def.type_parameters.clone(), stacks);
        let instance =
            interpreter
                .repository()
                .named_instance(&class, Some(name), classifier_generic_type);
        if let Some(key_expressions) = parameters.get(2) {
            apply_key_expressions(interpreter, &instance, key_expressions, stacks, context)?;
        }
        Ok(interpreter
            .repository()
            .value_specification(vec![instance]))
    }
}

/// Clone of an instance with selected properties replaced.
struct Copy;

impl NativeFunction for Copy {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=3
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        context: &Arc<VariableContext>,
        call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let source = one_value(&parameters[0], "copy")?;
        let classifier = source.classifier.clone().ok_or_else(|| {
            RuntimeError::with_source(
                ErrorKind::TypeError {
                    expected: "instance".to_string(),
                    actual: source.describe(),
                    operation: "copy".to_string(),
                },
                call_site.cloned(),
            )
        })?;
        let name = string_value(&parameters[1], "copy")?;
        let instance = interpreter.repository().named_instance(
            &classifier,
            Some(name),
            source.classifier_generic_type.clone(),
        );
        for (key, values) in source.state_entries() {
            instance.set_values(key, values);
        }
        if let Some(key_expressions) = parameters.get(2) {
            apply_key_expressions(interpreter, &instance, key_expressions, stacks, context)?;
        }
        Ok(interpreter
            .repository()
            .value_specification(vec![instance]))
    }
}

struct Eval;

impl NativeFunction for Eval {
    fn arity(&self) -> RangeInclusive<usize> {
        1..=3
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let function = one_value(&parameters[0], "eval")?;
        let arguments = parameters[1..].to_vec();
        interpreter.execute_lambda(&function, arguments, stacks)
    }
}

struct InstanceOf;

impl NativeFunction for InstanceOf {
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
        let value = one_value(&parameters[0], "instanceOf")?;
        let tested = one_value(&parameters[1], "instanceOf")?;
        let result = tested.id() == interpreter.repository().any_class.id()
            || value
                .classifier
                .as_ref()
                .map(|classifier| classifier.id() == tested.id())
                .unwrap_or(false);
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(result)]))
    }
}

struct Print;

impl NativeFunction for Print {
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
        let line = many_values(&parameters[0])
            .iter()
            .map(|value| value.describe())
            .join("\n");
        interpreter.output().write_line(&line);
        Ok(interpreter.repository().value_specification(Vec::new()))
    }
}

/// The instantiated type of a `new` call, reconstructed from the resolution
/// frame its application pushed. Classes without type parameters get a plain
/// classifier type.
fn instantiated_type(
    class: &NodeRef,
    type_parameters: Vec<String>,
    stacks: &ResolutionStacks,
) -> Option<GenericType> {
    if type_parameters.is_empty() {
        return Some(GenericType::of(class.clone()));
    }
    let arguments: Option<Vec<GenericType>> = type_parameters
        .iter()
        .map(|name| stacks.resolve_type(&GenericType::parameter(name)).ok())
        .collect();
    arguments.map(|arguments| GenericType::with_arguments(class.clone(), arguments, Vec::new()))
}

fn apply_key_expressions(
    interpreter: &Interpreter,
    instance: &NodeRef,
    key_expressions: &NodeRef,
    stacks: &mut ResolutionStacks,
    context: &Arc<VariableContext>,
) -> RuntimeResult<()> {
    for entry in many_values(key_expressions) {
        if let NodeKind::KeyValue { key, values } = &entry.kind {
            let mut evaluated = Vec::new();
            for value in values {
                if is_executable(value) {
                    let result = interpreter.execute_expression(value, context, stacks)?;
                    evaluated.extend(many_values(&result));
                } else {
                    evaluated.push(value.clone());
                }
            }
            instance.set_values(key.clone(), evaluated);
        }
    }
    Ok(())
}
