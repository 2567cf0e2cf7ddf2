// Expression dispatch. Every expression form evaluates to a value carrier;
// function application is where resolution frames are pushed and scope
// boundaries drawn.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::expr::{is_executable, unwrap_values, Application, Expression};
use crate::model::function::{Closure, Function};
use crate::model::node::NodeRef;
use crate::model::types::GenericType;
use crate::runtime::context::VariableContext;
use crate::runtime::error::{ErrorKind, RuntimeError, RuntimeResult};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::resolution::{MultiplicityFrame, ResolutionStacks, TypeFrame};

/// `let` binds into the live frame of the enclosing function body rather
/// than calling through, so it is intercepted before ordinary application.
pub const LET_SIGNATURE: &str = "letFunction_String_1__T_m__T_m_";

impl Interpreter {
    pub fn execute_expression(
        &self,
        node: &NodeRef,
        context: &Arc<VariableContext>,
        stacks: &mut ResolutionStacks,
    ) -> RuntimeResult<NodeRef> {
        let expression = match node.as_expression() {
            Some(expression) => expression,
            None => return Ok(node.clone()),
        };
        match expression {
            Expression::Variable(variable) => {
                context.lookup(&variable.name).ok_or_else(|| {
                    RuntimeError::with_source(
                        ErrorKind::UnknownVariable {
                            name: variable.name.clone(),
                        },
                        node.source_info.clone(),
                    )
                })
            }
            Expression::Value(value) => {
                if !value.executable {
                    return Ok(node.clone());
                }
                let mut results = Vec::new();
                for element in &value.values {
                    self.evaluate_element(element, context, stacks, &mut results)?;
                }
                let generic_type = stacks
                    .resolve_type(&value.generic_type)
                    .map_err(|err| err.relocate(node.source_info.clone()))?;
                Ok(self
                    .repository()
                    .value_specification_with_type(results, generic_type))
            }
            Expression::Clustered {
                values,
                generic_type,
                ..
            } => {
                let mut results = Vec::new();
                for value in values {
                    let evaluated = self.execute_expression(value, context, stacks)?;
                    results.extend(unwrap_values(&evaluated));
                }
                let generic_type = stacks
                    .resolve_type(generic_type)
                    .map_err(|err| err.relocate(node.source_info.clone()))?;
                Ok(self
                    .repository()
                    .value_specification_with_type(results, generic_type))
            }
            Expression::Routed { value } => self.execute_expression(value, context, stacks),
            Expression::Application(application) => {
                self.execute_application(node, application, context, stacks)
            }
        }
    }

    /// One element of an executable value carrier. Nested expressions run
    /// and flatten; lambdas with free variables capture the current frame.
    fn evaluate_element(
        &self,
        element: &NodeRef,
        context: &Arc<VariableContext>,
        stacks: &mut ResolutionStacks,
        results: &mut Vec<NodeRef>,
    ) -> RuntimeResult<()> {
        if is_executable(element) {
            let evaluated = self.execute_expression(element, context, stacks)?;
            results.extend(unwrap_values(&evaluated));
            return Ok(());
        }
        for value in unwrap_values(element) {
            results.push(self.capture_if_open_lambda(&value, context));
        }
        Ok(())
    }

    pub(crate) fn capture_if_open_lambda(
        &self,
        node: &NodeRef,
        context: &Arc<VariableContext>,
    ) -> NodeRef {
        match node.as_function() {
            Some(Function::Lambda(lambda)) if !lambda.open_variables.is_empty() => {
                self.repository().function(
                    None,
                    Function::Closure(Closure {
                        lambda: node.clone(),
                        context: context.clone(),
                    }),
                )
            }
            _ => node.clone(),
        }
    }

    fn execute_application(
        &self,
        node: &NodeRef,
        application: &Application,
        context: &Arc<VariableContext>,
        stacks: &mut ResolutionStacks,
    ) -> RuntimeResult<NodeRef> {
        self.check_cancelled()
            .map_err(|err| err.relocate(node.source_info.clone()))?;

        let function = application.function.as_function().ok_or_else(|| {
            RuntimeError::with_source(
                ErrorKind::UnsupportedFunction {
                    description: application.function.describe(),
                },
                node.source_info.clone(),
            )
        })?;

        if let Function::Native { signature, .. } = function {
            if signature == LET_SIGNATURE {
                return self
                    .execute_let(application, context, stacks)
                    .map_err(|err| err.relocate(node.source_info.clone()));
            }
        }

        let (types, multiplicities) = self
            .resolve_local_parameters(application, function, stacks)
            .map_err(|err| err.relocate(node.source_info.clone()))?;

        let deferred = match function {
            Function::Native { signature, .. } => self
                .native(signature)
                .map(|native| native.defer_parameter_execution())
                .unwrap_or(false),
            _ => false,
        };

        let arguments = if deferred {
            application.arguments.clone()
        } else {
            let mut arguments = Vec::with_capacity(application.arguments.len());
            for argument in &application.arguments {
                arguments.push(self.execute_expression(argument, context, stacks)?);
            }
            arguments
        };

        stacks
            .with_frames(types, multiplicities, |stacks| {
                self.execute_function(
                    &application.function,
                    arguments,
                    true,
                    context,
                    stacks,
                    node.source_info.as_ref(),
                )
            })
            .map_err(|err| {
                err.relocate(node.source_info.clone())
                    .push_call_site(node.source_info.clone())
            })
    }

    fn execute_let(
        &self,
        application: &Application,
        context: &Arc<VariableContext>,
        stacks: &mut ResolutionStacks,
    ) -> RuntimeResult<NodeRef> {
        let name_node = application.arguments.first().ok_or_else(|| {
            RuntimeError::new(ErrorKind::Generic(
                "let requires a variable name and a value".to_string(),
            ))
        })?;
        let value_node = application.arguments.get(1).ok_or_else(|| {
            RuntimeError::new(ErrorKind::Generic(
                "let requires a variable name and a value".to_string(),
            ))
        })?;
        let name_value = self.execute_expression(name_node, context, stacks)?;
        let name = crate::runtime::natives::string_value(&name_value, "let")?;
        let value = self.execute_expression(value_node, context, stacks)?;
        context.bind(name, value.clone())?;
        Ok(value)
    }

    /// The resolution frame pair contributed by one application. Ordinarily
    /// declared type parameters line up with the call's type arguments; the
    /// instantiation and copy natives and qualified properties instead read
    /// bindings off the static type of their first argument.
    fn resolve_local_parameters(
        &self,
        application: &Application,
        function: &Function,
        stacks: &mut ResolutionStacks,
    ) -> RuntimeResult<(TypeFrame, MultiplicityFrame)> {
        match function {
            Function::QualifiedProperty(_) => {
                match first_argument_static_type(application) {
                    Some(generic_type) => self.harvest_from_static_type(&generic_type, stacks),
                    None => Ok((TypeFrame::new(), MultiplicityFrame::new())),
                }
            }
            Function::Native { signature, .. } if signature.starts_with("new_") => {
                let instantiated = first_argument_static_type(application)
                    .and_then(|class_type| class_type.type_arguments.first().cloned());
                match instantiated {
                    Some(generic_type) => self.harvest_from_static_type(&generic_type, stacks),
                    None => Ok((TypeFrame::new(), MultiplicityFrame::new())),
                }
            }
            Function::Native { signature, .. } if signature.starts_with("copy_") => {
                match first_argument_static_type(application) {
                    Some(generic_type) => self.harvest_from_static_type(&generic_type, stacks),
                    None => Ok((TypeFrame::new(), MultiplicityFrame::new())),
                }
            }
            _ => self.declared_parameter_frames(application, function, stacks),
        }
    }

    fn declared_parameter_frames(
        &self,
        application: &Application,
        function: &Function,
        stacks: &mut ResolutionStacks,
    ) -> RuntimeResult<(TypeFrame, MultiplicityFrame)> {
        let function_type = function.function_type();
        if function_type.type_parameters.is_empty() && application.type_arguments.is_empty() {
            return Ok((TypeFrame::new(), MultiplicityFrame::new()));
        }
        if function_type.type_parameters.len() != application.type_arguments.len() {
            return Err(RuntimeError::new(ErrorKind::TypeArgumentCountMismatch {
                function: function.display_name(),
                parameter_count: function_type.type_parameters.len(),
                argument_count: application.type_arguments.len(),
            }));
        }
        let mut types = TypeFrame::new();
        for (name, argument) in function_type
            .type_parameters
            .iter()
            .zip(application.type_arguments.iter())
        {
            types.insert(name.clone(), stacks.resolve_type(argument)?);
        }
        let mut multiplicities = MultiplicityFrame::new();
        if function_type.multiplicity_parameters.len() == application.multiplicity_arguments.len()
        {
            for (name, argument) in function_type
                .multiplicity_parameters
                .iter()
                .zip(application.multiplicity_arguments.iter())
            {
                multiplicities.insert(name.clone(), stacks.resolve_multiplicity(argument)?);
            }
        }
        Ok((types, multiplicities))
    }

    /// Bindings read off a concrete generic type: the raw class's declared
    /// parameters paired with the type's arguments.
    fn harvest_from_static_type(
        &self,
        generic_type: &GenericType,
        stacks: &mut ResolutionStacks,
    ) -> RuntimeResult<(TypeFrame, MultiplicityFrame)> {
        let resolved = stacks.resolve_type(generic_type)?;
        let def = match resolved.raw_type.as_ref().and_then(|raw| raw.as_class()) {
            Some(def) => def,
            None => return Ok((TypeFrame::new(), MultiplicityFrame::new())),
        };
        let types: HashMap<String, GenericType> = def
            .type_parameters
            .iter()
            .cloned()
            .zip(resolved.type_arguments.iter().cloned())
            .collect();
        let multiplicities: MultiplicityFrame = def
            .multiplicity_parameters
            .iter()
            .cloned()
            .zip(resolved.multiplicity_arguments.iter().cloned())
            .collect();
        Ok((types, multiplicities))
    }
}

fn first_argument_static_type(application: &Application) -> Option<GenericType> {
    let first = application.arguments.first()?;
    if let Some(expression) = first.as_expression() {
        if let Some(generic_type) = expression.generic_type() {
            return Some(generic_type.clone());
        }
    }
    first.value_generic_type()
}
