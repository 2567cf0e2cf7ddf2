// Function invocation. Expressions are evaluated by the dispatcher in
// `evaluator`; this module owns the engine itself: registry, cancellation,
// parameter binding, constraints, property routing and the native/extension
// dispatch chain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use lazy_static::lazy_static;

use crate::model::expr::unwrap_values;
use crate::model::function::{Function, PropertyDefinition};
use crate::model::node::{
    NodeRef, SourceInfo, ELEMENT_OVERRIDE, GETTER_OVERRIDE_TO_MANY, GETTER_OVERRIDE_TO_ONE,
    HIDDEN_PAYLOAD,
};
use crate::model::repository::Repository;
use crate::model::types::GenericType;
use crate::runtime::context::VariableContext;
use crate::runtime::error::{ErrorKind, RuntimeError, RuntimeResult};
use crate::runtime::extension::InterpretedExtension;
use crate::runtime::natives::{self, NativeFunction, NativeRegistry};
use crate::runtime::output::{LogOutputWriter, OutputWriter};
use crate::runtime::resolution::ResolutionStacks;

/// Source id of the assertion library. Failures raised inside it are
/// re-pointed at the first caller outside it, so a failing assertion reports
/// the test line rather than the assertion body.
pub const ASSERT_SOURCE_ID: &str = "/platform/pure/asserts.pure";

lazy_static! {
    /// Properties that are part of the override machinery itself and must
    /// always read stored state.
    static ref RESERVED_PROPERTIES: std::collections::HashSet<&'static str> =
        [ELEMENT_OVERRIDE, HIDDEN_PAYLOAD].into_iter().collect();
}

pub struct Interpreter {
    repository: Arc<Repository>,
    natives: NativeRegistry,
    extensions: Vec<Arc<dyn InterpretedExtension>>,
    cancel_requested: AtomicBool,
    output: Arc<dyn OutputWriter>,
}

impl Interpreter {
    pub fn new(repository: Arc<Repository>) -> Interpreter {
        Interpreter::with_extensions(repository, Vec::new())
    }

    pub fn with_extensions(
        repository: Arc<Repository>,
        extensions: Vec<Arc<dyn InterpretedExtension>>,
    ) -> Interpreter {
        let mut registry = natives::install();
        for extension in &extensions {
            for (signature, native) in extension.extra_natives() {
                log::debug!(
                    "extension '{}' registers native '{}'",
                    extension.name(),
                    signature
                );
                registry.insert(signature, native);
            }
        }
        Interpreter {
            repository,
            natives: registry,
            extensions,
            cancel_requested: AtomicBool::new(false),
            output: Arc::new(LogOutputWriter),
        }
    }

    pub fn with_output(mut self, output: Arc<dyn OutputWriter>) -> Interpreter {
        self.output = output;
        self
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    pub fn output(&self) -> &Arc<dyn OutputWriter> {
        &self.output
    }

    pub(crate) fn native(&self, signature: &str) -> Option<&Arc<dyn NativeFunction>> {
        self.natives.get(signature)
    }

    /// Flag the running execution for cancellation. The flag is consumed by
    /// the next expression boundary; requesting cancellation when nothing is
    /// running poisons at most the next run's first check.
    pub fn request_cancellation(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// One-shot consume of the cancellation flag.
    pub(crate) fn check_cancelled(&self) -> RuntimeResult<()> {
        if self
            .cancel_requested
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return Err(RuntimeError::new(ErrorKind::Cancelled));
        }
        Ok(())
    }

    /// Top-level entry point: run a function node over already-evaluated
    /// arguments with a fresh variable context and empty resolution stacks.
    pub fn start(&self, function: &NodeRef, arguments: Vec<NodeRef>) -> RuntimeResult<NodeRef> {
        self.cancel_requested.store(false, Ordering::SeqCst);
        log::debug!(
            "executing function '{}'",
            function.name.as_deref().unwrap_or("<anonymous>")
        );
        let root = Arc::new(VariableContext::new());
        let mut stacks = ResolutionStacks::new();
        self.execute_function(function, arguments, false, &root, &mut stacks, None)
            .map_err(normalize)
    }

    /// Like `start`, but also serializes the result's value sequence through
    /// the given writer, one line per value.
    pub fn start_with_output(
        &self,
        function: &NodeRef,
        arguments: Vec<NodeRef>,
        writer: &dyn OutputWriter,
    ) -> RuntimeResult<NodeRef> {
        let result = self.start(function, arguments)?;
        for value in unwrap_values(&result) {
            writer.write_line(&value.describe());
        }
        Ok(result)
    }

    /// Invoke a function value from native code (`map`, `filter`, `eval`).
    /// Closures run against their captured context; bare functions get a
    /// fresh one.
    pub fn execute_lambda(
        &self,
        function: &NodeRef,
        arguments: Vec<NodeRef>,
        stacks: &mut ResolutionStacks,
    ) -> RuntimeResult<NodeRef> {
        let root = Arc::new(VariableContext::new());
        self.execute_function(function, arguments, false, &root, stacks, None)
    }

    pub(crate) fn execute_function(
        &self,
        function_node: &NodeRef,
        arguments: Vec<NodeRef>,
        limit_scope: bool,
        parent: &Arc<VariableContext>,
        stacks: &mut ResolutionStacks,
        call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        self.check_cancelled()
            .map_err(|err| err.relocate(call_site.cloned()))?;

        let function = function_node.as_function().ok_or_else(|| {
            RuntimeError::with_source(
                ErrorKind::UnsupportedFunction {
                    description: function_node.describe(),
                },
                call_site.cloned(),
            )
        })?;

        // A closure is its lambda run against the captured chain. The chain
        // stays open so free variables resolve through the definition site.
        if let Function::Closure(closure) = function {
            return self.execute_function(
                &closure.lambda,
                arguments,
                false,
                &closure.context,
                stacks,
                call_site,
            );
        }

        if let Function::Native { signature, .. } = function {
            return self.dispatch_native(signature, &arguments, stacks, parent, call_site);
        }

        let function_type = function.function_type();
        if function_type.parameters.len() != arguments.len() {
            let dump = arguments.iter().map(|arg| arg.describe()).join("\n");
            return Err(RuntimeError::with_source(
                ErrorKind::ArityMismatch {
                    function: function.display_name(),
                    parameter_count: function_type.parameters.len(),
                    argument_count: arguments.len(),
                    dump,
                },
                call_site.cloned(),
            ));
        }

        let context = Arc::new(if limit_scope {
            VariableContext::sealed(parent.clone())
        } else {
            VariableContext::with_parent(parent.clone())
        });
        for (parameter, argument) in function_type.parameters.iter().zip(arguments.iter()) {
            context.bind(&parameter.name, argument.clone())?;
        }

        // Pre-constraints see the bound parameters but none of the caller's
        // resolution state.
        for constraint in function.pre_constraints() {
            let mut fresh = ResolutionStacks::new();
            if !self.constraint_holds(&constraint.expression, &context, &mut fresh)? {
                return Err(RuntimeError::with_source(
                    ErrorKind::PreConstraintViolated {
                        rule: constraint.name.clone(),
                        function: function.display_name(),
                    },
                    call_site.cloned(),
                ));
            }
        }

        let result = match function {
            Function::Defined(def) => self.execute_body(&def.body, &context, stacks)?,
            Function::Lambda(lambda) => self.execute_body(&lambda.body, &context, stacks)?,
            Function::QualifiedProperty(qualified) => {
                self.execute_body(&qualified.body, &context, stacks)?
            }
            Function::Property(property) => self.execute_property(
                property,
                function_node,
                &arguments[0],
                &context,
                stacks,
                call_site,
            )?,
            Function::Native { .. } | Function::Closure(_) => {
                return Err(RuntimeError::with_source(
                    ErrorKind::UnsupportedFunction {
                        description: function_node.describe(),
                    },
                    call_site.cloned(),
                ))
            }
        };

        if !function.post_constraints().is_empty() {
            let post_context = Arc::new(VariableContext::with_parent(context.clone()));
            post_context.bind("return", result.clone())?;
            for constraint in function.post_constraints() {
                let mut fresh = ResolutionStacks::new();
                if !self.constraint_holds(&constraint.expression, &post_context, &mut fresh)? {
                    return Err(RuntimeError::with_source(
                        ErrorKind::PostConstraintViolated {
                            rule: constraint.name.clone(),
                            function: function.display_name(),
                        },
                        call_site.cloned(),
                    ));
                }
            }
        }

        Ok(result)
    }

    fn execute_body(
        &self,
        body: &[NodeRef],
        context: &Arc<VariableContext>,
        stacks: &mut ResolutionStacks,
    ) -> RuntimeResult<NodeRef> {
        let mut result = self.repository.value_specification(Vec::new());
        for expression in body {
            result = self.execute_expression(expression, context, stacks)?;
        }
        Ok(result)
    }

    fn constraint_holds(
        &self,
        expression: &NodeRef,
        context: &Arc<VariableContext>,
        stacks: &mut ResolutionStacks,
    ) -> RuntimeResult<bool> {
        let result = self.execute_expression(expression, context, stacks)?;
        natives::boolean_value(&result, "constraint")
    }

    fn dispatch_native(
        &self,
        signature: &str,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        context: &Arc<VariableContext>,
        call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        if let Some(native) = self.natives.get(signature) {
            let arity = native.arity();
            if !arity.contains(&parameters.len()) {
                let dump = parameters.iter().map(|p| p.describe()).join("\n");
                return Err(RuntimeError::with_source(
                    ErrorKind::ArityMismatch {
                        function: signature.to_string(),
                        parameter_count: *arity.start(),
                        argument_count: parameters.len(),
                        dump,
                    },
                    call_site.cloned(),
                ));
            }
            return native.execute(self, parameters, stacks, context, call_site);
        }
        for extension in &self.extensions {
            if let Some(result) =
                extension.extra_function_execution(self, signature, parameters, stacks, context)
            {
                log::debug!(
                    "extension '{}' handled native '{}'",
                    extension.name(),
                    signature
                );
                return result;
            }
        }
        Err(RuntimeError::with_source(
            ErrorKind::UnsupportedNative {
                signature: signature.to_string(),
            },
            call_site.cloned(),
        ))
    }

    /// Property access. Instances carrying an element override route reads
    /// through the override's getter functions; everything else reads the
    /// stored state directly.
    fn execute_property(
        &self,
        property: &PropertyDefinition,
        property_node: &NodeRef,
        receiver_parameter: &NodeRef,
        context: &Arc<VariableContext>,
        stacks: &mut ResolutionStacks,
        call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let receivers = unwrap_values(receiver_parameter);
        let receiver = receivers.first().cloned().ok_or_else(|| {
            RuntimeError::with_source(
                ErrorKind::NullPropertyReceiver {
                    property: property.name.clone(),
                },
                call_site.cloned(),
            )
        })?;

        if self.routes_through_override(property) {
            if let Some(override_node) = receiver.get_to_one(ELEMENT_OVERRIDE) {
                let getter_key = if property.multiplicity.is_to_one() {
                    GETTER_OVERRIDE_TO_ONE
                } else {
                    GETTER_OVERRIDE_TO_MANY
                };
                if let Some(getter) = override_node.get_to_one(getter_key) {
                    let instance = self.repository.value_specification(vec![receiver.clone()]);
                    let accessor = self
                        .repository
                        .value_specification(vec![property_node.clone()]);
                    return self.execute_function(
                        &getter,
                        vec![instance, accessor],
                        true,
                        context,
                        stacks,
                        call_site,
                    );
                }
            }
        }

        let values = receiver.get_to_many(&property.name);
        if property.multiplicity.is_to_one() {
            return Ok(self.repository.value_specification(values));
        }
        match resolved_return_type(property, &receiver) {
            Some(generic_type) => Ok(self
                .repository
                .value_specification_with_type(values, generic_type)),
            None => Ok(self.repository.value_specification(values)),
        }
    }

    /// Reserved override bookkeeping properties and data-type valued
    /// properties always read stored state.
    fn routes_through_override(&self, property: &PropertyDefinition) -> bool {
        if RESERVED_PROPERTIES.contains(property.name.as_str()) {
            return false;
        }
        let is_data_type = property
            .value_type
            .raw_type
            .as_ref()
            .and_then(|raw| raw.as_class())
            .map(|def| def.is_data_type)
            .unwrap_or(false);
        !is_data_type
    }
}

/// To-many reads report an element type with the receiver's type arguments
/// substituted in, when the receiver carries them.
fn resolved_return_type(property: &PropertyDefinition, receiver: &NodeRef) -> Option<GenericType> {
    if property.value_type.is_concrete() {
        return Some(property.value_type.clone());
    }
    let classifier_type = receiver.classifier_generic_type.as_ref()?;
    let owner = property.owner.raw_type.as_ref()?.as_class()?;
    let types: HashMap<String, GenericType> = owner
        .type_parameters
        .iter()
        .cloned()
        .zip(classifier_type.type_arguments.iter().cloned())
        .collect();
    let multiplicities = owner
        .multiplicity_parameters
        .iter()
        .cloned()
        .zip(classifier_type.multiplicity_arguments.iter().cloned())
        .collect();
    let resolved = property.value_type.substitute(&types, &multiplicities);
    resolved.is_concrete().then_some(resolved)
}

/// Exception normalization applied once at the run boundary.
fn normalize(mut error: RuntimeError) -> RuntimeError {
    if matches!(error.kind, ErrorKind::AssertFailed { .. }) {
        let inside_machinery = error
            .source_info
            .as_ref()
            .map(|info| info.source_id == ASSERT_SOURCE_ID)
            .unwrap_or(false);
        if inside_machinery {
            if let Some(site) = error
                .call_stack
                .iter()
                .find(|info| info.source_id != ASSERT_SOURCE_ID)
            {
                error.source_info = Some(site.clone());
            }
        }
    }
    error
}
