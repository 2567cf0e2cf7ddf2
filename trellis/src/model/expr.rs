// Expression nodes.
//
// A closed set of variants: dispatch in the evaluator is an exhaustive match,
// so a new expression kind is a compile error at the dispatch site rather
// than a runtime "new node kind introduced" failure.

use crate::model::node::{NodeKind, NodeRef};
use crate::model::types::{GenericType, Multiplicity};

#[derive(Debug)]
pub enum Expression {
    Application(Application),
    Value(InstanceValue),
    Variable(VariableRef),
    /// Groups sibling expressions that must be resolved together before
    /// dispatch (e.g. branches of a conditional).
    Clustered {
        values: Vec<NodeRef>,
        generic_type: GenericType,
        multiplicity: Multiplicity,
    },
    /// A pre-evaluated wrapper carrying its result, short-circuiting
    /// re-evaluation.
    Routed { value: NodeRef },
}

/// A call site: the function, the argument expressions, and the
/// type/multiplicity arguments the validator resolved for this call.
#[derive(Debug)]
pub struct Application {
    pub function: NodeRef,
    pub arguments: Vec<NodeRef>,
    pub type_arguments: Vec<GenericType>,
    pub multiplicity_arguments: Vec<Multiplicity>,
    pub generic_type: GenericType,
    pub multiplicity: Multiplicity,
}

/// Literal/collection construction, and the shape of every evaluation
/// result. `executable == false` marks a plain value wrapper that the
/// dispatcher passes through untouched.
#[derive(Debug)]
pub struct InstanceValue {
    pub values: Vec<NodeRef>,
    pub generic_type: GenericType,
    pub multiplicity: Multiplicity,
    pub executable: bool,
}

#[derive(Debug)]
pub struct VariableRef {
    pub name: String,
    pub generic_type: GenericType,
    pub multiplicity: Multiplicity,
}

impl Expression {
    /// The statically declared generic type of this expression, as attached
    /// by the validator. Local parameter harvesting for receiver-generic
    /// calls reads this off the first argument. A routed wrapper around a
    /// non-expression value has no static type of its own.
    pub fn generic_type(&self) -> Option<&GenericType> {
        match self {
            Expression::Application(app) => Some(&app.generic_type),
            Expression::Value(value) => Some(&value.generic_type),
            Expression::Variable(var) => Some(&var.generic_type),
            Expression::Clustered { generic_type, .. } => Some(generic_type),
            Expression::Routed { value } => value.as_expression().and_then(Expression::generic_type),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Expression::Application(app) => format!(
                "Application of {}",
                app.function
                    .as_function()
                    .map(|function| function.display_name())
                    .unwrap_or_else(|| "<not a function>".to_string())
            ),
            Expression::Value(value) => format!("Value ({} values)", value.values.len()),
            Expression::Variable(var) => format!("Variable ${}", var.name),
            Expression::Clustered { values, .. } => format!("Clustered ({} values)", values.len()),
            Expression::Routed { .. } => "Routed".to_string(),
        }
    }
}

/// True if the dispatcher should evaluate this node rather than pass it
/// through: any expression except a value wrapper marked non-executable.
pub fn is_executable(node: &NodeRef) -> bool {
    match &node.kind {
        NodeKind::Expression(Expression::Value(value)) => value.executable,
        NodeKind::Expression(_) => true,
        _ => false,
    }
}

/// The underlying value sequence of a result: the contents of a value
/// wrapper, or the node itself.
pub fn unwrap_values(node: &NodeRef) -> Vec<NodeRef> {
    match &node.kind {
        NodeKind::Expression(Expression::Value(value)) => value.values.clone(),
        _ => vec![node.clone()],
    }
}

/// The single underlying value of a result, if there is exactly zero or one.
pub fn unwrap_value(node: &NodeRef) -> Option<NodeRef> {
    match &node.kind {
        NodeKind::Expression(Expression::Value(value)) => value.values.first().cloned(),
        _ => Some(node.clone()),
    }
}
