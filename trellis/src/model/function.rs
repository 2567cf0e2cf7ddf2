// Function nodes: native, user-defined, property accessors, lambdas and
// closures. Like expressions, a closed variant set with exhaustive dispatch
// in the invocation engine.

use std::sync::Arc;

use crate::model::node::NodeRef;
use crate::model::types::{FunctionType, GenericType, Multiplicity, Parameter};
use crate::runtime::context::VariableContext;

#[derive(Debug)]
pub enum Function {
    /// Implemented outside the graph, dispatched through the registry by its
    /// stable signature string.
    Native {
        signature: String,
        function_type: FunctionType,
    },
    Defined(FunctionDefinition),
    Lambda(LambdaFunction),
    /// A lambda paired with the variable context captured at its definition
    /// site.
    Closure(Closure),
    Property(PropertyDefinition),
    QualifiedProperty(QualifiedPropertyDefinition),
}

/// A named boolean-valued invariant on a function, checked before (pre) or
/// after (post) body evaluation depending on which list it sits in.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub expression: NodeRef,
}

#[derive(Debug)]
pub struct FunctionDefinition {
    pub name: String,
    pub function_type: FunctionType,
    pub body: Vec<NodeRef>,
    pub pre_constraints: Vec<Constraint>,
    pub post_constraints: Vec<Constraint>,
}

#[derive(Debug)]
pub struct LambdaFunction {
    pub function_type: FunctionType,
    pub body: Vec<NodeRef>,
    /// Free variable names, computed by the validator. A lambda with none
    /// needs no capture.
    pub open_variables: Vec<String>,
}

#[derive(Debug)]
pub struct Closure {
    pub lambda: NodeRef,
    pub context: Arc<VariableContext>,
}

/// A unary accessor over an owning type.
#[derive(Debug)]
pub struct PropertyDefinition {
    pub name: String,
    pub owner: GenericType,
    pub value_type: GenericType,
    pub multiplicity: Multiplicity,
}

/// An N-ary accessor; evaluated like a function body over the receiver and
/// the extra arguments.
#[derive(Debug)]
pub struct QualifiedPropertyDefinition {
    pub name: String,
    pub function_type: FunctionType,
    pub body: Vec<NodeRef>,
}

impl Function {
    /// The computed signature of the callable. Properties synthesize a
    /// one-parameter type over their owner; closures delegate to the lambda.
    pub fn function_type(&self) -> FunctionType {
        match self {
            Function::Native { function_type, .. } => function_type.clone(),
            Function::Defined(def) => def.function_type.clone(),
            Function::Lambda(lambda) => lambda.function_type.clone(),
            Function::Closure(closure) => closure
                .lambda
                .as_function()
                .map(Function::function_type)
                .unwrap_or_default(),
            Function::Property(property) => FunctionType::new(
                vec![Parameter::new(
                    "object",
                    property.owner.clone(),
                    Multiplicity::ONE,
                )],
                property.value_type.clone(),
                property.multiplicity.clone(),
            ),
            Function::QualifiedProperty(qualified) => qualified.function_type.clone(),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Function::Native { signature, .. } => signature.clone(),
            Function::Defined(def) => def.name.clone(),
            Function::Lambda(_) => "<lambda>".to_string(),
            Function::Closure(_) => "<lambda>".to_string(),
            Function::Property(property) => property.name.clone(),
            Function::QualifiedProperty(qualified) => qualified.name.clone(),
        }
    }

    pub fn pre_constraints(&self) -> &[Constraint] {
        match self {
            Function::Defined(def) => &def.pre_constraints,
            _ => &[],
        }
    }

    pub fn post_constraints(&self) -> &[Constraint] {
        match self {
            Function::Defined(def) => &def.post_constraints,
            _ => &[],
        }
    }
}
