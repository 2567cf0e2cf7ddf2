//! The node graph: one uniform representation for classes, functions,
//! expressions and values, plus the repository that mints nodes.

pub mod class;
pub mod expr;
pub mod function;
pub mod node;
pub mod repository;
pub mod types;

pub use class::ClassDef;
pub use expr::{Application, Expression, InstanceValue, VariableRef};
pub use function::{Constraint, Function, FunctionDefinition, LambdaFunction};
pub use node::{Node, NodeKind, NodeRef, PrimitiveValue, SourceInfo};
pub use repository::Repository;
pub use types::{FunctionType, GenericType, Multiplicity, Parameter};
