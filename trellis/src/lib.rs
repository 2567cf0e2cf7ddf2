//! Trellis: a metamodel-driven expression runtime.
//!
//! Programs are graphs of nodes. Classes, functions, expressions and values
//! all share one node representation; the interpreter walks expression nodes
//! directly, resolving generic type and multiplicity parameters as it crosses
//! call frames. See `model` for the graph and `runtime` for the engine.

pub mod model;
pub mod runtime;

pub use model::{Node, NodeRef, Repository};
pub use runtime::{ErrorKind, Interpreter, RuntimeError, RuntimeResult};
