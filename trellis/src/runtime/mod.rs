//! The execution engine: variable contexts, parameter resolution, equality,
//! the native library and the interpreter itself.

pub mod context;
pub mod equality;
pub mod error;
pub mod evaluator;
pub mod extension;
pub mod interpreter;
pub mod natives;
pub mod output;
pub mod resolution;

pub use context::VariableContext;
pub use error::{ErrorKind, RuntimeError, RuntimeResult};
pub use extension::InterpretedExtension;
pub use interpreter::{Interpreter, ASSERT_SOURCE_ID};
pub use natives::NativeFunction;
pub use output::{LineOutputWriter, LogOutputWriter, OutputWriter};
pub use resolution::{MultiplicityFrame, ResolutionStacks, TypeFrame};
