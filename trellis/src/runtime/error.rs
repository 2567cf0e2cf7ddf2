// Runtime failures. Every error carries the nearest source position and the
// engine call stack recorded at the point of failure, so a raw failure deep
// in a native surfaces with the location of the expression that caused it.

use std::fmt;

use thiserror::Error;

use crate::model::node::SourceInfo;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ErrorKind {
    #[error("Execution cancelled!")]
    Cancelled,

    #[error("Error executing the function:{function}. Mismatch between the number of function parameters ({parameter_count}) and the number of arguments ({argument_count})\n{dump}")]
    ArityMismatch {
        function: String,
        parameter_count: usize,
        argument_count: usize,
        dump: String,
    },

    #[error("The function '{signature}' is not supported by this execution platform")]
    UnsupportedNative { signature: String },

    #[error("Unsupported function for execution: {description}")]
    UnsupportedFunction { description: String },

    #[error("Error executing {function}. Mismatch between the number of type parameters ({parameter_count}) and the number of type arguments ({argument_count})")]
    TypeArgumentCountMismatch {
        function: String,
        parameter_count: usize,
        argument_count: usize,
    },

    #[error("Can't resolve some type parameters in: {rendered}")]
    UnresolvedTypeParameter { rendered: String },

    #[error("Cannot resolve multiplicity parameter: {name}")]
    UnresolvedMultiplicityParameter { name: String },

    #[error("Constraint (PRE):[{rule}] violated. (Function:{function})")]
    PreConstraintViolated { rule: String, function: String },

    #[error("Constraint (POST):[{rule}] violated. (Function:{function})")]
    PostConstraintViolated { rule: String, function: String },

    #[error("The variable '{name}' has already been defined!")]
    VariableNameConflict { name: String },

    #[error("The variable '{name}' is unknown!")]
    UnknownVariable { name: String },

    #[error("The system can't execute a property function '{property}' on a null instance.")]
    NullPropertyReceiver { property: String },

    #[error("Assert failed{}", message_suffix(.message))]
    AssertFailed { message: Option<String> },

    #[error("The system is trying to get an element at offset {index} where the collection is of size {size}")]
    IndexOutOfBounds { index: i64, size: usize },

    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("Integer overflow in '{operation}'")]
    IntegerOverflow { operation: String },

    #[error("Type error in {operation}: expected {expected}, found {actual}")]
    TypeError {
        expected: String,
        actual: String,
        operation: String,
    },

    #[error("{0}")]
    Generic(String),
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    /// Position of the outermost located expression the failure crossed.
    pub source_info: Option<SourceInfo>,
    /// Call sites active when the failure was raised, innermost first.
    pub call_stack: Vec<SourceInfo>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind) -> RuntimeError {
        RuntimeError {
            kind,
            source_info: None,
            call_stack: Vec::new(),
        }
    }

    pub fn with_source(kind: ErrorKind, source_info: Option<SourceInfo>) -> RuntimeError {
        RuntimeError {
            kind,
            source_info,
            call_stack: Vec::new(),
        }
    }

    /// Overwrite the carried position while unwinding. The outermost located
    /// call site wins, so a failure reports where the user invoked the
    /// failing expression rather than where library plumbing raised it.
    pub fn relocate(mut self, source_info: Option<SourceInfo>) -> RuntimeError {
        if let Some(info) = source_info {
            self.source_info = Some(info);
        }
        self
    }

    pub fn push_call_site(mut self, source_info: Option<SourceInfo>) -> RuntimeError {
        if let Some(info) = source_info {
            self.call_stack.push(info);
        }
        self
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(info) = &self.source_info {
            write!(f, "\nsource: {info}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeError {}

impl From<ErrorKind> for RuntimeError {
    fn from(kind: ErrorKind) -> RuntimeError {
        RuntimeError::new(kind)
    }
}
