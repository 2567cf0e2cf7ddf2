// Generic types, multiplicities and function signatures.
//
// These are the validator-facing halves of the metamodel: every expression
// and every function parameter carries a `GenericType` and a `Multiplicity`,
// both of which may still contain open parameters that the runtime resolves
// against the enclosing call frames (see `runtime::resolution`).

use std::collections::HashMap;
use std::fmt;

use crate::model::node::NodeRef;

/// A declared lower/upper bound on how many values a property, parameter, or
/// expression may hold. `upper == None` means unbounded ("many").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Multiplicity {
    Concrete { lower: u32, upper: Option<u32> },
    Parameter(String),
}

impl Multiplicity {
    pub const ONE: Multiplicity = Multiplicity::Concrete {
        lower: 1,
        upper: Some(1),
    };
    pub const ZERO_ONE: Multiplicity = Multiplicity::Concrete {
        lower: 0,
        upper: Some(1),
    };
    pub const ZERO_MANY: Multiplicity = Multiplicity::Concrete {
        lower: 0,
        upper: None,
    };
    pub const ONE_MANY: Multiplicity = Multiplicity::Concrete {
        lower: 1,
        upper: None,
    };

    pub fn parameter(name: impl Into<String>) -> Self {
        Multiplicity::Parameter(name.into())
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, Multiplicity::Concrete { .. })
    }

    /// Exactly one value.
    pub fn is_to_one(&self) -> bool {
        matches!(
            self,
            Multiplicity::Concrete {
                lower: 1,
                upper: Some(1)
            }
        )
    }

    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Multiplicity::Parameter(name) => Some(name),
            Multiplicity::Concrete { .. } => None,
        }
    }

    /// Substitute against a single resolution frame. Returns the frame's
    /// binding for an open parameter, or `self` unchanged.
    pub fn substitute(&self, frame: &HashMap<String, Multiplicity>) -> Multiplicity {
        match self {
            Multiplicity::Parameter(name) => frame.get(name).cloned().unwrap_or_else(|| self.clone()),
            concrete => concrete.clone(),
        }
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Multiplicity::ONE
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::Parameter(name) => write!(f, "[{}]", name),
            Multiplicity::Concrete { lower: 0, upper: None } => write!(f, "[*]"),
            Multiplicity::Concrete { lower, upper: None } => write!(f, "[{}..*]", lower),
            Multiplicity::Concrete { lower, upper: Some(upper) } if lower == upper => {
                write!(f, "[{}]", lower)
            }
            Multiplicity::Concrete { lower, upper: Some(upper) } => {
                write!(f, "[{}..{}]", lower, upper)
            }
        }
    }
}

/// A possibly-open generic type: either a concrete raw type (a class node)
/// with type/multiplicity arguments, or a reference to a type parameter that
/// an enclosing call frame must make concrete.
#[derive(Debug, Clone, Default)]
pub struct GenericType {
    pub raw_type: Option<NodeRef>,
    pub type_parameter: Option<String>,
    pub type_arguments: Vec<GenericType>,
    pub multiplicity_arguments: Vec<Multiplicity>,
}

impl GenericType {
    pub fn of(raw_type: NodeRef) -> Self {
        GenericType {
            raw_type: Some(raw_type),
            type_parameter: None,
            type_arguments: Vec::new(),
            multiplicity_arguments: Vec::new(),
        }
    }

    pub fn with_arguments(
        raw_type: NodeRef,
        type_arguments: Vec<GenericType>,
        multiplicity_arguments: Vec<Multiplicity>,
    ) -> Self {
        GenericType {
            raw_type: Some(raw_type),
            type_parameter: None,
            type_arguments,
            multiplicity_arguments,
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        GenericType {
            raw_type: None,
            type_parameter: Some(name.into()),
            type_arguments: Vec::new(),
            multiplicity_arguments: Vec::new(),
        }
    }

    /// A generic type is concrete iff it contains no open type or
    /// multiplicity parameter anywhere in its argument tree.
    pub fn is_concrete(&self) -> bool {
        self.type_parameter.is_none()
            && self.type_arguments.iter().all(GenericType::is_concrete)
            && self.multiplicity_arguments.iter().all(Multiplicity::is_concrete)
    }

    /// Substitute open parameters against a single resolution frame. One call
    /// is one substitution step: a parameter bound to another parameter stays
    /// open and needs the next outer frame.
    pub fn substitute(
        &self,
        types: &HashMap<String, GenericType>,
        multiplicities: &HashMap<String, Multiplicity>,
    ) -> GenericType {
        if let Some(name) = &self.type_parameter {
            if let Some(bound) = types.get(name) {
                return bound.clone();
            }
            return self.clone();
        }
        GenericType {
            raw_type: self.raw_type.clone(),
            type_parameter: None,
            type_arguments: self
                .type_arguments
                .iter()
                .map(|arg| arg.substitute(types, multiplicities))
                .collect(),
            multiplicity_arguments: self
                .multiplicity_arguments
                .iter()
                .map(|arg| arg.substitute(multiplicities))
                .collect(),
        }
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.type_parameter {
            return write!(f, "{}", name);
        }
        match &self.raw_type {
            Some(raw) => write!(f, "{}", raw.name.as_deref().unwrap_or("<anonymous>"))?,
            None => write!(f, "<unknown>")?,
        }
        if !self.type_arguments.is_empty() || !self.multiplicity_arguments.is_empty() {
            write!(f, "<")?;
            let mut first = true;
            for arg in &self.type_arguments {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
                first = false;
            }
            for arg in &self.multiplicity_arguments {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", arg)?;
                first = false;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// One declared parameter of a function signature.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub generic_type: GenericType,
    pub multiplicity: Multiplicity,
}

impl Parameter {
    pub fn new(name: impl Into<String>, generic_type: GenericType, multiplicity: Multiplicity) -> Self {
        Parameter {
            name: name.into(),
            generic_type,
            multiplicity,
        }
    }
}

/// The computed type of a function: ordered parameters, the open parameters
/// the function itself declares, and the return type/multiplicity.
#[derive(Debug, Clone, Default)]
pub struct FunctionType {
    pub parameters: Vec<Parameter>,
    pub type_parameters: Vec<String>,
    pub multiplicity_parameters: Vec<String>,
    pub return_type: GenericType,
    pub return_multiplicity: Multiplicity,
}

impl FunctionType {
    pub fn new(parameters: Vec<Parameter>, return_type: GenericType, return_multiplicity: Multiplicity) -> Self {
        FunctionType {
            parameters,
            type_parameters: Vec::new(),
            multiplicity_parameters: Vec::new(),
            return_type,
            return_multiplicity,
        }
    }

    pub fn with_type_parameters(mut self, type_parameters: Vec<String>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    pub fn with_multiplicity_parameters(mut self, multiplicity_parameters: Vec<String>) -> Self {
        self.multiplicity_parameters = multiplicity_parameters;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_multiplicities() {
        assert!(Multiplicity::ONE.is_concrete());
        assert!(Multiplicity::ONE.is_to_one());
        assert!(!Multiplicity::ZERO_ONE.is_to_one());
        assert!(!Multiplicity::parameter("m").is_concrete());
    }

    #[test]
    fn multiplicity_display() {
        assert_eq!(Multiplicity::ONE.to_string(), "[1]");
        assert_eq!(Multiplicity::ZERO_ONE.to_string(), "[0..1]");
        assert_eq!(Multiplicity::ZERO_MANY.to_string(), "[*]");
        assert_eq!(Multiplicity::ONE_MANY.to_string(), "[1..*]");
        assert_eq!(Multiplicity::parameter("m").to_string(), "[m]");
    }

    #[test]
    fn parameter_substitution_is_single_step() {
        let mut mults = HashMap::new();
        mults.insert("m".to_string(), Multiplicity::parameter("n"));
        let m = Multiplicity::parameter("m").substitute(&mults);
        // One step only: m maps to n, which stays open.
        assert_eq!(m, Multiplicity::parameter("n"));
    }

    #[test]
    fn open_type_argument_makes_type_open() {
        let t = GenericType {
            raw_type: None,
            type_parameter: None,
            type_arguments: vec![GenericType::parameter("T")],
            multiplicity_arguments: Vec::new(),
        };
        assert!(!t.is_concrete());
    }
}
