// Resolution of open type and multiplicity parameters. Each call frame that
// binds parameters pushes one resolution frame; resolving walks the stack from
// the innermost frame outward, substituting step by step until the value is
// concrete. With k frames live, resolution terminates in at most k steps.

use std::collections::HashMap;

use crate::model::types::{GenericType, Multiplicity};
use crate::runtime::error::{ErrorKind, RuntimeError, RuntimeResult};

pub type TypeFrame = HashMap<String, GenericType>;
pub type MultiplicityFrame = HashMap<String, Multiplicity>;

#[derive(Debug, Default)]
pub struct ResolutionStacks {
    types: Vec<TypeFrame>,
    multiplicities: Vec<MultiplicityFrame>,
}

impl ResolutionStacks {
    pub fn new() -> ResolutionStacks {
        ResolutionStacks::default()
    }

    pub fn depth(&self) -> usize {
        self.types.len()
    }

    /// Run `body` with one extra frame pair pushed. The frames are popped on
    /// every exit path, including errors, so stack depth always matches call
    /// depth.
    pub fn with_frames<T>(
        &mut self,
        types: TypeFrame,
        multiplicities: MultiplicityFrame,
        body: impl FnOnce(&mut ResolutionStacks) -> RuntimeResult<T>,
    ) -> RuntimeResult<T> {
        self.types.push(types);
        self.multiplicities.push(multiplicities);
        let result = body(self);
        self.types.pop();
        self.multiplicities.pop();
        result
    }

    /// Make a generic type concrete against the live stack. Already-concrete
    /// types pass through untouched, so a stale outer binding for the same
    /// parameter name can never corrupt them.
    pub fn resolve_type(&self, generic_type: &GenericType) -> RuntimeResult<GenericType> {
        if generic_type.is_concrete() {
            return Ok(generic_type.clone());
        }
        let mut current = generic_type.clone();
        for (types, multiplicities) in self
            .types
            .iter()
            .rev()
            .zip(self.multiplicities.iter().rev())
        {
            current = current.substitute(types, multiplicities);
            if current.is_concrete() {
                return Ok(current);
            }
        }
        Err(RuntimeError::new(ErrorKind::UnresolvedTypeParameter {
            rendered: current.to_string(),
        }))
    }

    /// Make a multiplicity concrete, following parameter renames outward.
    pub fn resolve_multiplicity(&self, multiplicity: &Multiplicity) -> RuntimeResult<Multiplicity> {
        let mut current = multiplicity.clone();
        if current.is_concrete() {
            return Ok(current);
        }
        for frame in self.multiplicities.iter().rev() {
            current = current.substitute(frame);
            if current.is_concrete() {
                return Ok(current);
            }
        }
        match current {
            Multiplicity::Parameter(name) => Err(RuntimeError::new(
                ErrorKind::UnresolvedMultiplicityParameter { name },
            )),
            concrete => Ok(concrete),
        }
    }
}
