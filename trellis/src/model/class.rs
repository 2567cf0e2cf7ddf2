// Class definitions.

use std::sync::RwLock;

use indexmap::IndexMap;

use crate::model::node::NodeRef;

/// A classifier: declared open parameters, insertion-ordered properties and
/// the key properties that drive structural equality. Properties are added
/// after the class node is allocated, which is what allows a class to
/// reference itself through a property type.
#[derive(Debug, Default)]
pub struct ClassDef {
    pub type_parameters: Vec<String>,
    pub multiplicity_parameters: Vec<String>,
    /// Primitive/data classes bypass the property override router.
    pub is_data_type: bool,
    properties: RwLock<IndexMap<String, NodeRef>>,
    equality_keys: RwLock<Vec<String>>,
}

impl ClassDef {
    pub fn new() -> Self {
        ClassDef::default()
    }

    pub fn data_type() -> Self {
        ClassDef {
            is_data_type: true,
            ..ClassDef::default()
        }
    }

    pub fn with_parameters(type_parameters: Vec<String>, multiplicity_parameters: Vec<String>) -> Self {
        ClassDef {
            type_parameters,
            multiplicity_parameters,
            ..ClassDef::default()
        }
    }

    pub fn add_property(&self, name: impl Into<String>, property: NodeRef) {
        self.properties
            .write()
            .expect("class properties lock poisoned")
            .insert(name.into(), property);
    }

    pub fn property(&self, name: &str) -> Option<NodeRef> {
        self.properties
            .read()
            .expect("class properties lock poisoned")
            .get(name)
            .cloned()
    }

    pub fn properties(&self) -> Vec<(String, NodeRef)> {
        self.properties
            .read()
            .expect("class properties lock poisoned")
            .iter()
            .map(|(name, property)| (name.clone(), property.clone()))
            .collect()
    }

    pub fn set_equality_keys(&self, keys: Vec<String>) {
        *self
            .equality_keys
            .write()
            .expect("class equality keys lock poisoned") = keys;
    }

    pub fn equality_keys(&self) -> Vec<String> {
        self.equality_keys
            .read()
            .expect("class equality keys lock poisoned")
            .clone()
    }

    /// The property nodes named as equality keys, in declaration order.
    /// Empty when the class declares none, in which case distinct instances
    /// are never structurally equal.
    pub fn equality_key_properties(&self) -> Vec<NodeRef> {
        let keys = self
            .equality_keys
            .read()
            .expect("class equality keys lock poisoned");
        keys.iter().filter_map(|key| self.property(key)).collect()
    }
}
