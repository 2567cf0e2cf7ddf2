// Shared graph nodes.
//
// A `Node` is any element of the expression/metamodel graph: a classifier, an
// instance, a primitive literal, a function, or an expression. Nodes are
// shared (`Arc`) and the graph may contain cycles; instance property values
// live in an untyped key -> values map so that "new instance" style
// operations can populate them after allocation. During evaluation the graph
// is read-only apart from freshly allocated nodes.

use std::fmt;
use std::sync::RwLock;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::model::class::ClassDef;
use crate::model::expr::Expression;
use crate::model::function::Function;
use crate::model::types::GenericType;

pub type NodeRef = Arc<Node>;

/// Property names reserved by the override machinery. Reads of these are
/// never routed through a getter override.
pub const ELEMENT_OVERRIDE: &str = "elementOverride";
pub const HIDDEN_PAYLOAD: &str = "hiddenPayload";
pub const GETTER_OVERRIDE_TO_ONE: &str = "getterOverrideToOne";
pub const GETTER_OVERRIDE_TO_MANY: &str = "getterOverrideToMany";

/// A source location: file identifier plus start/end line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub source_id: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceInfo {
    pub fn new(source_id: impl Into<String>, start_line: u32, start_column: u32) -> Self {
        SourceInfo {
            source_id: source_id.into(),
            start_line,
            start_column,
            end_line: start_line,
            end_column: start_column,
        }
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line:{} column:{}",
            self.source_id, self.start_line, self.start_column
        )
    }
}

/// A literal leaf value. Literal equality and hashing must agree with the
/// structural equality service, hence `OrderedFloat` for floats.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveValue {
    Boolean(bool),
    Integer(i64),
    Float(OrderedFloat<f64>),
    String(String),
    StrictDate(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PrimitiveValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveValue::Boolean(_) => "Boolean",
            PrimitiveValue::Integer(_) => "Integer",
            PrimitiveValue::Float(_) => "Float",
            PrimitiveValue::String(_) => "String",
            PrimitiveValue::StrictDate(_) => "StrictDate",
            PrimitiveValue::DateTime(_) => "DateTime",
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Boolean(v) => write!(f, "{}", v),
            PrimitiveValue::Integer(v) => write!(f, "{}", v),
            PrimitiveValue::Float(v) => write!(f, "{}", v),
            PrimitiveValue::String(v) => write!(f, "{}", v),
            PrimitiveValue::StrictDate(v) => write!(f, "{}", v),
            PrimitiveValue::DateTime(v) => write!(f, "{}", v),
        }
    }
}

/// The structural payload of a node.
#[derive(Debug)]
pub enum NodeKind {
    /// A literal leaf (classifier is the primitive class).
    Primitive(PrimitiveValue),
    /// A classifier.
    Class(ClassDef),
    /// A plain instance; property values live in the node state.
    Instance,
    /// A key/value pair used by the construct-with-overrides operations.
    KeyValue { key: String, values: Vec<NodeRef> },
    Expression(Expression),
    Function(Function),
}

#[derive(Debug)]
pub struct Node {
    id: u64,
    pub name: Option<String>,
    pub source_info: Option<SourceInfo>,
    pub classifier: Option<NodeRef>,
    /// For instances of generic classes: the full classifier generic type
    /// with its arguments, when the builder knows them.
    pub classifier_generic_type: Option<GenericType>,
    pub kind: NodeKind,
    state: RwLock<IndexMap<String, Vec<NodeRef>>>,
}

impl Node {
    pub fn new(
        id: u64,
        kind: NodeKind,
        classifier: Option<NodeRef>,
        name: Option<String>,
        source_info: Option<SourceInfo>,
    ) -> Node {
        Node {
            id,
            name,
            source_info,
            classifier,
            classifier_generic_type: None,
            kind,
            state: RwLock::new(IndexMap::new()),
        }
    }

    /// Synthetic id, unique per repository. Identity hashing and the
    /// no-equality-keys fallback of the structural hash are built on it.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn primitive_value(&self) -> Option<&PrimitiveValue> {
        match &self.kind {
            NodeKind::Primitive(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassDef> {
        match &self.kind {
            NodeKind::Class(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match &self.kind {
            NodeKind::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            NodeKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// The generic type of the node as a value: the declared classifier
    /// generic type when present, otherwise the bare classifier.
    pub fn value_generic_type(&self) -> Option<GenericType> {
        if let Some(generic_type) = &self.classifier_generic_type {
            return Some(generic_type.clone());
        }
        self.classifier.clone().map(GenericType::of)
    }

    // Instance state access. Storage is untyped: property reads resolve by
    // name and the caller supplies any type interpretation.

    pub fn get_to_one(&self, key: &str) -> Option<NodeRef> {
        self.state
            .read()
            .expect("node state lock poisoned")
            .get(key)
            .and_then(|values| values.first().cloned())
    }

    pub fn get_to_many(&self, key: &str) -> Vec<NodeRef> {
        self.state
            .read()
            .expect("node state lock poisoned")
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_values(&self, key: impl Into<String>, values: Vec<NodeRef>) {
        self.state
            .write()
            .expect("node state lock poisoned")
            .insert(key.into(), values);
    }

    pub fn add_value(&self, key: &str, value: NodeRef) {
        self.state
            .write()
            .expect("node state lock poisoned")
            .entry(key.to_string())
            .or_default()
            .push(value);
    }

    pub fn state_entries(&self) -> Vec<(String, Vec<NodeRef>)> {
        self.state
            .read()
            .expect("node state lock poisoned")
            .iter()
            .map(|(key, values)| (key.clone(), values.clone()))
            .collect()
    }

    /// Short human-readable rendering, used in error dumps.
    pub fn describe(&self) -> String {
        match &self.kind {
            NodeKind::Primitive(value) => format!("{} ({})", value, value.type_name()),
            NodeKind::Class(_) => format!("Class {}", self.name.as_deref().unwrap_or("<anonymous>")),
            NodeKind::Instance => format!(
                "{} instance of {}",
                self.name.as_deref().unwrap_or("<anonymous>"),
                self.classifier
                    .as_ref()
                    .and_then(|classifier| classifier.name.as_deref())
                    .unwrap_or("<unknown>")
            ),
            NodeKind::KeyValue { key, .. } => format!("KeyValue '{}'", key),
            NodeKind::Expression(expr) => expr.describe(),
            NodeKind::Function(function) => format!("Function {}", function.display_name()),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Primitive(value) => write!(f, "{}", value),
            _ => write!(f, "{}", self.describe()),
        }
    }
}
