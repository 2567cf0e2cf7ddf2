// Node factory and well-known classifiers. Every node in a run is minted
// here so ids are unique and the primitive classifiers are shared.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;

use crate::model::class::ClassDef;
use crate::model::expr::{Application, Expression, InstanceValue, VariableRef};
use crate::model::function::Function;
use crate::model::node::{Node, NodeKind, NodeRef, PrimitiveValue, SourceInfo};
use crate::model::types::{GenericType, Multiplicity};

pub struct Repository {
    counter: AtomicU64,
    pub any_class: NodeRef,
    pub nil_class: NodeRef,
    pub boolean_class: NodeRef,
    pub integer_class: NodeRef,
    pub float_class: NodeRef,
    pub string_class: NodeRef,
    pub strict_date_class: NodeRef,
    pub date_time_class: NodeRef,
}

impl Repository {
    pub fn new() -> Repository {
        let counter = AtomicU64::new(0);
        let mut next = || counter.fetch_add(1, Ordering::Relaxed);
        let primitive = |id: u64, name: &str| -> NodeRef {
            Arc::new(Node::new(
                id,
                NodeKind::Class(ClassDef::data_type()),
                None,
                Some(name.to_string()),
                None,
            ))
        };
        let any_class = primitive(next(), "Any");
        let nil_class = primitive(next(), "Nil");
        let boolean_class = primitive(next(), "Boolean");
        let integer_class = primitive(next(), "Integer");
        let float_class = primitive(next(), "Float");
        let string_class = primitive(next(), "String");
        let strict_date_class = primitive(next(), "StrictDate");
        let date_time_class = primitive(next(), "DateTime");
        Repository {
            counter,
            any_class,
            nil_class,
            boolean_class,
            integer_class,
            float_class,
            string_class,
            strict_date_class,
            date_time_class,
        }
    }

    fn next_id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    fn primitive(&self, value: PrimitiveValue, classifier: &NodeRef) -> NodeRef {
        Arc::new(Node::new(
            self.next_id(),
            NodeKind::Primitive(value),
            Some(classifier.clone()),
            None,
            None,
        ))
    }

    pub fn boolean(&self, value: bool) -> NodeRef {
        self.primitive(PrimitiveValue::Boolean(value), &self.boolean_class)
    }

    pub fn integer(&self, value: i64) -> NodeRef {
        self.primitive(PrimitiveValue::Integer(value), &self.integer_class)
    }

    pub fn float(&self, value: f64) -> NodeRef {
        self.primitive(
            PrimitiveValue::Float(OrderedFloat(value)),
            &self.float_class,
        )
    }

    pub fn string(&self, value: impl Into<String>) -> NodeRef {
        self.primitive(PrimitiveValue::String(value.into()), &self.string_class)
    }

    pub fn strict_date(&self, value: NaiveDate) -> NodeRef {
        self.primitive(PrimitiveValue::StrictDate(value), &self.strict_date_class)
    }

    pub fn date_time(&self, value: NaiveDateTime) -> NodeRef {
        self.primitive(PrimitiveValue::DateTime(value), &self.date_time_class)
    }

    /// A classifier node over the given definition.
    pub fn class(&self, name: impl Into<String>, def: ClassDef) -> NodeRef {
        Arc::new(Node::new(
            self.next_id(),
            NodeKind::Class(def),
            None,
            Some(name.into()),
            None,
        ))
    }

    pub fn instance(&self, classifier: &NodeRef) -> NodeRef {
        Arc::new(Node::new(
            self.next_id(),
            NodeKind::Instance,
            Some(classifier.clone()),
            None,
            None,
        ))
    }

    /// An instance whose classifier carries type/multiplicity arguments.
    pub fn instance_of(&self, classifier: &NodeRef, classifier_generic_type: GenericType) -> NodeRef {
        let mut node = Node::new(
            self.next_id(),
            NodeKind::Instance,
            Some(classifier.clone()),
            None,
            None,
        );
        node.classifier_generic_type = Some(classifier_generic_type);
        Arc::new(node)
    }

    /// Named instance with an optional instantiated classifier type. The
    /// construction natives build through this.
    pub fn named_instance(
        &self,
        classifier: &NodeRef,
        name: Option<String>,
        classifier_generic_type: Option<GenericType>,
    ) -> NodeRef {
        let mut node = Node::new(
            self.next_id(),
            NodeKind::Instance,
            Some(classifier.clone()),
            name,
            None,
        );
        node.classifier_generic_type = classifier_generic_type;
        Arc::new(node)
    }

    pub fn key_value(&self, key: impl Into<String>, values: Vec<NodeRef>) -> NodeRef {
        Arc::new(Node::new(
            self.next_id(),
            NodeKind::KeyValue {
                key: key.into(),
                values,
            },
            None,
            None,
            None,
        ))
    }

    pub fn function(&self, name: Option<String>, function: Function) -> NodeRef {
        Arc::new(Node::new(
            self.next_id(),
            NodeKind::Function(function),
            None,
            name,
            None,
        ))
    }

    pub fn expression(&self, expression: Expression, source_info: Option<SourceInfo>) -> NodeRef {
        Arc::new(Node::new(
            self.next_id(),
            NodeKind::Expression(expression),
            None,
            None,
            source_info,
        ))
    }

    /// An already-evaluated (inert) value carrier.
    pub fn value_specification(&self, values: Vec<NodeRef>) -> NodeRef {
        let generic_type = values
            .first()
            .and_then(|v| v.classifier.clone())
            .map(GenericType::of)
            .unwrap_or_else(|| GenericType::of(self.nil_class.clone()));
        self.value_specification_with_type(values, generic_type)
    }

    pub fn value_specification_with_type(
        &self,
        values: Vec<NodeRef>,
        generic_type: GenericType,
    ) -> NodeRef {
        let count = values.len() as u32;
        self.expression(
            Expression::Value(InstanceValue {
                values,
                generic_type,
                multiplicity: Multiplicity::Concrete {
                    lower: count,
                    upper: Some(count),
                },
                executable: false,
            }),
            None,
        )
    }

    pub fn application(
        &self,
        function: NodeRef,
        arguments: Vec<NodeRef>,
        source_info: Option<SourceInfo>,
    ) -> NodeRef {
        self.expression(
            Expression::Application(Application {
                function,
                arguments,
                type_arguments: Vec::new(),
                multiplicity_arguments: Vec::new(),
                generic_type: GenericType::default(),
                multiplicity: Multiplicity::ZERO_MANY,
            }),
            source_info,
        )
    }

    pub fn variable(&self, name: impl Into<String>) -> NodeRef {
        self.expression(
            Expression::Variable(VariableRef {
                name: name.into(),
                generic_type: GenericType::default(),
                multiplicity: Multiplicity::ZERO_MANY,
            }),
            None,
        )
    }
}

impl Default for Repository {
    fn default() -> Self {
        Repository::new()
    }
}
