// Identity and structural equality over graph nodes, plus the hashed set the
// collection natives use for containment and de-duplication. The structural
// hash is weaker than `equal` by construction; buckets resolve residual
// collisions with the full comparison.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::model::expr::{unwrap_values, Expression};
use crate::model::node::{NodeKind, NodeRef};

/// Shallow equality: same node, or primitives of the same type with the same
/// value.
pub fn eq(left: &NodeRef, right: &NodeRef) -> bool {
    if Arc::ptr_eq(left, right) || left.id() == right.id() {
        return true;
    }
    match (left.primitive_value(), right.primitive_value()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Structural equality. Instances compare through their classifier's equality
/// key properties, or through `external_keys` when given; an instance whose
/// class declares no keys equals nothing but itself. Value carriers compare
/// their value lists elementwise.
pub fn equal(left: &NodeRef, right: &NodeRef, external_keys: Option<&[String]>) -> bool {
    if Arc::ptr_eq(left, right) || left.id() == right.id() {
        return true;
    }
    if let (Some(a), Some(b)) = (left.primitive_value(), right.primitive_value()) {
        return a == b;
    }
    if is_value_carrier(left) || is_value_carrier(right) {
        return equal_many(&unwrap_values(left), &unwrap_values(right), external_keys);
    }
    match (&left.kind, &right.kind) {
        (NodeKind::Instance, NodeKind::Instance) => {
            let same_class = match (&left.classifier, &right.classifier) {
                (Some(a), Some(b)) => a.id() == b.id(),
                _ => false,
            };
            if !same_class {
                return false;
            }
            let keys = match external_keys {
                Some(keys) if !keys.is_empty() => keys.to_vec(),
                _ => equality_keys(left),
            };
            if keys.is_empty() {
                return false;
            }
            keys.iter().all(|key| {
                equal_many(&left.get_to_many(key), &right.get_to_many(key), None)
            })
        }
        _ => false,
    }
}

pub fn equal_many(left: &[NodeRef], right: &[NodeRef], external_keys: Option<&[String]>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right.iter())
            .all(|(a, b)| equal(a, b, external_keys))
}

fn is_value_carrier(node: &NodeRef) -> bool {
    matches!(node.as_expression(), Some(Expression::Value(_)))
}

fn equality_keys(node: &NodeRef) -> Vec<String> {
    node.classifier
        .as_ref()
        .and_then(|classifier| classifier.as_class())
        .map(|def| def.equality_keys())
        .unwrap_or_default()
}

/// A hash consistent with `equal`: primitives hash their value, keyed
/// instances hash their key property values, keyless instances fall back to
/// identity.
pub fn structural_hash(node: &NodeRef) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_into(node, &mut hasher);
    hasher.finish()
}

fn hash_into(node: &NodeRef, hasher: &mut DefaultHasher) {
    if let Some(value) = node.primitive_value() {
        value.hash(hasher);
        return;
    }
    if is_value_carrier(node) {
        for value in unwrap_values(node) {
            hash_into(&value, hasher);
        }
        return;
    }
    if let NodeKind::Instance = node.kind {
        let keys = equality_keys(node);
        if !keys.is_empty() {
            if let Some(classifier) = &node.classifier {
                classifier.id().hash(hasher);
            }
            for key in keys {
                key.hash(hasher);
                for value in node.get_to_many(&key) {
                    hash_into(&value, hasher);
                }
            }
            return;
        }
    }
    node.id().hash(hasher);
}

/// Bucketed set over structural equality.
#[derive(Debug, Default)]
pub struct NodeSet {
    buckets: HashMap<u64, Vec<NodeRef>>,
}

impl NodeSet {
    pub fn new() -> NodeSet {
        NodeSet::default()
    }

    pub fn contains(&self, node: &NodeRef) -> bool {
        self.buckets
            .get(&structural_hash(node))
            .map(|bucket| bucket.iter().any(|member| equal(member, node, None)))
            .unwrap_or(false)
    }

    /// Insert if absent; returns whether the node was added.
    pub fn insert(&mut self, node: NodeRef) -> bool {
        let bucket = self.buckets.entry(structural_hash(&node)).or_default();
        if bucket.iter().any(|member| equal(member, &node, None)) {
            return false;
        }
        bucket.push(node);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::class::ClassDef;
    use crate::model::repository::Repository;

    fn keyed_point(repo: &Repository, class: &NodeRef, x: i64, y: i64) -> NodeRef {
        let point = repo.instance(class);
        point.set_values("x", vec![repo.integer(x)]);
        point.set_values("y", vec![repo.integer(y)]);
        point
    }

    #[test]
    fn eq_is_identity_for_instances_and_value_for_primitives() {
        let repo = Repository::new();
        assert!(eq(&repo.integer(5), &repo.integer(5)));
        assert!(!eq(&repo.integer(5), &repo.float(5.0)));
        let class = repo.class("Thing", ClassDef::new());
        let a = repo.instance(&class);
        let b = repo.instance(&class);
        assert!(eq(&a, &a));
        assert!(!eq(&a, &b));
    }

    #[test]
    fn equal_uses_declared_equality_keys() {
        let repo = Repository::new();
        let def = ClassDef::new();
        def.set_equality_keys(vec!["x".to_string(), "y".to_string()]);
        let class = repo.class("Point", def);
        let a = keyed_point(&repo, &class, 1, 2);
        let b = keyed_point(&repo, &class, 1, 2);
        let c = keyed_point(&repo, &class, 1, 3);
        assert!(equal(&a, &b, None));
        assert!(!equal(&a, &c, None));
        assert_eq!(structural_hash(&a), structural_hash(&b));
    }

    #[test]
    fn keyless_instances_never_equal_distinct_nodes() {
        let repo = Repository::new();
        let class = repo.class("Opaque", ClassDef::new());
        let a = repo.instance(&class);
        let b = repo.instance(&class);
        assert!(!equal(&a, &b, None));
        assert!(equal(&a, &a, None));
    }

    #[test]
    fn external_keys_override_declared_keys() {
        let repo = Repository::new();
        let def = ClassDef::new();
        def.set_equality_keys(vec!["x".to_string(), "y".to_string()]);
        let class = repo.class("Point", def);
        let a = keyed_point(&repo, &class, 1, 2);
        let b = keyed_point(&repo, &class, 1, 9);
        let only_x = vec!["x".to_string()];
        assert!(equal(&a, &b, Some(&only_x)));
        assert!(!equal(&a, &b, None));
    }

    #[test]
    fn node_set_deduplicates_structurally() {
        let repo = Repository::new();
        let mut set = NodeSet::new();
        assert!(set.insert(repo.integer(1)));
        assert!(!set.insert(repo.integer(1)));
        assert!(set.insert(repo.integer(2)));
        assert!(set.contains(&repo.integer(2)));
        assert!(!set.contains(&repo.integer(3)));
    }
}
