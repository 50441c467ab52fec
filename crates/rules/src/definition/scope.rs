//! Immutable parent chain of config nodes used by keyed facet lookups.

use serde_json::{Map, Value};

/// A config object plus a link to the scope of its enclosing object.
///
/// Array elements link to the object holding the array, so a field declared
/// on an ancestor is visible from any depth below it.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    node: &'a Map<String, Value>,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    pub fn root(node: &'a Map<String, Value>) -> Self {
        Self { node, parent: None }
    }

    pub fn child(&'a self, node: &'a Map<String, Value>) -> Scope<'a> {
        Scope {
            node,
            parent: Some(self),
        }
    }

    pub fn node(&self) -> &'a Map<String, Value> {
        self.node
    }

    /// Find `field` on this node, else on the nearest ancestor that has it.
    /// `null` counts as absent.
    pub fn lookup(&self, field: &str) -> Option<&'a Value> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(value) = scope.node.get(field).filter(|v| !v.is_null()) {
                return Some(value);
            }
            current = scope.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nearest_definition_wins() {
        let outer = json!({"name": "outer", "function": "format"});
        let inner = json!({"name": "inner", "value": null});
        let root = Scope::root(outer.as_object().unwrap());
        let scope = root.child(inner.as_object().unwrap());

        assert_eq!(scope.lookup("name"), Some(&json!("inner")));
        assert_eq!(scope.lookup("function"), Some(&json!("format")));
        assert_eq!(scope.lookup("value"), None);
        assert_eq!(scope.lookup("missing"), None);
    }
}
