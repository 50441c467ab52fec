//! Declarative schema model for pipeline documents.
//!
//! A [`Definition`] maps property names to [`FieldDef`]s. Three facets of a
//! field (`required`, nested `def`, allowed values `one_of`) are either given
//! directly or *keyed*: the value of another property, found on the current
//! config node or on one of its ancestors, selects the facet from a map.
//! This is what lets a rule's `config` shape depend on its `name`.

mod registry;
mod scope;

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

pub use registry::{schema, SchemaModel};
pub use scope::Scope;

/// Declared runtime type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// A string or an integral number, as pipeline ids are.
    Identifier,
    Object,
    Array,
    /// Array of strings; elements are type-checked but not recursed into.
    StringArray,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Identifier => "string or integer",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::StringArray => "string-array",
        }
    }

    /// Whether a scalar JSON value satisfies this type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Identifier => value.is_string() || value.is_i64(),
            FieldType::Object => value.is_object(),
            FieldType::Array | FieldType::StringArray => value.is_array(),
        }
    }
}

/// Name of a JSON value's runtime type, as used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A facet given directly or selected through a keyed lookup.
#[derive(Debug, Clone)]
pub enum Facet<T> {
    Direct(T),
    Keyed {
        /// Property whose value (on this node or an ancestor) selects the entry.
        key: &'static str,
        map: HashMap<&'static str, T>,
    },
}

impl<T> Facet<T> {
    pub fn keyed(key: &'static str, entries: impl IntoIterator<Item = (&'static str, T)>) -> Self {
        Facet::Keyed {
            key,
            map: entries.into_iter().collect(),
        }
    }

    /// Resolve against a config scope. `None` when a keyed lookup finds no
    /// string key, or the key has no entry in the map.
    pub fn resolve<'s>(&'s self, scope: &Scope<'_>) -> Option<&'s T> {
        match self {
            Facet::Direct(value) => Some(value),
            Facet::Keyed { key, map } => scope
                .lookup(key)
                .and_then(Value::as_str)
                .and_then(|k| map.get(k)),
        }
    }
}

/// Nested shape of an `object`/`array` property.
#[derive(Debug, Clone)]
pub enum Shape {
    Fields(Arc<Definition>),
    /// No configurable properties (e.g. the `uncluster` rule); `null` is accepted.
    Empty,
}

impl Shape {
    pub fn fields(def: Definition) -> Self {
        Shape::Fields(Arc::new(def))
    }
}

/// Closed set of allowed scalar values.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOf {
    Strings(Vec<&'static str>),
    Integers(Vec<i64>),
}

impl OneOf {
    pub fn strings(values: &[&'static str]) -> Self {
        OneOf::Strings(values.to_vec())
    }

    pub fn contains(&self, value: &Value) -> bool {
        match (self, value) {
            (OneOf::Strings(allowed), Value::String(s)) => allowed.contains(&s.as_str()),
            (OneOf::Integers(allowed), Value::Number(n)) => {
                integral(n).is_some_and(|n| allowed.contains(&n))
            }
            _ => false,
        }
    }

    /// String candidates for "did you mean" suggestions.
    pub fn candidates(&self) -> &[&'static str] {
        match self {
            OneOf::Strings(allowed) => allowed,
            OneOf::Integers(_) => &[],
        }
    }
}

/// Integer value of a number, accepting floats without a fractional part.
pub fn integral(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Schema of a single property.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub required: Facet<bool>,
    pub field_type: FieldType,
    pub def: Option<Facet<Shape>>,
    pub one_of: Option<Facet<OneOf>>,
    /// `null` is accepted in place of the declared type.
    pub nullable: bool,
    /// Path segment used in errors instead of the property name.
    pub label: Option<&'static str>,
}

impl FieldDef {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            required: Facet::Direct(false),
            field_type,
            def: None,
            one_of: None,
            nullable: false,
            label: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    pub fn number() -> Self {
        Self::new(FieldType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn identifier() -> Self {
        Self::new(FieldType::Identifier)
    }

    pub fn string_array() -> Self {
        Self::new(FieldType::StringArray)
    }

    pub fn object(def: Facet<Shape>) -> Self {
        Self {
            def: Some(def),
            ..Self::new(FieldType::Object)
        }
    }

    pub fn array(def: Facet<Shape>) -> Self {
        Self {
            def: Some(def),
            ..Self::new(FieldType::Array)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = Facet::Direct(true);
        self
    }

    pub fn required_when(mut self, required: Facet<bool>) -> Self {
        self.required = required;
        self
    }

    pub fn one_of(mut self, one_of: Facet<OneOf>) -> Self {
        self.one_of = Some(one_of);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn reported_as(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Segment naming this field in error paths.
    pub fn path_segment<'a>(&self, name: &'a str) -> &'a str {
        self.label.unwrap_or(name)
    }
}

/// Ordered property definitions of one config node.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    fields: IndexMap<&'static str, FieldDef>,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, def: FieldDef) -> Self {
        self.fields.insert(name, def);
        self
    }

    /// Copy every field of `other` into this definition (spread).
    pub fn extend(mut self, other: &Definition) -> Self {
        for (name, def) in &other.fields {
            self.fields.insert(*name, def.clone());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldDef)> {
        self.fields.iter().map(|(name, def)| (*name, def))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fields.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn direct_facet_ignores_scope() {
        let node = json!({});
        let scope = Scope::root(node.as_object().unwrap());
        assert_eq!(Facet::Direct(true).resolve(&scope), Some(&true));
    }

    #[test]
    fn keyed_facet_walks_to_ancestor() {
        let facet = Facet::keyed("function", [("split", OneOf::strings(&["delimiter"]))]);
        let parent = json!({"function": "split"});
        let child = json!({"name": "delimiter"});
        let root = Scope::root(parent.as_object().unwrap());
        let scope = root.child(child.as_object().unwrap());

        let resolved = facet.resolve(&scope).unwrap();
        assert!(resolved.contains(&json!("delimiter")));
        assert!(!resolved.contains(&json!("template")));
    }

    #[test]
    fn keyed_facet_unresolved() {
        let facet = Facet::keyed("name", [("command", true)]);
        let missing = json!({});
        let unknown = json!({"name": "template"});
        let not_string = json!({"name": 3});
        for node in [missing, unknown, not_string] {
            let scope = Scope::root(node.as_object().unwrap());
            assert_eq!(facet.resolve(&scope), None);
        }
    }

    #[test]
    fn integer_one_of_accepts_integral_floats_only() {
        let offsets = OneOf::Integers((0..=9).collect());
        assert!(offsets.contains(&json!(3)));
        assert!(offsets.contains(&json!(5.0)));
        assert!(!offsets.contains(&json!(10)));
        assert!(!offsets.contains(&json!(3.5)));
        assert!(!offsets.contains(&json!("3")));
        assert!(offsets.candidates().is_empty());
    }

    #[test]
    fn identifier_accepts_strings_and_integers() {
        assert!(FieldType::Identifier.accepts(&json!(12)));
        assert!(FieldType::Identifier.accepts(&json!("sec-edgar")));
        assert!(!FieldType::Identifier.accepts(&json!(1.5)));
        assert!(!FieldType::Identifier.accepts(&json!(true)));
        assert!(FieldType::Boolean.accepts(&json!(false)));
        assert!(!FieldType::Boolean.accepts(&json!("yes")));
    }

    #[test]
    fn extend_keeps_declaration_order() {
        let base = Definition::new()
            .field("provider", FieldDef::string().required())
            .field("externalId", FieldDef::string().required());
        let def = Definition::new()
            .extend(&base)
            .field("text", FieldDef::string_array().required());
        assert_eq!(def.names(), vec!["provider", "externalId", "text"]);
        assert!(def.get("text").is_some());
        assert!(def.get("name").is_none());
    }
}
