//! Depth-first walk of a config tree paired with its schema definition.

use serde_json::{Map, Value};

use super::fuzzy::fuzzy_match;
use super::ValidationResult;
use crate::definition::{type_name, Definition, FieldDef, FieldType, Scope, Shape};

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn invalid_type(result: &mut ValidationResult, path: &str, property: &str, found: &Value, expected: &str) {
    result.error(
        path,
        format!(
            "Invalid value type \"{}\" for property \"{}\".  Must be \"{}\".",
            type_name(found),
            property,
            expected
        ),
    );
}

/// Check every property of `node` against `def`, then report missing required ones.
pub(crate) fn check_node(
    node: &Map<String, Value>,
    def: &Definition,
    scope: &Scope<'_>,
    path: &str,
    result: &mut ValidationResult,
) {
    for (key, value) in node {
        let Some(field) = def.get(key) else {
            let field_path = join(path, key);
            let message = format!("Unexpected property \"{}\".", key);
            match fuzzy_match(key, &def.names()) {
                Some(near) if !node.contains_key(near) => result.error_with_suggestion(
                    field_path,
                    message,
                    format!("did you mean '{}'?", near),
                ),
                _ => result.error(field_path, message),
            }
            continue;
        };

        let field_path = join(path, field.path_segment(key));
        match field.field_type {
            FieldType::Object => check_object(key, value, field, scope, &field_path, result),
            FieldType::Array => check_array(key, value, field, scope, &field_path, result),
            FieldType::StringArray => check_string_array(key, value, &field_path, result),
            FieldType::String
            | FieldType::Number
            | FieldType::Boolean
            | FieldType::Identifier => check_scalar(key, value, field, scope, &field_path, result),
        }
    }

    for (name, field) in def.fields() {
        if !node.contains_key(name) && field.required.resolve(scope).copied().unwrap_or(false) {
            result.error(
                join(path, field.path_segment(name)),
                format!("Missing required property \"{}\".", name),
            );
        }
    }
}

/// Recurse into one nested object with an already-resolved shape.
fn check_nested(
    node: &Map<String, Value>,
    shape: Option<&Shape>,
    scope: &Scope<'_>,
    path: &str,
    result: &mut ValidationResult,
) {
    match shape {
        Some(Shape::Fields(def)) => check_node(node, def, &scope.child(node), path, result),
        Some(Shape::Empty) => {
            for key in node.keys() {
                result.error(
                    join(path, key),
                    format!("Unexpected property \"{}\".", key),
                );
            }
        }
        // The selecting key is missing or invalid and reported on its own.
        None => {}
    }
}

fn check_object(
    key: &str,
    value: &Value,
    field: &FieldDef,
    scope: &Scope<'_>,
    path: &str,
    result: &mut ValidationResult,
) {
    let shape = field.def.as_ref().and_then(|d| d.resolve(scope));
    match value {
        Value::Object(node) => check_nested(node, shape, scope, path, result),
        Value::Null if field.nullable || matches!(shape, Some(Shape::Empty)) => {}
        other => invalid_type(result, path, key, other, FieldType::Object.as_str()),
    }
}

fn check_array(
    key: &str,
    value: &Value,
    field: &FieldDef,
    scope: &Scope<'_>,
    path: &str,
    result: &mut ValidationResult,
) {
    let Value::Array(items) = value else {
        invalid_type(result, path, key, value, FieldType::Array.as_str());
        return;
    };
    let shape = field.def.as_ref().and_then(|d| d.resolve(scope));
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Object(node) => {
                check_nested(node, shape, scope, &format!("{}[{}]", path, index), result)
            }
            other => invalid_type(
                result,
                path,
                &format!("{}[{}]", key, index),
                other,
                FieldType::Object.as_str(),
            ),
        }
    }
}

fn check_string_array(key: &str, value: &Value, path: &str, result: &mut ValidationResult) {
    let Value::Array(items) = value else {
        invalid_type(result, path, key, value, FieldType::StringArray.as_str());
        return;
    };
    for (index, item) in items.iter().enumerate() {
        if !item.is_string() {
            invalid_type(
                result,
                path,
                &format!("{}[{}]", key, index),
                item,
                FieldType::String.as_str(),
            );
        }
    }
}

fn check_scalar(
    key: &str,
    value: &Value,
    field: &FieldDef,
    scope: &Scope<'_>,
    path: &str,
    result: &mut ValidationResult,
) {
    if !field.field_type.accepts(value) {
        invalid_type(result, path, key, value, field.field_type.as_str());
        return;
    }
    let Some(allowed) = field.one_of.as_ref().and_then(|o| o.resolve(scope)) else {
        return;
    };
    if allowed.contains(value) {
        return;
    }
    let message = format!("Value of \"{}\" is invalid.", scalar_text(value));
    let suggestion = value
        .as_str()
        .and_then(|s| fuzzy_match(s, allowed.candidates()));
    match suggestion {
        Some(near) => result.error_with_suggestion(path, message, format!("did you mean '{}'?", near)),
        None => result.error(path, message),
    }
}
