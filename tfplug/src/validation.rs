//! Schema driven configuration validation
//!
//! Checks configuration against a schema before handler specific validation:
//! unsupported arguments, missing required arguments, values set on
//! read-only attributes, type mismatches and attribute validators.

use crate::plan::nested_element_paths;
use crate::schema::{Attribute, AttributeType, ValidatorRequest};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// Validate a whole configuration object against the schema attributes
pub fn validate_config(attributes: &[Attribute], config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_object(
        attributes,
        &AttributePath::root(),
        config,
        &mut diagnostics,
    );
    diagnostics
}

fn validate_object(
    attributes: &[Attribute],
    base: &AttributePath,
    config: &DynamicValue,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let Dynamic::Map(values) = config.get_dynamic(base) {
        let mut names: Vec<&String> = values.keys().collect();
        names.sort();
        for name in names {
            if !attributes.iter().any(|a| &a.name == name) {
                let path = base.clone().attribute(name);
                diagnostics.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named \"{}\" is not expected here.", path),
                    )
                    .with_attribute(path),
                );
            }
        }
    }

    for attr in attributes {
        let path = base.clone().attribute(&attr.name);
        let value = config.get_dynamic(&path);
        validate_attribute(attr, &path, &value, config, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    path: &AttributePath,
    value: &Dynamic,
    config: &DynamicValue,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if value.is_null() {
        if attr.required {
            diagnostics.push(
                Diagnostic::error(
                    "Missing required argument",
                    format!(
                        "The argument \"{}\" is required, but no definition was found.",
                        path
                    ),
                )
                .with_attribute(path.clone()),
            );
        }
    } else if attr.computed && !attr.optional && !attr.required {
        diagnostics.push(
            Diagnostic::error(
                "Invalid Configuration for Read-Only Attribute",
                format!(
                    "Cannot set value for {} as the provider has marked it as read-only. Remove the configuration line setting the value.",
                    path
                ),
            )
            .with_attribute(path.clone()),
        );
        return;
    }

    if attr.nested_type.is_none() && !value_conforms(value, &attr.r#type) {
        diagnostics.push(
            Diagnostic::error(
                "Incorrect attribute value type",
                format!(
                    "Inappropriate value for attribute \"{}\": expected {:?}, got {}.",
                    path,
                    attr.r#type,
                    value.type_name()
                ),
            )
            .with_attribute(path.clone()),
        );
        return;
    }

    if !value.is_unknown() {
        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: DynamicValue::new(value.clone()),
                config: config.clone(),
                path: path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }
    }

    if let Some(nested) = &attr.nested_type {
        for element in nested_element_paths(nested, path, value) {
            validate_object(&nested.attributes, &element, config, diagnostics);
        }
    }
}

fn value_conforms(value: &Dynamic, expected: &AttributeType) -> bool {
    match (value, expected) {
        (Dynamic::Null | Dynamic::Unknown, _) => true,
        (Dynamic::String(_), AttributeType::String) => true,
        (Dynamic::Number(_), AttributeType::Number) => true,
        (Dynamic::Bool(_), AttributeType::Bool) => true,
        (Dynamic::List(items), AttributeType::List(inner) | AttributeType::Set(inner)) => {
            items.iter().all(|item| value_conforms(item, inner))
        }
        (Dynamic::Map(entries), AttributeType::Map(inner)) => {
            entries.values().all(|item| value_conforms(item, inner))
        }
        (Dynamic::Map(entries), AttributeType::Object(fields)) => entries
            .iter()
            .all(|(k, v)| fields.get(k).is_some_and(|t| value_conforms(v, t))),
        _ => false,
    }
}
