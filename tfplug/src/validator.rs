//! Built-in attribute validators

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{Diagnostic, Dynamic};

/// Accepts only strings from a fixed set of values
pub struct OneOf {
    values: Vec<String>,
}

impl OneOf {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for OneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.quoted_values())
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();

        if let Some(value) = request.config_value.value.as_string() {
            if !self.values.iter().any(|v| v == value) {
                response.diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {} value must be one of: {}, got: \"{}\"",
                            request.path,
                            self.quoted_values(),
                            value
                        ),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        response
    }
}

impl OneOf {
    fn quoted_values(&self) -> String {
        self.values
            .iter()
            .map(|v| format!("\"{}\"", v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Rejects configurations that set this attribute together with a sibling
pub struct ConflictsWith {
    fields: Vec<String>,
}

impl ConflictsWith {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for ConflictsWith {
    fn description(&self) -> String {
        format!(
            "Ensure that if an attribute is set, these are not set: [{}]",
            self.fields.join(", ")
        )
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();

        if request.config_value.is_null() {
            return response;
        }

        let parent = request.path.parent();
        for field in &self.fields {
            let sibling_path = parent.clone().attribute(field);
            if matches!(request.config.get_dynamic(&sibling_path), Dynamic::Null) {
                continue;
            }
            response.diagnostics.push(
                Diagnostic::error(
                    "Invalid Attribute Combination",
                    format!(
                        "Attribute \"{}\" cannot be specified when \"{}\" is specified",
                        sibling_path, request.path
                    ),
                )
                .with_attribute(request.path.clone()),
            );
        }

        response
    }
}
