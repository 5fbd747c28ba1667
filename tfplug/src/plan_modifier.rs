//! Built-in plan modifiers
//!
//! Plan modifiers run after Terraform has produced a proposed new state and can:
//! - Modify the planned value
//! - Mark an attribute as requiring replacement
//! - Add warnings or errors to the plan
//!
//! The conditional defaults here (`DefaultValue`, `DefaultNull`,
//! `DefaultValueCopiedFromAnotherField`) only act when the attribute is not
//! set in configuration.

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::types::{Diagnostic, Dynamic, DynamicValue};

/// Marks an attribute as requiring replacement when it changes
pub struct RequiresReplaceIfChanged;

impl PlanModifier for RequiresReplaceIfChanged {
    fn description(&self) -> String {
        "If the value of this attribute changes, Terraform will destroy and recreate the resource."
            .to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let state = &request.state_value.value;
        let plan = &request.plan_value.value;
        let requires_replace = !matches!(
            (state, plan),
            (Dynamic::Null, _) | (Dynamic::Unknown, _) | (_, Dynamic::Unknown)
        ) && !values_equal(state, plan);

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: Vec::new(),
        }
    }
}

/// Uses the prior state value when the planned value is unknown
///
/// Useful for computed attributes that never change once the remote object
/// exists, so plans don't show them as "known after apply" on every update.
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "Once set, the value of this attribute in state will not change.".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        if !request.plan_value.is_unknown()
            || request.state_value.is_null()
            || request.state_value.is_unknown()
        {
            return PlanModifierResponse::unchanged(request);
        }

        PlanModifierResponse {
            plan_value: request.state_value,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Plans a constant value whenever the attribute is not configured
pub struct DefaultValue {
    value: Dynamic,
}

impl DefaultValue {
    pub fn string(value: &str) -> Self {
        Self {
            value: Dynamic::String(value.to_string()),
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            value: Dynamic::Bool(value),
        }
    }
}

impl PlanModifier for DefaultValue {
    fn description(&self) -> String {
        match &self.value {
            Dynamic::String(s) => format!("If value is not configured, defaults to \"{}\"", s),
            Dynamic::Bool(b) => format!("If value is not configured, defaults to {}", b),
            other => format!("If value is not configured, defaults to {:?}", other),
        }
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        if !request.config_value.is_null() {
            return PlanModifierResponse::unchanged(request);
        }

        PlanModifierResponse {
            plan_value: DynamicValue::new(self.value.clone()),
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Plans null whenever the attribute is not configured
pub struct DefaultNull;

impl PlanModifier for DefaultNull {
    fn description(&self) -> String {
        "If value is not configured, defaults to null".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        if !request.config_value.is_null() {
            return PlanModifierResponse::unchanged(request);
        }

        PlanModifierResponse {
            plan_value: DynamicValue::null(),
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Copies a sibling string attribute from configuration when this one is
/// unset and still unknown in the plan
///
/// The sibling is resolved relative to the attribute's parent, so inside a
/// nested object `fields[2].display_name` reads `fields[2].uid`.
pub struct DefaultValueCopiedFromAnotherField {
    field: String,
}

impl DefaultValueCopiedFromAnotherField {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

impl PlanModifier for DefaultValueCopiedFromAnotherField {
    fn description(&self) -> String {
        format!(
            "If value is not configured, defaults to the value of the \"{}\" property",
            self.field
        )
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        // a known plan value means an earlier modifier already decided
        if !request.plan_value.is_unknown() || !request.config_value.is_null() {
            return PlanModifierResponse::unchanged(request);
        }

        let sibling_path = request.path.parent().attribute(&self.field);
        match request.config.get_dynamic(&sibling_path) {
            Dynamic::String(value) => PlanModifierResponse {
                plan_value: DynamicValue::new(Dynamic::String(value)),
                requires_replace: false,
                diagnostics: Vec::new(),
            },
            Dynamic::Null | Dynamic::Unknown => PlanModifierResponse::unchanged(request),
            other => {
                let diagnostic = Diagnostic::error(
                    "Invalid source attribute",
                    format!(
                        "Expected {} to be a string to copy into {}, got {}",
                        sibling_path,
                        request.path,
                        other.type_name()
                    ),
                )
                .with_attribute(request.path.clone());
                let mut response = PlanModifierResponse::unchanged(request);
                response.diagnostics.push(diagnostic);
                response
            }
        }
    }
}

/// Structural equality for values, tolerant of float rounding
pub fn values_equal(a: &Dynamic, b: &Dynamic) -> bool {
    match (a, b) {
        (Dynamic::Null, Dynamic::Null) => true,
        (Dynamic::Unknown, Dynamic::Unknown) => true,
        (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
        (Dynamic::Number(a), Dynamic::Number(b)) => (a - b).abs() < f64::EPSILON,
        (Dynamic::String(a), Dynamic::String(b)) => a == b,
        (Dynamic::List(a), Dynamic::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Dynamic::Map(a), Dynamic::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|v2| values_equal(v, v2)))
        }
        _ => false,
    }
}
