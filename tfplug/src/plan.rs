//! Framework side of PlanResourceChange
//!
//! Turns Terraform's proposed new state into a planned state:
//! 1. Apply schema defaults where configuration is null
//! 2. Mark computed attributes without configuration as unknown, when the
//!    resource is being created or its configuration changed
//! 3. Run attribute plan modifiers, parents before nested attributes
//!
//! Destroy plans never reach this module.

use crate::plan_modifier::values_equal;
use crate::schema::{Attribute, DefaultRequest, NestedType, ObjectNestingMode, PlanModifierRequest};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// Result of planning one resource instance
pub struct PlannedChange {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Plan a create or update
pub fn plan_change(
    attributes: &[Attribute],
    prior_state: &DynamicValue,
    proposed_new_state: &DynamicValue,
    config: &DynamicValue,
) -> PlannedChange {
    let mut planner = Planner {
        prior_state,
        config,
        planned: proposed_new_state.clone(),
        requires_replace: Vec::new(),
        diagnostics: Vec::new(),
    };
    let root = AttributePath::root();

    planner.apply_defaults(attributes, &root);

    if prior_state.is_null() || !values_equal(&planner.planned.value, &prior_state.value) {
        planner.mark_computed_unknown(attributes, &root);
    }

    planner.modify(attributes, &root);

    PlannedChange {
        planned_state: planner.planned,
        requires_replace: planner.requires_replace,
        diagnostics: planner.diagnostics,
    }
}

/// Paths of the objects held by a nested attribute value
pub(crate) fn nested_element_paths(
    nested: &NestedType,
    path: &AttributePath,
    value: &Dynamic,
) -> Vec<AttributePath> {
    match (nested.nesting, value) {
        (ObjectNestingMode::Single, Dynamic::Map(_)) => vec![path.clone()],
        (ObjectNestingMode::List | ObjectNestingMode::Set, Dynamic::List(items)) => {
            (0..items.len()).map(|i| path.clone().index(i as i64)).collect()
        }
        (ObjectNestingMode::Map, Dynamic::Map(entries)) => {
            let mut keys: Vec<&String> = entries.keys().collect();
            keys.sort();
            keys.into_iter().map(|k| path.clone().key(k)).collect()
        }
        _ => Vec::new(),
    }
}

struct Planner<'a> {
    prior_state: &'a DynamicValue,
    config: &'a DynamicValue,
    planned: DynamicValue,
    requires_replace: Vec<AttributePath>,
    diagnostics: Vec<Diagnostic>,
}

impl Planner<'_> {
    fn set(&mut self, path: &AttributePath, value: Dynamic) {
        if let Err(e) = self.planned.set_value(path, value) {
            self.diagnostics.push(
                Diagnostic::error(
                    "Error modifying plan",
                    format!("Could not set planned value for {}: {}", path, e),
                )
                .with_attribute(path.clone()),
            );
        }
    }

    fn apply_defaults(&mut self, attributes: &[Attribute], base: &AttributePath) {
        for attr in attributes {
            let path = base.clone().attribute(&attr.name);
            let config_value = self.config.get_dynamic(&path);

            if let Some(default) = &attr.default {
                if config_value.is_null() {
                    let response = default.default_value(DefaultRequest { path: path.clone() });
                    self.set(&path, response.value.value);
                    continue;
                }
            }

            if let Some(nested) = &attr.nested_type {
                for element in nested_element_paths(nested, &path, &config_value) {
                    self.apply_defaults(&nested.attributes, &element);
                }
            }
        }
    }

    fn mark_computed_unknown(&mut self, attributes: &[Attribute], base: &AttributePath) {
        for attr in attributes {
            let path = base.clone().attribute(&attr.name);
            let config_value = self.config.get_dynamic(&path);

            if attr.computed && attr.default.is_none() && config_value.is_null() {
                self.set(&path, Dynamic::Unknown);
                continue;
            }

            if let Some(nested) = &attr.nested_type {
                for element in nested_element_paths(nested, &path, &config_value) {
                    self.mark_computed_unknown(&nested.attributes, &element);
                }
            }
        }
    }

    fn modify(&mut self, attributes: &[Attribute], base: &AttributePath) {
        for attr in attributes {
            let path = base.clone().attribute(&attr.name);

            for modifier in &attr.plan_modifiers {
                let request = PlanModifierRequest {
                    config_value: DynamicValue::new(self.config.get_dynamic(&path)),
                    state_value: DynamicValue::new(self.prior_state.get_dynamic(&path)),
                    plan_value: DynamicValue::new(self.planned.get_dynamic(&path)),
                    config: self.config.clone(),
                    path: path.clone(),
                };
                let response = modifier.modify(request);

                self.diagnostics.extend(response.diagnostics);
                if response.requires_replace && !self.requires_replace.contains(&path) {
                    self.requires_replace.push(path.clone());
                }
                self.set(&path, response.plan_value.value);
            }

            if let Some(nested) = &attr.nested_type {
                let planned_value = self.planned.get_dynamic(&path);
                for element in nested_element_paths(nested, &path, &planned_value) {
                    self.modify(&nested.attributes, &element);
                }
            }
        }
    }
}
