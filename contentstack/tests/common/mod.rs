//! Helpers shared by the provider integration tests

#![allow(dead_code)]

use contentstack::ContentstackProvider;
use std::collections::HashMap;
use tfplug::provider::ConfigureProviderRequest;
use tfplug::server::{
    ApplyResourceChangeRequest, ApplyResourceChangeResponse, PlanResourceChangeRequest,
    ProviderServer,
};
use tfplug::types::{ClientCapabilities, Dynamic, DynamicValue};

pub const API_KEY: &str = "blt-test-stack";
pub const MANAGEMENT_TOKEN: &str = "cs-test-token";

pub fn object(entries: &[(&str, Dynamic)]) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    ))
}

pub fn map(entries: &[(&str, Dynamic)]) -> Dynamic {
    object(entries).value
}

/// Route provider logs to the test harness; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// A provider server configured against `host`
pub async fn configured_server(host: &str) -> ProviderServer<ContentstackProvider> {
    init_tracing();
    let server = ProviderServer::new(ContentstackProvider::new());
    let diagnostics = server
        .configure_provider(ConfigureProviderRequest {
            terraform_version: "1.9.0".to_string(),
            config: object(&[
                ("host", Dynamic::from(host)),
                ("api_key", Dynamic::from(API_KEY)),
                ("management_token", Dynamic::from(MANAGEMENT_TOKEN)),
                ("debug", Dynamic::from(true)),
            ]),
            client_capabilities: ClientCapabilities::default(),
        })
        .await;
    assert!(diagnostics.is_empty(), "configure failed: {:?}", diagnostics);
    server
}

/// Proposed new state the way Terraform builds it: configuration, with
/// unset computed attributes carried over from prior state
pub fn proposed(prior: &DynamicValue, config: &DynamicValue) -> DynamicValue {
    if prior.is_null() || config.is_null() {
        return config.clone();
    }
    DynamicValue::new(carry_prior(&prior.value, &config.value))
}

fn carry_prior(prior: &Dynamic, config: &Dynamic) -> Dynamic {
    match (prior, config) {
        (_, Dynamic::Null) => prior.clone(),
        (Dynamic::Map(prior), Dynamic::Map(config)) => {
            let merged: HashMap<String, Dynamic> = config
                .iter()
                .map(|(k, v)| {
                    let value = match prior.get(k) {
                        Some(previous) => carry_prior(previous, v),
                        None => v.clone(),
                    };
                    (k.clone(), value)
                })
                .collect();
            Dynamic::Map(merged)
        }
        // Nested objects are matched on their uid, falling back to position
        (Dynamic::List(prior), Dynamic::List(config)) => Dynamic::List(
            config
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let uid = item.as_map().and_then(|m| m.get("uid"));
                    let previous = match uid {
                        Some(uid) if !uid.is_null() => prior
                            .iter()
                            .find(|p| p.as_map().and_then(|m| m.get("uid")) == Some(uid)),
                        _ => prior.get(i),
                    };
                    match previous {
                        Some(previous) => carry_prior(previous, item),
                        None => item.clone(),
                    }
                })
                .collect(),
        ),
        _ => config.clone(),
    }
}

/// Plan then apply a change, returning the planned state and the apply result
pub async fn plan_and_apply(
    server: &ProviderServer<ContentstackProvider>,
    type_name: &str,
    prior: &DynamicValue,
    config: &DynamicValue,
) -> (DynamicValue, ApplyResourceChangeResponse) {
    let plan = server
        .plan_resource_change(PlanResourceChangeRequest {
            type_name: type_name.to_string(),
            prior_state: prior.clone(),
            proposed_new_state: proposed(prior, config),
            config: config.clone(),
        })
        .await;
    assert!(plan.diagnostics.is_empty(), "plan failed: {:?}", plan.diagnostics);

    let applied = server
        .apply_resource_change(ApplyResourceChangeRequest {
            type_name: type_name.to_string(),
            prior_state: prior.clone(),
            planned_state: plan.planned_state.clone(),
            config: config.clone(),
        })
        .await;

    (plan.planned_state, applied)
}

/// Apply a destroy of `prior`
pub async fn destroy(
    server: &ProviderServer<ContentstackProvider>,
    type_name: &str,
    prior: &DynamicValue,
) -> ApplyResourceChangeResponse {
    server
        .apply_resource_change(ApplyResourceChangeRequest {
            type_name: type_name.to_string(),
            prior_state: prior.clone(),
            planned_state: DynamicValue::null(),
            config: DynamicValue::null(),
        })
        .await
}
