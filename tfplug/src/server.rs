//! In-process provider server
//!
//! `ProviderServer` implements the provider side of the Terraform plugin
//! protocol operations on top of the `Provider`, `Resource` and `DataSource`
//! traits. Handlers are created fresh from their factories and configured with
//! the provider data for every call. Wire transport is left to the host.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ReadDataSourceResponse, ValidateDataSourceConfigRequest,
};
use crate::plan::plan_change;
use crate::provider::{
    ConfigureProviderRequest, DataSourceFactory, Provider, ProviderMetadataRequest,
    ProviderSchemaRequest, ResourceFactory, StopProviderRequest, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, ResourceSchemaRequest, ResourceWithConfigure, UpdateResourceRequest,
    ValidateResourceConfigRequest,
};
use crate::schema::Schema;
use crate::types::{AttributePath, Diagnostic, DiagnosticsExt, DynamicValue, ServerCapabilities};
use crate::validation::validate_config;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct GetMetadataResponse {
    pub server_capabilities: ServerCapabilities,
    pub resources: Vec<String>,
    pub data_sources: Vec<String>,
}

pub struct GetProviderSchemaResponse {
    pub provider: Schema,
    pub resource_schemas: HashMap<String, Schema>,
    pub data_source_schemas: HashMap<String, Schema>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct PlanResourceChangeRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub proposed_new_state: DynamicValue,
    pub config: DynamicValue,
}

pub struct PlanResourceChangeResponse {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ApplyResourceChangeRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

pub struct ApplyResourceChangeResponse {
    /// Null once the resource is destroyed
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

/// Drives a single provider instance through Terraform's operations
pub struct ProviderServer<P: Provider> {
    provider: RwLock<P>,
    ctx: Context,
    provider_data: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
    resources: HashMap<String, ResourceFactory>,
    data_sources: HashMap<String, DataSourceFactory>,
}

impl<P: Provider> ProviderServer<P> {
    pub fn new(provider: P) -> Self {
        let resources = provider.resources();
        let data_sources = provider.data_sources();

        Self {
            provider: RwLock::new(provider),
            ctx: Context::new(),
            provider_data: RwLock::new(None),
            resources,
            data_sources,
        }
    }

    /// Context shared by every call, cancelled by stop_provider
    pub fn context(&self) -> Context {
        self.ctx.clone()
    }

    pub async fn get_metadata(&self) -> GetMetadataResponse {
        let provider = self.provider.read().await;
        let metadata = provider
            .metadata(self.ctx.clone(), ProviderMetadataRequest)
            .await;

        let mut resources: Vec<String> = self.resources.keys().cloned().collect();
        resources.sort();
        let mut data_sources: Vec<String> = self.data_sources.keys().cloned().collect();
        data_sources.sort();

        GetMetadataResponse {
            server_capabilities: metadata.server_capabilities,
            resources,
            data_sources,
        }
    }

    pub async fn get_provider_schema(&self) -> GetProviderSchemaResponse {
        let provider = self.provider.read().await;
        let provider_schema = provider
            .schema(self.ctx.clone(), ProviderSchemaRequest)
            .await;
        let mut diagnostics = provider_schema.diagnostics;

        let mut resource_schemas = HashMap::new();
        for (name, factory) in &self.resources {
            let response = factory()
                .schema(self.ctx.clone(), ResourceSchemaRequest)
                .await;
            diagnostics.extend(response.diagnostics);
            resource_schemas.insert(name.clone(), response.schema);
        }

        let mut data_source_schemas = HashMap::new();
        for (name, factory) in &self.data_sources {
            let response = factory()
                .schema(self.ctx.clone(), DataSourceSchemaRequest)
                .await;
            diagnostics.extend(response.diagnostics);
            data_source_schemas.insert(name.clone(), response.schema);
        }

        GetProviderSchemaResponse {
            provider: provider_schema.schema,
            resource_schemas,
            data_source_schemas,
            diagnostics,
        }
    }

    pub async fn validate_provider_config(
        &self,
        request: ValidateProviderConfigRequest,
    ) -> Vec<Diagnostic> {
        let provider = self.provider.read().await;
        let schema = provider
            .schema(self.ctx.clone(), ProviderSchemaRequest)
            .await;

        let mut diagnostics = schema.diagnostics;
        diagnostics.extend(validate_config(
            &schema.schema.block.attributes,
            &request.config,
        ));
        let response = provider.validate(self.ctx.clone(), request).await;
        diagnostics.extend(response.diagnostics);
        diagnostics
    }

    pub async fn configure_provider(&self, request: ConfigureProviderRequest) -> Vec<Diagnostic> {
        if let Some(diagnostic) = self.stopped() {
            return vec![diagnostic];
        }

        tracing::debug!(
            terraform_version = %request.terraform_version,
            "Configuring provider"
        );

        let mut provider = self.provider.write().await;
        let response = provider.configure(self.ctx.clone(), request).await;

        if !response.diagnostics.has_errors() {
            *self.provider_data.write().await = response.provider_data;
        }
        response.diagnostics
    }

    /// Cancels the shared context; in-flight and later calls observe it
    pub async fn stop_provider(&self) -> Option<String> {
        tracing::debug!("Stopping provider");
        self.ctx.cancel();

        let provider = self.provider.read().await;
        provider
            .stop(self.ctx.clone(), StopProviderRequest)
            .await
            .error
    }

    pub async fn validate_resource_config(
        &self,
        request: ValidateResourceConfigRequest,
    ) -> Vec<Diagnostic> {
        let factory = match self.resources.get(&request.type_name) {
            Some(factory) => factory,
            None => return vec![unknown_resource(&request.type_name)],
        };
        let resource = factory();
        let schema = resource
            .schema(self.ctx.clone(), ResourceSchemaRequest)
            .await;

        let mut diagnostics = schema.diagnostics;
        diagnostics.extend(validate_config(
            &schema.schema.block.attributes,
            &request.config,
        ));
        let response = resource.validate(self.ctx.clone(), request).await;
        diagnostics.extend(response.diagnostics);
        diagnostics
    }

    pub async fn validate_data_source_config(
        &self,
        request: ValidateDataSourceConfigRequest,
    ) -> Vec<Diagnostic> {
        let factory = match self.data_sources.get(&request.type_name) {
            Some(factory) => factory,
            None => return vec![unknown_data_source(&request.type_name)],
        };
        let data_source = factory();
        let schema = data_source
            .schema(self.ctx.clone(), DataSourceSchemaRequest)
            .await;

        let mut diagnostics = schema.diagnostics;
        diagnostics.extend(validate_config(
            &schema.schema.block.attributes,
            &request.config,
        ));
        let response = data_source.validate(self.ctx.clone(), request).await;
        diagnostics.extend(response.diagnostics);
        diagnostics
    }

    pub async fn plan_resource_change(
        &self,
        request: PlanResourceChangeRequest,
    ) -> PlanResourceChangeResponse {
        let fail = |diagnostics| PlanResourceChangeResponse {
            planned_state: request.proposed_new_state.clone(),
            requires_replace: Vec::new(),
            diagnostics,
        };

        if let Some(diagnostic) = self.stopped() {
            return fail(vec![diagnostic]);
        }
        let factory = match self.resources.get(&request.type_name) {
            Some(factory) => factory,
            None => return fail(vec![unknown_resource(&request.type_name)]),
        };

        if request.proposed_new_state.is_null() {
            tracing::trace!(type_name = %request.type_name, "Planning destroy");
            return PlanResourceChangeResponse {
                planned_state: DynamicValue::null(),
                requires_replace: Vec::new(),
                diagnostics: Vec::new(),
            };
        }

        let schema = factory()
            .schema(self.ctx.clone(), ResourceSchemaRequest)
            .await;
        if schema.diagnostics.has_errors() {
            return fail(schema.diagnostics);
        }

        let planned = plan_change(
            &schema.schema.block.attributes,
            &request.prior_state,
            &request.proposed_new_state,
            &request.config,
        );
        tracing::trace!(
            type_name = %request.type_name,
            requires_replace = planned.requires_replace.len(),
            "Planned resource change"
        );

        PlanResourceChangeResponse {
            planned_state: planned.planned_state,
            requires_replace: planned.requires_replace,
            diagnostics: planned.diagnostics,
        }
    }

    pub async fn apply_resource_change(
        &self,
        request: ApplyResourceChangeRequest,
    ) -> ApplyResourceChangeResponse {
        let ApplyResourceChangeRequest {
            type_name,
            prior_state,
            planned_state,
            config,
        } = request;

        let resource = match self.configured_resource(&type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ApplyResourceChangeResponse {
                    new_state: prior_state,
                    diagnostics,
                }
            }
        };

        if planned_state.is_null() {
            if prior_state.is_null() {
                return ApplyResourceChangeResponse {
                    new_state: DynamicValue::null(),
                    diagnostics: Vec::new(),
                };
            }

            tracing::debug!(type_name = %type_name, "Deleting resource");
            let response = resource
                .delete(
                    self.ctx.clone(),
                    DeleteResourceRequest {
                        type_name,
                        prior_state: prior_state.clone(),
                    },
                )
                .await;
            let new_state = if response.diagnostics.has_errors() {
                prior_state
            } else {
                DynamicValue::null()
            };
            return ApplyResourceChangeResponse {
                new_state,
                diagnostics: response.diagnostics,
            };
        }

        let (new_state, mut diagnostics) = if prior_state.is_null() {
            tracing::debug!(type_name = %type_name, "Creating resource");
            let response = resource
                .create(
                    self.ctx.clone(),
                    CreateResourceRequest {
                        type_name,
                        planned_state,
                        config,
                    },
                )
                .await;
            if response.diagnostics.has_errors() {
                (DynamicValue::null(), response.diagnostics)
            } else {
                (response.new_state, response.diagnostics)
            }
        } else {
            tracing::debug!(type_name = %type_name, "Updating resource");
            let response = resource
                .update(
                    self.ctx.clone(),
                    UpdateResourceRequest {
                        type_name,
                        prior_state: prior_state.clone(),
                        planned_state,
                        config,
                    },
                )
                .await;
            if response.diagnostics.has_errors() {
                (prior_state, response.diagnostics)
            } else {
                (response.new_state, response.diagnostics)
            }
        };

        if new_state.contains_unknown() {
            diagnostics.push(Diagnostic::error(
                "Provider returned invalid result object after apply",
                "After the apply operation, the provider still indicated an unknown value. \
                 All values must be known after apply, so this is always a bug in the provider.",
            ));
        }

        ApplyResourceChangeResponse {
            new_state,
            diagnostics,
        }
    }

    pub async fn read_resource(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        let resource = match self.configured_resource(&request.type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        };

        let current_state = request.current_state.clone();
        let mut response = resource.read(self.ctx.clone(), request).await;
        if response.diagnostics.has_errors() && response.new_state.is_none() {
            response.new_state = Some(current_state);
        }
        response
    }

    pub async fn import_resource_state(
        &self,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let resource = match self.configured_resource(&request.type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ImportResourceStateResponse {
                    imported_resources: Vec::new(),
                    diagnostics,
                }
            }
        };

        tracing::debug!(type_name = %request.type_name, id = %request.id, "Importing resource");
        resource.import_state(self.ctx.clone(), request).await
    }

    pub async fn read_data_source(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let data_source = match self.configured_data_source(&request.type_name).await {
            Ok(data_source) => data_source,
            Err(diagnostics) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                }
            }
        };

        data_source.read(self.ctx.clone(), request).await
    }

    fn stopped(&self) -> Option<Diagnostic> {
        self.ctx.is_cancelled().then(|| {
            Diagnostic::error(
                "Provider stopped",
                "The provider received a stop request and is no longer accepting operations.",
            )
        })
    }

    async fn configured_resource(
        &self,
        type_name: &str,
    ) -> Result<Box<dyn ResourceWithConfigure>, Vec<Diagnostic>> {
        if let Some(diagnostic) = self.stopped() {
            return Err(vec![diagnostic]);
        }
        let factory = self
            .resources
            .get(type_name)
            .ok_or_else(|| vec![unknown_resource(type_name)])?;

        let mut resource = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(self.ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;
        if response.diagnostics.has_errors() {
            return Err(response.diagnostics);
        }
        Ok(resource)
    }

    async fn configured_data_source(
        &self,
        type_name: &str,
    ) -> Result<Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>> {
        if let Some(diagnostic) = self.stopped() {
            return Err(vec![diagnostic]);
        }
        let factory = self
            .data_sources
            .get(type_name)
            .ok_or_else(|| vec![unknown_data_source(type_name)])?;

        let mut data_source = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(self.ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        if response.diagnostics.has_errors() {
            return Err(response.diagnostics);
        }
        Ok(data_source)
    }
}

fn unknown_resource(type_name: &str) -> Diagnostic {
    Diagnostic::error(
        "Resource Type Not Found",
        format!(
            "The provider does not support the resource type \"{}\".",
            type_name
        ),
    )
}

fn unknown_data_source(type_name: &str) -> Diagnostic {
    Diagnostic::error(
        "Data Source Type Not Found",
        format!(
            "The provider does not support the data source type \"{}\".",
            type_name
        ),
    )
}
