//! Publishing environment resource implementation

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder, StringKind};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use super::locale::client_error;
use crate::api::environments::{expand_urls_by_locale, Environment, EnvironmentRequest};
use crate::provider_data::{not_configured, ContentstackProviderData};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentModel {
    pub id: Option<String>,
    pub uid: Option<String>,
    pub name: Option<String>,
    pub urls: Option<BTreeMap<String, String>>,
    pub deploy_content: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub version: Option<i64>,
}

/// Read a map of strings, skipping unknown or null elements
pub(crate) fn string_map(value: &Dynamic) -> Option<BTreeMap<String, String>> {
    value.as_map().map(|map| {
        map.iter()
            .filter_map(|(k, v)| v.as_string().map(|s| (k.clone(), s.to_string())))
            .collect()
    })
}

pub(crate) fn to_dynamic_map(map: &BTreeMap<String, String>) -> Dynamic {
    Dynamic::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), Dynamic::from(v.as_str())))
            .collect(),
    )
}

impl EnvironmentModel {
    pub fn from_state(state: &DynamicValue) -> Self {
        let get = |name: &str| state.get_optional_string(&AttributePath::new(name));
        Self {
            id: get("id"),
            uid: get("uid"),
            name: get("name"),
            urls: string_map(&state.get_dynamic(&AttributePath::new("urls"))),
            deploy_content: state.get_optional_bool(&AttributePath::new("deploy_content")),
            created_at: get("created_at"),
            updated_at: get("updated_at"),
            version: state.get_optional_i64(&AttributePath::new("version")),
        }
    }

    pub fn to_state(&self) -> DynamicValue {
        DynamicValue::new(Dynamic::Map(HashMap::from([
            ("id".to_string(), Dynamic::from(self.id.clone())),
            ("uid".to_string(), Dynamic::from(self.uid.clone())),
            ("name".to_string(), Dynamic::from(self.name.clone())),
            (
                "urls".to_string(),
                self.urls.as_ref().map(to_dynamic_map).unwrap_or(Dynamic::Null),
            ),
            (
                "deploy_content".to_string(),
                Dynamic::from(self.deploy_content),
            ),
            ("created_at".to_string(), Dynamic::from(self.created_at.clone())),
            ("updated_at".to_string(), Dynamic::from(self.updated_at.clone())),
            ("version".to_string(), Dynamic::from(self.version)),
        ])))
    }

    /// Copy the API view into the model
    ///
    /// Unset optional attributes stay null while the API reports their zero
    /// value, so an omitted `urls` or `deploy_content` never shows a diff.
    pub fn update(&mut self, environment: &Environment) {
        self.id = Some(environment.uid.clone());
        self.uid = Some(environment.uid.clone());
        self.name = Some(environment.name.clone());

        let urls = environment.urls_by_locale();
        self.urls = match (&self.urls, urls.is_empty()) {
            (None, true) => None,
            _ => Some(urls),
        };

        self.deploy_content = match (self.deploy_content, environment.deploy_content) {
            (None, false) => None,
            (_, deploy) => Some(deploy),
        };

        self.created_at = environment.created_at.clone();
        self.updated_at = environment.updated_at.clone();
        self.version = environment.version;
    }

    pub fn export(&self) -> EnvironmentRequest {
        EnvironmentRequest {
            name: self.name.clone().unwrap_or_default(),
            urls: self
                .urls
                .as_ref()
                .map(expand_urls_by_locale)
                .unwrap_or_default(),
            deploy_content: self.deploy_content.unwrap_or(false),
        }
    }
}

#[derive(Default)]
pub struct EnvironmentResource {
    provider_data: Option<ContentstackProviderData>,
}

impl EnvironmentResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&ContentstackProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(not_configured)
    }
}

#[async_trait]
impl Resource for EnvironmentResource {
    fn type_name(&self) -> &str {
        "contentstack_environment"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Environment resource")
            .description_kind(StringKind::Markdown)
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .markdown_description(
                        "internal terraform resource id (matches the uid when the Environment has been created/imported)",
                    )
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("uid", AttributeType::String)
                    .markdown_description("internal contentstack identifier")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .markdown_description("name of the Environment")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created_at", AttributeType::String)
                    .markdown_description("created_at of the Environment")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("updated_at", AttributeType::String)
                    .markdown_description("updated_at of the Environment")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("version", AttributeType::Number)
                    .markdown_description("version number of the Environment")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("deploy_content", AttributeType::Bool)
                    .markdown_description("deploy_content")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("urls", AttributeType::Map(Box::new(AttributeType::String)))
                    .markdown_description("urls by locale")
                    .optional()
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        if let Some(name) = request
            .config
            .get_optional_string(&AttributePath::new("name"))
        {
            if name.trim().is_empty() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Environment name",
                        "The name of an Environment must not be empty",
                    )
                    .with_attribute(AttributePath::new("name")),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![diag],
                }
            }
        };

        let mut data = EnvironmentModel::from_state(&request.planned_state);
        let name = data.name.clone().unwrap_or_default();

        match provider_data
            .client
            .environments()
            .create(&data.export())
            .await
        {
            Ok(created) => {
                tracing::trace!(uid = %created.uid, name = %created.name, "created an Environment");
                data.update(&created);
                CreateResourceResponse {
                    new_state: data.to_state(),
                    diagnostics: vec![],
                }
            }
            Err(e) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![client_error(format!(
                    "Unable to create Environment \"{}\", got error: {}",
                    name, e
                ))],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                }
            }
        };

        let mut data = EnvironmentModel::from_state(&request.current_state);
        let Some(name) = data.name.clone() else {
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![Diagnostic::error(
                    "Missing environment name",
                    "The state does not contain the name of the Environment",
                )
                .with_attribute(AttributePath::new("name"))],
            };
        };

        match provider_data.client.environments().get(&name).await {
            Ok(environment) => {
                data.update(&environment);
                ReadResourceResponse {
                    new_state: Some(data.to_state()),
                    diagnostics: vec![],
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(name = %name, "Environment no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![client_error(format!(
                    "Unable to read Environment \"{}\", got error: {}",
                    name, e
                ))],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![diag],
                }
            }
        };

        let prior = EnvironmentModel::from_state(&request.prior_state);
        let mut data = EnvironmentModel::from_state(&request.planned_state);
        data.uid = prior.uid.clone();
        let current_name = prior.name.clone().unwrap_or_default();

        tracing::trace!(uid = ?data.uid, name = ?data.name, "about to update an Environment");

        match provider_data
            .client
            .environments()
            .update(&current_name, &data.export())
            .await
        {
            Ok(updated) => {
                data.update(&updated);
                UpdateResourceResponse {
                    new_state: data.to_state(),
                    diagnostics: vec![],
                }
            }
            Err(e) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![client_error(format!(
                    "Unable to update Environment \"{}\", got error: {}",
                    current_name, e
                ))],
            },
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diag],
                }
            }
        };

        let name = EnvironmentModel::from_state(&request.prior_state)
            .name
            .unwrap_or_default();

        match provider_data.client.environments().delete(&name).await {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!(name = %name, "Environment already deleted");
                DeleteResourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![client_error(format!(
                    "Unable to delete Environment \"{}\", got error: {}",
                    name, e
                ))],
            },
        }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse::default();
        import_state_passthrough_id(&ctx, AttributePath::new("name"), &request, &mut response);
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for EnvironmentResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        match ContentstackProviderData::from_request(
            request.provider_data,
            "Unexpected Resource Configure Type",
        ) {
            Ok(data) => self.provider_data = data,
            Err(diag) => diagnostics.push(diag),
        }

        ConfigureResourceResponse { diagnostics }
    }
}
