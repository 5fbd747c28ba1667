//! Locale resource implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::{DefaultValue, DefaultValueCopiedFromAnotherField, UseStateForUnknown};
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

use crate::api::locales::{Locale, LocaleRequest};
use crate::provider_data::{not_configured, ContentstackProviderData};

/// Terraform state of a locale, shared by the locale and default locale resources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleModel {
    pub uid: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub fallback_code: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: Option<String>,
    pub version: Option<i64>,
}

impl LocaleModel {
    /// Read known values; null and unknown attributes become None
    pub fn from_state(state: &DynamicValue) -> Self {
        let get = |name: &str| state.get_optional_string(&AttributePath::new(name));
        Self {
            uid: get("uid"),
            code: get("code"),
            name: get("name"),
            fallback_code: get("fallback_code"),
            created_by: get("created_by"),
            created_at: get("created_at"),
            updated_by: get("updated_by"),
            updated_at: get("updated_at"),
            version: state.get_optional_i64(&AttributePath::new("version")),
        }
    }

    pub fn to_state(&self) -> DynamicValue {
        DynamicValue::new(Dynamic::Map(HashMap::from([
            ("uid".to_string(), Dynamic::from(self.uid.clone())),
            ("code".to_string(), Dynamic::from(self.code.clone())),
            ("name".to_string(), Dynamic::from(self.name.clone())),
            (
                "fallback_code".to_string(),
                Dynamic::from(self.fallback_code.clone()),
            ),
            ("created_by".to_string(), Dynamic::from(self.created_by.clone())),
            ("created_at".to_string(), Dynamic::from(self.created_at.clone())),
            ("updated_by".to_string(), Dynamic::from(self.updated_by.clone())),
            ("updated_at".to_string(), Dynamic::from(self.updated_at.clone())),
            ("version".to_string(), Dynamic::from(self.version)),
        ])))
    }

    /// Copy everything the API reports; an empty fallback becomes null
    pub fn update(&mut self, locale: &Locale) {
        self.uid = Some(locale.uid.clone());
        self.code = Some(locale.code.clone());
        self.name = Some(locale.name.clone());
        self.fallback_code = locale.fallback_locale.clone().filter(|f| !f.is_empty());
        self.created_by = locale.created_by.clone();
        self.created_at = locale.created_at.clone();
        self.updated_by = locale.updated_by.clone();
        self.updated_at = locale.updated_at.clone();
        self.version = locale.version;
    }

    pub fn export(&self) -> LocaleRequest {
        LocaleRequest {
            code: self.code.clone(),
            name: self.name.clone(),
            fallback_locale: self.fallback_code.clone(),
        }
    }
}

/// Error diagnostic for a failed Management API call
pub(crate) fn client_error(detail: String) -> Diagnostic {
    Diagnostic::error("Client Error", detail)
}

#[derive(Default)]
pub struct LocaleResource {
    provider_data: Option<ContentstackProviderData>,
}

impl LocaleResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&ContentstackProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(not_configured)
    }
}

#[async_trait]
impl Resource for LocaleResource {
    fn type_name(&self) -> &str {
        "contentstack_locale"
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
            .description("Locale resource")
            .description_kind(StringKind::Markdown)
            .attribute(
                AttributeBuilder::new("uid", AttributeType::String)
                    .markdown_description("internal contentstack identifier")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("code", AttributeType::String)
                    .markdown_description("code of the Locale")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .markdown_description("name of the Locale")
                    .optional()
                    .computed()
                    .plan_modifier(DefaultValueCopiedFromAnotherField::new("code"))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("fallback_code", AttributeType::String)
                    .markdown_description("code of the fallback Locale")
                    .optional()
                    .computed()
                    .plan_modifier(DefaultValue::string("en-us"))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created_by", AttributeType::String)
                    .markdown_description("created_by of the Locale")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created_at", AttributeType::String)
                    .markdown_description("created_at of the Locale")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("version", AttributeType::Number)
                    .markdown_description("version number of the Locale")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("updated_by", AttributeType::String)
                    .markdown_description("updated_by of the Locale")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("updated_at", AttributeType::String)
                    .markdown_description("updated_at of the Locale")
                    .computed()
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
        _request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: vec![],
        }
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

        let mut data = LocaleModel::from_state(&request.planned_state);
        let code = data.code.clone().unwrap_or_default();

        match provider_data.client.locales().create(&data.export()).await {
            Ok(created) => {
                data.update(&created);
                tracing::trace!(uid = %created.uid, code = %created.code, "created a Locale");
                CreateResourceResponse {
                    new_state: data.to_state(),
                    diagnostics: vec![],
                }
            }
            Err(e) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![client_error(format!(
                    "Unable to create Locale \"{}\", got error: {}",
                    code, e
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

        let mut data = LocaleModel::from_state(&request.current_state);
        let Some(code) = data.code.clone() else {
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![Diagnostic::error(
                    "Missing locale code",
                    "The state does not contain the code of the Locale",
                )
                .with_attribute(AttributePath::new("code"))],
            };
        };

        match provider_data.client.locales().get(&code).await {
            Ok(locale) => {
                data.update(&locale);
                ReadResourceResponse {
                    new_state: Some(data.to_state()),
                    diagnostics: vec![],
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(code = %code, "Locale no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![client_error(format!(
                    "Unable to read Locale \"{}\", got error: {}",
                    code, e
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

        let prior = LocaleModel::from_state(&request.prior_state);
        let mut data = LocaleModel::from_state(&request.planned_state);
        data.uid = prior.uid.clone();
        let current_code = prior.code.clone().unwrap_or_default();

        tracing::trace!(
            uid = ?data.uid,
            code = ?data.code,
            "about to update a Locale"
        );

        match provider_data
            .client
            .locales()
            .update(&current_code, &data.export())
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
                    "Unable to update Locale \"{}\", got error: {}",
                    current_code, e
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

        let code = LocaleModel::from_state(&request.prior_state)
            .code
            .unwrap_or_default();

        match provider_data.client.locales().delete(&code).await {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!(code = %code, "Locale already deleted");
                DeleteResourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![client_error(format!(
                    "Unable to delete Locale \"{}\", got error: {}",
                    code, e
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
        import_state_passthrough_id(&ctx, AttributePath::new("code"), &request, &mut response);
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for LocaleResource {
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
