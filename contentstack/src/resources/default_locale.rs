//! Default locale resource implementation
//!
//! The master locale of a stack always exists, so this resource adopts it
//! instead of creating one and only forgets it on delete.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::{DefaultNull, DefaultValueCopiedFromAnotherField, UseStateForUnknown};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder, StringKind};
use tfplug::types::{AttributePath, Diagnostic};

use super::locale::{client_error, LocaleModel};
use crate::api::locales::Locale;
use crate::provider_data::{not_configured, ContentstackProviderData};

/// Code of the locale every stack is created with
pub const DEFAULT_LOCALE_CODE: &str = "en-us";

#[derive(Default)]
pub struct DefaultLocaleResource {
    provider_data: Option<ContentstackProviderData>,
}

impl DefaultLocaleResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&ContentstackProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(not_configured)
    }
}

/// The master locale never has a fallback
fn adopt(data: &mut LocaleModel, locale: &Locale) {
    data.update(locale);
    data.fallback_code = None;
}

#[async_trait]
impl Resource for DefaultLocaleResource {
    fn type_name(&self) -> &str {
        "contentstack_default_locale"
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
            .description("Default locale resource")
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
                    .computed()
                    .plan_modifier(UseStateForUnknown)
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
                    .computed()
                    .plan_modifier(DefaultNull)
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

        let planned = LocaleModel::from_state(&request.planned_state);
        let locales = provider_data.client.locales();

        let mut locale = match locales.get(DEFAULT_LOCALE_CODE).await {
            Ok(locale) => locale,
            Err(e) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![client_error(format!(
                        "Unable to read default Locale \"{}\", got error: {}",
                        DEFAULT_LOCALE_CODE, e
                    ))],
                }
            }
        };

        tracing::trace!(uid = %locale.uid, code = %locale.code, "found the default Locale");

        // a configured name that differs from the stack's is applied right away
        if let Some(name) = planned.name.as_ref().filter(|name| **name != locale.name) {
            let mut rename = LocaleModel::default();
            adopt(&mut rename, &locale);
            rename.name = Some(name.clone());

            locale = match locales.update(&locale.code, &rename.export()).await {
                Ok(updated) => updated,
                Err(e) => {
                    return CreateResourceResponse {
                        new_state: request.planned_state,
                        diagnostics: vec![client_error(format!(
                            "Unable to update Locale \"{}\", got error: {}",
                            locale.code, e
                        ))],
                    }
                }
            };
        }

        let mut data = planned;
        adopt(&mut data, &locale);

        CreateResourceResponse {
            new_state: data.to_state(),
            diagnostics: vec![],
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
        let code = data
            .code
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCALE_CODE.to_string());

        match provider_data.client.locales().get(&code).await {
            Ok(locale) => {
                adopt(&mut data, &locale);
                ReadResourceResponse {
                    new_state: Some(data.to_state()),
                    diagnostics: vec![],
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(code = %code, "default Locale no longer exists, removing from state");
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
        data.code = prior.code.clone();
        data.fallback_code = None;
        let code = prior
            .code
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCALE_CODE.to_string());

        tracing::trace!(uid = ?data.uid, code = %code, "about to update a Locale");

        match provider_data
            .client
            .locales()
            .update(&code, &data.export())
            .await
        {
            Ok(updated) => {
                adopt(&mut data, &updated);
                UpdateResourceResponse {
                    new_state: data.to_state(),
                    diagnostics: vec![],
                }
            }
            Err(e) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![client_error(format!(
                    "Unable to update Locale \"{}\", got error: {}",
                    code, e
                ))],
            },
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let data = LocaleModel::from_state(&request.prior_state);
        tracing::debug!(code = ?data.code, "leaving the default Locale in place, removing it from state only");

        DeleteResourceResponse {
            diagnostics: vec![],
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
impl ResourceWithConfigure for DefaultLocaleResource {
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
