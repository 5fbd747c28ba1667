//! Locale data source implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder, StringKind};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::locales::Locale;
use crate::provider_data::{not_configured, ContentstackProviderData};

#[derive(Default)]
pub struct LocaleDataSource {
    provider_data: Option<ContentstackProviderData>,
}

impl LocaleDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn locale_state(locale: &Locale) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::from(locale.name.as_str())),
        ("uid".to_string(), Dynamic::from(locale.uid.as_str())),
        ("code".to_string(), Dynamic::from(locale.code.as_str())),
        ("name".to_string(), Dynamic::from(locale.name.as_str())),
        (
            "fallback_locale".to_string(),
            Dynamic::from(locale.fallback_locale.clone().filter(|f| !f.is_empty())),
        ),
        ("created_by".to_string(), Dynamic::from(locale.created_by.clone())),
        ("created_at".to_string(), Dynamic::from(locale.created_at.clone())),
        ("updated_by".to_string(), Dynamic::from(locale.updated_by.clone())),
        ("updated_at".to_string(), Dynamic::from(locale.updated_at.clone())),
        ("version".to_string(), Dynamic::from(locale.version)),
    ])))
}

#[async_trait]
impl DataSource for LocaleDataSource {
    fn type_name(&self) -> &str {
        "contentstack_locale"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Locale data source")
            .description_kind(StringKind::Markdown)
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .markdown_description("internal terraform resource id (matches the name of the Locale)")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("uid", AttributeType::String)
                    .markdown_description("internal contentstack identifier")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("code", AttributeType::String)
                    .markdown_description("code for the Locale")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .markdown_description("name of the Locale")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("fallback_locale", AttributeType::String)
                    .markdown_description("fallback code of the Locale")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created_by", AttributeType::String)
                    .markdown_description("created_by of the Locale")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created_at", AttributeType::String)
                    .markdown_description("created_at of the Locale")
                    .computed()
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

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![not_configured()],
            };
        };

        let code = match request.config.get_string(&AttributePath::new("code")) {
            Ok(code) => code,
            Err(e) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error("Invalid locale code", e.to_string())
                        .with_attribute(AttributePath::new("code"))],
                }
            }
        };

        match provider_data.client.locales().get(&code).await {
            Ok(locale) => {
                tracing::trace!(uid = %locale.uid, code = %locale.code, "read a Locale");
                ReadDataSourceResponse {
                    state: locale_state(&locale),
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Client Error",
                    format!("Unable to read Locale \"{}\", got error: {}", code, e),
                )],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for LocaleDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        match ContentstackProviderData::from_request(
            request.provider_data,
            "Unexpected Data Source Configure Type",
        ) {
            Ok(data) => self.provider_data = data,
            Err(diag) => diagnostics.push(diag),
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_locale_has_null_fallback() {
        let state = locale_state(&Locale {
            uid: "blt-master".to_string(),
            code: "en-us".to_string(),
            name: "English - United States".to_string(),
            fallback_locale: Some(String::new()),
            version: Some(1),
            ..Default::default()
        });

        assert_eq!(
            state.get_string(&AttributePath::new("id")).unwrap(),
            "English - United States"
        );
        assert!(state
            .get_dynamic(&AttributePath::new("fallback_locale"))
            .is_null());
        assert_eq!(state.get_i64(&AttributePath::new("version")).unwrap(), 1);
    }
}
