//! Data source listing every locale of the stack

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
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};

use crate::api::locales::Locale;
use crate::provider_data::{not_configured, ContentstackProviderData};

const LOCALE_OBJECT_ATTRIBUTES: [&str; 8] = [
    "uid",
    "code",
    "name",
    "fallback_locale_code",
    "created_by",
    "created_at",
    "updated_by",
    "updated_at",
];

#[derive(Default)]
pub struct LocalesDataSource {
    provider_data: Option<ContentstackProviderData>,
}

impl LocalesDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn locale_object(locale: &Locale) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("uid".to_string(), Dynamic::from(locale.uid.as_str())),
        ("code".to_string(), Dynamic::from(locale.code.as_str())),
        ("name".to_string(), Dynamic::from(locale.name.as_str())),
        (
            "fallback_locale_code".to_string(),
            Dynamic::from(locale.fallback_locale.clone().unwrap_or_default()),
        ),
        (
            "created_by".to_string(),
            Dynamic::from(locale.created_by.clone().unwrap_or_default()),
        ),
        (
            "created_at".to_string(),
            Dynamic::from(locale.created_at.clone().unwrap_or_default()),
        ),
        (
            "updated_by".to_string(),
            Dynamic::from(locale.updated_by.clone().unwrap_or_default()),
        ),
        (
            "updated_at".to_string(),
            Dynamic::from(locale.updated_at.clone().unwrap_or_default()),
        ),
    ]))
}

/// Locales keyed by code, later entries win on duplicate codes
fn locales_by_code(locales: &[Locale]) -> Dynamic {
    Dynamic::Map(
        locales
            .iter()
            .map(|locale| (locale.code.clone(), locale_object(locale)))
            .collect(),
    )
}

#[async_trait]
impl DataSource for LocalesDataSource {
    fn type_name(&self) -> &str {
        "contentstack_locales"
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
        let object = AttributeType::Object(
            LOCALE_OBJECT_ATTRIBUTES
                .iter()
                .map(|name| (name.to_string(), AttributeType::String))
                .collect(),
        );

        let schema = SchemaBuilder::new()
            .version(0)
            .description("Data source to fetch all locales")
            .description_kind(StringKind::Markdown)
            .attribute(
                AttributeBuilder::new("locales_by_code", AttributeType::Map(Box::new(object)))
                    .markdown_description(
                        "exposes a list of all locales defined in the provider's stack",
                    )
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

    async fn read(&self, _ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![not_configured()],
            };
        };

        match provider_data.client.locales().list().await {
            Ok(locales) => {
                tracing::trace!(count = locales.len(), "read all Locales");
                ReadDataSourceResponse {
                    state: DynamicValue::new(Dynamic::Map(HashMap::from([(
                        "locales_by_code".to_string(),
                        locales_by_code(&locales),
                    )]))),
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Client Error",
                    format!("Unable to read Locales from the configured stack: {}", e),
                )],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for LocalesDataSource {
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
