//! Publishing environment data source implementation

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

use crate::api::environments::Environment;
use crate::provider_data::{not_configured, ContentstackProviderData};
use crate::resources::environment::to_dynamic_map;

#[derive(Default)]
pub struct EnvironmentDataSource {
    provider_data: Option<ContentstackProviderData>,
}

impl EnvironmentDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn environment_state(environment: &Environment) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::from(environment.name.as_str())),
        ("uid".to_string(), Dynamic::from(environment.uid.as_str())),
        ("name".to_string(), Dynamic::from(environment.name.as_str())),
        (
            "created_at".to_string(),
            Dynamic::from(environment.created_at.clone()),
        ),
        (
            "updated_at".to_string(),
            Dynamic::from(environment.updated_at.clone()),
        ),
        ("version".to_string(), Dynamic::from(environment.version)),
        (
            "deploy_content".to_string(),
            Dynamic::from(environment.deploy_content),
        ),
        (
            "urls".to_string(),
            to_dynamic_map(&environment.urls_by_locale()),
        ),
    ])))
}

#[async_trait]
impl DataSource for EnvironmentDataSource {
    fn type_name(&self) -> &str {
        "contentstack_environment"
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
            .description("Environment data source")
            .description_kind(StringKind::Markdown)
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .markdown_description("internal terraform resource id (matches the name of the Environment)")
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
                AttributeBuilder::new("name", AttributeType::String)
                    .markdown_description("name of the Environment")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created_at", AttributeType::String)
                    .markdown_description("created_at of the Environment")
                    .computed()
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
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("urls", AttributeType::Map(Box::new(AttributeType::String)))
                    .markdown_description("urls by locale")
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

        let name = match request.config.get_string(&AttributePath::new("name")) {
            Ok(name) => name,
            Err(e) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error("Invalid environment name", e.to_string())
                        .with_attribute(AttributePath::new("name"))],
                }
            }
        };

        match provider_data.client.environments().get(&name).await {
            Ok(environment) => {
                tracing::trace!(uid = %environment.uid, name = %environment.name, "read an Environment");
                ReadDataSourceResponse {
                    state: environment_state(&environment),
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Client Error",
                    format!("Unable to read Environment \"{}\", got error: {}", name, e),
                )],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for EnvironmentDataSource {
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
