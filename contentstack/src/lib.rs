pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

pub use provider_data::ContentstackProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, StopProviderRequest, StopProviderResponse,
    ValidateProviderConfigRequest, ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder, StringKind};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue, ServerCapabilities};

pub const ENV_HOST: &str = "CONTENTSTACK_HOST";
pub const ENV_API_KEY: &str = "CONTENTSTACK_API_KEY";
pub const ENV_MANAGEMENT_TOKEN: &str = "CONTENTSTACK_MANAGEMENT_TOKEN";

pub const USER_AGENT: &str = "terraform-provider-contentstack";

pub struct ContentstackProvider {
    provider_data: Option<ContentstackProviderData>,
}

impl Default for ContentstackProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentstackProvider {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider_data.is_some()
    }
}

/// Config value when set, otherwise the environment variable
fn setting(config: &DynamicValue, attribute: &str, env: &str) -> String {
    config
        .get_optional_string(&AttributePath::new(attribute))
        .or_else(|| std::env::var(env).ok())
        .unwrap_or_default()
}

fn missing_setting(attribute: &str, summary: &str, label: &str, env: &str) -> Diagnostic {
    Diagnostic::error(
        summary,
        format!(
            "The provider cannot create the ContentStack API client as there is a missing or empty value for the ContentStack {label}. \
             Set the {label} value in the configuration or use the {env} environment variable. \
             If either is already set, ensure the value is not empty."
        ),
    )
    .with_attribute(AttributePath::new(attribute))
}

#[async_trait]
impl Provider for ContentstackProvider {
    fn type_name(&self) -> &str {
        "contentstack"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            server_capabilities: ServerCapabilities::default(),
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manage a Contentstack stack through its Content Management API")
            .description_kind(StringKind::Markdown)
            .attribute(
                AttributeBuilder::new("host", AttributeType::String)
                    .markdown_description(
                        "Host of the Contentstack Management API, one of:\n\
                         - NA: `https://api.contentstack.io/`\n\
                         - EU: `https://eu-api.contentstack.com/`\n\
                         - Azure NA: `https://azure-na-api.contentstack.com/`\n\n\
                         Can also be set with the `CONTENTSTACK_HOST` environment variable.",
                    )
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_key", AttributeType::String)
                    .markdown_description(
                        "An API Key which uniquely identifies the stack. \
                         Can also be set with the `CONTENTSTACK_API_KEY` environment variable.",
                    )
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("management_token", AttributeType::String)
                    .markdown_description(
                        "A stack management token. \
                         Can also be set with the `CONTENTSTACK_MANAGEMENT_TOKEN` environment variable.",
                    )
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("debug", AttributeType::Bool)
                    .markdown_description("enable debug logs for the ContentStack API client")
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let config = &request.config;
        let host = setting(config, "host", ENV_HOST);
        let api_key = setting(config, "api_key", ENV_API_KEY);
        let management_token = setting(config, "management_token", ENV_MANAGEMENT_TOKEN);
        let debug_client = config
            .get_optional_bool(&AttributePath::new("debug"))
            .unwrap_or(false);

        let mut diagnostics = vec![];

        if host.is_empty() {
            diagnostics.push(missing_setting(
                "host",
                "Missing ContentStack API Host",
                "API host",
                ENV_HOST,
            ));
        }
        if api_key.is_empty() {
            diagnostics.push(missing_setting(
                "api_key",
                "Missing ContentStack API Key",
                "API Key",
                ENV_API_KEY,
            ));
        }
        if management_token.is_empty() {
            diagnostics.push(missing_setting(
                "management_token",
                "Missing ContentStack Management Token",
                "Management Token",
                ENV_MANAGEMENT_TOKEN,
            ));
        }

        if !diagnostics.is_empty() {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        tracing::debug!(host = %host, debug = debug_client, "configuring Contentstack client");

        let client_config = api::ClientConfig {
            user_agent: USER_AGENT.to_string(),
            debug: debug_client,
            ..Default::default()
        };

        match api::Client::with_config(&host, &api_key, &management_token, client_config) {
            Ok(client) => {
                let provider_data = ContentstackProviderData::new(client);
                self.provider_data = Some(provider_data.clone());

                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(Arc::new(provider_data)),
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Unable to Create ContentStack API Client",
                    format!(
                        "An unexpected error occurred when creating the ContentStack API client. \
                         If the error is not clear, please contact the provider developers.\n\n\
                         ContentStack Client Error: {}",
                        e
                    ),
                ));

                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        let mut diagnostics = vec![];

        if let Some(host) = request
            .config
            .get_optional_string(&AttributePath::new("host"))
        {
            if !host.is_empty() && url::Url::parse(&host).is_err() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid ContentStack API Host",
                        format!("The host \"{}\" is not a valid URL", host),
                    )
                    .with_attribute(AttributePath::new("host")),
                );
            }
        }

        ValidateProviderConfigResponse { diagnostics }
    }

    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();

        factories.insert(
            "contentstack_locale".to_string(),
            Box::new(|| {
                Box::new(resources::LocaleResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "contentstack_default_locale".to_string(),
            Box::new(|| {
                Box::new(resources::DefaultLocaleResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "contentstack_environment".to_string(),
            Box::new(|| {
                Box::new(resources::EnvironmentResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "contentstack_global_field".to_string(),
            Box::new(|| {
                Box::new(resources::GlobalFieldResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );

        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();

        factories.insert(
            "contentstack_locale".to_string(),
            Box::new(|| {
                Box::new(data_sources::LocaleDataSource::new()) as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories.insert(
            "contentstack_locales".to_string(),
            Box::new(|| {
                Box::new(data_sources::LocalesDataSource::new()) as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories.insert(
            "contentstack_environment".to_string(),
            Box::new(|| {
                Box::new(data_sources::EnvironmentDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories.insert(
            "contentstack_global_field".to_string(),
            Box::new(|| {
                Box::new(data_sources::GlobalFieldDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );

        factories
    }
}
