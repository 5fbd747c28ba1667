//! Global field data source implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, NestedType, SchemaBuilder, StringKind};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::global_fields::{Field, GlobalField};
use crate::provider_data::{not_configured, ContentstackProviderData};

#[derive(Default)]
pub struct GlobalFieldDataSource {
    provider_data: Option<ContentstackProviderData>,
}

impl GlobalFieldDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn field_object(field: &Field) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("uid".to_string(), Dynamic::from(field.uid.as_str())),
        ("data_type".to_string(), Dynamic::from(field.data_type.as_str())),
        (
            "display_name".to_string(),
            Dynamic::from(field.display_name.as_str()),
        ),
        (
            "display_type".to_string(),
            Dynamic::from(field.display_type.clone()),
        ),
    ]))
}

fn global_field_state(global_field: &GlobalField) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::from(global_field.uid.as_str())),
        ("uid".to_string(), Dynamic::from(global_field.uid.as_str())),
        ("title".to_string(), Dynamic::from(global_field.title.as_str())),
        (
            "description".to_string(),
            Dynamic::from(global_field.description.as_str()),
        ),
        (
            "created_at".to_string(),
            Dynamic::from(global_field.created_at.clone()),
        ),
        (
            "updated_at".to_string(),
            Dynamic::from(global_field.updated_at.clone()),
        ),
        (
            "field".to_string(),
            Dynamic::List(global_field.schema.iter().map(field_object).collect()),
        ),
    ])))
}

#[async_trait]
impl DataSource for GlobalFieldDataSource {
    fn type_name(&self) -> &str {
        "contentstack_global_field"
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
            .description("Global field data source")
            .description_kind(StringKind::Markdown)
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .markdown_description("internal terraform resource id (matches the uid of the Global Field)")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("uid", AttributeType::String)
                    .markdown_description("uid of the Global Field")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("title", AttributeType::String)
                    .markdown_description("title of the Global Field")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .markdown_description("description of the Global Field")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created_at", AttributeType::String)
                    .markdown_description("created_at of the Global Field")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("updated_at", AttributeType::String)
                    .markdown_description("updated_at of the Global Field")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "field",
                    AttributeType::List(Box::new(AttributeType::Object(HashMap::new()))),
                )
                .markdown_description("field schema of the Global Field")
                .computed()
                .nested_type(NestedType::list(vec![
                    AttributeBuilder::new("data_type", AttributeType::String)
                        .markdown_description("data type of the field")
                        .computed()
                        .build(),
                    AttributeBuilder::new("display_name", AttributeType::String)
                        .markdown_description("display name of the field")
                        .computed()
                        .build(),
                    AttributeBuilder::new("display_type", AttributeType::String)
                        .markdown_description("display type of the field")
                        .computed()
                        .build(),
                    AttributeBuilder::new("uid", AttributeType::String)
                        .markdown_description("uid of the field")
                        .computed()
                        .build(),
                ]))
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

        let uid = match request.config.get_string(&AttributePath::new("uid")) {
            Ok(uid) => uid,
            Err(e) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error("Invalid global field uid", e.to_string())
                        .with_attribute(AttributePath::new("uid"))],
                }
            }
        };

        match provider_data.client.global_fields().get(&uid).await {
            Ok(global_field) => {
                tracing::trace!(uid = %global_field.uid, "read a GlobalField");
                ReadDataSourceResponse {
                    state: global_field_state(&global_field),
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Client Error",
                    format!("Unable to read GlobalField \"{}\", got error: {}", uid, e),
                )],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for GlobalFieldDataSource {
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
    fn schema_entries_become_field_list() {
        let state = global_field_state(&GlobalField {
            uid: "seo".to_string(),
            title: "SEO".to_string(),
            schema: vec![Field {
                uid: "meta_title".to_string(),
                data_type: "text".to_string(),
                display_name: "Meta title".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        });

        let first = AttributePath::new("field").index(0);
        assert_eq!(
            state.get_string(&first.clone().attribute("uid")).unwrap(),
            "meta_title"
        );
        assert!(state
            .get_dynamic(&first.attribute("display_type"))
            .is_null());
        assert!(state.get_dynamic(&AttributePath::new("created_at")).is_null());
    }
}
