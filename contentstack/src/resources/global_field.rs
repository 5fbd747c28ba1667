//! Global field resource implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
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
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, NestedType, SchemaBuilder, StringKind,
};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{ConflictsWith, OneOf};

use super::locale::client_error;
use crate::api::global_fields::{self, Field, FieldMetadata, GlobalField, GlobalFieldRequest};
use crate::provider_data::{not_configured, ContentstackProviderData};

/// Data types a global field entry may have
pub const FIELD_DATA_TYPES: [&str; 7] = [
    "text", "boolean", "number", "file", "link", "json", "isodate",
];

/// One element of the `fields` set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldModel {
    pub uid: Option<String>,
    pub data_type: Option<String>,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub default_text: Option<String>,
    pub default_bool: Option<bool>,
    pub format: Option<String>,
    pub placeholder: Option<String>,
    pub instruction: Option<String>,
    pub mandatory: Option<bool>,
    pub multiple: Option<bool>,
    pub unique: Option<bool>,
}

impl FieldModel {
    fn from_dynamic(value: &Dynamic) -> Self {
        let element = DynamicValue::new(value.clone());
        let string = |name: &str| element.get_optional_string(&AttributePath::new(name));
        let boolean = |name: &str| element.get_optional_bool(&AttributePath::new(name));
        Self {
            uid: string("uid"),
            data_type: string("data_type"),
            description: string("description"),
            display_name: string("display_name"),
            default_text: string("default_text"),
            default_bool: boolean("default_bool"),
            format: string("format"),
            placeholder: string("placeholder"),
            instruction: string("instruction"),
            mandatory: boolean("mandatory"),
            multiple: boolean("multiple"),
            unique: boolean("unique"),
        }
    }

    fn to_dynamic(&self) -> Dynamic {
        Dynamic::Map(HashMap::from([
            ("uid".to_string(), Dynamic::from(self.uid.clone())),
            ("data_type".to_string(), Dynamic::from(self.data_type.clone())),
            ("description".to_string(), Dynamic::from(self.description.clone())),
            ("display_name".to_string(), Dynamic::from(self.display_name.clone())),
            ("default_text".to_string(), Dynamic::from(self.default_text.clone())),
            ("default_bool".to_string(), Dynamic::from(self.default_bool)),
            ("format".to_string(), Dynamic::from(self.format.clone())),
            ("placeholder".to_string(), Dynamic::from(self.placeholder.clone())),
            ("instruction".to_string(), Dynamic::from(self.instruction.clone())),
            ("mandatory".to_string(), Dynamic::from(self.mandatory)),
            ("multiple".to_string(), Dynamic::from(self.multiple)),
            ("unique".to_string(), Dynamic::from(self.unique)),
        ]))
    }

    /// Build the state of a field from the API view
    ///
    /// Values the API leaves out fall back to `planned`, the element with
    /// the same uid in the plan or prior state.
    pub fn from_api(field: &Field, planned: Option<&FieldModel>) -> Self {
        let meta = &field.field_metadata;
        let (default_text, default_bool) = match &meta.default_value {
            Some(global_fields::DefaultValue::Text(text)) => (Some(text.clone()), None),
            Some(global_fields::DefaultValue::Bool(value)) => (None, Some(*value)),
            Some(global_fields::DefaultValue::Other(other)) => {
                tracing::warn!(
                    uid = %field.uid,
                    value = %other,
                    "unsupported default_value type for global field entry"
                );
                (None, None)
            }
            None => (
                planned.and_then(|p| p.default_text.clone()),
                planned.and_then(|p| p.default_bool),
            ),
        };

        Self {
            uid: Some(field.uid.clone()),
            data_type: Some(field.data_type.clone()),
            description: Some(meta.description.clone()),
            display_name: Some(field.display_name.clone()),
            default_text,
            default_bool,
            format: field
                .format
                .clone()
                .or_else(|| planned.and_then(|p| p.format.clone())),
            placeholder: meta
                .placeholder
                .clone()
                .or_else(|| planned.and_then(|p| p.placeholder.clone())),
            instruction: meta
                .instruction
                .clone()
                .or_else(|| planned.and_then(|p| p.instruction.clone())),
            mandatory: Some(field.mandatory),
            multiple: Some(field.multiple),
            unique: field.unique.or_else(|| planned.and_then(|p| p.unique)),
        }
    }

    pub fn export(&self) -> Field {
        let uid = self.uid.clone().unwrap_or_default();
        let default_value = match (self.default_bool, &self.default_text) {
            (Some(value), _) => Some(global_fields::DefaultValue::Bool(value)),
            (None, Some(text)) => Some(global_fields::DefaultValue::Text(text.clone())),
            (None, None) => None,
        };

        Field {
            display_name: self.display_name.clone().unwrap_or_else(|| uid.clone()),
            uid,
            data_type: self.data_type.clone().unwrap_or_default(),
            display_type: None,
            format: self.format.clone(),
            mandatory: self.mandatory.unwrap_or(false),
            multiple: self.multiple.unwrap_or(false),
            unique: self.unique,
            field_metadata: FieldMetadata {
                description: self.description.clone().unwrap_or_default(),
                default_value,
                placeholder: self.placeholder.clone(),
                instruction: self.instruction.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalFieldModel {
    pub id: Option<String>,
    pub uid: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<FieldModel>,
}

impl GlobalFieldModel {
    pub fn from_state(state: &DynamicValue) -> Self {
        let get = |name: &str| state.get_optional_string(&AttributePath::new(name));
        let fields = match state.get_dynamic(&AttributePath::new("fields")) {
            Dynamic::List(items) => items.iter().map(FieldModel::from_dynamic).collect(),
            _ => Vec::new(),
        };

        Self {
            id: get("id"),
            uid: get("uid"),
            title: get("title"),
            description: get("description"),
            fields,
        }
    }

    pub fn to_state(&self) -> DynamicValue {
        DynamicValue::new(Dynamic::Map(HashMap::from([
            ("id".to_string(), Dynamic::from(self.id.clone())),
            ("uid".to_string(), Dynamic::from(self.uid.clone())),
            ("title".to_string(), Dynamic::from(self.title.clone())),
            ("description".to_string(), Dynamic::from(self.description.clone())),
            (
                "fields".to_string(),
                Dynamic::List(self.fields.iter().map(FieldModel::to_dynamic).collect()),
            ),
        ])))
    }

    pub fn update(&mut self, global_field: &GlobalField) {
        let fields = global_field
            .schema
            .iter()
            .map(|field| {
                let planned = self
                    .fields
                    .iter()
                    .find(|p| p.uid.as_deref() == Some(field.uid.as_str()));
                FieldModel::from_api(field, planned)
            })
            .collect();

        self.id = Some(global_field.uid.clone());
        self.uid = Some(global_field.uid.clone());
        self.title = Some(global_field.title.clone());
        self.description = Some(global_field.description.clone());
        self.fields = fields;
    }

    pub fn export(&self) -> GlobalFieldRequest {
        let uid = self.uid.clone().unwrap_or_default();
        GlobalFieldRequest {
            title: self.title.clone().unwrap_or_else(|| uid.clone()),
            uid,
            description: self.description.clone().unwrap_or_default(),
            schema: self.fields.iter().map(FieldModel::export).collect(),
        }
    }
}

fn fields_attribute() -> Attribute {
    AttributeBuilder::new(
        "fields",
        AttributeType::Set(Box::new(AttributeType::Object(HashMap::new()))),
    )
    .markdown_description("field schema of the Global Field")
    .required()
    .nested_type(NestedType::set(vec![
        AttributeBuilder::new("data_type", AttributeType::String)
            .markdown_description(
                "data type of the field:\n  - text\n  - boolean\n  - number\n  - file\n  - link\n  - json\n  - isodate\n",
            )
            .required()
            .validator(OneOf::new(FIELD_DATA_TYPES))
            .build(),
        AttributeBuilder::new("description", AttributeType::String)
            .markdown_description("description of the field")
            .optional()
            .computed()
            .default(StaticDefault::string(""))
            .build(),
        AttributeBuilder::new("default_bool", AttributeType::Bool)
            .markdown_description("default boolean value for the field")
            .optional()
            .computed()
            .validator(ConflictsWith::new(["default_text"]))
            .build(),
        AttributeBuilder::new("default_text", AttributeType::String)
            .markdown_description("default text value for the field")
            .optional()
            .computed()
            .validator(ConflictsWith::new(["default_bool"]))
            .build(),
        AttributeBuilder::new("display_name", AttributeType::String)
            .markdown_description("display name of the field")
            .optional()
            .computed()
            .plan_modifier(DefaultValueCopiedFromAnotherField::new("uid"))
            .build(),
        AttributeBuilder::new("format", AttributeType::String)
            .markdown_description("format of the field")
            .optional()
            .build(),
        AttributeBuilder::new("placeholder", AttributeType::String)
            .markdown_description("placeholder text for the field")
            .optional()
            .computed()
            .plan_modifier(DefaultValue::string(""))
            .build(),
        AttributeBuilder::new("instruction", AttributeType::String)
            .markdown_description("instruction text for the field")
            .optional()
            .computed()
            .plan_modifier(DefaultValue::string(""))
            .build(),
        AttributeBuilder::new("uid", AttributeType::String)
            .markdown_description("uid of the field")
            .required()
            .build(),
        AttributeBuilder::new("mandatory", AttributeType::Bool)
            .markdown_description("is this field mandatory")
            .optional()
            .computed()
            .plan_modifier(DefaultValue::bool(false))
            .build(),
        AttributeBuilder::new("multiple", AttributeType::Bool)
            .markdown_description("can this field be used multiple times")
            .optional()
            .computed()
            .plan_modifier(DefaultValue::bool(false))
            .build(),
        AttributeBuilder::new("unique", AttributeType::Bool)
            .markdown_description("must this field be unique")
            .optional()
            .computed()
            .plan_modifier(DefaultValue::bool(false))
            .build(),
    ]))
    .build()
}

#[derive(Default)]
pub struct GlobalFieldResource {
    provider_data: Option<ContentstackProviderData>,
}

impl GlobalFieldResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&ContentstackProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(not_configured)
    }
}

#[async_trait]
impl Resource for GlobalFieldResource {
    fn type_name(&self) -> &str {
        "contentstack_global_field"
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
            .description("GlobalField resource")
            .description_kind(StringKind::Markdown)
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .markdown_description("description of the GlobalField")
                    .optional()
                    .computed()
                    .plan_modifier(DefaultValue::string(""))
                    .build(),
            )
            .attribute(fields_attribute())
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .markdown_description("GlobalField identifier")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("title", AttributeType::String)
                    .markdown_description("title of the GlobalField")
                    .optional()
                    .computed()
                    .plan_modifier(DefaultValueCopiedFromAnotherField::new("uid"))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("uid", AttributeType::String)
                    .markdown_description("uid of the GlobalField")
                    .required()
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
        let mut seen = Vec::new();

        if let Dynamic::List(items) = request.config.get_dynamic(&AttributePath::new("fields")) {
            for (i, item) in items.iter().enumerate() {
                let Some(uid) = FieldModel::from_dynamic(item).uid else {
                    continue;
                };
                if seen.contains(&uid) {
                    diagnostics.push(
                        Diagnostic::error(
                            "Duplicate field uid",
                            format!("The field uid \"{}\" is used more than once", uid),
                        )
                        .with_attribute(AttributePath::new("fields").index(i as i64).attribute("uid")),
                    );
                }
                seen.push(uid);
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

        let mut data = GlobalFieldModel::from_state(&request.planned_state);
        let uid = data.uid.clone().unwrap_or_default();

        match provider_data
            .client
            .global_fields()
            .create(&data.export())
            .await
        {
            Ok(created) => {
                data.update(&created);
                tracing::trace!(uid = %created.uid, "created a GlobalField");
                CreateResourceResponse {
                    new_state: data.to_state(),
                    diagnostics: vec![],
                }
            }
            Err(e) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![client_error(format!(
                    "Unable to create GlobalField \"{}\", got error: {}",
                    uid, e
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

        let mut data = GlobalFieldModel::from_state(&request.current_state);
        let Some(id) = data.id.clone().or_else(|| data.uid.clone()) else {
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![Diagnostic::error(
                    "Missing global field id",
                    "The state does not contain the id of the GlobalField",
                )
                .with_attribute(AttributePath::new("id"))],
            };
        };

        match provider_data.client.global_fields().get(&id).await {
            Ok(global_field) => {
                data.update(&global_field);
                ReadResourceResponse {
                    new_state: Some(data.to_state()),
                    diagnostics: vec![],
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(id = %id, "GlobalField no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![client_error(format!(
                    "Unable to read GlobalField \"{}\", got error: {}",
                    id, e
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

        let prior = GlobalFieldModel::from_state(&request.prior_state);
        let mut data = GlobalFieldModel::from_state(&request.planned_state);
        let id = prior
            .id
            .clone()
            .or_else(|| prior.uid.clone())
            .unwrap_or_default();

        tracing::trace!(id = %id, uid = ?data.uid, "about to update a GlobalField");

        match provider_data
            .client
            .global_fields()
            .update(&id, &data.export())
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
                    "Unable to update GlobalField \"{}\", got error: {}",
                    id, e
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

        let data = GlobalFieldModel::from_state(&request.prior_state);
        let id = data.id.or(data.uid).unwrap_or_default();

        match provider_data.client.global_fields().delete(&id).await {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!(id = %id, "GlobalField already deleted");
                DeleteResourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![client_error(format!(
                    "Unable to delete GlobalField \"{}\", got error: {}",
                    id, e
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
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for GlobalFieldResource {
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
