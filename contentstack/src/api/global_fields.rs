//! Global field API implementation

use serde::{Deserialize, Serialize};

use super::common::{path_segment, version_number, Envelope, Notice};
use super::{ApiError, Client};

/// A reusable group of fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GlobalField {
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schema: Vec<Field>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_version", default, deserialize_with = "version_number::deserialize")]
    pub version: Option<i64>,
}

/// Request body for creating and updating global fields
#[derive(Debug, Clone, Serialize)]
pub struct GlobalFieldRequest {
    pub uid: String,
    pub title: String,
    pub description: String,
    pub schema: Vec<Field>,
}

/// One entry of a global field schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub uid: String,
    pub data_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default)]
    pub field_metadata: FieldMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

/// Default value of a field, its JSON type follows the field's data type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct GlobalFieldResponse {
    global_field: GlobalField,
}

/// Global fields API for global field operations
pub struct GlobalFieldsApi<'a> {
    client: &'a Client,
}

impl<'a> GlobalFieldsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /v3/global_fields/{uid}
    pub async fn get(&self, uid: &str) -> Result<GlobalField, ApiError> {
        let response: GlobalFieldResponse = self
            .client
            .get(&format!("/global_fields/{}", path_segment(uid)))
            .await?;
        Ok(response.global_field)
    }

    /// POST /v3/global_fields
    pub async fn create(&self, request: &GlobalFieldRequest) -> Result<GlobalField, ApiError> {
        let response: GlobalFieldResponse = self
            .client
            .post("/global_fields", &Envelope::new("global_field", request))
            .await?;
        Ok(response.global_field)
    }

    /// PUT /v3/global_fields/{uid}
    pub async fn update(
        &self,
        uid: &str,
        request: &GlobalFieldRequest,
    ) -> Result<GlobalField, ApiError> {
        let response: GlobalFieldResponse = self
            .client
            .put(
                &format!("/global_fields/{}", path_segment(uid)),
                &Envelope::new("global_field", request),
            )
            .await?;
        Ok(response.global_field)
    }

    /// DELETE /v3/global_fields/{uid}
    pub async fn delete(&self, uid: &str) -> Result<(), ApiError> {
        self.client
            .delete::<Notice>(&format!("/global_fields/{}", path_segment(uid)))
            .await
            .map(|_| ())
    }
}
