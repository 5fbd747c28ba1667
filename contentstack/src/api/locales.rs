//! Locale (language) API implementation

use serde::{Deserialize, Serialize};

use super::common::{path_segment, version_number, Envelope, Notice};
use super::{ApiError, Client};

/// A language configured on the stack
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Locale {
    #[serde(default)]
    pub uid: String,
    pub code: String,
    #[serde(default)]
    pub name: String,
    /// Empty or missing for the master locale
    #[serde(default)]
    pub fallback_locale: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_version", default, deserialize_with = "version_number::deserialize")]
    pub version: Option<i64>,
}

/// Request body for creating and updating locales
#[derive(Debug, Clone, Serialize)]
pub struct LocaleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocaleResponse {
    locale: Locale,
}

#[derive(Debug, Deserialize)]
struct LocaleListResponse {
    #[serde(default)]
    locales: Vec<Locale>,
}

/// Locales API for locale operations
pub struct LocalesApi<'a> {
    client: &'a Client,
}

impl<'a> LocalesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /v3/locales
    pub async fn list(&self) -> Result<Vec<Locale>, ApiError> {
        let response: LocaleListResponse = self.client.get("/locales").await?;
        Ok(response.locales)
    }

    /// GET /v3/locales/{code}
    pub async fn get(&self, code: &str) -> Result<Locale, ApiError> {
        let response: LocaleResponse = self
            .client
            .get(&format!("/locales/{}", path_segment(code)))
            .await?;
        Ok(response.locale)
    }

    /// POST /v3/locales
    pub async fn create(&self, request: &LocaleRequest) -> Result<Locale, ApiError> {
        let response: LocaleResponse = self
            .client
            .post("/locales", &Envelope::new("locale", request))
            .await?;
        Ok(response.locale)
    }

    /// PUT /v3/locales/{code}
    pub async fn update(&self, code: &str, request: &LocaleRequest) -> Result<Locale, ApiError> {
        let response: LocaleResponse = self
            .client
            .put(
                &format!("/locales/{}", path_segment(code)),
                &Envelope::new("locale", request),
            )
            .await?;
        Ok(response.locale)
    }

    /// DELETE /v3/locales/{code}
    pub async fn delete(&self, code: &str) -> Result<(), ApiError> {
        self.client
            .delete::<Notice>(&format!("/locales/{}", path_segment(code)))
            .await
            .map(|_| ())
    }
}
