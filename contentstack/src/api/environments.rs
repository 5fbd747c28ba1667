//! Publishing environment API implementation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::common::{path_segment, version_number, Envelope, Notice};
use super::{ApiError, Client};

/// Base URL of an environment for one locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleUrl {
    pub locale: String,
    #[serde(default)]
    pub url: String,
}

/// A publishing environment
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub urls: Vec<LocaleUrl>,
    #[serde(default)]
    pub deploy_content: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_version", default, deserialize_with = "version_number::deserialize")]
    pub version: Option<i64>,
}

impl Environment {
    /// URLs keyed by locale code, later pairs win on duplicate locales
    pub fn urls_by_locale(&self) -> BTreeMap<String, String> {
        flatten_urls_by_locale(&self.urls)
    }
}

/// Request body for creating and updating environments
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentRequest {
    pub name: String,
    pub urls: Vec<LocaleUrl>,
    pub deploy_content: bool,
}

/// Turn the API's list of locale/url pairs into a map keyed by locale
pub fn flatten_urls_by_locale(urls: &[LocaleUrl]) -> BTreeMap<String, String> {
    urls.iter()
        .map(|u| (u.locale.clone(), u.url.clone()))
        .collect()
}

/// Turn a map keyed by locale into the API's list of pairs, ordered by locale
pub fn expand_urls_by_locale(urls: &BTreeMap<String, String>) -> Vec<LocaleUrl> {
    urls.iter()
        .map(|(locale, url)| LocaleUrl {
            locale: locale.clone(),
            url: url.clone(),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct EnvironmentResponse {
    environment: Environment,
}

/// Environments API for publishing environment operations
pub struct EnvironmentsApi<'a> {
    client: &'a Client,
}

impl<'a> EnvironmentsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /v3/environments/{name}
    pub async fn get(&self, name: &str) -> Result<Environment, ApiError> {
        let response: EnvironmentResponse = self
            .client
            .get(&format!("/environments/{}", path_segment(name)))
            .await?;
        Ok(response.environment)
    }

    /// POST /v3/environments
    pub async fn create(&self, request: &EnvironmentRequest) -> Result<Environment, ApiError> {
        let response: EnvironmentResponse = self
            .client
            .post("/environments", &Envelope::new("environment", request))
            .await?;
        Ok(response.environment)
    }

    /// PUT /v3/environments/{name}
    pub async fn update(
        &self,
        name: &str,
        request: &EnvironmentRequest,
    ) -> Result<Environment, ApiError> {
        let response: EnvironmentResponse = self
            .client
            .put(
                &format!("/environments/{}", path_segment(name)),
                &Envelope::new("environment", request),
            )
            .await?;
        Ok(response.environment)
    }

    /// DELETE /v3/environments/{name}
    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.client
            .delete::<Notice>(&format!("/environments/{}", path_segment(name)))
            .await
            .map(|_| ())
    }
}
