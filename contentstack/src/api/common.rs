//! Common types and utilities for the Contentstack Management API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error body returned by the Management API
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error_message: Option<String>,
    pub error_code: Option<i64>,
    pub errors: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: error_code={error_code:?}, errors={errors:?}")]
pub struct ApiErrorDetails {
    pub error_code: Option<i64>,
    pub errors: Option<HashMap<String, serde_json::Value>>,
}

/// Body of responses that only carry a human readable notice, such as deletes
#[derive(Debug, Default, Deserialize)]
pub struct Notice {
    #[serde(default)]
    pub notice: Option<String>,
}

/// Encode a single path segment such as a locale code or environment name
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Read either a string or a number as an i64, the API is not consistent
/// about the type of `_version`
pub mod version_number {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrI64 {
            String(String),
            I64(i64),
        }

        match Option::<StringOrI64>::deserialize(deserializer)? {
            Some(StringOrI64::String(s)) => {
                s.parse::<i64>().map(Some).map_err(serde::de::Error::custom)
            }
            Some(StringOrI64::I64(n)) => Ok(Some(n)),
            None => Ok(None),
        }
    }
}

/// Wraps a request body in the single key object the API expects,
/// e.g. `{"locale": {...}}`
#[derive(Serialize)]
#[serde(transparent)]
pub struct Envelope<'a, T: Serialize> {
    inner: HashMap<&'a str, &'a T>,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    pub fn new(key: &'a str, body: &'a T) -> Self {
        Self {
            inner: HashMap::from([(key, body)]),
        }
    }
}
