//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::any::Any;
use std::sync::Arc;
use tfplug::types::Diagnostic;

#[derive(Clone)]
pub struct ContentstackProviderData {
    pub client: Arc<Client>,
}

impl ContentstackProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Pick the provider data out of a configure request
    ///
    /// Returns `Ok(None)` when the provider has not been configured yet,
    /// which Terraform does during validation.
    pub fn from_request(
        data: Option<Arc<dyn Any + Send + Sync>>,
        summary: &str,
    ) -> Result<Option<Self>, Diagnostic> {
        let Some(data) = data else {
            return Ok(None);
        };

        match data.downcast_ref::<ContentstackProviderData>() {
            Some(provider_data) => Ok(Some(provider_data.clone())),
            None => {
                tracing::error!("Provider data type id: {:?}", (*data).type_id());
                Err(Diagnostic::error(
                    summary,
                    "Expected ContentstackProviderData. Please report this issue to the provider developers.",
                ))
            }
        }
    }
}

/// Error returned when a handler runs before the provider was configured
pub fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "The Contentstack client is not available, configure the provider before using resources and data sources",
    )
}
