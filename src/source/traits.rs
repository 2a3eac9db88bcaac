//! Trait abstraction for configuration sources to enable mocking in tests

use crate::error::FormError;
use crate::state::{FormConfig, FormType};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Supplier of field configurations, one per form type
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the configuration for a form type
    async fn fetch_form_config(&self, form_type: FormType) -> Result<FormConfig>;
}

/// Fetch a configuration, failing once `timeout` elapses
pub async fn fetch_with_timeout(
    source: &dyn ConfigSource,
    form_type: FormType,
    timeout: Duration,
) -> Result<FormConfig, FormError> {
    match tokio::time::timeout(timeout, source.fetch_form_config(form_type)).await {
        Ok(Ok(config)) => Ok(config),
        Ok(Err(err)) => Err(FormError::ConfigFetch {
            form_type,
            message: format!("{err:#}"),
        }),
        Err(_) => Err(FormError::FetchTimeout {
            form_type,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
