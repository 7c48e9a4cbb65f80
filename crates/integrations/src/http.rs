//! Shared plumbing for the HTTP clients.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::{IntegrationError, Result};

/// Builds the reqwest client shared by the HTTP integrations.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Decodes a JSON body, turning non-success statuses into [`IntegrationError::Status`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(service, status = %status, body = %body, "integration call failed");
        return Err(IntegrationError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

/// Counts a finished call by service and outcome.
pub(crate) fn record_call<T>(service: &'static str, result: &Result<T>) {
    let outcome = if result.is_ok() { "success" } else { "failure" };
    metrics::counter!("integration_calls", "service" => service, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(endpoint("http://wms:1080/", "/products"), "http://wms:1080/products");
        assert_eq!(endpoint("http://wms:1080", "/products"), "http://wms:1080/products");
    }
}
