//! Audit log service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::http::{endpoint, read_json, record_call};
use crate::{IntegrationError, Result};

/// One entry in the external audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogRequest {
    pub user_id: String,
    pub email: String,
    pub action_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Acknowledgement returned by the audit service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogResponse {
    pub message: String,
}

/// Records user actions in the audit system.
#[async_trait]
pub trait AuditService: Send + Sync {
    async fn log_action(&self, entry: AuditLogRequest) -> Result<AuditLogResponse>;
}

/// Audit client that posts entries to `{base_url}/logs`.
#[derive(Debug, Clone)]
pub struct HttpAuditService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuditService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AuditService for HttpAuditService {
    #[tracing::instrument(skip(self, entry), fields(action = %entry.action_name))]
    async fn log_action(&self, entry: AuditLogRequest) -> Result<AuditLogResponse> {
        let result: Result<AuditLogResponse> = async {
            let response = self
                .client
                .post(endpoint(&self.base_url, "/logs"))
                .json(&entry)
                .send()
                .await?;
            read_json("audit", response).await
        }
        .await;

        record_call("audit", &result);
        result
    }
}

#[derive(Debug, Default)]
struct InMemoryAuditState {
    entries: Vec<AuditLogRequest>,
    fail_on_log: bool,
}

/// In-memory audit service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditService {
    state: Arc<RwLock<InMemoryAuditState>>,
}

impl InMemoryAuditService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent calls fail until switched back.
    pub async fn set_fail_on_log(&self, fail: bool) {
        self.state.write().await.fail_on_log = fail;
    }

    /// Returns every entry logged so far, oldest first.
    pub async fn entries(&self) -> Vec<AuditLogRequest> {
        self.state.read().await.entries.clone()
    }
}

#[async_trait]
impl AuditService for InMemoryAuditService {
    async fn log_action(&self, entry: AuditLogRequest) -> Result<AuditLogResponse> {
        let mut state = self.state.write().await;
        if state.fail_on_log {
            return Err(IntegrationError::Unavailable("audit service".to_string()));
        }

        let message = format!("Logged '{}'", entry.action_name);
        state.entries.push(entry);
        Ok(AuditLogResponse { message })
    }
}
