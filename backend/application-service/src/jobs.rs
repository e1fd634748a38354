//! Job ownership lookup
//!
//! Applications reference jobs owned by job-service. Ownership checks ask a
//! `JobDirectory` who posted a job; production uses job-service over HTTP.

use actix_middleware::{TrustedIdentity, CORRELATION_ID_HEADER, INTERNAL_API_KEY_HEADER};
use async_trait::async_trait;
use dashmap::DashMap;
use error_types::ServiceError;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

#[async_trait]
pub trait JobDirectory: Send + Sync {
    /// `posted_by` of the job, or `None` if it does not exist
    ///
    /// The lookup runs as `caller` and carries the inbound correlation id, if any.
    async fn job_owner(
        &self,
        job_id: Uuid,
        caller: &TrustedIdentity,
        correlation_id: Option<&str>,
    ) -> Result<Option<Uuid>, ServiceError>;
}

/// Fields of job-service's job body needed here
#[derive(Debug, Deserialize)]
struct JobOwner {
    posted_by: Uuid,
}

/// Calls job-service `GET /jobs/{id}` with the caller's trusted headers
#[derive(Debug, Clone)]
pub struct HttpJobDirectory {
    client: reqwest::Client,
    base_url: String,
    internal_api_key: Option<String>,
}

impl HttpJobDirectory {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        internal_api_key: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            internal_api_key,
        })
    }
}

#[async_trait]
impl JobDirectory for HttpJobDirectory {
    async fn job_owner(
        &self,
        job_id: Uuid,
        caller: &TrustedIdentity,
        correlation_id: Option<&str>,
    ) -> Result<Option<Uuid>, ServiceError> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);

        let mut request = self.client.get(&url);
        for (name, value) in caller.propagation_headers() {
            request = request.header(name, value);
        }
        if let Some(key) = &self.internal_api_key {
            request = request.header(INTERNAL_API_KEY_HEADER, key);
        }
        if let Some(id) = correlation_id {
            request = request.header(CORRELATION_ID_HEADER, id);
        }

        let response = request.send().await.map_err(|e| {
            warn!(job_id = %job_id, error = %e, "job-service unreachable");
            ServiceError::Upstream(format!("job-service: {}", e))
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            warn!(job_id = %job_id, status = status.as_u16(), "job-service lookup failed");
            return Err(ServiceError::Upstream(format!(
                "job-service returned {}",
                status
            )));
        }

        let job: JobOwner = response
            .json()
            .await
            .map_err(|e| ServiceError::Upstream(format!("job-service body: {}", e)))?;
        Ok(Some(job.posted_by))
    }
}

/// Fixed job → owner table
#[derive(Debug, Default)]
pub struct InMemoryJobDirectory {
    owners: DashMap<Uuid, Uuid>,
}

impl InMemoryJobDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_job(&self, job_id: Uuid, posted_by: Uuid) {
        self.owners.insert(job_id, posted_by);
    }
}

#[async_trait]
impl JobDirectory for InMemoryJobDirectory {
    async fn job_owner(
        &self,
        job_id: Uuid,
        _caller: &TrustedIdentity,
        _correlation_id: Option<&str>,
    ) -> Result<Option<Uuid>, ServiceError> {
        Ok(self.owners.get(&job_id).map(|owner| *owner))
    }
}
