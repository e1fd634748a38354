/// Application business logic
///
/// Role checks happen in the HTTP handlers; this layer enforces ownership.
use actix_middleware::{require_owner, TrustedIdentity};
use chrono::Utc;
use error_types::ServiceError;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::jobs::JobDirectory;
use crate::models::{Application, ApplicationStatus};
use crate::store::ApplicationStore;

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<ApplicationStore>,
    jobs: Arc<dyn JobDirectory>,
}

impl ApplicationService {
    pub fn new(store: Arc<ApplicationStore>, jobs: Arc<dyn JobDirectory>) -> Self {
        Self { store, jobs }
    }

    async fn owner_of(
        &self,
        job_id: Uuid,
        caller: &TrustedIdentity,
        correlation_id: Option<&str>,
    ) -> Result<Uuid, ServiceError> {
        self.jobs
            .job_owner(job_id, caller, correlation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("job"))
    }

    /// Apply the caller to `job_id`
    ///
    /// The job must exist and must not be the caller's own posting.
    pub async fn apply(
        &self,
        caller: &TrustedIdentity,
        job_id: Uuid,
        correlation_id: Option<&str>,
    ) -> Result<Application, ServiceError> {
        let owner = self.owner_of(job_id, caller, correlation_id).await?;
        if caller.is_owner(&owner) {
            warn!(user_id = %caller.user_id, job_id = %job_id, "Attempt to apply to own job");
            return Err(ServiceError::Forbidden);
        }

        let application = self.store.insert(job_id, caller.user_id, Utc::now())?;
        info!(
            application_id = %application.id,
            job_id = %job_id,
            applicant_id = %caller.user_id,
            "Application submitted"
        );
        Ok(application)
    }

    pub fn my_applications(&self, caller: &TrustedIdentity) -> Vec<Application> {
        self.store.by_applicant(caller.user_id)
    }

    pub async fn applications_for_job(
        &self,
        caller: &TrustedIdentity,
        job_id: Uuid,
        correlation_id: Option<&str>,
    ) -> Result<Vec<Application>, ServiceError> {
        let owner = self.owner_of(job_id, caller, correlation_id).await?;
        require_owner(caller, owner)?;
        Ok(self.store.for_job(job_id))
    }

    pub async fn update_status(
        &self,
        caller: &TrustedIdentity,
        application_id: Uuid,
        status: ApplicationStatus,
        correlation_id: Option<&str>,
    ) -> Result<Application, ServiceError> {
        let application = self
            .store
            .get(application_id)
            .ok_or_else(|| ServiceError::not_found("application"))?;

        let owner = self.owner_of(application.job_id, caller, correlation_id).await?;
        require_owner(caller, owner)?;

        let updated = self
            .store
            .set_status(application_id, status)
            .ok_or_else(|| ServiceError::not_found("application"))?;
        info!(
            application_id = %application_id,
            status = ?status,
            updated_by = %caller.user_id,
            "Application status updated"
        );
        Ok(updated)
    }
}
