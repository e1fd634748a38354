//! In-memory application storage
//!
//! One application per (job, applicant). The pair index is claimed through the
//! `DashMap` entry API, so two concurrent applies for the same pair cannot both
//! succeed.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use error_types::ServiceError;
use uuid::Uuid;

use crate::models::{Application, ApplicationStatus};

#[derive(Debug, Default)]
pub struct ApplicationStore {
    applications: DashMap<Uuid, Application>,
    /// (job_id, applicant_id) -> application id
    by_pair: DashMap<(Uuid, Uuid), Uuid>,
}

impl ApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Conflict` if the applicant already applied to the job
    pub fn insert(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Application, ServiceError> {
        match self.by_pair.entry((job_id, applicant_id)) {
            Entry::Occupied(_) => Err(ServiceError::Conflict(
                "already applied to this job".to_string(),
            )),
            Entry::Vacant(slot) => {
                let application = Application::new(job_id, applicant_id, now);
                self.applications
                    .insert(application.id, application.clone());
                slot.insert(application.id);
                Ok(application)
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Application> {
        self.applications.get(&id).map(|a| a.value().clone())
    }

    pub fn by_applicant(&self, applicant_id: Uuid) -> Vec<Application> {
        self.collect(|a| a.applicant_id == applicant_id)
    }

    pub fn for_job(&self, job_id: Uuid) -> Vec<Application> {
        self.collect(|a| a.job_id == job_id)
    }

    pub fn set_status(&self, id: Uuid, status: ApplicationStatus) -> Option<Application> {
        let mut application = self.applications.get_mut(&id)?;
        application.status = status;
        Some(application.clone())
    }

    fn collect(&self, keep: impl Fn(&Application) -> bool) -> Vec<Application> {
        let mut applications: Vec<Application> = self
            .applications
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        applications
    }
}
