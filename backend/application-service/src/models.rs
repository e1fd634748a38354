use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    /// Owner; always the caller that applied
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl Application {
    pub fn new(job_id: Uuid, applicant_id: Uuid, applied_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            applicant_id,
            status: ApplicationStatus::Applied,
            applied_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRequest {
    pub job_id: Uuid,
}

/// `?status=SHORTLISTED`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery {
    pub status: ApplicationStatus,
}
