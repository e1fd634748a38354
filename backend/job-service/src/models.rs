use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub company_name: String,
    pub salary: String,
    pub job_type: String,
    /// Owner; set from the caller's identity, never from the request body
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    #[validate(length(min = 1, max = 100))]
    pub salary: String,
    #[validate(length(min = 1, max = 50))]
    pub job_type: String,
}

impl CreateJobRequest {
    pub fn into_job(self, posted_by: Uuid) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            location: self.location,
            company_name: self.company_name,
            salary: self.salary,
            job_type: self.job_type,
            posted_by,
            created_at: Utc::now(),
        }
    }
}
