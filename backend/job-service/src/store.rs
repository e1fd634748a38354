//! In-memory job storage

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::Job;

#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<Uuid, Job>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) -> Job {
        self.jobs.insert(job.id, job.clone());
        job
    }

    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.get(&id).map(|j| j.value().clone())
    }

    /// Newest first
    pub fn list(&self) -> Vec<Job> {
        self.collect(|_| true)
    }

    pub fn posted_by(&self, owner: Uuid) -> Vec<Job> {
        self.collect(|job| job.posted_by == owner)
    }

    pub fn remove(&self, id: Uuid) -> Option<Job> {
        self.jobs.remove(&id).map(|(_, job)| job)
    }

    fn collect(&self, keep: impl Fn(&Job) -> bool) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }
}
