use async_trait::async_trait;

use super::domain::{ApplicantReceipt, JobApplication, JobDetails, JobOpening};
use crate::workflows::leads::ErpError;

/// ERP side of the careers pages.
#[async_trait]
pub trait CareersGateway: Send + Sync {
    /// Every listed opening, whatever its status.
    async fn job_openings(&self) -> Result<Vec<JobOpening>, ErpError>;
    /// One opening by document name; `None` when the ERP does not know it.
    async fn job_opening(&self, name: &str) -> Result<Option<JobDetails>, ErpError>;
    async fn submit_applicant(
        &self,
        application: &JobApplication,
    ) -> Result<ApplicantReceipt, ErpError>;
}
