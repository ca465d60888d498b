use std::sync::Arc;

use super::domain::{ApplicantReceipt, JobApplication, JobDetails, JobFilter, JobListing};
use super::gateway::CareersGateway;
use crate::workflows::leads::ErpError;
use crate::workflows::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum CareersServiceError {
    #[error("job opening '{0}' not found")]
    JobNotFound(String),
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Erp(#[from] ErpError),
}

/// Job board backed by the ERP. Nothing is stored locally: an application
/// the ERP does not accept is reported back to the applicant.
pub struct CareersService<G> {
    gateway: Arc<G>,
}

impl<G> CareersService<G>
where
    G: CareersGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Open positions matching `filter`. An unreachable ERP yields an empty
    /// listing flagged unavailable instead of an error.
    pub async fn openings(&self, filter: JobFilter) -> JobListing {
        match self.gateway.job_openings().await {
            Ok(openings) => {
                let listing = JobListing::build(openings, filter);
                tracing::debug!(jobs = listing.jobs.len(), "job openings listed");
                listing
            }
            Err(error) => {
                tracing::warn!(error = %error, "job openings unavailable");
                JobListing::unavailable(filter)
            }
        }
    }

    /// Any ERP failure reads as not found; the detail page has nothing else
    /// to show.
    pub async fn opening(&self, name: &str) -> Result<JobDetails, CareersServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CareersServiceError::JobNotFound(String::new()));
        }
        match self.gateway.job_opening(name).await {
            Ok(Some(details)) => Ok(details),
            Ok(None) => Err(CareersServiceError::JobNotFound(name.to_string())),
            Err(error) => {
                tracing::warn!(job = name, error = %error, "job opening lookup failed");
                Err(CareersServiceError::JobNotFound(name.to_string()))
            }
        }
    }

    pub async fn apply(
        &self,
        application: JobApplication,
    ) -> Result<ApplicantReceipt, CareersServiceError> {
        application.validate().map_err(CareersServiceError::Invalid)?;
        let application = application.trimmed();

        match self.gateway.submit_applicant(&application).await {
            Ok(receipt) => {
                tracing::info!(
                    status = receipt.status,
                    applicant = ?receipt.applicant,
                    job = %application.job_title,
                    "job application forwarded to ERP"
                );
                Ok(receipt)
            }
            Err(error) => {
                tracing::warn!(job = %application.job_title, error = %error, "job application failed");
                Err(error.into())
            }
        }
    }
}
