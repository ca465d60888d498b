//! Careers: open positions and job applications, read from and written to the
//! ERP through the same REST client as leads.

pub mod domain;
pub mod gateway;
pub mod http;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantReceipt, JobApplication, JobDetails, JobFilter, JobListing, JobOpening,
    APPLICANT_SOURCES, OPEN_STATUS,
};
pub use gateway::CareersGateway;
pub use router::careers_router;
pub use service::{CareersService, CareersServiceError};
