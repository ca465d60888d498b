use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::domain::{ApplicantReceipt, JobApplication, JobDetails, JobOpening};
use super::gateway::CareersGateway;
use crate::workflows::leads::http::send;
use crate::workflows::leads::{ConfiguredGateway, ErpError, HttpErpClient};

const JOB_OPENING: &str = "Job Opening";
const JOB_APPLICANT: &str = "Job Applicant";

const LISTING_FIELDS: &str =
    r#"["name","designation","status","custom_territory","custom_qualification"]"#;
const DETAIL_FIELDS: &str = r#"["name","description","custom_no_of_vacancy","custom_territory","designation","custom_qualification"]"#;

/// Resource responses wrap the document (or list) in `data`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct CreatedDocument {
    #[serde(default)]
    name: Option<String>,
}

async fn read_data<T>(response: reqwest::Response) -> Result<T, ErpError>
where
    T: DeserializeOwned + Default,
{
    response
        .json::<Envelope<T>>()
        .await
        .map(|envelope| envelope.data)
        .map_err(|error| ErpError::Transport(format!("unreadable ERP response: {error}")))
}

#[async_trait]
impl CareersGateway for HttpErpClient {
    async fn job_openings(&self) -> Result<Vec<JobOpening>, ErpError> {
        let url = self.resource_url(JOB_OPENING)?;
        // A page length of 0 lifts the ERP's default page size.
        let request = self.get(url).query(&[
            ("fields", LISTING_FIELDS),
            ("limit_start", "0"),
            ("limit_page_length", "0"),
        ]);
        read_data(send(request).await?).await
    }

    async fn job_opening(&self, name: &str) -> Result<Option<JobDetails>, ErpError> {
        let mut url = self.resource_url(JOB_OPENING)?;
        url.path_segments_mut()
            .map_err(|_| ErpError::Transport("ERP base URL cannot carry a path".to_string()))?
            .push(name);

        match send(self.get(url).query(&[("fields", DETAIL_FIELDS)])).await {
            Ok(response) => read_data(response).await,
            Err(ErpError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn submit_applicant(
        &self,
        application: &JobApplication,
    ) -> Result<ApplicantReceipt, ErpError> {
        let response = send(self.post(JOB_APPLICANT).json(application)).await?;
        let status = response.status().as_u16();
        let created = read_data::<Option<CreatedDocument>>(response)
            .await
            .ok()
            .flatten();
        Ok(ApplicantReceipt {
            status,
            applicant: created.and_then(|document| document.name),
        })
    }
}

#[async_trait]
impl CareersGateway for ConfiguredGateway {
    async fn job_openings(&self) -> Result<Vec<JobOpening>, ErpError> {
        match self {
            Self::Disabled => Err(ErpError::Disabled),
            Self::Http(client) => client.job_openings().await,
        }
    }

    async fn job_opening(&self, name: &str) -> Result<Option<JobDetails>, ErpError> {
        match self {
            Self::Disabled => Err(ErpError::Disabled),
            Self::Http(client) => client.job_opening(name).await,
        }
    }

    async fn submit_applicant(
        &self,
        application: &JobApplication,
    ) -> Result<ApplicantReceipt, ErpError> {
        match self {
            Self::Disabled => Err(ErpError::Disabled),
            Self::Http(client) => client.submit_applicant(application).await,
        }
    }
}
