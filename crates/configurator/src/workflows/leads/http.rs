use async_trait::async_trait;
use reqwest::{header, redirect, Client, RequestBuilder, Response};

use super::gateway::{ErpError, LeadGateway, LeadReceipt};
use super::lead::LeadPayload;
use crate::config::ErpConfig;

/// Largest slice of an error body kept for logs.
const BODY_PREVIEW: usize = 400;

/// ERP client for the REST resource endpoints: lead documents here, job
/// openings and applicants in the careers workflow.
#[derive(Debug, Clone)]
pub struct HttpErpClient {
    client: Client,
    config: ErpConfig,
    endpoint: String,
    authorization: String,
}

impl HttpErpClient {
    pub fn new(config: &ErpConfig) -> Result<Self, ErpError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(|error| ErpError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            endpoint: config.lead_endpoint(),
            authorization: config.authorization(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Authorized GET against a doctype's resource endpoint.
    pub(crate) fn get(&self, url: reqwest::Url) -> RequestBuilder {
        self.client
            .get(url)
            .header(header::AUTHORIZATION, &self.authorization)
    }

    /// Authorized POST against a doctype's resource endpoint.
    pub(crate) fn post(&self, doctype: &str) -> RequestBuilder {
        self.client
            .post(self.config.resource_endpoint(doctype))
            .header(header::AUTHORIZATION, &self.authorization)
    }

    pub(crate) fn resource_url(&self, doctype: &str) -> Result<reqwest::Url, ErpError> {
        reqwest::Url::parse(&self.config.resource_endpoint(doctype))
            .map_err(|error| ErpError::Transport(error.to_string()))
    }
}

/// Send a prepared request, mapping non-2xx answers to `Rejected`.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response, ErpError> {
    let response = request
        .send()
        .await
        .map_err(|error| ErpError::Transport(error.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ErpError::Rejected {
        status: status.as_u16(),
        body: body.chars().take(BODY_PREVIEW).collect(),
    })
}

#[async_trait]
impl LeadGateway for HttpErpClient {
    async fn push_lead(&self, payload: &LeadPayload) -> Result<LeadReceipt, ErpError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, &self.authorization)
            .json(payload);
        let response = send(request).await?;
        Ok(LeadReceipt {
            status: response.status().as_u16(),
        })
    }
}

/// Gateway selected from configuration at startup.
#[derive(Debug, Clone)]
pub enum ConfiguredGateway {
    Disabled,
    Http(HttpErpClient),
}

impl ConfiguredGateway {
    pub fn from_config(config: &ErpConfig) -> Result<Self, ErpError> {
        if !config.enabled {
            return Ok(Self::Disabled);
        }
        Ok(Self::Http(HttpErpClient::new(config)?))
    }
}

#[async_trait]
impl LeadGateway for ConfiguredGateway {
    async fn push_lead(&self, payload: &LeadPayload) -> Result<LeadReceipt, ErpError> {
        match self {
            Self::Disabled => Err(ErpError::Disabled),
            Self::Http(client) => client.push_lead(payload).await,
        }
    }
}
