use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::lead::{Lead, LeadPayload};
use crate::config::ErpConfig;

/// Outbound sink for sales leads.
#[async_trait]
pub trait LeadGateway: Send + Sync {
    async fn push_lead(&self, payload: &LeadPayload) -> Result<LeadReceipt, ErpError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeadReceipt {
    pub status: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ErpError {
    #[error("ERP integration is disabled")]
    Disabled,
    #[error("ERP rejected the request with status {status}")]
    Rejected { status: u16, body: String },
    #[error("ERP request failed: {0}")]
    Transport(String),
}

/// What happened to a lead push, reported next to the user-facing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LeadPushStatus {
    Pushed { status: u16 },
    Rejected { status: u16 },
    Failed { reason: String },
    Disabled,
}

impl LeadPushStatus {
    pub fn is_pushed(&self) -> bool {
        matches!(self, Self::Pushed { .. })
    }
}

/// Addresses leads to the configured document and pushes them best-effort.
///
/// Failures are logged and reported, never propagated: the local write that
/// preceded the push stands either way.
pub struct LeadDispatcher<L> {
    gateway: Arc<L>,
    document: ErpConfig,
}

impl<L> LeadDispatcher<L>
where
    L: LeadGateway,
{
    pub fn new(gateway: Arc<L>, document: ErpConfig) -> Self {
        Self { gateway, document }
    }

    pub async fn dispatch(&self, lead: &Lead) -> LeadPushStatus {
        let payload = lead.payload(&self.document);
        match self.gateway.push_lead(&payload).await {
            Ok(receipt) => {
                tracing::info!(kind = ?lead.kind, status = receipt.status, "lead pushed to ERP");
                LeadPushStatus::Pushed {
                    status: receipt.status,
                }
            }
            Err(ErpError::Disabled) => {
                tracing::debug!(kind = ?lead.kind, "ERP disabled; lead kept locally");
                LeadPushStatus::Disabled
            }
            Err(ErpError::Rejected { status, body }) => {
                tracing::warn!(kind = ?lead.kind, status, body = %body, "ERP rejected lead");
                LeadPushStatus::Rejected { status }
            }
            Err(ErpError::Transport(reason)) => {
                tracing::warn!(kind = ?lead.kind, error = %reason, "ERP push failed");
                LeadPushStatus::Failed { reason }
            }
        }
    }
}
