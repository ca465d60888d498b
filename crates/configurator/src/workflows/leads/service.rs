use std::sync::Arc;

use serde::Serialize;

use super::domain::{ContactInbox, ContactMessage, Participant};
use super::gateway::{LeadDispatcher, LeadGateway, LeadPushStatus};
use super::lead::Lead;
use crate::catalog::domain::{Item, ItemId};
use crate::catalog::repository::{CatalogReader, RepositoryError};
use crate::workflows::validation::FieldErrors;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteReceipt {
    pub item: Item,
    pub erp: LeadPushStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReceipt {
    pub message_id: u64,
    pub erp: LeadPushStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error("item {0} not found")]
    ItemNotFound(ItemId),
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Quote requests and contact messages outside the quiz flow.
pub struct LeadService<C, I, L> {
    catalog: Arc<C>,
    inbox: Arc<I>,
    dispatcher: Arc<LeadDispatcher<L>>,
}

impl<C, I, L> LeadService<C, I, L>
where
    C: CatalogReader,
    I: ContactInbox,
    L: LeadGateway,
{
    pub fn new(catalog: Arc<C>, inbox: Arc<I>, dispatcher: Arc<LeadDispatcher<L>>) -> Self {
        Self {
            catalog,
            inbox,
            dispatcher,
        }
    }

    pub async fn request_quote(
        &self,
        item_id: ItemId,
        participant: Participant,
    ) -> Result<QuoteReceipt, LeadServiceError> {
        let item = self
            .catalog
            .item(item_id)?
            .filter(|item| item.is_active)
            .ok_or(LeadServiceError::ItemNotFound(item_id))?;
        participant.validate().map_err(LeadServiceError::Invalid)?;
        let participant = participant.trimmed();

        let lead = Lead::for_quote(&participant, &item.name);
        let erp = self.dispatcher.dispatch(&lead).await;
        tracing::info!(item = %item.id, pushed = erp.is_pushed(), "quote request received");

        Ok(QuoteReceipt { item, erp })
    }

    /// Store the message locally, then forward it.
    pub async fn contact(
        &self,
        message: ContactMessage,
    ) -> Result<ContactReceipt, LeadServiceError> {
        message.validate().map_err(LeadServiceError::Invalid)?;
        let record = self.inbox.record(message)?;

        let lead = Lead::for_contact(&record.message);
        let erp = self.dispatcher.dispatch(&lead).await;
        tracing::info!(message = record.id, pushed = erp.is_pushed(), "contact message stored");

        Ok(ContactReceipt {
            message_id: record.id,
            erp,
        })
    }
}
