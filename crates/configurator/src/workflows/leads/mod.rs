//! Sales leads: quiz contact details, quote requests and contact messages,
//! forwarded best-effort to the ERP.

pub mod domain;
pub mod gateway;
pub mod http;
pub mod lead;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{ContactInbox, ContactMessage, ContactRecord, Participant};
pub use gateway::{ErpError, LeadDispatcher, LeadGateway, LeadPushStatus, LeadReceipt};
pub use http::{ConfiguredGateway, HttpErpClient};
pub use lead::{escape_html, Lead, LeadKind, LeadPayload, SelectionSummary};
pub use router::lead_router;
pub use service::{ContactReceipt, LeadService, LeadServiceError, QuoteReceipt};
