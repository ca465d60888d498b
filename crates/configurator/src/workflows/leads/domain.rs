use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::repository::RepositoryError;
use crate::workflows::validation::{check_email, check_text, FieldErrors};

/// Contact details a shopper leaves after a quiz or on an item page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub company: String,
}

impl Participant {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, 140, true);
        check_email(&mut errors, "email", &self.email);
        check_text(&mut errors, "phone", &self.phone, 40, true);
        check_text(&mut errors, "designation", &self.designation, 140, false);
        check_text(&mut errors, "company", &self.company, 180, false);
        errors.into_result(())
    }

    pub(crate) fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            designation: self.designation.trim().to_string(),
            company: self.company.trim().to_string(),
        }
    }
}

/// Message from the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
    /// Territory, forwarded to the ERP alongside the customer name.
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub remark: String,
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, 140, true);
        check_email(&mut errors, "email", &self.email);
        check_text(&mut errors, "phone", &self.phone, 40, false);
        check_text(&mut errors, "subject", &self.subject, 180, false);
        check_text(&mut errors, "message", &self.message, usize::MAX, true);
        errors.into_result(())
    }
}

/// Locally stored contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: u64,
    pub received_at: DateTime<Utc>,
    pub message: ContactMessage,
    pub handled: bool,
}

/// Local persistence for contact messages; the ERP copy is best-effort.
pub trait ContactInbox: Send + Sync {
    fn record(&self, message: ContactMessage) -> Result<ContactRecord, RepositoryError>;
}
