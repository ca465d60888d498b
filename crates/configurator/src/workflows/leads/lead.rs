use serde::Serialize;

use super::domain::{ContactMessage, Participant};
use crate::config::ErpConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    /// Contact step after a finished quiz.
    Quiz,
    /// Quote request from an item page.
    Quote,
    /// Public contact form.
    Contact,
}

/// One answered question as shown to sales: label plus the chosen texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    pub label: String,
    pub choices: Vec<String>,
}

/// A sales lead before it is addressed to a specific ERP document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub kind: LeadKind,
    pub contact_email: String,
    pub customer_name: String,
    pub contact_number: String,
    pub contact_person: String,
    pub interested_product: Option<String>,
    pub state: Option<String>,
    pub remark: Option<String>,
}

impl Lead {
    pub fn for_quiz(
        participant: &Participant,
        interested_items: &[String],
        selections: &[SelectionSummary],
    ) -> Self {
        let mut rows = String::new();
        if interested_items.is_empty() {
            push_row(&mut rows, "Interested Product", "(not specified)");
        } else {
            for name in interested_items {
                push_row(&mut rows, "Interested Product", name);
            }
        }
        rows.push_str(
            "<tr><th colspan='2' style='text-align:left;background:#f6f6f6;'>Your selections</th></tr>",
        );
        let mut wrote_selection = false;
        for selection in selections {
            if selection.label.trim().is_empty() || selection.choices.is_empty() {
                continue;
            }
            push_row(&mut rows, selection.label.trim(), &selection.choices.join(", "));
            wrote_selection = true;
        }
        if !wrote_selection {
            push_row(&mut rows, "User selections", "(none)");
        }

        Self::from_participant(LeadKind::Quiz, participant, &rows)
    }

    pub fn for_quote(participant: &Participant, item_name: &str) -> Self {
        let mut rows = String::new();
        push_row(&mut rows, "Interested Product", item_name);
        Self::from_participant(LeadKind::Quote, participant, &rows)
    }

    pub fn for_contact(message: &ContactMessage) -> Self {
        let state = message.state.trim();
        let name = message.name.trim();
        let customer_name = if state.is_empty() {
            name.to_string()
        } else {
            format!("{name} | Territory : {state}")
        };
        let contact_number = match message.contact_number.trim() {
            "" => message.phone.trim(),
            number => number,
        };
        let remark = match message.remark.trim() {
            "" => message.message.trim(),
            remark => remark,
        };

        Self {
            kind: LeadKind::Contact,
            contact_email: message.email.trim().to_string(),
            customer_name,
            contact_number: contact_number.to_string(),
            contact_person: message.contact_person.trim().to_string(),
            interested_product: None,
            state: Some(state.to_string()),
            remark: Some(remark.to_string()),
        }
    }

    fn from_participant(kind: LeadKind, participant: &Participant, rows: &str) -> Self {
        let note = format!(
            "Name: {}<br>Designation: {}<br>Company: {}<br>Phone: {}",
            escape_html(&participant.name),
            escape_html(or_dash(&participant.designation)),
            escape_html(or_dash(&participant.company)),
            escape_html(or_dash(&participant.phone)),
        );
        let table = format!(
            "<table border='1' style='border-collapse:collapse;'>\
             <tr><th>Requirement</th><th>Details</th></tr>{rows}</table>"
        );

        Self {
            kind,
            contact_email: participant.email.clone(),
            customer_name: participant.company.clone(),
            contact_number: participant.phone.clone(),
            contact_person: participant.name.clone(),
            interested_product: Some(format!("{table}<br>{note}")),
            state: None,
            remark: None,
        }
    }

    /// Address the lead to the configured ERP document.
    pub fn payload(&self, document: &ErpConfig) -> LeadPayload {
        let (doctype, source, status) = match self.kind {
            LeadKind::Quiz => (
                Some(document.lead_doctype.clone()),
                document.source.clone(),
                Some(document.status.clone()),
            ),
            LeadKind::Quote => (Some(document.lead_doctype.clone()), document.source.clone(), None),
            LeadKind::Contact => (
                None,
                document.contact_source.clone(),
                Some(document.status.clone()),
            ),
        };

        LeadPayload {
            doctype,
            naming_series: document.naming_series.clone(),
            source,
            status,
            contact_email_id: self.contact_email.clone(),
            new_customer_name: self.customer_name.clone(),
            contact_number: self.contact_number.clone(),
            contact_person: self.contact_person.clone(),
            interested_product: self.interested_product.clone(),
            state: self.state.clone(),
            remark: self.remark.clone(),
        }
    }
}

/// JSON body posted to the ERP resource endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctype: Option<String>,
    pub naming_series: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub contact_email_id: String,
    pub new_customer_name: String,
    pub contact_number: String,
    pub contact_person: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interested_product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

fn push_row(rows: &mut String, label: &str, details: &str) {
    rows.push_str("<tr><td>");
    rows.push_str(&escape_html(label));
    rows.push_str("</td><td>");
    rows.push_str(&escape_html(details));
    rows.push_str("</td></tr>");
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
