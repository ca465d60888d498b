use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::workflows::validation::{check_email, check_text, FieldErrors, REQUIRED};

/// Status the ERP gives openings that accept applications.
pub const OPEN_STATUS: &str = "Open";

/// Where an applicant heard about the position.
pub const APPLICANT_SOURCES: [&str; 4] = [
    "Campaign",
    "Employee Referral",
    "Walk In",
    "Website Listing",
];

/// Job opening row from the ERP listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOpening {
    pub name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub designation: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub status: String,
    #[serde(default, alias = "custom_territory", deserialize_with = "text_or_empty")]
    pub territory: String,
    #[serde(
        default,
        alias = "custom_qualification",
        deserialize_with = "text_or_empty"
    )]
    pub qualification: String,
}

impl JobOpening {
    pub fn is_open(&self) -> bool {
        self.status.trim() == OPEN_STATUS
    }
}

/// Full job opening shown on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetails {
    pub name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub description: String,
    #[serde(default, alias = "custom_no_of_vacancy")]
    pub vacancies: Option<u32>,
    #[serde(default, alias = "custom_territory", deserialize_with = "text_or_empty")]
    pub territory: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub designation: String,
    #[serde(
        default,
        alias = "custom_qualification",
        deserialize_with = "text_or_empty"
    )]
    pub qualification: String,
}

/// Listing filters. `qualification` and `location` are accepted as aliases
/// for the designation and territory filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default, alias = "qualification")]
    pub designation: String,
    #[serde(default, alias = "location")]
    pub territory: String,
}

impl JobFilter {
    /// Case-insensitive substring search over name and designation; the
    /// designation and territory filters match exactly.
    pub fn matches(&self, job: &JobOpening) -> bool {
        let search = self.search.trim().to_lowercase();
        if !search.is_empty()
            && !job.name.to_lowercase().contains(&search)
            && !job.designation.to_lowercase().contains(&search)
        {
            return false;
        }

        let designation = self.designation.trim();
        if !designation.is_empty() && job.designation != designation {
            return false;
        }

        let territory = self.territory.trim();
        territory.is_empty() || job.territory == territory
    }
}

/// Open positions after filtering, with the option lists for the filter
/// controls drawn from every open position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobListing {
    pub jobs: Vec<JobOpening>,
    pub designations: Vec<String>,
    pub territories: Vec<String>,
    pub filter: JobFilter,
    /// False when the ERP could not be reached; `jobs` is empty then.
    pub available: bool,
}

impl JobListing {
    pub fn build(openings: Vec<JobOpening>, filter: JobFilter) -> Self {
        let open: Vec<JobOpening> = openings.into_iter().filter(JobOpening::is_open).collect();
        let designations = distinct(open.iter().map(|job| job.designation.as_str()));
        let territories = distinct(open.iter().map(|job| job.territory.as_str()));
        let jobs = open.into_iter().filter(|job| filter.matches(job)).collect();
        Self {
            jobs,
            designations,
            territories,
            filter,
            available: true,
        }
    }

    pub fn unavailable(filter: JobFilter) -> Self {
        Self {
            jobs: Vec::new(),
            designations: Vec::new(),
            territories: Vec::new(),
            filter,
            available: false,
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Application form; serialized as-is into the ERP `Job Applicant` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub applicant_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub designation: String,
    pub email_id: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub cover_letter: String,
    #[serde(default)]
    pub lower_range: String,
    #[serde(default)]
    pub upper_range: String,
    #[serde(default)]
    pub resume_link: String,
    pub source: String,
}

impl JobApplication {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "applicant_name", &self.applicant_name, 200, true);
        check_text(&mut errors, "job_title", &self.job_title, 200, false);
        check_text(&mut errors, "designation", &self.designation, 200, false);
        check_email(&mut errors, "email_id", &self.email_id);
        check_text(&mut errors, "phone_number", &self.phone_number, 50, false);
        check_text(&mut errors, "country", &self.country, 120, false);

        let link = self.resume_link.trim();
        if !link.is_empty() && reqwest::Url::parse(link).is_err() {
            errors.add("resume_link", "Enter a valid URL.");
        }

        let source = self.source.trim();
        if source.is_empty() {
            errors.add("source", REQUIRED);
        } else if !APPLICANT_SOURCES.contains(&source) {
            errors.add(
                "source",
                format!("Select a valid choice. {source} is not one of the available choices."),
            );
        }
        errors.into_result(())
    }

    pub(crate) fn trimmed(self) -> Self {
        Self {
            applicant_name: self.applicant_name.trim().to_string(),
            job_title: self.job_title.trim().to_string(),
            designation: self.designation.trim().to_string(),
            email_id: self.email_id.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            country: self.country.trim().to_string(),
            cover_letter: self.cover_letter.trim().to_string(),
            lower_range: self.lower_range.trim().to_string(),
            upper_range: self.upper_range.trim().to_string(),
            resume_link: self.resume_link.trim().to_string(),
            source: self.source.trim().to_string(),
        }
    }
}

/// ERP answer to an accepted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantReceipt {
    pub status: u16,
    /// Document name the ERP assigned, when it reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<String>,
}

/// ERP documents carry `null` for unset text fields.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
