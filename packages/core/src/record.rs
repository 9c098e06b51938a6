//! KYC application records as seen by the PDF pipeline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How long a generated PDF stays fresh before a job may regenerate it.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60 * 60);

/// Identifier of a KYC application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KycId(String);

impl KycId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KycId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for KycId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for KycId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Applicant fields that count towards profile completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Name,
    Email,
    NationalId,
    Occupation,
    Address,
}

impl ProfileField {
    /// All completeness fields, in report order.
    pub const ALL: [ProfileField; 5] = [
        ProfileField::Name,
        ProfileField::Email,
        ProfileField::NationalId,
        ProfileField::Occupation,
        ProfileField::Address,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProfileField::Name => "Name",
            ProfileField::Email => "Email",
            ProfileField::NationalId => "National ID",
            ProfileField::Occupation => "Occupation",
            ProfileField::Address => "Address",
        }
    }
}

/// A KYC application.
///
/// The pipeline only ever writes the `pdf_*` fields; everything else is
/// owned by the submission flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KycRecord {
    pub id: KycId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// National identity number.
    #[serde(default)]
    pub nid: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Review status (`pending`, `approved`, `rejected`).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Storage key of the last rendered PDF.
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub pdf_generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pdf_error: Option<String>,
    #[serde(default)]
    pub pdf_error_at: Option<DateTime<Utc>>,
}

impl KycRecord {
    /// Create an empty application with the given ID.
    pub fn new(id: impl Into<KycId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_nid(mut self, nid: impl Into<String>) -> Self {
        self.nid = Some(nid.into());
        self
    }

    pub fn with_occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = Some(occupation.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_submitted_at(mut self, submitted_at: DateTime<Utc>) -> Self {
        self.submitted_at = Some(submitted_at);
        self
    }

    /// The trimmed value of a profile field, or `None` when blank.
    pub fn field(&self, field: ProfileField) -> Option<&str> {
        let value = match field {
            ProfileField::Name => &self.name,
            ProfileField::Email => &self.email,
            ProfileField::NationalId => &self.nid,
            ProfileField::Occupation => &self.occupation,
            ProfileField::Address => &self.address,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Number of populated completeness fields.
    pub fn populated_fields(&self) -> usize {
        ProfileField::ALL
            .iter()
            .filter(|f| self.field(**f).is_some())
            .count()
    }

    /// Check whether a previously rendered PDF is younger than `max_age`.
    ///
    /// Requires both a stored path and a generation time. A generation time
    /// in the future counts as fresh.
    pub fn has_fresh_pdf(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match (&self.pdf_path, self.pdf_generated_at) {
            (Some(_), Some(generated_at)) => now
                .signed_duration_since(generated_at)
                .to_std()
                .map_or(true, |age| age < max_age),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn rendered(at: DateTime<Utc>) -> KycRecord {
        let mut record = KycRecord::new("k1");
        record.pdf_path = Some("kyc/k1.pdf".into());
        record.pdf_generated_at = Some(at);
        record
    }

    #[test]
    fn thirty_minute_old_pdf_is_fresh() {
        let now = Utc::now();
        assert!(rendered(now - TimeDelta::minutes(30)).has_fresh_pdf(now, DEFAULT_FRESHNESS));
    }

    #[test]
    fn two_hour_old_pdf_is_stale() {
        let now = Utc::now();
        assert!(!rendered(now - TimeDelta::hours(2)).has_fresh_pdf(now, DEFAULT_FRESHNESS));
    }

    #[test]
    fn timestamp_without_path_is_not_fresh() {
        let now = Utc::now();
        let mut record = rendered(now);
        record.pdf_path = None;
        assert!(!record.has_fresh_pdf(now, DEFAULT_FRESHNESS));
    }

    #[test]
    fn blank_fields_do_not_count() {
        let record = KycRecord::new("k1")
            .with_name("Jane")
            .with_email("   ")
            .with_address("1 Main St");
        assert_eq!(record.populated_fields(), 2);
        assert_eq!(record.field(ProfileField::Email), None);
    }
}
