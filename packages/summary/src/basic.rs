//! Rule-based fallback summary.

use chrono::{DateTime, Utc};
use kyc_core::{KycRecord, ProfileField};

const NOT_PROVIDED: &str = "Not provided";

/// How many completeness fields an application has filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completeness {
    pub complete: usize,
    pub total: usize,
}

impl Completeness {
    pub fn of(record: &KycRecord) -> Self {
        Self {
            complete: record.populated_fields(),
            total: ProfileField::ALL.len(),
        }
    }

    /// Rounded percentage of populated fields.
    pub fn percentage(self) -> u32 {
        ((self.complete as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn assess(completeness: Completeness) -> Self {
        match completeness.percentage() {
            100 => RiskLevel::Low,
            60.. => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    pub fn rationale(self) -> &'static str {
        match self {
            RiskLevel::Low => {
                "All required information provided. Standard verification process recommended."
            }
            RiskLevel::Medium => {
                "Some information missing. Request additional details before proceeding."
            }
            RiskLevel::High => {
                "Critical information missing. Cannot proceed without complete application."
            }
        }
    }
}

/// Build the fallback summary for `record`.
///
/// The only clock input is `now`, used when the record has no submission
/// time, so the output is fixed for a fixed `now`.
pub fn basic_summary(record: &KycRecord, now: DateTime<Utc>) -> String {
    let completeness = Completeness::of(record);
    let risk = RiskLevel::assess(completeness);

    let first_step = if completeness.complete == completeness.total {
        "Proceed with document verification"
    } else {
        "Request missing information"
    };

    let detail = |field: ProfileField| match record.field(field) {
        Some(value) => format!("[x] {}: {}", field.label(), value),
        None => format!("[ ] {}: {}", field.label(), NOT_PROVIDED),
    };

    let submitted = record
        .submitted_at
        .unwrap_or(now)
        .format("%B %-d, %Y at %I:%M %p");

    format!(
        "KYC Application Summary

Applicant: {name} ({email})

Profile Completeness: {percentage}% ({complete}/{total} fields)

{nid}
{occupation}
{address}

Initial Risk Level: {level}
{rationale}

Next Steps:
- {first_step}
- Verify identity documents
- Conduct background screening
- Review for compliance with AML/KYC policies

Submitted: {submitted}",
        name = record.field(ProfileField::Name).unwrap_or(NOT_PROVIDED),
        email = record.field(ProfileField::Email).unwrap_or(NOT_PROVIDED),
        percentage = completeness.percentage(),
        complete = completeness.complete,
        total = completeness.total,
        nid = detail(ProfileField::NationalId),
        occupation = detail(ProfileField::Occupation),
        address = detail(ProfileField::Address),
        level = risk.label(),
        rationale = risk.rationale(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 1, 14, 5, 0).unwrap()
    }

    fn complete_record() -> KycRecord {
        KycRecord::new("k1")
            .with_name("Jane Doe")
            .with_email("jane@example.com")
            .with_nid("1234567890")
            .with_occupation("Engineer")
            .with_address("1 Main St")
    }

    #[test]
    fn identical_for_fixed_clock() {
        let record = complete_record();
        assert_eq!(
            basic_summary(&record, clock()),
            basic_summary(&record, clock())
        );
    }

    #[test]
    fn complete_application_is_low_risk() {
        let summary = basic_summary(&complete_record(), clock());
        assert!(summary.starts_with("KYC Application Summary\n\nApplicant: Jane Doe (jane@example.com)"));
        assert!(summary.contains("Profile Completeness: 100% (5/5 fields)"));
        assert!(summary.contains("[x] National ID: 1234567890"));
        assert!(summary.contains("Initial Risk Level: LOW\n"));
        assert!(summary.contains("- Proceed with document verification\n"));
        assert!(summary.ends_with("Submitted: November 1, 2024 at 02:05 PM"));
    }

    #[test]
    fn three_of_five_is_medium() {
        let record = KycRecord::new("k2")
            .with_name("Jane Doe")
            .with_email("jane@example.com")
            .with_occupation("Engineer");
        let summary = basic_summary(&record, clock());
        assert!(summary.contains("Profile Completeness: 60% (3/5 fields)"));
        assert!(summary.contains("[ ] National ID: Not provided"));
        assert!(summary.contains("[ ] Address: Not provided"));
        assert!(summary.contains("Initial Risk Level: MEDIUM\n"));
        assert!(summary.contains("- Request missing information\n"));
    }

    #[test]
    fn sparse_application_is_high_risk() {
        let record = KycRecord::new("k3").with_email("x@example.com");
        let summary = basic_summary(&record, clock());
        assert!(summary.contains("Applicant: Not provided (x@example.com)"));
        assert!(summary.contains("20% (1/5 fields)"));
        assert!(summary.contains("Initial Risk Level: HIGH\n"));
    }

    #[test]
    fn submission_time_wins_over_clock() {
        let submitted = Utc.with_ymd_and_hms(2023, 3, 9, 9, 30, 0).unwrap();
        let record = complete_record().with_submitted_at(submitted);
        assert!(basic_summary(&record, clock()).ends_with("Submitted: March 9, 2023 at 09:30 AM"));
    }
}
