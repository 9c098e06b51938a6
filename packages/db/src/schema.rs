//! Database schema definitions using SurrealQL.

use crate::{DbError, get_db};

/// Initialize the database schema.
///
/// Safe to run on every startup.
pub async fn init_schema() -> Result<(), DbError> {
    let db = get_db()?;

    tracing::info!("Initializing database schema...");

    db.query(KYC_SCHEMA).await?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// KYC application table.
///
/// Applicant fields are written by the submission flow, so the table stays
/// schemaless; the PDF pipeline only merges the `pdf_*` fields.
const KYC_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS kyc SCHEMALESS;

-- Lookups used by the admin views
DEFINE INDEX IF NOT EXISTS kyc_email ON kyc FIELDS email;
DEFINE INDEX IF NOT EXISTS kyc_status ON kyc FIELDS status;
DEFINE INDEX IF NOT EXISTS kyc_pdf_generated ON kyc FIELDS pdf_generated_at;
"#;
