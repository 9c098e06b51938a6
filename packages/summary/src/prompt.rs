use kyc_core::{KycRecord, ProfileField};

pub const SYSTEM_PROMPT: &str = "You are a professional KYC (Know Your Customer) analyst assistant. \
Your task is to create clear, concise, and professional summaries of customer verification applications. \
Focus on key information, risk indicators, and provide actionable insights for compliance officers. \
IMPORTANT: Output PLAIN TEXT ONLY. DO NOT use markdown formatting, asterisks, or any special formatting characters. \
Use simple paragraphs with line breaks.";

/// User message asking for a summary of `record`.
pub fn build_prompt(record: &KycRecord) -> String {
    let mut fields = String::new();
    for field in ProfileField::ALL {
        let value = record.field(field).unwrap_or("Not provided");
        fields.push_str(&format!("- {}: {}\n", field.label(), value));
    }

    format!(
        "Analyze the following KYC application and provide a professional summary in PLAIN TEXT format \
(no markdown, no asterisks, no formatting):

Customer Information:
{fields}
Task:
Create a professional KYC application summary that includes:

1. Overview: Brief introduction of the applicant
2. Verification Status: What information is complete/incomplete
3. Risk Assessment: Initial risk indicators (if any)
4. Recommendations: Next steps for the compliance team

Keep the summary concise (3-4 paragraphs), professional, and actionable. Use clear, business-appropriate \
language. Write in plain text format with simple paragraphs separated by line breaks. Do NOT use markdown \
formatting or special characters."
    )
}
