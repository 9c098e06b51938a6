//! PDF rendering.

use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use genpdf::{Element, elements, style};
use kyc_core::{KycRecord, ProfileField};

use crate::RenderError;

/// Lays out a KYC application and its summary as a PDF document.
///
/// Called from a blocking thread; implementations may do file I/O.
pub trait PdfRenderer: Send + Sync + 'static {
    fn render(
        &self,
        record: &KycRecord,
        summary: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<Bytes, RenderError>;
}

/// Renderer backed by `genpdf`, using a TrueType family loaded from disk.
#[derive(Debug, Clone)]
pub struct GenPdfRenderer {
    font_dir: PathBuf,
    font_name: String,
}

impl GenPdfRenderer {
    pub fn new(font_dir: impl Into<PathBuf>, font_name: impl Into<String>) -> Self {
        Self {
            font_dir: font_dir.into(),
            font_name: font_name.into(),
        }
    }
}

impl PdfRenderer for GenPdfRenderer {
    fn render(
        &self,
        record: &KycRecord,
        summary: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<Bytes, RenderError> {
        let family = genpdf::fonts::from_files(&self.font_dir, &self.font_name, None)
            .map_err(|e| RenderError::Font(e.to_string()))?;

        let mut doc = genpdf::Document::new(family);
        doc.set_title(format!("KYC Application {}", record.id));

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);

        let heading = style::Style::new().bold().with_font_size(16);
        let section = style::Style::new().bold().with_font_size(12);

        doc.push(elements::Paragraph::new("KYC Application Report").styled(heading));
        doc.push(elements::Paragraph::new(format!("Application ID: {}", record.id)));
        doc.push(elements::Break::new(1));

        doc.push(elements::Paragraph::new("Applicant Details").styled(section));
        for field in ProfileField::ALL {
            let value = record.field(field).unwrap_or("Not provided");
            doc.push(elements::Paragraph::new(format!("{}: {}", field.label(), value)));
        }
        if let Some(status) = record.status.as_deref() {
            doc.push(elements::Paragraph::new(format!("Status: {}", status)));
        }
        if let Some(submitted_at) = record.submitted_at {
            doc.push(elements::Paragraph::new(format!(
                "Submitted: {}",
                submitted_at.format("%Y-%m-%d %H:%M UTC")
            )));
        }
        doc.push(elements::Break::new(1));

        doc.push(elements::Paragraph::new("Risk Summary").styled(section));
        // Paragraphs do not break on '\n'.
        for line in summary.lines() {
            if line.trim().is_empty() {
                doc.push(elements::Break::new(1));
            } else {
                doc.push(elements::Paragraph::new(line.trim_end()));
            }
        }
        doc.push(elements::Break::new(2));

        doc.push(
            elements::Paragraph::new(format!(
                "Generated: {}",
                generated_at.format("%Y-%m-%d %H:%M UTC")
            ))
            .styled(style::Style::new().italic().with_font_size(8)),
        );

        let mut buf = Vec::new();
        doc.render(&mut buf)
            .map_err(|e| RenderError::Layout(e.to_string()))?;
        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_family_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GenPdfRenderer::new(dir.path(), "NoSuchFont");
        let result = renderer.render(&KycRecord::new("k1"), "summary", Utc::now());
        assert!(matches!(result, Err(RenderError::Font(_))));
    }
}
