//! Text extraction from uploaded documents

pub mod docx;
pub mod pdf;

use tracing::debug;

use crate::errors::DocQaError;
use crate::errors::Result;
use crate::models::DocumentKind;

/// Message returned when a document yields no text
pub const EMPTY_DOCUMENT_MESSAGE: &str = "No text extracted from the document";

/// Extract the plain text of a document
///
/// Text that is blank after trimming is rejected with [`DocQaError::EmptyDocument`].
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String> {
    if bytes.is_empty() {
        return Err(DocQaError::EmptyDocument(EMPTY_DOCUMENT_MESSAGE.to_string()));
    }

    let text = match kind {
        DocumentKind::Pdf => pdf::extract(bytes)?,
        DocumentKind::Docx => docx::extract(bytes)?,
    };

    if text.trim().is_empty() {
        return Err(DocQaError::EmptyDocument(EMPTY_DOCUMENT_MESSAGE.to_string()));
    }

    debug!("Extracted {} characters from {} document", text.chars().count(), kind);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docx_text() {
        let bytes = docx::tests::build_docx(&["Quarterly revenue grew 12%."]);
        let text = extract_text(&bytes, DocumentKind::Docx).unwrap();
        assert!(text.contains("Quarterly revenue grew 12%."));
    }

    #[test]
    fn test_blank_docx_is_empty_document() {
        let bytes = docx::tests::build_docx(&["   ", ""]);
        let err = extract_text(&bytes, DocumentKind::Docx).unwrap_err();
        assert!(matches!(err, DocQaError::EmptyDocument(_)));
        assert_eq!(err.to_string(), EMPTY_DOCUMENT_MESSAGE);
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_pdf_text() {
        let bytes = pdf::tests::build_pdf(&["Hello PDF"]);
        let text = extract_text(&bytes, DocumentKind::Pdf).unwrap();
        assert!(text.contains("Hello"));
    }

    #[test]
    fn test_pdf_without_text_is_empty_document() {
        let bytes = pdf::tests::build_pdf(&[]);
        let err = extract_text(&bytes, DocumentKind::Pdf).unwrap_err();
        assert!(matches!(err, DocQaError::EmptyDocument(_)));
    }

    #[test]
    fn test_no_bytes_is_empty_document() {
        let err = extract_text(&[], DocumentKind::Pdf).unwrap_err();
        assert!(matches!(err, DocQaError::EmptyDocument(_)));
    }
}
