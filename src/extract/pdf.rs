//! PDF text extraction

use std::panic;

use crate::errors::DocQaError;
use crate::errors::Result;

pub fn extract(bytes: &[u8]) -> Result<String> {
    if !bytes.starts_with(b"%PDF") {
        return Err(DocQaError::Extraction(
            "Not a valid PDF document (missing %PDF header)".to_string(),
        ));
    }

    // pdf-extract panics on some malformed inputs instead of returning an error
    let extracted = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| DocQaError::Extraction("PDF parser crashed on this document".to_string()))?;

    extracted.map_err(|e| DocQaError::Extraction(format!("Failed to read PDF: {e}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a one-page PDF showing each line in Helvetica
    pub(crate) fn build_pdf(lines: &[&str]) -> Vec<u8> {
        let mut content = String::from("BT\n/F1 12 Tf\n72 720 Td\n14 TL\n");
        for line in lines {
            let escaped = line
                .replace('\\', "\\\\")
                .replace('(', "\\(")
                .replace(')', "\\)");
            content.push_str(&format!("({escaped}) Tj T*\n"));
        }
        content.push_str("ET\n");

        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
        }

        let xref = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_extracts_page_text() {
        let pdf = build_pdf(&["Hello PDF", "Refunds are issued within 30 days."]);
        let text = extract(&pdf).unwrap();
        assert!(text.contains("Hello"), "{text:?}");
        assert!(text.contains("Refunds"), "{text:?}");
    }

    #[test]
    fn test_rejects_missing_header() {
        let err = extract(b"PK\x03\x04 definitely a zip").unwrap_err();
        assert!(err.to_string().contains("%PDF"));
    }

    #[test]
    fn test_truncated_pdf_is_an_extraction_error() {
        let err = extract(b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog").unwrap_err();
        assert!(matches!(err, DocQaError::Extraction(_)));
    }
}
