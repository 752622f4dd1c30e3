//! Word (.docx) text extraction
//!
//! A .docx file is a zip archive; the body lives in `word/document.xml` as
//! paragraphs (`w:p`) of runs whose text is in `w:t` elements.

use std::io::Cursor;
use std::io::Read;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::errors::DocQaError;
use crate::errors::Result;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocQaError::Extraction(format!("Not a valid Word document: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| DocQaError::Extraction(format!("Missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| DocQaError::Extraction(format!("Failed to read {DOCUMENT_PART}: {e}")))?;

    document_text(&xml)
}

/// Flatten WordprocessingML into plain text, one line per paragraph
fn document_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text_run = true;
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" | b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run => {
                let run = e
                    .unescape()
                    .map_err(|e| DocQaError::Extraction(format!("Malformed text run: {e}")))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DocQaError::Extraction(format!(
                    "Malformed {DOCUMENT_PART} at position {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    Ok(text)
}
