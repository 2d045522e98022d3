//! DOCX text extraction.
//!
//! A .docx file is a zip archive; the body lives in `word/document.xml`.
//! We pull the text runs (`<w:t>`) out of that XML directly and emit a
//! newline per paragraph close (`</w:p>`), which is all a resume needs.

use std::io::{Cursor, Read};

use crate::errors::AppError;

pub fn extract_docx_text(data: &[u8]) -> Result<String, AppError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| AppError::Extraction(format!("Failed to read DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Extraction(format!("DOCX has no document body: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::Extraction(format!("Failed to read DOCX body: {e}")))?;

    Ok(document_xml_to_text(&xml))
}

/// Walks the document XML, collecting `<w:t>` run contents and turning
/// paragraph boundaries into newlines. Not a general XML parser: WordprocessingML
/// from real producers is well-formed enough for this scan.
fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    let mut rest = xml;

    loop {
        let Some(open) = rest.find('<') else { break };
        rest = &rest[open + 1..];
        let Some(end) = rest.find('>') else { break };
        let tag = &rest[..end];
        rest = &rest[end + 1..];

        if tag == "/w:p" {
            out.push('\n');
        } else if (tag == "w:t" || tag.starts_with("w:t ")) && !tag.ends_with('/') {
            if let Some(close) = rest.find("</w:t>") {
                push_unescaped(&mut out, &rest[..close]);
                rest = &rest[close + "</w:t>".len()..];
            }
        }
    }

    out
}

/// Resolves the five XML character entities; numeric references pass through.
fn push_unescaped(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let entity = [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&apos;", '\''),
        ]
        .iter()
        .find(|(name, _)| rest.starts_with(name));
        match entity {
            Some((name, ch)) => {
                out.push(*ch);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_and_paragraphs() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
            <w:p><w:r><w:t xml:space="preserve">Senior </w:t></w:r><w:r><w:t>Engineer</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(document_xml_to_text(xml), "Jane Doe\nSenior Engineer\n");
    }

    #[test]
    fn test_self_closing_run_is_skipped() {
        let xml = "<w:p><w:t/><w:t>after</w:t></w:p>";
        assert_eq!(document_xml_to_text(xml), "after\n");
    }

    #[test]
    fn test_entities_unescaped() {
        let xml = "<w:p><w:t>R&amp;D &lt;lead&gt;</w:t></w:p>";
        assert_eq!(document_xml_to_text(xml), "R&D <lead>\n");
    }

    #[test]
    fn test_invalid_archive_is_extraction_error() {
        let err = extract_docx_text(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, crate::errors::AppError::Extraction(_)));
    }

    #[test]
    fn test_real_zip_without_document_body() {
        // Minimal zip containing an unrelated file.
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            writer
                .start_file("other.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            std::io::Write::write_all(&mut writer, b"hello").unwrap();
            writer.finish().unwrap();
        }
        let err = extract_docx_text(&buf).unwrap_err();
        assert!(matches!(err, crate::errors::AppError::Extraction(_)));
    }

    #[test]
    fn test_round_trip_through_zip() {
        let xml = "<w:document><w:body><w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p></w:body></w:document>";
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            std::io::Write::write_all(&mut writer, xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        assert_eq!(extract_docx_text(&buf).unwrap(), "Jane Doe\n");
    }
}
