use crate::errors::AppError;

/// Extracts plain text from an in-memory PDF.
pub fn extract_pdf_text(data: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(data)
        .map_err(|e| AppError::Extraction(format!("Failed to read PDF: {e}")))
}
