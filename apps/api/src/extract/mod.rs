// Resume text extraction. Thin wrappers: format is routed on file
// extension, and an extraction yielding only whitespace is rejected so the
// workflow never composes against an empty resume.

pub mod docx;
pub mod pdf;

use crate::errors::AppError;

pub fn extract_resume_text(filename: &str, data: &[u8]) -> Result<String, AppError> {
    let lower = filename.to_ascii_lowercase();
    let text = if lower.ends_with(".pdf") {
        pdf::extract_pdf_text(data)?
    } else if lower.ends_with(".docx") {
        docx::extract_docx_text(data)?
    } else {
        return Err(AppError::Validation(format!(
            "Unsupported resume format: {filename} (expected .pdf or .docx)"
        )));
    };

    if text.trim().is_empty() {
        return Err(AppError::MissingInput(
            "Could not extract any text from the uploaded resume".to_string(),
        ));
    }
    Ok(text)
}
