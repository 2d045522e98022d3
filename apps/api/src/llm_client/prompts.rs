// Prompt constants and builders for the cover letter Composer.
// Both templates embed the user inputs verbatim.

/// System prompt for first-draft composition.
pub const COMPOSE_SYSTEM: &str =
    "You are a helpful assistant that writes professional cover letters.";

/// System prompt for instruction-guided revision.
pub const REVISE_SYSTEM: &str = "You are a helpful assistant that improves cover letters.";

pub fn compose_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        "Write a professional cover letter based on this resume:\n\n{resume_text}\n\nAnd this job description:\n\n{job_description}"
    )
}

pub fn revise_prompt(current_letter: &str, instructions: &str) -> String {
    format!(
        "Here's my current cover letter:\n\n{current_letter}\n\nPlease make these improvements: {instructions}"
    )
}
