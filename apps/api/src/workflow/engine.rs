//! Workflow engine — orchestrates one generation or improvement.
//!
//! Flow: validate inputs → check credit against the ledger → call the
//! Composer → debit → update session (letter, history, chat log).
//!
//! Composer failures surface as typed errors: no debit is recorded and the
//! previous letter stays in place. A debit that fails because the code
//! vanished from the ledger fails the whole operation the same way.

use tracing::info;

use crate::credits::ledger::{CreditLedger, UserCreditRecord};
use crate::errors::AppError;
use crate::llm_client::Composer;
use crate::workflow::session::{ChatMessage, SessionContext};

/// Assistant chat message seeded after a successful generation.
pub const QUICK_ACTIONS_MESSAGE: &str = "Cover letter generated! Try these quick actions or type your own request:\n\
    • Make it more professional\n\
    • Make it more concise\n\
    • Emphasize leadership experience\n\
    • Highlight technical skills\n\
    • Make it more enthusiastic";

/// Result of a successful generation or improvement.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub cover_letter: String,
    pub credits: UserCreditRecord,
}

/// Composes a fresh cover letter from a resume and a job description.
///
/// Requires non-empty inputs and at least one remaining generation credit.
/// On success the generation is debited, the improvement allotment is
/// restored, and the letter becomes the session's current version.
pub async fn generate(
    ledger: &CreditLedger,
    composer: &dyn Composer,
    session: &mut SessionContext,
    resume_text: &str,
    job_description: &str,
) -> Result<WorkflowOutcome, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::MissingInput(
            "Resume text is empty".to_string(),
        ));
    }
    if job_description.trim().is_empty() {
        return Err(AppError::MissingInput(
            "Job description is empty".to_string(),
        ));
    }

    let has_generation = ledger
        .peek(&session.access_code)
        .await
        .map(|record| record.remaining_generations > 0)
        .unwrap_or(false);
    if !has_generation {
        return Err(AppError::CreditsExhausted(
            "No cover letter generations remaining for this access code".to_string(),
        ));
    }

    let letter = composer.compose(resume_text, job_description).await?;

    // Debit only after the composer succeeded.
    let credits = ledger.debit_generation(&session.access_code).await?;

    session.set_letter(&letter);
    // A fresh letter starts a fresh refinement conversation; stale chat
    // about the previous letter is dropped. History keeps every version.
    session.messages = vec![ChatMessage::assistant(QUICK_ACTIONS_MESSAGE)];
    info!(
        "Generated cover letter for session {} ({} generations left)",
        session.id, credits.remaining_generations
    );

    Ok(WorkflowOutcome {
        cover_letter: letter,
        credits,
    })
}

/// Revises the current letter according to free-text instructions.
///
/// Requires an active letter and a remaining improvement credit. The user
/// instruction is logged to the chat before the composer call; the
/// assistant confirmation is logged only on success.
pub async fn improve(
    ledger: &CreditLedger,
    composer: &dyn Composer,
    session: &mut SessionContext,
    instructions: &str,
) -> Result<WorkflowOutcome, AppError> {
    if instructions.trim().is_empty() {
        return Err(AppError::MissingInput(
            "Improvement instructions are empty".to_string(),
        ));
    }
    let Some(current) = session.cover_letter.clone() else {
        return Err(AppError::Validation(
            "No cover letter to improve; generate one first".to_string(),
        ));
    };

    let can_improve = ledger
        .peek(&session.access_code)
        .await
        .map(|record| record.active_generation && record.remaining_improvements > 0)
        .unwrap_or(false);
    if !can_improve {
        return Err(AppError::CreditsExhausted(
            "No improvements remaining for the current cover letter".to_string(),
        ));
    }

    session.messages.push(ChatMessage::user(instructions));

    let revised = composer.revise(&current, instructions).await?;

    // If the code vanished from the ledger mid-session the debit fails and
    // the whole improvement fails with it; the letter is not replaced.
    let credits = ledger.debit_improvement(&session.access_code).await?;

    session.set_letter(&revised);
    session.messages.push(ChatMessage::assistant(format!(
        "Cover letter updated based on: {instructions}"
    )));
    info!(
        "Improved cover letter for session {} ({} improvements left)",
        session.id, credits.remaining_improvements
    );

    Ok(WorkflowOutcome {
        cover_letter: revised,
        credits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::credits::store::JsonStore;
    use crate::credits::{MAX_GENERATIONS, MAX_IMPROVEMENTS};
    use crate::llm_client::LlmError;
    use crate::workflow::session::Role;

    /// Composer stub: counts calls, optionally fails, and labels each
    /// revision with a call number so outputs differ.
    struct MockComposer {
        fail: bool,
        fixed_output: Option<String>,
        calls: AtomicU32,
    }

    impl MockComposer {
        fn ok() -> Self {
            Self {
                fail: false,
                fixed_output: None,
                calls: AtomicU32::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                fixed_output: None,
                calls: AtomicU32::new(0),
            }
        }

        fn always(output: &str) -> Self {
            Self {
                fail: false,
                fixed_output: Some(output.to_string()),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Composer for MockComposer {
        async fn compose(
            &self,
            _resume_text: &str,
            _job_description: &str,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LlmError::EmptyContent);
            }
            Ok(self
                .fixed_output
                .clone()
                .unwrap_or_else(|| "Dear Hiring Manager,".to_string()))
        }

        async fn revise(
            &self,
            current_letter: &str,
            _instructions: &str,
        ) -> Result<String, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LlmError::EmptyContent);
            }
            Ok(self
                .fixed_output
                .clone()
                .unwrap_or_else(|| format!("{current_letter} (rev {n})")))
        }
    }

    fn ledger_in(dir: &tempfile::TempDir) -> CreditLedger {
        CreditLedger::new(JsonStore::new(dir.path().join("user_data.json")))
    }

    async fn activated_session(ledger: &CreditLedger, code: &str) -> SessionContext {
        ledger.consume_access(code).await.unwrap().unwrap();
        SessionContext::new(code.to_string())
    }

    #[tokio::test]
    async fn test_generate_debits_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let composer = MockComposer::ok();
        let mut session = activated_session(&ledger, "ABCD1234").await;

        let outcome = generate(&ledger, &composer, &mut session, "resume", "the role")
            .await
            .unwrap();

        assert_eq!(outcome.credits.remaining_generations, MAX_GENERATIONS - 1);
        assert_eq!(outcome.credits.remaining_improvements, MAX_IMPROVEMENTS);
        assert!(outcome.credits.active_generation);
        assert_eq!(session.cover_letter.as_deref(), Some("Dear Hiring Manager,"));
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_inputs_without_debit() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let composer = MockComposer::ok();
        let mut session = activated_session(&ledger, "ABCD1234").await;

        let err = generate(&ledger, &composer, &mut session, "resume", "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingInput(_)));

        let err = generate(&ledger, &composer, &mut session, "", "the role")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingInput(_)));

        assert_eq!(composer.calls.load(Ordering::SeqCst), 0);
        let record = ledger.peek("ABCD1234").await.unwrap();
        assert_eq!(record.remaining_generations, MAX_GENERATIONS);
    }

    #[tokio::test]
    async fn test_generate_composer_failure_leaves_state_intact() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let composer = MockComposer::failing();
        let mut session = activated_session(&ledger, "ABCD1234").await;

        let err = generate(&ledger, &composer, &mut session, "resume", "the role")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Composer(_)));

        assert!(session.cover_letter.is_none());
        assert!(session.history.is_empty());
        let record = ledger.peek("ABCD1234").await.unwrap();
        assert_eq!(record.remaining_generations, MAX_GENERATIONS);
        assert!(!record.active_generation);
    }

    #[tokio::test]
    async fn test_generate_with_no_generations_left() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let composer = MockComposer::ok();
        let mut session = activated_session(&ledger, "ABCD1234").await;
        for _ in 0..MAX_GENERATIONS {
            ledger.debit_generation("ABCD1234").await.unwrap();
        }

        let err = generate(&ledger, &composer, &mut session, "resume", "the role")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CreditsExhausted(_)));
        assert_eq!(composer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_improvement_budget_exhausts_at_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let composer = MockComposer::ok();
        let mut session = activated_session(&ledger, "ABCD1234").await;

        generate(&ledger, &composer, &mut session, "resume", "the role")
            .await
            .unwrap();

        for i in 0..MAX_IMPROVEMENTS {
            let outcome = improve(&ledger, &composer, &mut session, "tighten it")
                .await
                .unwrap();
            assert_eq!(
                outcome.credits.remaining_improvements,
                MAX_IMPROVEMENTS - 1 - i
            );
        }

        let err = improve(&ledger, &composer, &mut session, "one more")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CreditsExhausted(_)));
        let record = ledger.peek("ABCD1234").await.unwrap();
        assert_eq!(record.remaining_improvements, 0);

        // A fresh generation restores the improvement allotment.
        generate(&ledger, &composer, &mut session, "resume", "the role")
            .await
            .unwrap();
        let record = ledger.peek("ABCD1234").await.unwrap();
        assert_eq!(record.remaining_improvements, MAX_IMPROVEMENTS);
    }

    #[tokio::test]
    async fn test_new_generation_resets_chat_log() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let composer = MockComposer::ok();
        let mut session = activated_session(&ledger, "ABCD1234").await;

        generate(&ledger, &composer, &mut session, "resume", "the role")
            .await
            .unwrap();
        improve(&ledger, &composer, &mut session, "tighten it")
            .await
            .unwrap();
        assert_eq!(session.messages.len(), 3);

        generate(&ledger, &composer, &mut session, "resume", "another role")
            .await
            .unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, Role::Assistant);
        assert_eq!(session.messages[0].content, QUICK_ACTIONS_MESSAGE);
        // The previous letter versions survive the reset.
        assert!(session.history.len() >= 2);
    }

    #[tokio::test]
    async fn test_improve_without_letter() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let composer = MockComposer::ok();
        let mut session = activated_session(&ledger, "ABCD1234").await;

        let err = improve(&ledger, &composer, &mut session, "shorter")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_improve_composer_failure_keeps_letter_and_credit() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let mut session = activated_session(&ledger, "ABCD1234").await;

        generate(&ledger, &MockComposer::ok(), &mut session, "resume", "the role")
            .await
            .unwrap();

        let err = improve(&ledger, &MockComposer::failing(), &mut session, "shorter")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Composer(_)));

        assert_eq!(session.cover_letter.as_deref(), Some("Dear Hiring Manager,"));
        let record = ledger.peek("ABCD1234").await.unwrap();
        assert_eq!(record.remaining_improvements, MAX_IMPROVEMENTS);
        // The user instruction stays in the chat log; no assistant reply.
        assert_eq!(session.messages.last().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_improve_fails_whole_operation_when_code_vanished() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let composer = MockComposer::ok();
        let mut session = activated_session(&ledger, "ABCD1234").await;

        generate(&ledger, &composer, &mut session, "resume", "the role")
            .await
            .unwrap();

        // External reset: the ledger file disappears under us.
        std::fs::remove_file(dir.path().join("user_data.json")).unwrap();

        let err = improve(&ledger, &composer, &mut session, "shorter")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CreditsExhausted(_)));
        assert_eq!(session.cover_letter.as_deref(), Some("Dear Hiring Manager,"));
    }

    #[tokio::test]
    async fn test_identical_revision_does_not_duplicate_history() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let composer = MockComposer::always("Same letter");
        let mut session = activated_session(&ledger, "ABCD1234").await;

        generate(&ledger, &composer, &mut session, "resume", "the role")
            .await
            .unwrap();
        improve(&ledger, &composer, &mut session, "no-op change")
            .await
            .unwrap();

        assert_eq!(session.history.len(), 1);
        // The improvement credit is still spent.
        let record = ledger.peek("ABCD1234").await.unwrap();
        assert_eq!(record.remaining_improvements, MAX_IMPROVEMENTS - 1);
    }
}
