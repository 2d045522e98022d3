use std::sync::Arc;

use crate::config::Config;
use crate::credits::ledger::CreditLedger;
use crate::credits::registry::AccessCodeRegistry;
use crate::llm_client::Composer;
use crate::workflow::session::SessionMap;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<CreditLedger>,
    pub registry: Arc<AccessCodeRegistry>,
    /// Pluggable cover letter composer. Production: the Anthropic-backed
    /// `LlmClient`; tests substitute a mock.
    pub composer: Arc<dyn Composer>,
    /// Live sessions. Letter, history and chat log are session-scoped and
    /// die with the process; only the two JSON stores persist.
    pub sessions: SessionMap,
    pub config: Config,
}
