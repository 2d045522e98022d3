// Generation/Improvement workflow: per-session state, letter history, and
// the credit-gated orchestration between the ledger and the Composer.

pub mod engine;
pub mod handlers;
pub mod history;
pub mod session;
