//! Credit Ledger — per-access-code generation/improvement bookkeeping.
//!
//! Backed by `user_data.json`. Every mutation is a full
//! load → modify → save cycle serialized behind one async mutex, so
//! concurrent sessions in this process cannot lose each other's updates.
//! A second process writing the same file can still race; the file format
//! stays a plain whole-file rewrite on purpose.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::credits::store::JsonStore;
use crate::credits::{MAX_GENERATIONS, MAX_IMPROVEMENTS};

/// Credit state for one access code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreditRecord {
    pub remaining_generations: u32,
    /// Only meaningful while `active_generation` is true; reset to
    /// `MAX_IMPROVEMENTS` on every new generation.
    pub remaining_improvements: u32,
    pub active_generation: bool,
}

impl UserCreditRecord {
    /// Seed state for a code seen for the first time.
    fn fresh() -> Self {
        Self {
            remaining_generations: MAX_GENERATIONS,
            remaining_improvements: 0,
            active_generation: false,
        }
    }

    pub fn has_credit(&self) -> bool {
        self.remaining_generations > 0 || self.remaining_improvements > 0
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The code vanished from the store between activation and debit
    /// (external reset). The caller must fail the whole operation rather
    /// than apply an undebited change.
    #[error("Access code {0} is not present in the ledger")]
    UnknownCode(String),

    /// The record ran out of the requested credit before this debit took
    /// its turn in the critical section. Debits re-check inside the lock,
    /// so two sessions racing for the last credit cannot both spend it.
    #[error("No {kind} credit remaining for access code {code}")]
    InsufficientCredit { code: String, kind: &'static str },

    #[error("Ledger store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Normalizes an access code: trimmed, uppercase.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub struct CreditLedger {
    store: JsonStore<HashMap<String, UserCreditRecord>>,
    // Serializes all read-modify-write cycles against the store file.
    write_lock: Mutex<()>,
}

impl CreditLedger {
    pub fn new(store: JsonStore<HashMap<String, UserCreditRecord>>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the full code → record mapping. Missing or corrupt store
    /// degrades to an empty mapping.
    pub fn load(&self) -> HashMap<String, UserCreditRecord> {
        self.store.load()
    }

    /// Returns the current record for `code` without mutating anything.
    pub async fn peek(&self, code: &str) -> Option<UserCreditRecord> {
        let code = normalize_code(code);
        let _guard = self.write_lock.lock().await;
        self.store.load().get(&code).cloned()
    }

    /// Activates an access code.
    ///
    /// An unseen code lazily creates a fresh record seeded with
    /// `MAX_GENERATIONS` generations and persists it. A seen code is
    /// returned only while it still has generation or improvement credit;
    /// `None` signals exhaustion.
    pub async fn consume_access(
        &self,
        code: &str,
    ) -> Result<Option<UserCreditRecord>, LedgerError> {
        let code = normalize_code(code);
        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load();

        match users.get(&code) {
            None => {
                let record = UserCreditRecord::fresh();
                users.insert(code.clone(), record.clone());
                self.store.save(&users)?;
                info!("Created credit record for new access code {code}");
                Ok(Some(record))
            }
            Some(record) if record.has_credit() => Ok(Some(record.clone())),
            Some(_) => Ok(None),
        }
    }

    /// Records a successful generation: one generation consumed, the
    /// improvement ceiling restored, the generation marked active.
    ///
    /// The credit check lives inside the same critical section as the
    /// decrement; a record already at zero refuses the debit instead of
    /// flooring, so generations can never be over-spent.
    pub async fn debit_generation(&self, code: &str) -> Result<UserCreditRecord, LedgerError> {
        let code = normalize_code(code);
        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load();

        let record = users
            .get_mut(&code)
            .ok_or_else(|| LedgerError::UnknownCode(code.clone()))?;
        if record.remaining_generations == 0 {
            return Err(LedgerError::InsufficientCredit {
                code,
                kind: "generation",
            });
        }
        record.remaining_generations -= 1;
        record.remaining_improvements = MAX_IMPROVEMENTS;
        record.active_generation = true;
        let record = record.clone();

        self.store.save(&users)?;
        info!(
            "Debited generation for {code}: {} generations left",
            record.remaining_generations
        );
        Ok(record)
    }

    /// Records a successful improvement: one improvement consumed. Like
    /// `debit_generation`, a record at zero refuses the debit inside the
    /// lock rather than flooring, so `remaining_improvements` can never go
    /// negative and never gets over-spent by racing sessions.
    pub async fn debit_improvement(&self, code: &str) -> Result<UserCreditRecord, LedgerError> {
        let code = normalize_code(code);
        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load();

        let record = users
            .get_mut(&code)
            .ok_or_else(|| LedgerError::UnknownCode(code.clone()))?;
        if record.remaining_improvements == 0 {
            return Err(LedgerError::InsufficientCredit {
                code,
                kind: "improvement",
            });
        }
        record.remaining_improvements -= 1;
        let record = record.clone();

        self.store.save(&users)?;
        info!(
            "Debited improvement for {code}: {} improvements left",
            record.remaining_improvements
        );
        Ok(record)
    }
}
