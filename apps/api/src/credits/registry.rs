//! Access Code Registry — the pool of issuable prepaid codes.
//!
//! Backed by `access_codes.json` (code → credit allotment). Provisioning
//! only: activation and debits live in the ledger.

use std::collections::HashMap;

use anyhow::Result;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::info;

use crate::credits::store::JsonStore;
use crate::credits::{BOOTSTRAP_CODE, CODE_LENGTH, CREDITS_PER_CODE};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a random alphanumeric access code of `length` characters.
/// `rand::rng()` is a CSPRNG, so codes are not guessable.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

pub struct AccessCodeRegistry {
    store: JsonStore<HashMap<String, u32>>,
    write_lock: Mutex<()>,
}

impl AccessCodeRegistry {
    pub fn new(store: JsonStore<HashMap<String, u32>>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Seeds an absent registry store with the well-known admin code.
    /// An existing (even corrupt) file is left alone.
    pub fn bootstrap(&self) -> Result<()> {
        if self.store.exists() {
            return Ok(());
        }
        let mut codes = HashMap::new();
        codes.insert(BOOTSTRAP_CODE.to_string(), CREDITS_PER_CODE);
        self.store.save(&codes)?;
        info!("Created initial access code {BOOTSTRAP_CODE} with {CREDITS_PER_CODE} generations");
        Ok(())
    }

    pub fn load(&self) -> HashMap<String, u32> {
        self.store.load()
    }

    /// Issues `count` new codes carrying `credits` each, unique against
    /// both the persisted registry and the batch under construction.
    /// Collisions retry until a free code is found; at 36^8 codes the
    /// retry loop terminates in practice immediately.
    pub async fn issue_batch(&self, count: usize, credits: u32) -> Result<HashMap<String, u32>> {
        let _guard = self.write_lock.lock().await;
        let mut codes = self.store.load();

        let mut new_codes = HashMap::with_capacity(count);
        for _ in 0..count {
            loop {
                let code = generate_code(CODE_LENGTH);
                if !codes.contains_key(&code) && !new_codes.contains_key(&code) {
                    new_codes.insert(code, credits);
                    break;
                }
            }
        }

        for (code, credits) in &new_codes {
            codes.insert(code.clone(), *credits);
        }
        self.store.save(&codes)?;
        info!("Issued {} new access codes", new_codes.len());

        Ok(new_codes)
    }
}
