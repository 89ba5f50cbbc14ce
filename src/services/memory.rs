use crate::services::{CreditLedger, LedgerError, SpendOutcome};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Process-local ledger for development and tests.
#[derive(Default)]
pub struct InMemoryLedger {
    profiles: Mutex<HashMap<String, Option<i64>>>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, user_id: &str, credits: Option<i64>) -> Self {
        self.insert_profile(user_id, credits);
        self
    }

    pub fn insert_profile(&self, user_id: &str, credits: Option<i64>) {
        self.lock().insert(user_id.to_string(), credits);
    }

    /// `None` when the profile does not exist, `Some(None)` for a null balance.
    pub fn credits(&self, user_id: &str) -> Option<Option<i64>> {
        self.lock().get(user_id).copied()
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Option<i64>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.profiles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CreditLedger for InMemoryLedger {
    async fn add_credits(&self, user_id: &str, amount: i64) -> Result<i64, LedgerError> {
        let mut profiles = self.lock();
        self.reads.fetch_add(1, Ordering::SeqCst);

        let credits = profiles
            .get_mut(user_id)
            .ok_or_else(|| LedgerError::ProfileNotFound(user_id.to_string()))?;

        let new_total = credits
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Write("credit balance overflow".to_string()))?;
        *credits = Some(new_total);
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(new_total)
    }

    async fn spend_credits(&self, user_id: &str, amount: i64) -> Result<SpendOutcome, LedgerError> {
        let mut profiles = self.lock();
        self.reads.fetch_add(1, Ordering::SeqCst);

        let credits = profiles
            .get_mut(user_id)
            .ok_or_else(|| LedgerError::ProfileNotFound(user_id.to_string()))?;

        let current = credits.unwrap_or(0);
        if current < amount {
            return Ok(SpendOutcome::Insufficient { current });
        }

        *credits = Some(current - amount);
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(SpendOutcome::Spent {
            remaining: current - amount,
        })
    }

    async fn ping(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
