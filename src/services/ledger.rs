use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no profile for user {0}")]
    ProfileNotFound(String),

    #[error("{0}")]
    Read(String),

    #[error("{0}")]
    Write(String),

    #[error("credits changed concurrently, gave up after {attempts} attempts")]
    Conflict { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendOutcome {
    Spent { remaining: i64 },
    Insufficient { current: i64 },
}

/// Per-user credit balances.
///
/// Both mutations are atomic with respect to each other: concurrent calls
/// for the same user never lose an update. A `null` balance counts as zero.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Adds `amount` to the user's balance and returns the new total.
    async fn add_credits(&self, user_id: &str, amount: i64) -> Result<i64, LedgerError>;

    /// Removes `amount` if the balance covers it; otherwise leaves it alone.
    async fn spend_credits(&self, user_id: &str, amount: i64) -> Result<SpendOutcome, LedgerError>;

    async fn ping(&self) -> bool;

    fn name(&self) -> &'static str;
}
