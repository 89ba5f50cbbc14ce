pub mod ledger;
pub mod memory;
pub mod redis_ledger;
pub mod signature;
pub mod supabase;

pub use ledger::{CreditLedger, LedgerError, SpendOutcome};
pub use memory::InMemoryLedger;
pub use redis_ledger::RedisLedger;
pub use signature::SignatureVerifier;
pub use supabase::SupabaseLedger;

use crate::config::{Config, StoreConfig};
use anyhow::Result;
use std::sync::Arc;

/// Connects the credit store selected by `CREDIT_STORE`.
pub async fn build_ledger(config: &Config) -> Result<Arc<dyn CreditLedger>> {
    let ledger: Arc<dyn CreditLedger> = match &config.store {
        StoreConfig::Supabase {
            url,
            service_role_key,
            table,
        } => Arc::new(SupabaseLedger::new(
            url,
            service_role_key,
            table,
            config.store_max_attempts,
        )),
        StoreConfig::Redis { url } => Arc::new(RedisLedger::connect(url).await?),
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory credit store, balances are lost on restart");
            Arc::new(InMemoryLedger::new())
        }
    };

    tracing::info!("Credit store: {}", ledger.name());
    Ok(ledger)
}
