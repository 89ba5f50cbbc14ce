use crate::services::{CreditLedger, LedgerError, SpendOutcome};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ProfileRow {
    credits: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CreditsUpdate {
    credits: i64,
}

/// Credit balances kept in a Supabase `profiles` table, reached through
/// PostgREST with the service role key.
///
/// PostgREST has no "add N" operator for plain tables, so increments are
/// compare-and-swap: the PATCH is filtered on the balance we read, and an
/// empty result means another writer got there first.
pub struct SupabaseLedger {
    client: Client,
    rest_url: String,
    service_role_key: String,
    table: String,
    max_attempts: u32,
}

impl SupabaseLedger {
    pub fn new(url: &str, service_role_key: &str, table: &str, max_attempts: u32) -> Self {
        Self {
            client: Client::new(),
            rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            service_role_key: service_role_key.to_string(),
            table: table.to_string(),
            max_attempts: max_attempts.max(1),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.rest_url, self.table)
    }

    async fn fetch_credits(&self, user_id: &str) -> Result<Option<i64>, LedgerError> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("id", format!("eq.{}", user_id)), ("select", "credits".to_string())])
            .send()
            .await
            .map_err(|e| LedgerError::Read(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Read(format!("{}: {}", status, body)));
        }

        let rows: Vec<ProfileRow> = response
            .json()
            .await
            .map_err(|e| LedgerError::Read(e.to_string()))?;

        rows.into_iter()
            .next()
            .map(|row| row.credits)
            .ok_or_else(|| LedgerError::ProfileNotFound(user_id.to_string()))
    }

    /// Writes `new_total` only if the stored balance still equals `expected`.
    /// Returns `false` when the guard did not match.
    async fn compare_and_set(
        &self,
        user_id: &str,
        expected: Option<i64>,
        new_total: i64,
    ) -> Result<bool, LedgerError> {
        let guard = match expected {
            Some(credits) => format!("eq.{}", credits),
            None => "is.null".to_string(),
        };

        let response = self
            .authorized(self.client.patch(self.table_url()))
            .query(&[("id", format!("eq.{}", user_id)), ("credits", guard)])
            .header("Prefer", "return=representation")
            .json(&CreditsUpdate { credits: new_total })
            .send()
            .await
            .map_err(|e| LedgerError::Write(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Write(format!("{}: {}", status, body)));
        }

        let rows: Vec<ProfileRow> = response
            .json()
            .await
            .map_err(|e| LedgerError::Write(e.to_string()))?;

        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl CreditLedger for SupabaseLedger {
    async fn add_credits(&self, user_id: &str, amount: i64) -> Result<i64, LedgerError> {
        for attempt in 1..=self.max_attempts {
            let current = self.fetch_credits(user_id).await?;
            let new_total = current
                .unwrap_or(0)
                .checked_add(amount)
                .ok_or_else(|| LedgerError::Write("credit balance overflow".to_string()))?;

            if self.compare_and_set(user_id, current, new_total).await? {
                return Ok(new_total);
            }

            tracing::warn!(
                user_id,
                attempt,
                "Credit balance changed during update, retrying"
            );
        }

        Err(LedgerError::Conflict {
            attempts: self.max_attempts,
        })
    }

    async fn spend_credits(&self, user_id: &str, amount: i64) -> Result<SpendOutcome, LedgerError> {
        for attempt in 1..=self.max_attempts {
            let current = self.fetch_credits(user_id).await?;
            let balance = current.unwrap_or(0);

            if balance < amount {
                return Ok(SpendOutcome::Insufficient { current: balance });
            }

            if self.compare_and_set(user_id, current, balance - amount).await? {
                return Ok(SpendOutcome::Spent {
                    remaining: balance - amount,
                });
            }

            tracing::warn!(
                user_id,
                attempt,
                "Credit balance changed during spend, retrying"
            );
        }

        Err(LedgerError::Conflict {
            attempts: self.max_attempts,
        })
    }

    async fn ping(&self) -> bool {
        match self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Supabase ping failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}
