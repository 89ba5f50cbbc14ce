use anyhow::{bail, Context, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Which backend holds the per-user credit balances.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Supabase {
        url: String,
        service_role_key: String,
        table: String,
    },
    Redis {
        url: String,
    },
    Memory,
}

impl StoreConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreConfig::Supabase { .. } => "supabase",
            StoreConfig::Redis { .. } => "redis",
            StoreConfig::Memory => "memory",
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConfig::Supabase { url, table, .. } => f
                .debug_struct("Supabase")
                .field("url", url)
                .field("table", table)
                .field("service_role_key", &"<redacted>")
                .finish(),
            StoreConfig::Redis { url } => f.debug_struct("Redis").field("url", url).finish(),
            StoreConfig::Memory => f.write_str("Memory"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Payment provider
    pub razorpay_key_secret: String,
    pub credits_per_payment: i64,

    // Credit store
    pub store: StoreConfig,
    pub store_max_attempts: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("razorpay_key_secret", &"<redacted>")
            .field("credits_per_payment", &self.credits_per_payment)
            .field("store", &self.store)
            .field("store_max_attempts", &self.store_max_attempts)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = Self::parse_environment(var("ENVIRONMENT"))?;

        let store = match var("CREDIT_STORE")
            .unwrap_or_else(|| "supabase".to_string())
            .to_lowercase()
            .as_str()
        {
            "supabase" => StoreConfig::Supabase {
                url: var("SUPABASE_URL").context("SUPABASE_URL required")?,
                service_role_key: var("SUPABASE_SERVICE_ROLE_KEY")
                    .context("SUPABASE_SERVICE_ROLE_KEY required")?,
                table: var("SUPABASE_PROFILES_TABLE").unwrap_or_else(|| "profiles".to_string()),
            },
            "redis" => StoreConfig::Redis {
                url: var("REDIS_URL").unwrap_or_else(|| "redis://localhost:6379".to_string()),
            },
            "memory" => StoreConfig::Memory,
            other => bail!("Unknown CREDIT_STORE: {}", other),
        };

        let config = Self {
            environment,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(var("PORT"), 8080, "PORT")?,

            razorpay_key_secret: var("RAZORPAY_KEY_SECRET")
                .context("RAZORPAY_KEY_SECRET required")?,
            credits_per_payment: parse_or(var("CREDITS_PER_PAYMENT"), 50, "CREDITS_PER_PAYMENT")?,

            store,
            store_max_attempts: parse_or(var("STORE_MAX_ATTEMPTS"), 5, "STORE_MAX_ATTEMPTS")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment(value: Option<String>) -> Result<Environment> {
        let env = value.unwrap_or_else(|| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.credits_per_payment <= 0 {
            bail!("CREDITS_PER_PAYMENT must be positive");
        }
        if self.store_max_attempts == 0 {
            bail!("STORE_MAX_ATTEMPTS must be at least 1");
        }

        match &self.store {
            StoreConfig::Supabase { url, .. } if !url.starts_with("http") => {
                bail!("SUPABASE_URL must be HTTP(S) URL");
            }
            StoreConfig::Memory if self.environment == Environment::Production => {
                bail!("CREDIT_STORE=memory is not allowed in production");
            }
            _ => {}
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

fn parse_or<T>(value: Option<String>, default: T, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", name)),
        None => Ok(default),
    }
}
