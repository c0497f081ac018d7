use crate::util::{env_non_empty, is_local_endpoint_url};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_DATABASE: &str = "SNOWFLAKE_INTELLIGENCE";
const DEFAULT_SCHEMA: &str = "AGENTS";
const DEFAULT_AGENT: &str = "STAFFADMINTESTAGENT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: Option<String>,
    pub database: String,
    pub schema: String,
    pub agent: String,
    pub url_override: Option<String>,
    pub token: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Reads the environment, after loading `.env` from the working
    /// directory when one exists.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let request_timeout = env_non_empty("WARDLINE_REQUEST_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>()
                    .with_context(|| format!("invalid WARDLINE_REQUEST_TIMEOUT_SECS '{raw}'"))
            })
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            host: env_non_empty("CORTEX_AGENT_HOST"),
            database: env_non_empty("CORTEX_AGENT_DATABASE")
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            schema: env_non_empty("CORTEX_AGENT_SCHEMA")
                .unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
            agent: env_non_empty("CORTEX_AGENT_NAME").unwrap_or_else(|| DEFAULT_AGENT.to_string()),
            url_override: env_non_empty("CORTEX_AGENT_URL"),
            token: env_non_empty("SNOWFLAKE_PAT"),
            request_timeout,
        })
    }

    pub fn run_url(&self) -> String {
        if let Some(url) = &self.url_override {
            return url.clone();
        }
        format!(
            "https://{}/api/v2/databases/{}/schemas/{}/agents/{}:run",
            self.host.as_deref().unwrap_or_default(),
            self.database,
            self.schema,
            self.agent
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.url_override.is_none() && self.host.is_none() {
            bail!("CORTEX_AGENT_HOST must be set (or CORTEX_AGENT_URL for a custom endpoint)");
        }

        let run_url = self.run_url();
        if !run_url.starts_with("http://") && !run_url.starts_with("https://") {
            bail!("Invalid agent run URL '{run_url}': expected http:// or https:// URL");
        }

        if self.token.is_none() && !is_local_endpoint_url(&run_url) {
            bail!("SNOWFLAKE_PAT must be set for non-local endpoints (url: '{run_url}')");
        }

        Ok(())
    }

    pub fn is_local_endpoint(&self) -> bool {
        is_local_endpoint_url(&self.run_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScopedEnv, ENV_LOCK};

    const ENV_KEYS: [&str; 7] = [
        "CORTEX_AGENT_HOST",
        "CORTEX_AGENT_DATABASE",
        "CORTEX_AGENT_SCHEMA",
        "CORTEX_AGENT_NAME",
        "CORTEX_AGENT_URL",
        "SNOWFLAKE_PAT",
        "WARDLINE_REQUEST_TIMEOUT_SECS",
    ];

    #[test]
    fn test_load_applies_defaults_and_builds_run_url() {
        let _env_lock = ENV_LOCK.blocking_lock();
        let env = ScopedEnv::cleared(&ENV_KEYS);
        env.set("CORTEX_AGENT_HOST", "acme.snowflakecomputing.com");
        env.set("SNOWFLAKE_PAT", "pat-123");

        let config = Config::load().expect("config should load");
        assert_eq!(
            config.run_url(),
            "https://acme.snowflakecomputing.com/api/v2/databases/SNOWFLAKE_INTELLIGENCE/schemas/AGENTS/agents/STAFFADMINTESTAGENT:run"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_reads_segment_overrides() {
        let _env_lock = ENV_LOCK.blocking_lock();
        let env = ScopedEnv::cleared(&ENV_KEYS);
        env.set("CORTEX_AGENT_HOST", "acme.snowflakecomputing.com");
        env.set("CORTEX_AGENT_DATABASE", "OPS");
        env.set("CORTEX_AGENT_SCHEMA", "HOSPITAL");
        env.set("CORTEX_AGENT_NAME", "WARD_AGENT");

        let config = Config::load().expect("config should load");
        assert!(config
            .run_url()
            .ends_with("/databases/OPS/schemas/HOSPITAL/agents/WARD_AGENT:run"));
        assert!(config.validate().is_err(), "remote endpoint needs a token");
    }

    #[test]
    fn test_load_rejects_bad_timeout() {
        let _env_lock = ENV_LOCK.blocking_lock();
        let env = ScopedEnv::cleared(&ENV_KEYS);
        env.set("WARDLINE_REQUEST_TIMEOUT_SECS", "soon");
        assert!(Config::load().is_err());
        env.set("WARDLINE_REQUEST_TIMEOUT_SECS", "30");
        let config = Config::load().expect("config should load");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }
}
