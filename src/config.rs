//! Application configuration management.
//!
//! Configuration is read from environment variables with the `envy` crate,
//! after an optional `.env` file has been loaded.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `LEDGER_SERVER_URL` (required): root URL of the ledger service
/// - `LEDGER_API_KEY` (required): key sent to the ledger service
/// - `LEDGER_BUDGET_ID` (required): budget the server operates on
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `LEDGER_TIMEOUT_SECS` (optional): per-request timeout, defaults to 30
/// - `MCP_AUTH_TOKEN` (optional): bearer token required on `/mcp` when set
#[derive(Clone, Deserialize)]
pub struct Config {
    pub ledger_server_url: String,
    pub ledger_api_key: String,
    pub ledger_budget_id: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_timeout_secs")]
    pub ledger_timeout_secs: u64,

    #[serde(default)]
    pub mcp_auth_token: Option<String>,
}

// Secrets stay out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("ledger_server_url", &self.ledger_server_url)
            .field("ledger_budget_id", &self.ledger_budget_id)
            .field("server_port", &self.server_port)
            .field("ledger_timeout_secs", &self.ledger_timeout_secs)
            .field("mcp_auth_token", &self.mcp_auth_token.as_ref().map(|_| "<set>"))
            .finish_non_exhaustive()
    }
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot
    /// be parsed into its field type.
    pub fn from_env() -> Result<Self, envy::Error> {
        // .env is optional
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Build from an explicit variable list instead of the process environment.
    #[cfg(test)]
    pub fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }

    /// The auth token, treating an empty value as unset.
    pub fn auth_token(&self) -> Option<&str> {
        self.mcp_auth_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_to_optional_fields() {
        let config = Config::from_pairs(vars(&[
            ("LEDGER_SERVER_URL", "http://localhost:5007"),
            ("LEDGER_API_KEY", "secret"),
            ("LEDGER_BUDGET_ID", "budget-1"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.ledger_timeout_secs, 30);
        assert_eq!(config.auth_token(), None);
    }

    #[test]
    fn missing_required_variable_fails() {
        let result = Config::from_pairs(vars(&[("LEDGER_SERVER_URL", "http://localhost:5007")]));
        assert!(result.is_err());
    }

    #[test]
    fn blank_auth_token_is_unset() {
        let config = Config::from_pairs(vars(&[
            ("LEDGER_SERVER_URL", "http://localhost:5007"),
            ("LEDGER_API_KEY", "secret"),
            ("LEDGER_BUDGET_ID", "budget-1"),
            ("MCP_AUTH_TOKEN", "  "),
            ("SERVER_PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.auth_token(), None);
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config::from_pairs(vars(&[
            ("LEDGER_SERVER_URL", "http://localhost:5007"),
            ("LEDGER_API_KEY", "super-secret-key"),
            ("LEDGER_BUDGET_ID", "budget-1"),
            ("MCP_AUTH_TOKEN", "token-value"),
        ]))
        .unwrap();

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-key"));
        assert!(!rendered.contains("token-value"));
    }
}
