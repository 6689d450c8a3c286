use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // AI providers
    pub anthropic_api_key: String,

    // Matching engine
    pub match_primary_model: String,
    pub match_fallback_model: String,
    pub match_shortlist_cap: usize,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
            match_primary_model: env::var("MATCH_PRIMARY_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string()),
            match_fallback_model: env::var("MATCH_FALLBACK_MODEL")
                .unwrap_or_else(|_| "claude-haiku-4-5-20251001".to_string()),
            match_shortlist_cap: env::var("MATCH_SHORTLIST_CAP")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("MATCH_SHORTLIST_CAP must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
