use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
/// Passed explicitly to component constructors — no module-level client state.
#[derive(Debug, Clone)]
pub struct Config {
    // Apify
    pub apify_token: String,

    // Gemini
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_image_model: String,

    // LinkedIn scraping requires session cookies (JSON array); the LinkedIn
    // adapter is only constructed when these are present.
    pub linkedin_cookies: Option<String>,

    // Bounded fan-out width for concurrent source adapter calls.
    pub fetch_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            apify_token: required_env("APIFY_API_TOKEN"),
            gemini_api_key: required_env("GEMINI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL_NAME")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            gemini_image_model: env::var("GEMINI_IMAGE_MODEL_NAME")
                .unwrap_or_else(|_| "gemini-1.5-pro".to_string()),
            linkedin_cookies: env::var("LINKEDIN_COOKIES").ok(),
            fetch_concurrency: env::var("FETCH_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .expect("FETCH_CONCURRENCY must be a number"),
        }
    }

    /// Log which optional pieces are configured without leaking secrets.
    pub fn log_redacted(&self) {
        info!(
            gemini_model = self.gemini_model.as_str(),
            gemini_image_model = self.gemini_image_model.as_str(),
            linkedin_cookies = self.linkedin_cookies.is_some(),
            fetch_concurrency = self.fetch_concurrency,
            "Config loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test covers all the env-derived defaults: tests run in parallel
    // and the process environment is shared, so env setup is not split
    // across multiple test functions.
    #[test]
    fn fetch_concurrency_defaults_and_overrides() {
        env::set_var("APIFY_API_TOKEN", "test-token");
        env::set_var("GEMINI_API_KEY", "test-key");
        env::remove_var("GEMINI_MODEL_NAME");
        env::remove_var("GEMINI_IMAGE_MODEL_NAME");
        env::remove_var("LINKEDIN_COOKIES");

        env::remove_var("FETCH_CONCURRENCY");
        let config = Config::from_env();
        assert_eq!(config.fetch_concurrency, 4);
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.gemini_image_model, "gemini-1.5-pro");
        assert!(config.linkedin_cookies.is_none());

        env::set_var("FETCH_CONCURRENCY", "8");
        let config = Config::from_env();
        assert_eq!(config.fetch_concurrency, 8);
        env::remove_var("FETCH_CONCURRENCY");
    }
}
