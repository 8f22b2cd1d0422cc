use anyhow::{bail, Context, Result};
use bill_pipeline::{DelegateCredentials, PipelineConfig, SecretString, DEFAULT_MODEL};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Analyzer configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: SecretString,
    pub anthropic_base_url: Option<String>,
    pub model: String,
    pub call_timeout: Duration,
    pub web_search: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = var("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY must be set")?;
        let anthropic_api_key = SecretString::new(api_key);
        if anthropic_api_key.is_blank() {
            bail!("ANTHROPIC_API_KEY must not be empty");
        }

        let call_timeout = match var("ANALYZER_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .context("ANALYZER_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => PipelineConfig::default().call_timeout,
        };

        let web_search = match var("ANALYZER_WEB_SEARCH") {
            Some(flag) => flag
                .trim()
                .to_ascii_lowercase()
                .parse()
                .context("ANALYZER_WEB_SEARCH must be true or false")?,
            None => true,
        };

        Ok(Self {
            anthropic_api_key,
            anthropic_base_url: var("ANTHROPIC_BASE_URL"),
            model: var("ANALYZER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            call_timeout,
            web_search,
        })
    }

    pub fn credentials(&self) -> DelegateCredentials {
        let mut credentials = DelegateCredentials {
            api_key: self.anthropic_api_key.clone(),
            base_url: None,
        };
        if let Some(url) = &self.anthropic_base_url {
            credentials = credentials.with_base_url(url);
        }
        credentials
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_model(&self.model)
            .with_call_timeout(self.call_timeout)
            .with_web_search(self.web_search)
    }
}
