use std::time::Duration;

use crate::{
    error::{Result, TubecheckError},
    provider::Provider,
};

pub const DEFAULT_VIDEO_ID: &str = "5NojPQTNx9s";
pub const DEFAULT_TRANSCRIPT_API_URL: &str = "http://127.0.0.1:8000";

pub const VIDEO_ID_ENV: &str = "VIDEO_ID";
pub const PROVIDER_ENV: &str = "TUBECHECK_PROVIDER";
pub const MODEL_ENV: &str = "TUBECHECK_MODEL";
pub const TRANSCRIPT_API_URL_ENV: &str = "TRANSCRIPT_API_URL";
pub const TIMEOUT_ENV: &str = "TUBECHECK_TIMEOUT_SECS";

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub video_id: Option<String>,
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub transcript_api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Startup configuration, resolved once before the pipeline is built.
#[derive(Debug, Clone)]
pub struct Settings {
    pub video_id: String,
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub transcript_api_url: String,
    pub timeout: Option<Duration>,
}

impl Settings {
    /// Resolve from an arbitrary variable lookup. Blank values count as unset.
    pub fn resolve<F>(lookup: F, overrides: Overrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let provider = match overrides.provider {
            Some(provider) => provider,
            None => var(PROVIDER_ENV)
                .map(|name| name.parse::<Provider>())
                .transpose()?
                .unwrap_or_default(),
        };

        // Credential first: nothing else matters without it.
        let api_key = provider.api_key(&lookup)?;

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => Some(secs),
            None => var(TIMEOUT_ENV)
                .map(|secs| {
                    secs.parse::<u64>().map_err(|_| TubecheckError::InvalidConfig {
                        reason: format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{secs}'"),
                    })
                })
                .transpose()?,
        };

        Ok(Self {
            video_id: overrides
                .video_id
                .or_else(|| var(VIDEO_ID_ENV))
                .unwrap_or_else(|| DEFAULT_VIDEO_ID.to_string()),
            model: overrides
                .model
                .or_else(|| var(MODEL_ENV))
                .unwrap_or_else(|| provider.config().model.to_string()),
            transcript_api_url: overrides
                .transcript_api_url
                .or_else(|| var(TRANSCRIPT_API_URL_ENV))
                .unwrap_or_else(|| DEFAULT_TRANSCRIPT_API_URL.to_string()),
            timeout: timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs),
            provider,
            api_key,
        })
    }

    /// Key prefix safe to show in diagnostics.
    pub fn masked_api_key(&self) -> String {
        let prefix: String = self.api_key.chars().take(8).collect();
        format!("{prefix}...")
    }
}
