//! Configuration management for Engraver.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::batch::DEFAULT_BATCH_SIZE;
use crate::core::provider::{
    DEFAULT_API_BASE, DEFAULT_MODEL, GenerationParams, ImageGenerator, MAX_SEED,
    ReplicateProvider,
};

/// Default blocklist sent as the negative prompt.
pub const DEFAULT_NEGATIVE_PROMPT: &str = "nsfw, violence, gore, blood, weapons, inappropriate content, nudity, adult content, offensive symbols, photographic, complex backgrounds, text, letters, numbers, thin lines, detailed lines";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relay server configuration.
    pub api: ApiConfig,

    /// Image provider configuration.
    pub provider: ProviderConfig,

    /// Generation parameters.
    pub generation: GenerationConfig,

    /// TUI / headless client configuration.
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// Loads global config first, then merges project-local config if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;

        if let Ok(project_path) = Self::project_config_path() {
            if project_path.exists() {
                let project_config = Self::load_from(&project_path)?;
                config.merge(project_config);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every batch fail before it starts.
    ///
    /// # Errors
    ///
    /// Returns an error if `generation.batch_size` is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.generation.batch_size == 0 {
            anyhow::bail!("generation.batch_size must be at least 1");
        }
        Ok(())
    }

    /// Load a single config file, falling back to defaults if it is absent.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Get the project-local configuration file path.
    ///
    /// Looks for `.engraver/config.toml` in the current directory.
    pub fn project_config_path() -> anyhow::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(cwd.join(".engraver").join("config.toml"))
    }

    /// Merge another config into this one (project overrides global).
    fn merge(&mut self, other: Self) {
        let api_default = ApiConfig::default();
        if other.api.host != api_default.host {
            self.api.host = other.api.host;
        }
        if other.api.port != api_default.port {
            self.api.port = other.api.port;
        }

        let provider_default = ProviderConfig::default();
        if other.provider.model != provider_default.model {
            self.provider.model = other.provider.model;
        }
        if other.provider.api_base != provider_default.api_base {
            self.provider.api_base = other.provider.api_base;
        }
        if other.provider.token_env != provider_default.token_env {
            self.provider.token_env = other.provider.token_env;
        }
        if other.provider.poll_interval_ms != provider_default.poll_interval_ms {
            self.provider.poll_interval_ms = other.provider.poll_interval_ms;
        }
        if other.provider.poll_timeout_secs != provider_default.poll_timeout_secs {
            self.provider.poll_timeout_secs = other.provider.poll_timeout_secs;
        }

        let generation_default = GenerationConfig::default();
        if other.generation.aspect_ratio != generation_default.aspect_ratio {
            self.generation.aspect_ratio = other.generation.aspect_ratio;
        }
        if other.generation.negative_prompt != generation_default.negative_prompt {
            self.generation.negative_prompt = other.generation.negative_prompt;
        }
        if other.generation.safety_filter_level != generation_default.safety_filter_level {
            self.generation.safety_filter_level = other.generation.safety_filter_level;
        }
        if other.generation.batch_size != generation_default.batch_size {
            self.generation.batch_size = other.generation.batch_size;
        }

        if other.client.relay_url.is_some() {
            self.client.relay_url = other.client.relay_url;
        }
        if other.client.download_dir.is_some() {
            self.client.download_dir = other.client.download_dir;
        }
    }

    /// Get the configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the config directory path (`~/.config/engraver/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config_home).join("engraver"));
        }

        if cfg!(target_os = "macos") {
            if let Ok(home) = std::env::var("HOME") {
                return Ok(PathBuf::from(home).join(".config").join("engraver"));
            }
        }

        let base = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;

        Ok(base.config_dir().join("engraver"))
    }

    /// Get the data directory path (`~/.local/share/engraver/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined.
    pub fn data_dir() -> anyhow::Result<PathBuf> {
        let base = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("could not determine data directory"))?;

        Ok(base.data_dir().join("engraver"))
    }

    /// Log file used while the TUI owns the terminal.
    pub fn log_path() -> anyhow::Result<PathBuf> {
        Ok(Self::data_dir()?.join("engraver.log"))
    }
}

/// Relay server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to bind to.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 10000,
        }
    }
}

/// Image provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Model identifier (`owner/name`).
    pub model: String,

    /// API base URL.
    pub api_base: String,

    /// Environment variable holding the API token.
    pub token_env: String,

    /// Delay between polls for long-running predictions.
    pub poll_interval_ms: u64,

    /// Give up polling after this long.
    pub poll_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            token_env: "REPLICATE_API_TOKEN".to_string(),
            poll_interval_ms: 1000,
            poll_timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// Read the API token from the environment.
    #[must_use]
    pub fn api_token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }

    /// Create the configured provider.
    ///
    /// A missing token is not an error here; the provider reports it per request.
    #[must_use]
    pub fn create_provider(&self) -> Arc<dyn ImageGenerator> {
        let token = self.api_token();
        if token.is_none() {
            tracing::warn!(
                env = %self.token_env,
                "provider token not set, generation requests will fail"
            );
        }

        Arc::new(
            ReplicateProvider::with_config(token, Some(self.api_base.clone()), &self.model)
                .with_token_env(&self.token_env)
                .with_polling(
                    Duration::from_millis(self.poll_interval_ms),
                    Duration::from_secs(self.poll_timeout_secs),
                ),
        )
    }
}

/// Parameters sent with every generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Output aspect ratio.
    pub aspect_ratio: String,

    /// Content blocklist.
    pub negative_prompt: String,

    /// Provider safety filter level.
    pub safety_filter_level: String,

    /// Designs requested per batch.
    pub batch_size: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: "1:1".to_string(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            safety_filter_level: "block_medium_and_above".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl GenerationConfig {
    /// Parameters for one call, with a freshly drawn seed.
    #[must_use]
    pub fn params(&self) -> GenerationParams {
        let mut rng = rand::rng();
        GenerationParams {
            aspect_ratio: self.aspect_ratio.clone(),
            negative_prompt: self.negative_prompt.clone(),
            safety_filter_level: self.safety_filter_level.clone(),
            seed: rng.random_range(0..MAX_SEED),
        }
    }
}

/// Client-side configuration for the TUI and headless commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay server to call. When unset the provider is called in-process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_url: Option<String>,

    /// Where downloaded designs are written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Resolve the download directory: configured, then the user's
    /// downloads folder, then the current directory.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download_dir {
            return dir.clone();
        }

        directories::UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.api.port, 10000);
        assert_eq!(config.provider.model, "google/imagen-3");
        assert_eq!(config.provider.token_env, "REPLICATE_API_TOKEN");
        assert_eq!(config.generation.aspect_ratio, "1:1");
        assert_eq!(config.generation.safety_filter_level, "block_medium_and_above");
        assert_eq!(config.generation.batch_size, 3);
        assert!(config.client.relay_url.is_none());
    }

    #[test]
    fn params_draw_seed_in_range() {
        let generation = GenerationConfig::default();
        for _ in 0..100 {
            let params = generation.params();
            assert!(params.seed < MAX_SEED);
            assert_eq!(params.aspect_ratio, "1:1");
        }
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            port = 8080

            [client]
            relay_url = "http://relay.local:10000"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.client.relay_url.as_deref(), Some("http://relay.local:10000"));
        assert_eq!(config.generation, GenerationConfig::default());
    }

    #[test]
    fn project_config_overrides_global() {
        let mut global = Config::default();
        global.api.port = 9000;
        global.client.download_dir = Some(PathBuf::from("/global"));

        let mut project = Config::default();
        project.generation.batch_size = 5;
        project.provider.poll_interval_ms = 250;
        project.provider.poll_timeout_secs = 30;
        project.client.download_dir = Some(PathBuf::from("/project"));

        global.merge(project);

        assert_eq!(global.api.port, 9000);
        assert_eq!(global.generation.batch_size, 5);
        assert_eq!(global.provider.poll_interval_ms, 250);
        assert_eq!(global.provider.poll_timeout_secs, 30);
        assert_eq!(global.client.download_dir, Some(PathBuf::from("/project")));
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.api.port, 10000);
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[provider]\nmodel = \"black-forest-labs/flux-schnell\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider.model, "black-forest-labs/flux-schnell");
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[generation]\nbatch_size = 0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch_size"));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn load_from_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nport = ").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn api_token_reads_named_env_var() {
        // HOME is always set in test environments
        let provider = ProviderConfig {
            token_env: "HOME".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(provider.api_token(), std::env::var("HOME").ok());

        let provider = ProviderConfig {
            token_env: "ENGRAVER_TEST_UNSET_TOKEN_VAR".to_string(),
            ..ProviderConfig::default()
        };
        assert!(provider.api_token().is_none());
    }

    #[test]
    fn configured_download_dir_wins() {
        let client = ClientConfig {
            relay_url: None,
            download_dir: Some(PathBuf::from("/tmp/designs")),
        };
        assert_eq!(client.download_dir(), PathBuf::from("/tmp/designs"));
    }
}
