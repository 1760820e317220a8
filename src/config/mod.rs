mod api;
mod chat;
pub mod defaults;
mod push;
mod validation;

use crate::cli::Args;
use crate::push::PushSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub use api::ApiConfig;
pub use chat::ChatConfig;
pub use push::PushConfig;
pub use validation::{expand_env_var_in_string, normalize_base_url};

use defaults::{
    default_autosave_idle_secs, default_ready_timeout_secs, default_request_timeout,
    default_stream_timeout, default_vapid_retry_delay_ms, DEFAULT_API_URL,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AutosaveConfig {
    #[serde(default)]
    pub idle_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub stream_timeout: u64,
    pub request_timeout: u64,
    pub system_prompt: Option<String>,
    pub enable_tools: bool,
    pub push: PushSettings,
    pub push_relay_url: Option<String>,
    pub autosave_idle_secs: u64,
    pub verbose: bool,
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self, String> {
        let json_config = JsonConfig::load().unwrap_or_default();
        Self::resolve(args, json_config)
    }

    /// Merge CLI args, environment and a loaded config file.
    /// Precedence: CLI args > env vars > config file > defaults.
    pub fn resolve(args: &Args, json_config: JsonConfig) -> Result<Self, String> {
        let api_url = args
            .api_url
            .clone()
            .or_else(|| env::var("JOURNAL_API_URL").ok())
            .or(json_config.api.base_url.clone())
            .map(|url| expand_env_var_in_string(&url))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = normalize_base_url(&api_url)?;

        let stream_timeout = env::var("JOURNAL_STREAM_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or(json_config.api.stream_timeout)
            .unwrap_or_else(default_stream_timeout);

        let request_timeout = env::var("JOURNAL_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or(json_config.api.request_timeout)
            .unwrap_or_else(default_request_timeout);

        let system_prompt = env::var("JOURNAL_SYSTEM_PROMPT")
            .ok()
            .or(json_config.chat.system_prompt.clone())
            .map(|p| expand_env_var_in_string(&p));

        // --no-tools wins over everything else
        let enable_tools = if args.no_tools {
            false
        } else {
            match env::var("JOURNAL_TOOLS_ENABLED").ok() {
                Some(v) => parse_bool(&v),
                None => json_config.chat.enable_tools,
            }
        };

        let verbose = args.verbose
            || env::var("JOURNAL_VERBOSE")
                .ok()
                .map(|v| parse_bool(&v))
                .or(json_config.session.verbose)
                .unwrap_or(false);

        let push = PushSettings {
            ready_timeout: Duration::from_secs(
                json_config
                    .push
                    .ready_timeout_secs
                    .unwrap_or_else(default_ready_timeout_secs),
            ),
            vapid_retry_delay: Duration::from_millis(
                json_config
                    .push
                    .vapid_retry_delay_ms
                    .unwrap_or_else(default_vapid_retry_delay_ms),
            ),
        };

        let push_relay_url = env::var("JOURNAL_PUSH_RELAY_URL")
            .ok()
            .or(json_config.push.relay_url.clone())
            .map(|url| expand_env_var_in_string(&url))
            .map(|url| normalize_base_url(&url))
            .transpose()?;

        let autosave_idle_secs = json_config
            .autosave
            .idle_secs
            .unwrap_or_else(default_autosave_idle_secs);

        let cache_dir = Self::default_cache_dir()?;

        Ok(Config {
            api_url,
            stream_timeout,
            request_timeout,
            system_prompt,
            enable_tools,
            push,
            push_relay_url,
            autosave_idle_secs,
            verbose,
            cache_dir,
        })
    }

    /// `JOURNAL_CACHE_DIR`, else `~/.cache/journal`.
    pub fn default_cache_dir() -> Result<PathBuf, String> {
        if let Ok(dir) = env::var("JOURNAL_CACHE_DIR") {
            return Ok(PathBuf::from(dir));
        }
        dirs::home_dir()
            .map(|home| home.join(".cache").join("journal"))
            .ok_or_else(|| "Could not determine home directory".to_string())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl JsonConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            serde_yaml::from_str(&contents).with_context(|| {
                format!("Failed to parse YAML config file: {}", path.display())
            })?
        } else {
            serde_json::from_str(&contents).with_context(|| {
                format!("Failed to parse JSON config file: {}", path.display())
            })?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".journal.yaml"),
            PathBuf::from(".journal.yml"),
            PathBuf::from(".journal.json"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("journal");
            paths.push(config_dir.join("journal.yaml"));
            paths.push(config_dir.join("journal.yml"));
            paths.push(config_dir.join("journal.json"));
        }

        paths
    }
}
