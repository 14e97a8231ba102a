use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trip_engine::{ClientSettings, EngineConfig};
use trip_logging::trip_info;

use crate::cli::Args;

pub const CONFIG_FILENAME: &str = "trip_planner.ron";
pub const API_URL_ENV: &str = "TRIP_PLANNER_API_URL";
const DEFAULT_OUTPUT_DIR: &str = "plans";

/// Contents of `trip_planner.ron`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid API url {0:?}: expected an http or https origin")]
    InvalidApiUrl(String),
}

/// Effective settings after layering file, environment and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub client: ClientSettings,
    pub output_dir: PathBuf,
}

impl AppConfig {
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default_with_output(self.output_dir.clone());
        config.client = self.client.clone();
        config.timestamp = Arc::new(|| Local::now().format("%Y%m%d_%H%M").to_string());
        config
    }
}

/// Loads the config for `args` from disk and the process environment.
pub fn load(args: &Args, cwd: &Path) -> Result<AppConfig, ConfigError> {
    let file = match &args.config {
        Some(path) => read_file(path)?,
        None => {
            let path = cwd.join(CONFIG_FILENAME);
            if path.is_file() {
                read_file(&path)?
            } else {
                FileConfig::default()
            }
        }
    };
    resolve(file, std::env::var(API_URL_ENV).ok(), args, cwd)
}

pub fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ron::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    trip_info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Flags beat the environment, which beats the file.
pub fn resolve(
    file: FileConfig,
    env_api_url: Option<String>,
    args: &Args,
    cwd: &Path,
) -> Result<AppConfig, ConfigError> {
    let mut client = ClientSettings::default();

    let api_url = args
        .api_url
        .clone()
        .or(env_api_url.filter(|url| !url.trim().is_empty()))
        .or(file.api_url);
    if let Some(api_url) = api_url {
        client.base_url = normalize_api_url(&api_url)?;
    }
    if let Some(secs) = file.connect_timeout_secs {
        client.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.request_timeout_secs {
        client.request_timeout = Duration::from_secs(secs);
    }

    let output_dir = args
        .output_dir
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let output_dir = if output_dir.is_absolute() {
        output_dir
    } else {
        cwd.join(output_dir)
    };

    Ok(AppConfig { client, output_dir })
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    match url::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(trimmed.to_string())
        }
        _ => Err(ConfigError::InvalidApiUrl(raw.to_string())),
    }
}
