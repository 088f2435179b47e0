use serde::Deserialize;
use std::{env, path::Path, path::PathBuf};

use lexlens_analysis::ServiceConfig;
use lexlens_pipeline::PipelineConfig;

const ENDPOINT_ENV: &str = "LEXLENS_ENDPOINT";
const DEBOUNCE_ENV: &str = "LEXLENS_DEBOUNCE_MS";

/// Contents of `~/.lexlens/config.toml`. Every table is optional.
#[derive(Debug, Default, Deserialize)]
pub struct LexlensConfig {
    pub service: Option<ServiceConfig>,
    pub pipeline: Option<PipelineConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".lexlens").join("config.toml"))
}

/// Replace `${VAR}` references with the variable's value (empty if unset).
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn expand_strings(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) => *s = expand_env_vars(s),
        toml::Value::Array(items) => items.iter_mut().for_each(expand_strings),
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| expand_strings(v)),
        _ => {}
    }
}

impl LexlensConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        Self::load_from(&path)
    }

    /// Load from an explicit path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        Self::parse(&content)
            .map(Some)
            .map_err(|source| {
                tracing::warn!("Failed to parse config at {:?}: {}", path, source);
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(content)?;
        let mut value = toml::Value::Table(table);
        expand_strings(&mut value);
        value.try_into()
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// `[service]` settings with environment overrides applied.
    #[must_use]
    pub fn service(&self) -> ServiceConfig {
        let service = self.service.clone().unwrap_or_default();
        match env::var(ENDPOINT_ENV) {
            Ok(endpoint) if !endpoint.trim().is_empty() => {
                service.with_endpoint(endpoint.trim())
            }
            _ => service,
        }
    }

    /// `[pipeline]` settings with environment overrides applied.
    #[must_use]
    pub fn pipeline(&self) -> PipelineConfig {
        let pipeline = self.pipeline.clone().unwrap_or_default();
        let Ok(raw) = env::var(DEBOUNCE_ENV) else {
            return pipeline;
        };
        match raw.trim().parse::<u64>() {
            Ok(ms) => pipeline.with_debounce_ms(ms),
            Err(_) => {
                tracing::warn!(value = %raw, "Ignoring invalid {DEBOUNCE_ENV}");
                pipeline
            }
        }
    }
}
