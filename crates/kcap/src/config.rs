//! Layered configuration: defaults, then the config file, then `KCAP_*`
//! environment variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "KCAP_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    Missing(PathBuf),
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),
    #[error("unknown alias '{0}'; add it under [aliases.{0}] in the config file")]
    UnknownAlias(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub download: DownloadConfig,
    pub aliases:  BTreeMap<String, AliasConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Where finalized artifacts are placed.
    pub dir:      PathBuf,
    pub progress: bool,
    /// Directory for in-flight downloads. Defaults to `dir` so the final
    /// rename stays on one filesystem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir:      PathBuf::from("."),
            progress: true,
            temp_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasConfig {
    pub url:   String,
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    /// `$HOME/.kcap/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        home::home_dir().map(|home| home.join(".kcap").join("config.toml"))
    }

    pub fn figment(file: Option<&Path>) -> Figment {
        let mut fig = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            fig = fig.merge(Toml::file(file));
        }
        fig.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load from an explicit file, which must exist, or from the default
    /// location when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) if !path.is_file() => return Err(ConfigError::Missing(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };
        Self::figment(file.as_deref())
            .extract()
            .map_err(|err| ConfigError::Figment(Box::new(err)))
    }

    pub fn alias(&self, name: &str) -> Result<&AliasConfig, ConfigError> {
        self.aliases
            .get(name)
            .ok_or_else(|| ConfigError::UnknownAlias(name.to_owned()))
    }
}
