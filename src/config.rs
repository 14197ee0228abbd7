use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::chunker::{Nesting, SplitError, Splitter, DEFAULT_CEILING};
use crate::normalize::{is_pass, Normalizer};

pub const DEFAULT_SEPARATOR: &str = "\n\n--- chunk ---\n\n";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("unknown normalize pass `{0}`")]
    UnknownPass(String),
    #[error(transparent)]
    Split(#[from] SplitError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    split: SplitSection,
    normalize: NormalizeSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SplitSection {
    ceiling: Option<usize>,
    nesting: Option<Nesting>,
    separator: Option<String>,
    normalize: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NormalizeSection {
    skip: Vec<String>,
}

/// Settings after merging defaults and the config file. CLI flags are applied
/// on top by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub ceiling: usize,
    pub nesting: Nesting,
    pub separator: String,
    pub normalize: bool,
    pub skip_passes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_CEILING,
            nesting: Nesting::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
            normalize: true,
            skip_passes: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::default();

        let config = Self {
            ceiling: file.split.ceiling.unwrap_or(defaults.ceiling),
            nesting: file.split.nesting.unwrap_or(defaults.nesting),
            separator: file.split.separator.unwrap_or(defaults.separator),
            normalize: file.split.normalize.unwrap_or(defaults.normalize),
            skip_passes: file.normalize.skip,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ceiling == 0 {
            return Err(SplitError::InvalidCeiling.into());
        }
        if let Some(name) = self.skip_passes.iter().find(|name| !is_pass(name.as_str())) {
            return Err(ConfigError::UnknownPass(name.clone()));
        }
        Ok(())
    }

    pub fn splitter(&self) -> Result<Splitter, SplitError> {
        Ok(Splitter::new(self.ceiling)?.with_nesting(self.nesting))
    }

    pub fn normalizer(&self) -> Normalizer {
        self.skip_passes
            .iter()
            .fold(Normalizer::new(), |n, name| n.without(name))
    }
}
