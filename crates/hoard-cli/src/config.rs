use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use hoard_gc::GcConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// File import settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Maximum size of a leaf block.
    pub chunk_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256 * 1024,
        }
    }
}

/// Contents of `<repo>/config.toml`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub gc: GcConfig,
    pub import: ImportConfig,
}

impl RepoConfig {
    /// Read the config from `repo`, falling back to defaults if the file is
    /// missing.
    pub fn load(repo: &Path) -> anyhow::Result<Self> {
        let path = repo.join(CONFIG_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, repo: &Path) -> anyhow::Result<()> {
        let path = repo.join(CONFIG_FILE);
        let text = toml::to_string_pretty(self).context("serializing config")?;
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RepoConfig::load(dir.path()).unwrap();
        assert_eq!(config, RepoConfig::default());
        assert_eq!(config.import.chunk_size, 262_144);
        assert_eq!(config.gc.output_capacity, 1);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RepoConfig::default();
        config.gc.output_capacity = 32;
        config.import.chunk_size = 1024;
        config.save(dir.path()).unwrap();

        assert_eq!(RepoConfig::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[import]\nchunk_size = 4096\n").unwrap();

        let config = RepoConfig::load(dir.path()).unwrap();
        assert_eq!(config.import.chunk_size, 4096);
        assert_eq!(config.gc, GcConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "gc = 3").unwrap();
        assert!(RepoConfig::load(dir.path()).is_err());
    }
}
