use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dictionary::{ConfiguredSource, FileSource, HttpSource};

fn default_timeout_secs() -> u64 {
    30
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the dictionary is loaded from. Exactly one of `path`/`url`.
#[derive(Debug, Deserialize, Clone)]
pub struct DictionaryConfig {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match (&self.dictionary.path, &self.dictionary.url) {
            (Some(_), Some(_)) => bail!("dictionary.path and dictionary.url are mutually exclusive"),
            (None, None) => bail!("one of dictionary.path or dictionary.url is required"),
            _ => {}
        }
        if self.dictionary.timeout_secs == 0 {
            bail!("dictionary.timeout_secs must be positive");
        }
        Ok(())
    }

    /// Build the dictionary source this configuration names.
    pub fn source(&self) -> Result<ConfiguredSource> {
        self.validate()?;
        if let Some(path) = &self.dictionary.path {
            return Ok(ConfiguredSource::File(FileSource::new(path)));
        }

        let url = self
            .dictionary
            .url
            .as_deref()
            .context("dictionary.url is not set")?;
        let timeout = Duration::from_secs(self.dictionary.timeout_secs);
        let source = HttpSource::new(url, timeout)
            .with_context(|| format!("Invalid dictionary URL {url}"))?;
        Ok(ConfiguredSource::Http(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jusho.toml");
        fs::write(
            &path,
            r#"
[dictionary]
path = "data/dictionary.json.gz"

[server]
listen = "127.0.0.1:8080"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(
            config.dictionary.path.as_deref(),
            Some(Path::new("data/dictionary.json.gz"))
        );
        assert_eq!(config.dictionary.timeout_secs, 30);
        assert_eq!(config.server.listen, "127.0.0.1:8080");
        assert!(matches!(config.source().unwrap(), ConfiguredSource::File(_)));
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: Config = toml::from_str("[dictionary]\nurl = \"https://example.com/d.json\"").unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert!(matches!(config.source().unwrap(), ConfiguredSource::Http(_)));
    }

    #[test]
    fn test_validate_requires_exactly_one_location() {
        assert!(Config::default().validate().is_err());

        let mut config = Config::default();
        config.dictionary.path = Some(PathBuf::from("a.json"));
        config.dictionary.url = Some("https://example.com/a.json".to_string());
        assert!(config.validate().is_err());

        config.dictionary.url = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load_from_file("/nonexistent/jusho.toml").is_err());
    }
}
