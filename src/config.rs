use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub map: MapConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourceConfig {
    pub url: Option<String>, // Published CSV feed
    pub path: Option<PathBuf>,
}

/// Where the feed comes from once the config has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub center: [f64; 2], // [lat, lon]
    pub zoom: u8,
    pub fit_padding: u32,
    pub tile_url: String,
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [54.5, -2.5],
            zoom: 6,
            fit_padding: 40,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

impl SourceConfig {
    pub fn feed_source(&self) -> Result<FeedSource> {
        match (&self.url, &self.path) {
            (Some(url), _) => Ok(FeedSource::Url(url.clone())),
            (None, Some(path)) => Ok(FeedSource::File(path.clone())),
            (None, None) => anyhow::bail!("No feed configured: set source.url or source.path"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_with_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[source]\nurl = \"https://example.com/feed.csv\"\n\n[server]\nport = 9000")?;

        let config = AppConfig::load_from_file(file.path())?;
        assert_eq!(
            config.source.feed_source()?,
            FeedSource::Url("https://example.com/feed.csv".to_string())
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.static_dir, PathBuf::from("static"));
        assert_eq!(config.map.zoom, 6);
        assert_eq!(config.map.center, [54.5, -2.5]);
        Ok(())
    }

    #[test]
    fn test_url_wins_over_path() -> Result<()> {
        let config: AppConfig = toml::from_str("[source]\nurl = \"u\"\npath = \"p.csv\"")?;
        assert_eq!(config.source.feed_source()?, FeedSource::Url("u".to_string()));

        let config: AppConfig = toml::from_str("[source]\npath = \"p.csv\"")?;
        assert_eq!(config.source.feed_source()?, FeedSource::File(PathBuf::from("p.csv")));
        Ok(())
    }

    #[test]
    fn test_missing_source_is_error() {
        let config = AppConfig::default();
        assert!(config.source.feed_source().is_err());
    }

    #[test]
    fn test_bad_toml_reports_context() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[map\nzoom = ")?;
        let err = AppConfig::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
        Ok(())
    }
}
