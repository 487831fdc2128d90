use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the upstream REST API
    pub base_url: String,

    /// Characters per local page
    pub page_size: usize,

    /// Upstream pages fetched before the first render
    pub initial_pages: u32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent sent upstream
    pub user_agent: String,

    /// Serve the built-in dataset instead of calling the API
    pub offline: bool,

    /// Log file used while the terminal UI owns the screen
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://rickandmortyapi.com/api".to_string(),
            page_size: 15,
            initial_pages: 3,
            request_timeout_secs: 10,
            user_agent: concat!("character-gallery/", env!("CARGO_PKG_VERSION")).to_string(),
            offline: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Initialize configuration from various sources
    pub async fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match Self::load_from_file().await? {
            Some(file_config) => file_config,
            None => Self::default(),
        };

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        if let Ok(base_url) = std::env::var("GALLERY_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(page_size) = std::env::var("GALLERY_PAGE_SIZE") {
            if let Ok(page_size) = page_size.parse() {
                self.page_size = page_size;
            }
        }

        if let Ok(initial_pages) = std::env::var("GALLERY_INITIAL_PAGES") {
            if let Ok(initial_pages) = initial_pages.parse() {
                self.initial_pages = initial_pages;
            }
        }

        if let Ok(timeout) = std::env::var("GALLERY_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse() {
                self.request_timeout_secs = timeout;
            }
        }

        if let Ok(offline) = std::env::var("GALLERY_OFFLINE") {
            self.offline = matches!(offline.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Ok(log_file) = std::env::var("GALLERY_LOG_FILE") {
            self.log_file = Some(PathBuf::from(log_file));
        }
    }

    /// Candidate configuration files, highest priority first
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./.gallery.json"), PathBuf::from("./gallery.json")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("gallery").join("gallery.json"));
        }

        paths
    }

    /// Load the first configuration file that exists
    pub async fn load_from_file() -> Result<Option<Self>> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::load_path(&path).await.map(Some);
            }
        }

        Ok(None)
    }

    /// Load one configuration file; missing keys keep their defaults
    pub async fn load_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid configuration in {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Where logs go in interactive mode
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("character-gallery.log"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(anyhow::anyhow!("page_size must be greater than 0"));
        }

        if self.initial_pages == 0 {
            return Err(anyhow::anyhow!("initial_pages must be greater than 0"));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("request_timeout_secs must be greater than 0"));
        }

        let is_http = self.base_url.starts_with("http://") || self.base_url.starts_with("https://");
        if !self.offline && !is_http {
            return Err(anyhow::anyhow!(
                "base_url must start with http:// or https:// (got {:?})",
                self.base_url
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.page_size, 15);
        assert_eq!(config.initial_pages, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let zero_page = Config { page_size: 0, ..Config::default() };
        assert!(zero_page.validate().is_err());

        let zero_initial = Config { initial_pages: 0, ..Config::default() };
        assert!(zero_initial.validate().is_err());

        let bad_url = Config { base_url: "ftp://example.com".into(), ..Config::default() };
        assert!(bad_url.validate().is_err());

        let offline = Config { base_url: String::new(), offline: true, ..Config::default() };
        assert!(offline.validate().is_ok());
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "page_size": 20, "offline": true }}"#).unwrap();

        let config = Config::load_path(file.path()).await.unwrap();
        assert_eq!(config.page_size, 20);
        assert!(config.offline);
        assert_eq!(config.initial_pages, 3);
        assert_eq!(config.base_url, Config::default().base_url);
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "page_size = 20").unwrap();

        let err = Config::load_path(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }
}
