//! Application configuration.
//!
//! Supplies the document title and the server URL. Loaded from a JSON or YAML
//! file, the format being chosen by the file extension.

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration of the documented application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// Application name, used as the document title
    pub name: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "API".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// `http` or `https`
    pub protocol: String,
    /// Public domain name; the host is used when empty
    pub domain: String,
    pub host: String,
    pub port: u16,
    /// Full base URL overriding every other server setting
    pub base_url: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            domain: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: None,
        }
    }
}

impl AppConfig {
    /// Load the configuration from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e))),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e))),
            _ => Err(Error::ConfigError(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    /// URL the application is served at.
    ///
    /// The port is omitted when it is the default one for the protocol.
    pub fn base_url(&self) -> String {
        let server = &self.server;
        if let Some(base_url) = &server.base_url {
            return base_url.trim_end_matches('/').to_string();
        }

        let domain = if server.domain.is_empty() {
            &server.host
        } else {
            &server.domain
        };
        let default_port = matches!(
            (server.protocol.as_str(), server.port),
            ("http", 80) | ("https", 443)
        );
        if default_port {
            format!("{}://{}", server.protocol, domain)
        } else {
            format!("{}://{}:{}", server.protocol, domain, server.port)
        }
    }
}
