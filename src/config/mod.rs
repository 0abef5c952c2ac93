use serde::Deserialize;
use std::path::PathBuf;

use crate::api::geocode::DEFAULT_ENDPOINT;

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_country_column() -> String {
    "country".to_string()
}
fn default_venue_column() -> String {
    "venue".to_string()
}

/// File-backed configuration, merged under CLI flags.
///
/// The geocoding credential lives here (or in the GEOCODE_API_KEY
/// environment variable, or --api-key); it is never compiled in.
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_country_column")]
    pub country_column: String,
    #[serde(default = "default_venue_column")]
    pub venue_column: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            country_column: default_country_column(),
            venue_column: default_venue_column(),
        }
    }
}

impl FileConfig {
    /// Load the first parseable config file from the search paths.
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("compmap.toml"));
    paths.push(PathBuf::from(".compmap.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("compmap").join("config.toml"));
        paths.push(config_dir.join("compmap.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".compmap.toml"));
        paths.push(home.join(".config").join("compmap").join("config.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: FileConfig = toml::from_str("api_key = \"abc123\"").unwrap();

        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.country_column, "country");
        assert_eq!(config.venue_column, "venue");
    }

    #[test]
    fn test_full_config_parses() {
        let toml = r#"
            api_key = "abc123"
            endpoint = "https://geocode.example.com/json"
            timeout_secs = 10
            country_column = "nation"
            venue_column = "location"
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.endpoint, "https://geocode.example.com/json");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.country_column, "nation");
        assert_eq!(config.venue_column, "location");
    }
}
