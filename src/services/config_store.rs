// Configuration Storage Service
// Handles config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub version: String,
    /// Base URL of the hosted inference API; env var takes precedence.
    pub inference_url: Option<String>,
    pub api_token: Option<String>,
    pub default_paraphrase_model: Option<String>,
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default = "default_probes")]
    pub default_probes: Vec<String>,
    #[serde(default = "default_threshold")]
    pub highlight_threshold: f64,
    #[serde(default = "default_segment_length")]
    pub segment_length: usize,
    #[serde(default = "default_min_line_length")]
    pub min_line_length: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            default_probes: default_probes(),
            highlight_threshold: 0.7,
            segment_length: 200,
            min_line_length: 20,
        }
    }
}

fn default_probes() -> Vec<String> {
    super::detection::default_probe_ids()
}
fn default_threshold() -> f64 { 0.7 }
fn default_segment_length() -> usize { 200 }
fn default_min_line_length() -> usize { 20 }

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quillforge"))
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &PathBuf, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Sort by modification time (oldest first)
        entries.sort_by_key(|e| {
            e.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        // Remove oldest entries
        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    /// Get the inference API token from the config file
    pub fn get_api_token(&self) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.api_token)
    }

    /// Store the inference API token in the config file
    pub fn set_api_token(&self, token: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_token = Some(token.to_string());
        self.save(&config)
    }

    /// Get the inference base URL from the config file
    pub fn get_inference_url(&self) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.inference_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.detection.segment_length, 200);
        assert_eq!(config.detection.default_probes.len(), 2);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            version: "1.0.0".to_string(),
            inference_url: Some("http://localhost:9090".to_string()),
            api_token: None,
            default_paraphrase_model: Some("facebook/bart-base".to_string()),
            detection: DetectionConfig::default(),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, "1.0.0");
        assert_eq!(parsed.detection.highlight_threshold, 0.7);
    }

    #[test]
    fn test_inference_url_round_trip() {
        let dir = std::env::temp_dir().join(format!("quillforge-test-{}", uuid::Uuid::new_v4()));
        let store = ConfigStore::new(dir.clone());
        assert_eq!(store.get_inference_url(), Ok(None));

        let config = AppConfig {
            inference_url: Some("http://localhost:9090".to_string()),
            ..AppConfig::default()
        };
        store.save(&config).unwrap();
        assert_eq!(
            store.get_inference_url().unwrap(),
            Some("http://localhost:9090".to_string())
        );

        let _ = fs::remove_dir_all(dir);
    }
}
