//! Application configuration module / アプリケーション設定
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 初回起動時にデフォルト設定を作成

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Official KEN_ALL archive / 日本郵便 KEN_ALL
pub const DEFAULT_SOURCE_URL: &str = "https://www.post.japanpost.jp/zipcode/dl/kogaki/zip/ken_all.zip";

/// Application configuration / アプリケーション設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / サーバー設定
    pub server: ServerConfig,
    /// Data directory and artifact / データ設定
    pub data: DataConfig,
    /// Postal master source / 元データ設定
    pub source: SourceConfig,
}

/// Server configuration / サーバー設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 待ち受けアドレス
    pub host: String,
    /// Server port / ポート
    pub port: u16,
    /// Static UI directory / 静的ファイルのディレクトリ
    pub public_dir: String,
}

/// Data configuration / データ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Data directory path / データディレクトリ
    pub data_dir: String,
    /// Artifact file name (relative to data_dir) / 成果物ファイル名
    pub artifact_file: String,
}

/// Source configuration / 元データ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Archive download URL / ダウンロード URL
    pub url: String,
    /// Encoding label of the CSV / CSV の文字コード
    pub encoding: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: "public".to_string(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            artifact_file: "postal-data.json".to_string(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            encoding: "Shift_JIS".to_string(),
        }
    }
}

impl AppConfig {
    /// Get the full data directory path / データディレクトリ
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.data_dir)
    }

    /// Get the artifact path / 成果物のパス
    pub fn get_artifact_path(&self) -> PathBuf {
        self.get_data_dir().join(&self.data.artifact_file)
    }

    /// Get the static file directory / 静的ファイルのディレクトリ
    pub fn get_public_dir(&self) -> PathBuf {
        PathBuf::from(&self.server.public_dir)
    }

    /// Get the server bind address / バインドアドレス
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply environment overrides (PORT) / 環境変数で上書き
    pub fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }
}

/// Get the config file path / 設定ファイルのパス
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 設定を読み込み、無ければ作成
pub fn load_config() -> Result<AppConfig, String> {
    let mut config = load_config_from(&get_config_path())?;
    config.apply_env();
    Ok(config)
}

/// Load configuration from a specific path / 指定パスから設定を読み込む
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        // Load existing config / 既存設定を読み込み
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        // Create default config / デフォルト設定を作成
        let config = AppConfig::default();
        save_config_to(config_path, &config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to a specific path / 設定を保存
pub fn save_config_to(config_path: &Path, config: &AppConfig) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.get_bind_address(), "0.0.0.0:3000");
        assert_eq!(config.get_artifact_path(), Path::new("data").join("postal-data.json"));
        assert_eq!(config.source.encoding, "Shift_JIS");
    }

    #[test]
    fn test_creates_then_reloads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let created = load_config_from(&path).unwrap();
        assert!(path.exists());

        let mut edited = created.clone();
        edited.server.port = 8080;
        edited.data.artifact_file = "other.json".to_string();
        save_config_to(&path, &edited).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.data.artifact_file, "other.json");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
