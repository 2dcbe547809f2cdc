use crate::error::{EcopotError, Result};
use ecopot_common::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// APIキーの環境変数名
pub const API_KEY_ENV: &str = "PLANT_ID_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub plant_language: String,
    pub timeout_seconds: u64,
    /// テキスト相談への応答待ち時間
    pub reply_latency_ms: u64,
    /// 写真相談への応答待ち時間
    pub image_reply_latency_ms: u64,
    pub settings: Settings,
}

/// アプリ設定（トグル）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub notifications_enabled: bool,
    pub water_reminders_enabled: bool,
    pub dark_mode_enabled: bool,
    pub location_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications_enabled: false,
            water_reminders_enabled: true,
            dark_mode_enabled: false,
            location_enabled: true,
        }
    }
}

impl Settings {
    pub const NAMES: &'static [&'static str] = &["notifications", "water-reminders", "dark-mode", "location"];

    /// 名前でトグルを反転し、反転後の値を返す
    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        let flag = match name {
            "notifications" => &mut self.notifications_enabled,
            "water-reminders" => &mut self.water_reminders_enabled,
            "dark-mode" => &mut self.dark_mode_enabled,
            "location" => &mut self.location_enabled,
            other => {
                return Err(EcopotError::Config(format!(
                    "不明な設定項目: {} (指定可能: {})",
                    other,
                    Self::NAMES.join(", ")
                )))
            }
        };
        *flag = !*flag;
        Ok(*flag)
    }

    pub fn entries(&self) -> [(&'static str, bool); 4] {
        [
            ("notifications", self.notifications_enabled),
            ("water-reminders", self.water_reminders_enabled),
            ("dark-mode", self.dark_mode_enabled),
            ("location", self.location_enabled),
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.into(),
            plant_language: "en".into(),
            timeout_seconds: 30,
            reply_latency_ms: 1000,
            image_reply_latency_ms: 1500,
            settings: Settings::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EcopotError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("ecopot").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(EcopotError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn reply_latency(&self) -> Duration {
        Duration::from_millis(self.reply_latency_ms)
    }

    pub fn image_reply_latency(&self) -> Duration {
        Duration::from_millis(self.image_reply_latency_ms)
    }
}
