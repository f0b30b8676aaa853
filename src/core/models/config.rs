//! 运行配置模型

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// OAuth 客户端凭据 (validateKeys.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

impl Credentials {
    /// 从 JSON 文件读取凭据
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read credentials file {:?}: {}", path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse credentials file {:?}: {}", path, e))
    }

    /// Default location: `~/validateKeys.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join("validateKeys.json"))
    }
}

/// 中继运行策略
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// The only identity allowed through the relay.
    pub allowed_email: String,
    /// File served at `/binary.html`.
    pub asset_path: PathBuf,
    /// Include error debug output and source chain in 500 bodies.
    pub debug_errors: bool,
    /// Outbound timeout; `None` waits on the origin indefinitely.
    pub relay_timeout: Option<Duration>,
}

impl RelayConfig {
    pub fn new(allowed_email: impl Into<String>) -> Self {
        Self {
            allowed_email: allowed_email.into(),
            asset_path: PathBuf::from("./binary.html"),
            debug_errors: false,
            relay_timeout: None,
        }
    }
}
