use std::path::{Path, PathBuf};

use channel::{ChannelConfig, ReconnectPolicy};
use serde::Deserialize;

/// 终端配置。缺省值与线上客户端配置保持一致。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub ws_url: String,
    pub connect_timeout_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub heartbeat_timeout_ms: u64,
    pub reconnect_interval_ms: u64,
    /// 为空表示无限重试。
    pub reconnect_max_attempts: Option<u32>,
    pub session_file: PathBuf,
    pub watchlist: Vec<String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8080/ws".to_string(),
            connect_timeout_ms: 10_000,
            heartbeat_interval_ms: 4000,
            heartbeat_timeout_ms: 12_000,
            reconnect_interval_ms: 3000,
            reconnect_max_attempts: None,
            session_file: PathBuf::from("terminal-session.json"),
            watchlist: vec![
                "rb2405".to_string(),
                "cu2405".to_string(),
                "al2405".to_string(),
            ],
        }
    }
}

impl TerminalConfig {
    /// 读取 YAML 配置；文件不存在时回落到缺省值。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            connect_timeout_ms: self.connect_timeout_ms,
            heartbeat_interval_ms: self.heartbeat_interval_ms,
            heartbeat_timeout_ms: self.heartbeat_timeout_ms,
            reconnect: ReconnectPolicy {
                interval_ms: self.reconnect_interval_ms,
                max_attempts: self.reconnect_max_attempts,
            },
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config io error: {}", e),
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::TerminalConfig;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config =
            TerminalConfig::load("/definitely/not/there.yaml").expect("defaults expected");
        assert_eq!(config.ws_url, "ws://localhost:8080/ws");
        assert_eq!(config.reconnect_max_attempts, None);
    }

    #[test]
    fn yaml_overrides_only_the_given_fields() {
        let raw = "ws_url: ws://broker.example:9000/ws\nreconnect_interval_ms: 500\nreconnect_max_attempts: 5\nwatchlist:\n  - rb2405\n";
        let config: TerminalConfig = serde_yaml::from_str(raw).expect("yaml parses");
        assert_eq!(config.ws_url, "ws://broker.example:9000/ws");
        assert_eq!(config.reconnect_interval_ms, 500);
        assert_eq!(config.reconnect_max_attempts, Some(5));
        assert_eq!(config.watchlist, vec!["rb2405".to_string()]);
        // 未覆盖的字段保持缺省。
        assert_eq!(config.heartbeat_interval_ms, 4000);
    }
}
