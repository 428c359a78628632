use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// 当前用户会话记录：登录写入，登出清除，启动时读取一次
/// 以决定是否尝试连接与数据水合。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub trading_status: bool,
    pub market_status: bool,
    pub login_time: String,
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// 任何读取/解析失败都按"无会话"处理。
    pub fn load(&self) -> Option<UserRecord> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(%error, "session record unreadable, ignoring");
                None
            }
        }
    }

    pub fn save(&self, record: &UserRecord) -> io::Result<()> {
        let raw = serde_json::to_string_pretty(record).map_err(io::Error::other)?;
        fs::write(&self.path, raw)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
