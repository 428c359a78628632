use chrono::Utc;
use serde::{Deserialize, Serialize};

use snapshot::Direction;

/// 请求级失败：要么被服务端业务拒绝，要么网络层失败。
/// 一律带可读 message 上抛给调用方，绝不静默吞掉。
#[derive(Debug, Clone)]
pub enum RequestError {
    Rejected { message: String },
    Network(String),
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Rejected { message } => write!(f, "request rejected: {}", message),
            RequestError::Network(msg) => write!(f, "network error: {}", msg),
        }
    }
}

impl std::error::Error for RequestError {}

/// 统一响应信封。`success=false` 即业务失败，与 HTTP 状态码无关。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            code: 200,
            message: "操作成功".to_string(),
            data: Some(data),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
            data: None,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn into_result(self) -> Result<Option<T>, RequestError> {
        if self.success {
            Ok(self.data)
        } else {
            let message = if self.message.is_empty() {
                "请求失败".to_string()
            } else {
                self.message
            };
            Err(RequestError::Rejected { message })
        }
    }
}

/// 开平标志。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetFlag {
    Open,
    Close,
    CloseToday,
}

impl OffsetFlag {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Open => "0",
            Self::Close => "1",
            Self::CloseToday => "3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "开仓",
            Self::Close => "平仓",
            Self::CloseToday => "平今",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub instrument_id: String,
    pub direction: Direction,
    pub offset_flag: OffsetFlag,
    pub price: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    pub order_ref: String,
    pub instrument_id: String,
}

/// 合约查询结果。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentInfo {
    pub instrument_id: String,
    pub instrument_name: String,
    pub exchange_id: String,
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::{ApiResponse, RequestError};

    #[test]
    fn rejected_response_surfaces_the_server_message() {
        let response: ApiResponse<()> = ApiResponse::error(500, "柜台未就绪");
        let error = response.into_result().expect_err("must fail");
        assert!(matches!(
            error,
            RequestError::Rejected { message } if message == "柜台未就绪"
        ));
    }

    #[test]
    fn rejected_response_without_message_gets_a_fallback() {
        let response: ApiResponse<()> = ApiResponse {
            success: false,
            code: 500,
            message: String::new(),
            data: None,
            timestamp: 0,
        };
        let error = response.into_result().expect_err("must fail");
        assert!(matches!(
            error,
            RequestError::Rejected { message } if message == "请求失败"
        ));
    }

    #[test]
    fn envelope_decodes_with_missing_optional_fields() {
        let response: ApiResponse<Vec<String>> =
            serde_json::from_str(r#"{"success":true,"data":["rb2405"]}"#).expect("decode");
        assert_eq!(
            response.into_result().expect("ok"),
            Some(vec!["rb2405".to_string()])
        );
    }
}
