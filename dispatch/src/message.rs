//! 类型化消息模块。
//!
//! 入站帧 body 按事件类别解码为固定字段集；字段缺省按零值补齐，
//! 无法解码的 body 走显式错误路径，绝不透传给消费者。

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// 事件类别：多个主题可以归入同一类别
/// （所有合约行情主题都归入 `MarketData`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	ConnectionStatus,
	LoginStatus,
	OrderUpdate,
	TradeUpdate,
	MarketData,
	MarketConnectionStatus,
}

impl EventKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::ConnectionStatus => "connection",
			Self::LoginStatus => "login_status",
			Self::OrderUpdate => "order_update",
			Self::TradeUpdate => "trade_data",
			Self::MarketData => "market_data",
			Self::MarketConnectionStatus => "market_connection",
		}
	}
}

/// 行情推送（三档盘口）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteTick {
	pub instrument_id: String,
	pub last_price: f64,
	pub pre_close_price: f64,
	pub open_price: f64,
	pub highest_price: f64,
	pub lowest_price: f64,
	pub upper_limit_price: f64,
	pub lower_limit_price: f64,
	pub volume: u64,
	pub turnover: f64,
	pub open_interest: f64,
	pub update_time: String,
	pub trading_day: String,
	pub bid_price1: f64,
	pub bid_volume1: u64,
	pub bid_price2: f64,
	pub bid_volume2: u64,
	pub bid_price3: f64,
	pub bid_volume3: u64,
	pub ask_price1: f64,
	pub ask_volume1: u64,
	pub ask_price2: f64,
	pub ask_volume2: u64,
	pub ask_price3: f64,
	pub ask_volume3: u64,
}

/// 报单回报。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderEvent {
	pub order_ref: String,
	pub instrument_id: String,
	pub direction: String,
	pub limit_price: f64,
	pub volume_total_original: u64,
	pub volume_traded: u64,
	pub order_status: String,
	pub insert_time: String,
}

/// 成交回报。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradeEvent {
	pub trade_id: String,
	pub instrument_id: String,
	pub direction: String,
	pub price: f64,
	pub volume: u64,
	pub trade_time: String,
}

/// 连接状态推送（交易通道与行情通道共用同一形状）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusEvent {
	pub connected: bool,
	pub message: String,
}

/// 登录状态推送。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginEvent {
	pub success: bool,
	pub message: String,
}

/// 解码后的入站事件。
#[derive(Debug, Clone, PartialEq)]
pub enum EventMessage {
	ConnectionStatus(StatusEvent),
	LoginStatus(LoginEvent),
	OrderUpdate(OrderEvent),
	TradeUpdate(TradeEvent),
	MarketData(QuoteTick),
	MarketConnectionStatus(StatusEvent),
}

impl EventMessage {
	pub fn kind(&self) -> EventKind {
		match self {
			Self::ConnectionStatus(_) => EventKind::ConnectionStatus,
			Self::LoginStatus(_) => EventKind::LoginStatus,
			Self::OrderUpdate(_) => EventKind::OrderUpdate,
			Self::TradeUpdate(_) => EventKind::TradeUpdate,
			Self::MarketData(_) => EventKind::MarketData,
			Self::MarketConnectionStatus(_) => EventKind::MarketConnectionStatus,
		}
	}

	/// 按事件类别解码 body；失败即 `MalformedMessage`。
	pub fn decode(kind: EventKind, topic: &str, body: &str) -> Result<Self, DispatchError> {
		let result = match kind {
			EventKind::ConnectionStatus => {
				serde_json::from_str(body).map(Self::ConnectionStatus)
			}
			EventKind::LoginStatus => serde_json::from_str(body).map(Self::LoginStatus),
			EventKind::OrderUpdate => serde_json::from_str(body).map(Self::OrderUpdate),
			EventKind::TradeUpdate => serde_json::from_str(body).map(Self::TradeUpdate),
			EventKind::MarketData => serde_json::from_str(body).map(Self::MarketData),
			EventKind::MarketConnectionStatus => {
				serde_json::from_str(body).map(Self::MarketConnectionStatus)
			}
		};
		result.map_err(|source| DispatchError::MalformedMessage {
			topic: topic.to_string(),
			detail: source.to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::{EventKind, EventMessage};

	#[test]
	fn quote_tick_decodes_camel_case_payload() {
		let body = r#"{
			"instrumentId": "rb2405",
			"lastPrice": 3700.0,
			"preClosePrice": 3650.0,
			"bidPrice1": 3699.0,
			"bidVolume1": 12,
			"askPrice1": 3701.0,
			"askVolume1": 8,
			"volume": 120045
		}"#;
		let message = EventMessage::decode(EventKind::MarketData, "/topic/market/data/rb2405", body)
			.expect("payload should decode");

		let EventMessage::MarketData(tick) = message else {
			panic!("expected market data");
		};
		assert_eq!(tick.instrument_id, "rb2405");
		assert_eq!(tick.last_price, 3700.0);
		assert_eq!(tick.bid_volume1, 12);
		// 缺省字段补零，不报错。
		assert_eq!(tick.open_interest, 0.0);
	}

	#[test]
	fn malformed_body_is_an_explicit_error() {
		let result = EventMessage::decode(EventKind::OrderUpdate, "/topic/orders", "not json");
		assert!(result.is_err());
	}

	#[test]
	fn order_event_keeps_wire_status_code_raw() {
		let body = r#"{"orderRef":"1001","orderStatus":"1","volumeTraded":2}"#;
		let message =
			EventMessage::decode(EventKind::OrderUpdate, "/topic/orders", body).expect("decode");
		let EventMessage::OrderUpdate(event) = message else {
			panic!("expected order update");
		};
		assert_eq!(event.order_status, "1");
		assert_eq!(event.volume_traded, 2);
	}
}
