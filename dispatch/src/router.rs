//! 消息路由模块。
//!
//! 入站帧按主题模式分类、按类别解码，再经回调总线分发。
//! 未知主题与坏帧只丢弃并告警（向前兼容），不影响后续帧。

use std::sync::Arc;

use tracing::warn;

use crate::bus::CallbackBus;
use crate::error::DispatchError;
use crate::message::{EventKind, EventMessage};
use crate::registry::TopicHandler;
use crate::topic::{self, Topic};

/// 主题 → 事件类别。静态主题精确匹配，合约行情主题按前缀匹配；
/// 未知主题返回 `None`。
pub fn classify(raw: &str) -> Option<EventKind> {
	match raw {
		topic::CONNECTION => Some(EventKind::ConnectionStatus),
		topic::LOGIN => Some(EventKind::LoginStatus),
		topic::ORDERS => Some(EventKind::OrderUpdate),
		topic::TRADES => Some(EventKind::TradeUpdate),
		topic::MARKET_CONNECTION => Some(EventKind::MarketConnectionStatus),
		topic::MARKET_DATA => Some(EventKind::MarketData),
		parameterized if parameterized.starts_with(topic::MARKET_DATA_PREFIX) => {
			Some(EventKind::MarketData)
		}
		_ => None,
	}
}

#[derive(Clone)]
pub struct MessageRouter {
	bus: Arc<CallbackBus>,
}

impl MessageRouter {
	pub fn new(bus: Arc<CallbackBus>) -> Self {
		Self { bus }
	}

	pub fn bus(&self) -> &Arc<CallbackBus> {
		&self.bus
	}

	/// 一条入站帧的完整路径：分类 → 解码 → 分发。
	/// 返回本次触达的回调数量（丢弃时为 0）。
	pub fn route(&self, raw_topic: &str, body: &str) -> usize {
		let kind = match classify(raw_topic) {
			Some(kind) => kind,
			None => {
				let error = DispatchError::UnrecognizedTopic(raw_topic.to_string());
				warn!(%error, "dropping frame");
				return 0;
			}
		};
		match EventMessage::decode(kind, raw_topic, body) {
			Ok(message) => self.bus.emit(&message),
			Err(error) => {
				warn!(%error, "dropping malformed frame");
				0
			}
		}
	}

	/// 标准主题 handler：把原始 body 原样送入路由。
	pub fn forwarding_handler(&self) -> TopicHandler {
		let router = self.clone();
		Arc::new(move |topic: &Topic, body: &str| {
			router.route(topic.as_str(), body);
		})
	}
}

#[cfg(test)]
mod tests {
	use super::classify;
	use crate::message::EventKind;

	#[test]
	fn static_topics_classify_exactly() {
		assert_eq!(classify("/topic/connection"), Some(EventKind::ConnectionStatus));
		assert_eq!(classify("/topic/login"), Some(EventKind::LoginStatus));
		assert_eq!(classify("/topic/orders"), Some(EventKind::OrderUpdate));
		assert_eq!(classify("/topic/trades"), Some(EventKind::TradeUpdate));
		assert_eq!(
			classify("/topic/market/connection"),
			Some(EventKind::MarketConnectionStatus)
		);
		assert_eq!(classify("/topic/market/data"), Some(EventKind::MarketData));
	}

	#[test]
	fn instrument_topics_classify_by_prefix() {
		assert_eq!(
			classify("/topic/market/data/rb2405"),
			Some(EventKind::MarketData)
		);
		assert_eq!(
			classify("/topic/market/data/cu2405"),
			Some(EventKind::MarketData)
		);
	}

	#[test]
	fn unknown_topics_are_not_classified() {
		assert_eq!(classify("/topic/settlement"), None);
		assert_eq!(classify("/topic/market"), None);
		assert_eq!(classify(""), None);
	}
}
