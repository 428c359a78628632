//! 订阅登记模块。
//!
//! 纯状态组件：记录当前订阅集合与对应的 broker 订阅 id，
//! 是重连后回放的唯一事实来源；本身不做任何 I/O。

use std::sync::Arc;

use crate::topic::Topic;

/// 主题级 handler，入参为主题与原始 body 文本。
pub type TopicHandler = Arc<dyn Fn(&Topic, &str) + Send + Sync>;

struct SubscriptionEntry {
	topic: Topic,
	handler: TopicHandler,
	broker_id: u64,
}

#[derive(Default)]
pub struct SubscriptionRegistry {
	entries: Vec<SubscriptionEntry>,
}

impl SubscriptionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// 登记订阅。同主题重复登记时替换 handler 并保留原 broker id
	/// （幂等，handler 为 last-writer-wins）。
	pub fn insert(&mut self, topic: Topic, handler: TopicHandler, broker_id: u64) {
		if let Some(entry) = self.entries.iter_mut().find(|e| e.topic == topic) {
			entry.handler = handler;
			return;
		}
		self.entries.push(SubscriptionEntry {
			topic,
			handler,
			broker_id,
		});
	}

	/// 重连回放后刷新 broker 侧订阅 id。
	pub fn update_broker_id(&mut self, topic: &Topic, broker_id: u64) {
		if let Some(entry) = self.entries.iter_mut().find(|e| &e.topic == topic) {
			entry.broker_id = broker_id;
		}
	}

	/// 移除订阅并交还 broker id；不存在时为 no-op。
	pub fn remove(&mut self, topic: &Topic) -> Option<u64> {
		let index = self.entries.iter().position(|e| &e.topic == topic)?;
		Some(self.entries.remove(index).broker_id)
	}

	/// 整体清空，不逐个向 broker 退订（连接拆除时 broker 侧状态已不存在）。
	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn contains(&self, topic: &Topic) -> bool {
		self.entries.iter().any(|e| &e.topic == topic)
	}

	pub fn broker_id(&self, topic: &Topic) -> Option<u64> {
		self.entries
			.iter()
			.find(|e| &e.topic == topic)
			.map(|e| e.broker_id)
	}

	pub fn handler_for(&self, topic: &str) -> Option<TopicHandler> {
		self.entries
			.iter()
			.find(|e| e.topic.as_str() == topic)
			.map(|e| Arc::clone(&e.handler))
	}

	/// 当前订阅集合（登记顺序）。
	pub fn topics(&self) -> Vec<Topic> {
		self.entries.iter().map(|e| e.topic.clone()).collect()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
