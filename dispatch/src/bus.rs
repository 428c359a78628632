//! 回调总线模块（fan-out）。
//!
//! 按事件类别维护有序回调列表；分发时对列表做快照，
//! 单个回调 panic 被就地隔离，不影响后续回调与后续帧。

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};

use tracing::error;

use crate::message::{EventKind, EventMessage};

pub type EventCallback = Arc<dyn Fn(&EventMessage) + Send + Sync>;

#[derive(Default)]
pub struct CallbackBus {
	listeners: RwLock<HashMap<EventKind, Vec<EventCallback>>>,
}

impl CallbackBus {
	pub fn new() -> Self {
		Self::default()
	}

	/// 追加注册。同一回调允许重复注册，分发时会被调用多次，
	/// 去重由调用方自行负责。
	pub fn on(&self, kind: EventKind, callback: EventCallback) {
		let mut guard = self.listeners.write().expect("callback bus lock poisoned");
		guard.entry(kind).or_default().push(callback);
	}

	/// 按 `Arc` 身份移除首个匹配注册；不存在时为 no-op。
	pub fn off(&self, kind: EventKind, callback: &EventCallback) {
		let mut guard = self.listeners.write().expect("callback bus lock poisoned");
		if let Some(list) = guard.get_mut(&kind) {
			if let Some(index) = list.iter().position(|x| Arc::ptr_eq(x, callback)) {
				list.remove(index);
			}
		}
	}

	/// 同步按注册顺序分发，返回本次触达的回调数量。
	pub fn emit(&self, message: &EventMessage) -> usize {
		let snapshot = {
			let guard = self.listeners.read().expect("callback bus lock poisoned");
			guard.get(&message.kind()).cloned().unwrap_or_default()
		};
		let mut invoked = 0usize;
		for callback in snapshot {
			if catch_unwind(AssertUnwindSafe(|| callback(message))).is_err() {
				error!(
					kind = message.kind().as_str(),
					"callback panicked, isolated from remaining listeners"
				);
			}
			invoked += 1;
		}
		invoked
	}

	pub fn listener_count(&self, kind: EventKind) -> usize {
		let guard = self.listeners.read().expect("callback bus lock poisoned");
		guard.get(&kind).map(Vec::len).unwrap_or(0)
	}
}
