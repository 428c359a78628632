//! `dispatch` crate 入口。
//!
//! 职责：主题命名空间、订阅登记、入站帧的分类/解码与回调总线 fan-out。
//! 该文件只做模块装配与统一导出，具体实现位于各子模块。
//!
//! 模块分工：
//! - `topic`：主题命名空间（静态 + 按合约参数化）。
//! - `registry`：订阅集合，重连回放的唯一事实来源。
//! - `message`：事件类别与类型化 payload。
//! - `router`：分类 → 解码 → 分发。
//! - `bus`：按类别的有序回调 fan-out 与 panic 隔离。

pub mod bus;
pub mod error;
pub mod message;
pub mod registry;
pub mod router;
pub mod topic;

pub use bus::{CallbackBus, EventCallback};
pub use error::DispatchError;
pub use message::{
	EventKind, EventMessage, LoginEvent, OrderEvent, QuoteTick, StatusEvent, TradeEvent,
};
pub use registry::{SubscriptionRegistry, TopicHandler};
pub use router::{MessageRouter, classify};
pub use topic::Topic;
