use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use dispatch::{CallbackBus, EventKind, EventMessage};
use tracing::debug;

use crate::account::{Account, Position};
use crate::order::Order;
use crate::quote::Quote;
use crate::store::SnapshotStore;
use crate::trade::Trade;

/// 回调总线的消费者：把入站事件折叠进快照。
///
/// 登录成功不直接回调外部接口，只登记一次性的 refresh 请求，
/// 由会话层取走并发起批量拉取。
pub struct Reconciler {
    store: Arc<RwLock<SnapshotStore>>,
    refresh_requested: Arc<AtomicBool>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(SnapshotStore::new())),
            refresh_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> Arc<RwLock<SnapshotStore>> {
        Arc::clone(&self.store)
    }

    /// 在总线上登记全部消费者，每个事件类别一个回调。只应调用一次。
    pub fn attach(&self, bus: &CallbackBus) {
        let store = Arc::clone(&self.store);
        bus.on(
            EventKind::MarketData,
            Arc::new(move |message: &EventMessage| {
                if let EventMessage::MarketData(tick) = message {
                    store
                        .write()
                        .expect("snapshot lock poisoned")
                        .upsert_quote(Quote::from_tick(tick));
                }
            }),
        );

        let store = Arc::clone(&self.store);
        bus.on(
            EventKind::OrderUpdate,
            Arc::new(move |message: &EventMessage| {
                if let EventMessage::OrderUpdate(event) = message {
                    store
                        .write()
                        .expect("snapshot lock poisoned")
                        .upsert_order(Order::from_event(event));
                }
            }),
        );

        let store = Arc::clone(&self.store);
        bus.on(
            EventKind::TradeUpdate,
            Arc::new(move |message: &EventMessage| {
                if let EventMessage::TradeUpdate(event) = message {
                    store
                        .write()
                        .expect("snapshot lock poisoned")
                        .push_trade(Trade::from_event(event));
                }
            }),
        );

        let store = Arc::clone(&self.store);
        bus.on(
            EventKind::ConnectionStatus,
            Arc::new(move |message: &EventMessage| {
                if let EventMessage::ConnectionStatus(event) = message {
                    store
                        .write()
                        .expect("snapshot lock poisoned")
                        .set_trading_connected(event.connected);
                }
            }),
        );

        let store = Arc::clone(&self.store);
        bus.on(
            EventKind::MarketConnectionStatus,
            Arc::new(move |message: &EventMessage| {
                if let EventMessage::MarketConnectionStatus(event) = message {
                    store
                        .write()
                        .expect("snapshot lock poisoned")
                        .set_market_connected(event.connected);
                }
            }),
        );

        let flag = Arc::clone(&self.refresh_requested);
        bus.on(
            EventKind::LoginStatus,
            Arc::new(move |message: &EventMessage| {
                if let EventMessage::LoginStatus(event) = message {
                    debug!(success = event.success, "login status received");
                    if event.success {
                        flag.store(true, Ordering::SeqCst);
                    }
                }
            }),
        );
    }

    pub fn request_refresh(&self) {
        self.refresh_requested.store(true, Ordering::SeqCst);
    }

    /// 取走一次性 refresh 请求（取走即复位）。
    pub fn take_refresh_request(&self) -> bool {
        self.refresh_requested.swap(false, Ordering::SeqCst)
    }

    /// 登录/定时批量拉取后的整表落库。
    pub fn hydrate(
        &self,
        orders: Vec<Order>,
        positions: Vec<Position>,
        account: Option<Account>,
    ) {
        let mut store = self.store.write().expect("snapshot lock poisoned");
        store.replace_orders(orders);
        store.replace_positions(positions);
        store.replace_account(account);
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}
