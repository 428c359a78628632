use std::sync::{Arc, RwLock};

use channel::{
    Channel, ChannelError, ChannelEvent, ConnectionState, FrameTransport, StateObserver,
};
use chrono::Utc;
use dispatch::{
    CallbackBus, EventCallback, EventKind, MessageRouter, SubscriptionRegistry, Topic,
    TopicHandler,
};
use gateway::{CancelOrderRequest, PlaceOrderRequest, RequestError, TradingGateway};
use snapshot::{Reconciler, SnapshotStore};
use tracing::{debug, info, warn};

use crate::config::TerminalConfig;
use crate::session_store::{SessionStore, UserRecord};

/// 终端数据层的装配点：独占持有通道、订阅登记、路由/总线、
/// 快照 reconciler 与柜台网关，生命周期显式（启动构造、退出拆除）。
pub struct TerminalSession<T: FrameTransport, G: TradingGateway> {
    channel: Channel<T>,
    gateway: G,
    registry: SubscriptionRegistry,
    router: MessageRouter,
    bus: Arc<CallbackBus>,
    reconciler: Reconciler,
    sessions: SessionStore,
    user: Option<UserRecord>,
}

impl<T: FrameTransport, G: TradingGateway> TerminalSession<T, G> {
    pub fn new(transport: T, gateway: G, config: &TerminalConfig) -> Self {
        let bus = Arc::new(CallbackBus::new());
        let router = MessageRouter::new(Arc::clone(&bus));
        let reconciler = Reconciler::new();
        reconciler.attach(&bus);
        let channel = Channel::new(transport, config.ws_url.clone(), config.channel_config());

        Self {
            channel,
            gateway,
            registry: SubscriptionRegistry::new(),
            router,
            bus,
            reconciler,
            sessions: SessionStore::new(config.session_file.clone()),
            user: None,
        }
    }

    /// 启动时读取一次持久化会话；有会话则尝试连接并水合数据。
    pub async fn startup(&mut self) -> Option<UserRecord> {
        let record = self.sessions.load()?;
        self.user = Some(record.clone());
        if let Err(error) = self.connect().await {
            warn!(%error, "startup connect failed, staying offline");
            return Some(record);
        }
        self.subscribe_trade_topics().await;
        self.hydrate().await;
        Some(record)
    }

    /// 交易登录 + 行情登录；两者任一被拒即整体失败。
    /// 登录成功后连接 websocket（连接失败只告警，不影响登录结果）。
    pub async fn login(&mut self, username: &str) -> Result<UserRecord, RequestError> {
        self.gateway.trading_login().await?;
        self.gateway.market_login().await?;

        let record = UserRecord {
            username: username.to_string(),
            trading_status: true,
            market_status: true,
            login_time: Utc::now().to_rfc3339(),
        };
        if let Err(error) = self.sessions.save(&record) {
            warn!(%error, "failed to persist session record");
        }
        self.user = Some(record.clone());

        match self.connect().await {
            Ok(()) => {
                self.subscribe_trade_topics().await;
                self.hydrate().await;
            }
            Err(error) => warn!(%error, "websocket connect failed after login"),
        }

        Ok(record)
    }

    /// 登出请求失败只告警；本地会话与连接总是清理。
    pub async fn logout(&mut self) {
        if let Err(error) = self.gateway.trading_logout().await {
            warn!(%error, "logout request failed");
        }
        self.user = None;
        if let Err(error) = self.sessions.clear() {
            warn!(%error, "failed to clear session record");
        }
        self.disconnect().await;
    }

    pub async fn connect(&mut self) -> Result<(), ChannelError> {
        self.channel.connect().await?;
        self.after_connected().await;
        Ok(())
    }

    /// 整体拆除：订阅集合一次性清空（broker 侧状态已随连接消失），
    /// 再关闭通道。
    pub async fn disconnect(&mut self) {
        self.registry.clear();
        self.channel.disconnect().await;
    }

    /// 未连接时返回 `None` 并告警（非致命，调用方可稍后重试）。
    /// 同主题重复订阅幂等：只替换 handler，不重复向 broker 订阅。
    pub async fn subscribe(&mut self, topic: Topic, handler: TopicHandler) -> Option<u64> {
        if !self.channel.is_connected() {
            warn!(topic = topic.as_str(), "subscribe while disconnected");
            return None;
        }
        if self.registry.contains(&topic) {
            let id = self.registry.broker_id(&topic);
            self.registry.insert(topic, handler, 0);
            return id;
        }
        match self.channel.subscribe(topic.as_str()).await {
            Ok(id) => {
                self.registry.insert(topic, handler, id);
                Some(id)
            }
            Err(error) => {
                warn!(%error, "subscribe failed");
                None
            }
        }
    }

    pub async fn unsubscribe(&mut self, topic: &Topic) {
        if let Some(id) = self.registry.remove(topic) {
            if self.channel.is_connected() {
                if let Err(error) = self.channel.unsubscribe(id).await {
                    warn!(%error, topic = topic.as_str(), "unsubscribe frame failed");
                }
            }
        }
    }

    /// 订阅通用行情主题与各合约行情主题。
    pub async fn subscribe_market_data(&mut self, instruments: &[String]) {
        let handler = self.router.forwarding_handler();
        self.subscribe(Topic::market_data_all(), handler).await;
        for instrument in instruments {
            let handler = self.router.forwarding_handler();
            self.subscribe(Topic::market_data(instrument), handler).await;
        }
    }

    pub async fn unsubscribe_market_data(&mut self, instruments: &[String]) {
        self.unsubscribe(&Topic::market_data_all()).await;
        for instrument in instruments {
            self.unsubscribe(&Topic::market_data(instrument)).await;
        }
    }

    pub async fn subscribe_trade_topics(&mut self) {
        for topic in [Topic::orders(), Topic::trades(), Topic::login()] {
            let handler = self.router.forwarding_handler();
            self.subscribe(topic, handler).await;
        }
    }

    pub async fn unsubscribe_trade_topics(&mut self) {
        for topic in [Topic::orders(), Topic::trades(), Topic::login()] {
            self.unsubscribe(&topic).await;
        }
    }

    /// 行情选约：REST 登录/订阅失败只告警（非致命），
    /// websocket 订阅照常进行。
    pub async fn select_instruments(&mut self, instruments: &[String]) {
        if let Err(error) = self.gateway.market_login().await {
            warn!(%error, "market login failed");
        }
        if let Err(error) = self.gateway.subscribe_market(instruments).await {
            warn!(%error, "market data subscribe request failed");
        }
        if self.channel.is_connected() {
            self.subscribe_market_data(instruments).await;
        }
    }

    pub async fn place_order(
        &mut self,
        request: &PlaceOrderRequest,
    ) -> Result<String, RequestError> {
        let order_ref = self.gateway.place_order(request).await?;
        self.refresh_orders().await;
        Ok(order_ref)
    }

    pub async fn cancel_order(&mut self, request: &CancelOrderRequest) -> Result<(), RequestError> {
        self.gateway.cancel_order(request).await?;
        self.refresh_orders().await;
        Ok(())
    }

    /// 驱动通道事件循环，最多处理 `max_events` 个事件。
    /// 重连成功（`Connected` 事件）会把整个订阅集合回放一遍。
    pub async fn pump(&mut self, max_events: usize) -> Result<usize, ChannelError> {
        let mut processed = 0usize;
        while processed < max_events {
            let event = match self.channel.recv().await? {
                Some(event) => event,
                None => break,
            };
            match event {
                ChannelEvent::Connected => {
                    info!("channel connected, replaying subscriptions");
                    self.after_connected().await;
                }
                ChannelEvent::Message { topic, body } => {
                    if let Some(handler) = self.registry.handler_for(&topic) {
                        handler(&Topic::new(topic), &body);
                    } else {
                        // 退订后在途的帧：到此为止，不再分发。
                        debug!(topic = %topic, "frame for inactive topic dropped");
                    }
                }
            }
            processed += 1;
            if self.reconciler.take_refresh_request() {
                self.hydrate().await;
            }
        }
        Ok(processed)
    }

    /// 批量拉取并整表替换。单项失败只告警并保留旧数据。
    pub async fn hydrate(&mut self) {
        let store = self.reconciler.store();
        match self.gateway.query_orders().await {
            Ok(orders) => store
                .write()
                .expect("snapshot lock poisoned")
                .replace_orders(orders),
            Err(error) => warn!(%error, "order query failed during hydration"),
        }
        match self.gateway.query_positions().await {
            Ok(positions) => store
                .write()
                .expect("snapshot lock poisoned")
                .replace_positions(positions),
            Err(error) => warn!(%error, "position query failed during hydration"),
        }
        match self.gateway.query_account().await {
            Ok(account) => store
                .write()
                .expect("snapshot lock poisoned")
                .replace_account(account),
            Err(error) => warn!(%error, "account query failed during hydration"),
        }
    }

    pub fn snapshot(&self) -> Arc<RwLock<SnapshotStore>> {
        self.reconciler.store()
    }

    pub fn bus(&self) -> Arc<CallbackBus> {
        Arc::clone(&self.bus)
    }

    pub fn on(&self, kind: EventKind, callback: EventCallback) {
        self.bus.on(kind, callback);
    }

    pub fn off(&self, kind: EventKind, callback: &EventCallback) {
        self.bus.off(kind, callback);
    }

    pub fn on_state(&mut self, observer: StateObserver) {
        self.channel.on_state(observer);
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.channel.state()
    }

    pub fn active_topics(&self) -> Vec<Topic> {
        self.registry.topics()
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    pub fn channel(&self) -> &Channel<T> {
        &self.channel
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    async fn after_connected(&mut self) {
        self.replay_subscriptions().await;
        self.ensure_subscribed(Topic::connection()).await;
        self.ensure_subscribed(Topic::market_connection()).await;
    }

    /// 把登记过的每个主题重新向 broker 订阅一次，刷新订阅 id。
    async fn replay_subscriptions(&mut self) {
        for topic in self.registry.topics() {
            match self.channel.subscribe(topic.as_str()).await {
                Ok(id) => self.registry.update_broker_id(&topic, id),
                Err(error) => {
                    warn!(%error, topic = topic.as_str(), "subscription replay failed");
                }
            }
        }
    }

    async fn ensure_subscribed(&mut self, topic: Topic) {
        if self.registry.contains(&topic) {
            return;
        }
        let handler = self.router.forwarding_handler();
        self.subscribe(topic, handler).await;
    }

    async fn refresh_orders(&mut self) {
        match self.gateway.query_orders().await {
            Ok(orders) => {
                self.reconciler
                    .store()
                    .write()
                    .expect("snapshot lock poisoned")
                    .replace_orders(orders);
            }
            Err(error) => warn!(%error, "order refresh failed"),
        }
    }
}
