use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::frame::WireFrame;
use crate::transport::FrameTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Closed,
}

#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub interval_ms: u64,
    /// Total connect attempts before giving up. `None` retries indefinitely.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    pub connect_timeout_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub heartbeat_timeout_ms: u64,
    pub reconnect: ReconnectPolicy,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            heartbeat_interval_ms: 4000,
            heartbeat_timeout_ms: 12_000,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChannelStats {
    pub connects: u64,
    pub reconnects: u64,
    pub frames_in: u64,
    pub frames_out: u64,
    pub dropped_sends: u64,
    pub heartbeat_failures: u64,
}

/// What the owner sees from the pump. `Connected` is the replay signal: the
/// broker-side subscription state is gone and must be re-established.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Message { topic: String, body: String },
}

pub type StateObserver = Arc<dyn Fn(ConnectionState) + Send + Sync>;

pub struct Channel<T: FrameTransport> {
    transport: T,
    url: String,
    config: ChannelConfig,
    state: ConnectionState,
    attempts: u32,
    last_error: Option<ChannelError>,
    next_subscription_id: u64,
    last_seen: Option<Instant>,
    observers: Vec<StateObserver>,
    stats: ChannelStats,
}

impl<T: FrameTransport> Channel<T> {
    pub fn new(transport: T, url: impl Into<String>, config: ChannelConfig) -> Self {
        Self {
            transport,
            url: url.into(),
            config,
            state: ConnectionState::Disconnected,
            attempts: 0,
            last_error: None,
            next_subscription_id: 0,
            last_seen: None,
            observers: Vec::new(),
            stats: ChannelStats::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn last_error(&self) -> Option<&ChannelError> {
        self.last_error.as_ref()
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats.clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Every transition is reported, including repeated `Reconnecting` (one
    /// notification per failed attempt).
    pub fn on_state(&mut self, observer: StateObserver) {
        self.observers.push(observer);
    }

    fn transition(&mut self, state: ConnectionState) {
        self.state = state;
        for observer in &self.observers {
            observer(state);
        }
    }

    pub async fn connect(&mut self) -> Result<(), ChannelError> {
        if self.state == ConnectionState::Connected {
            return Ok(());
        }
        self.transition(ConnectionState::Connecting);
        self.attempts = 0;
        match self.attempt_connect().await {
            Ok(()) => {
                self.on_connected(false);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "connect failed, entering retry loop");
                self.last_error = Some(error);
                self.retry_until_connected().await
            }
        }
    }

    /// Idempotent. Also the only way to stop the reconnect loop for good.
    pub async fn disconnect(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.transport.close().await;
        self.last_seen = None;
        self.transition(ConnectionState::Closed);
    }

    /// Non-fatal when disconnected: the payload is dropped, logged and
    /// counted. Callers must not assume delivery.
    pub async fn send(&mut self, destination: &str, body: &str) {
        if self.state != ConnectionState::Connected {
            self.stats.dropped_sends += 1;
            warn!(destination, "send while not connected, dropping payload");
            return;
        }
        let frame = WireFrame::Send {
            destination: destination.to_string(),
            body: body.to_string(),
        };
        match self.transport.send(&frame).await {
            Ok(()) => self.stats.frames_out += 1,
            Err(error) => {
                warn!(%error, destination, "send failed, connection marked lost");
                self.last_error = Some(error);
                self.transition(ConnectionState::Disconnected);
            }
        }
    }

    pub async fn subscribe(&mut self, topic: &str) -> Result<u64, ChannelError> {
        if self.state != ConnectionState::Connected {
            return Err(ChannelError::NotConnected);
        }
        self.next_subscription_id += 1;
        let id = self.next_subscription_id;
        let frame = WireFrame::Subscribe {
            id,
            topic: topic.to_string(),
        };
        self.transport.send(&frame).await?;
        self.stats.frames_out += 1;
        Ok(id)
    }

    pub async fn unsubscribe(&mut self, id: u64) -> Result<(), ChannelError> {
        if self.state != ConnectionState::Connected {
            return Err(ChannelError::NotConnected);
        }
        self.transport.send(&WireFrame::Unsubscribe { id }).await?;
        self.stats.frames_out += 1;
        Ok(())
    }

    /// The pump. Yields message frames in arrival order and `Connected`
    /// after every recovery from an unexpected loss. Returns `Ok(None)` only
    /// after an explicit `disconnect`.
    pub async fn recv(&mut self) -> Result<Option<ChannelEvent>, ChannelError> {
        loop {
            match self.state {
                ConnectionState::Closed => return Ok(None),
                ConnectionState::Connected => {}
                _ => {
                    self.recover().await?;
                    return Ok(Some(ChannelEvent::Connected));
                }
            }

            let idle = Duration::from_millis(self.config.heartbeat_interval_ms);
            match tokio::time::timeout(idle, self.transport.recv()).await {
                Ok(Ok(Some(frame))) => {
                    self.last_seen = Some(Instant::now());
                    self.stats.frames_in += 1;
                    match frame {
                        WireFrame::Message { topic, body } => {
                            return Ok(Some(ChannelEvent::Message { topic, body }));
                        }
                        WireFrame::Ping => {
                            if let Err(error) = self.transport.send(&WireFrame::Pong).await {
                                warn!(%error, "pong failed, treating as connection loss");
                                self.recover().await?;
                                return Ok(Some(ChannelEvent::Connected));
                            }
                            self.stats.frames_out += 1;
                        }
                        WireFrame::Pong => {}
                        other => debug!(?other, "ignoring unexpected frame from broker"),
                    }
                }
                Ok(Ok(None)) => {
                    warn!("broker closed the connection unexpectedly");
                    self.recover().await?;
                    return Ok(Some(ChannelEvent::Connected));
                }
                Ok(Err(error)) => {
                    warn!(%error, "transport error, reconnecting");
                    self.last_error = Some(error);
                    self.recover().await?;
                    return Ok(Some(ChannelEvent::Connected));
                }
                Err(_) => {
                    let silent = self
                        .last_seen
                        .map(|seen| seen.elapsed())
                        .unwrap_or_default();
                    if silent >= Duration::from_millis(self.config.heartbeat_timeout_ms) {
                        self.stats.heartbeat_failures += 1;
                        warn!(
                            silent_ms = silent.as_millis() as u64,
                            "heartbeat timeout, reconnecting"
                        );
                        self.recover().await?;
                        return Ok(Some(ChannelEvent::Connected));
                    }
                    if let Err(error) = self.transport.send(&WireFrame::Ping).await {
                        warn!(%error, "ping failed, treating as connection loss");
                        self.recover().await?;
                        return Ok(Some(ChannelEvent::Connected));
                    }
                    self.stats.frames_out += 1;
                }
            }
        }
    }

    async fn attempt_connect(&mut self) -> Result<(), ChannelError> {
        self.attempts += 1;
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        match tokio::time::timeout(timeout, self.transport.connect(&self.url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(error),
            Err(_) => Err(ChannelError::HandshakeTimeout(self.config.connect_timeout_ms)),
        }
    }

    fn on_connected(&mut self, reconnect: bool) {
        self.attempts = 0;
        self.last_error = None;
        self.last_seen = Some(Instant::now());
        self.stats.connects += 1;
        if reconnect {
            self.stats.reconnects += 1;
        }
        self.transition(ConnectionState::Connected);
    }

    async fn recover(&mut self) -> Result<(), ChannelError> {
        self.transport.close().await;
        self.attempts = 0;
        self.retry_until_connected().await
    }

    async fn retry_until_connected(&mut self) -> Result<(), ChannelError> {
        loop {
            if let Some(max) = self.config.reconnect.max_attempts {
                if self.attempts >= max {
                    self.transition(ConnectionState::Disconnected);
                    return Err(ChannelError::RetriesExhausted(self.attempts));
                }
            }
            self.transition(ConnectionState::Reconnecting);
            tokio::time::sleep(Duration::from_millis(self.config.reconnect.interval_ms)).await;
            match self.attempt_connect().await {
                Ok(()) => {
                    self.on_connected(true);
                    return Ok(());
                }
                Err(error) => {
                    warn!(%error, attempt = self.attempts, "reconnect attempt failed");
                    self.last_error = Some(error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Channel, ChannelConfig, ChannelEvent, ConnectionState, ReconnectPolicy};
    use crate::frame::WireFrame;
    use crate::transport::{MockStep, MockTransport};

    fn quiet_config() -> ChannelConfig {
        ChannelConfig {
            connect_timeout_ms: 1000,
            heartbeat_interval_ms: 60_000,
            heartbeat_timeout_ms: 180_000,
            reconnect: ReconnectPolicy {
                interval_ms: 0,
                max_attempts: None,
            },
        }
    }

    fn message(topic: &str, body: &str) -> MockStep {
        MockStep::Frame(WireFrame::Message {
            topic: topic.to_string(),
            body: body.to_string(),
        })
    }

    #[tokio::test]
    async fn send_before_connect_is_dropped_and_counted() {
        let mut channel = Channel::new(MockTransport::new(vec![]), "mock://broker", quiet_config());
        channel.send("/app/order", "{}").await;

        assert_eq!(channel.stats().dropped_sends, 1);
        assert!(channel.transport().sent.is_empty());
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let mut channel = Channel::new(MockTransport::new(vec![]), "mock://broker", quiet_config());
        channel.connect().await.expect("connect");

        channel.disconnect().await;
        channel.disconnect().await;

        assert_eq!(channel.state(), ConnectionState::Closed);
        assert_eq!(channel.recv().await.expect("closed pump"), None);
    }

    #[tokio::test]
    async fn inbound_ping_is_answered_with_pong() {
        let transport = MockTransport::new(vec![
            MockStep::Frame(WireFrame::Ping),
            message("/topic/orders", "{}"),
        ]);
        let mut channel = Channel::new(transport, "mock://broker", quiet_config());
        channel.connect().await.expect("connect");

        let event = channel.recv().await.expect("pump").expect("event");
        assert!(matches!(event, ChannelEvent::Message { .. }));
        assert!(channel.transport().sent.contains(&WireFrame::Pong));
    }

    #[tokio::test]
    async fn subscription_ids_are_unique_and_frames_go_out() {
        let mut channel = Channel::new(MockTransport::new(vec![]), "mock://broker", quiet_config());
        channel.connect().await.expect("connect");

        let a = channel.subscribe("/topic/orders").await.expect("subscribe");
        let b = channel.subscribe("/topic/trades").await.expect("subscribe");

        assert_ne!(a, b);
        assert_eq!(
            channel.transport().sent_subscriptions(),
            vec![(a, "/topic/orders".to_string()), (b, "/topic/trades".to_string())]
        );
    }
}
