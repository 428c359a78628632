use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use channel::{ConnectionState, MockStep, MockTransport, WireFrame};
use dispatch::{EventKind, EventMessage, Topic};
use gateway::MockGateway;
use runtime::{SessionStore, TerminalConfig, TerminalSession, UserRecord};
use snapshot::{Account, Direction, Order, OrderStatus};

fn test_config(tag: &str) -> TerminalConfig {
    let mut config = TerminalConfig::default();
    config.ws_url = "mock://broker".to_string();
    config.reconnect_interval_ms = 0;
    config.heartbeat_interval_ms = 60_000;
    config.heartbeat_timeout_ms = 180_000;
    config.session_file = std::env::temp_dir().join(format!(
        "terminal-session-{}-{}.json",
        tag,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&config.session_file);
    config
}

fn message(topic: &str, body: &str) -> MockStep {
    MockStep::Frame(WireFrame::Message {
        topic: topic.to_string(),
        body: body.to_string(),
    })
}

fn quote_frame() -> MockStep {
    message(
        "/topic/market/data/rb2405",
        r#"{"instrumentId":"rb2405","lastPrice":3700.0,"preClosePrice":3650.0,"volume":120045}"#,
    )
}

fn order_frame() -> MockStep {
    message(
        "/topic/orders",
        r#"{"orderRef":"1001","instrumentId":"rb2405","direction":"0","limitPrice":3702.0,"volumeTotalOriginal":5,"volumeTraded":2,"orderStatus":"1","insertTime":"09:31:05"}"#,
    )
}

fn trade_frame(trade_id: &str) -> MockStep {
    message(
        "/topic/trades",
        &format!(
            r#"{{"tradeId":"{}","instrumentId":"rb2405","direction":"0","price":3702.0,"volume":2,"tradeTime":"09:31:06"}}"#,
            trade_id
        ),
    )
}

fn seeded_order(id: &str) -> Order {
    Order {
        id: id.to_string(),
        time: "09:00:00".to_string(),
        symbol: "rb2405".to_string(),
        direction: Direction::Buy,
        price: 3690.0,
        quantity: 3,
        filled: 0,
        status: OrderStatus::NotTraded,
    }
}

#[tokio::test]
async fn login_connects_subscribes_and_hydrates() {
    let config = test_config("login");
    let mut gateway = MockGateway::new();
    gateway.orders = vec![seeded_order("9001")];
    gateway.account = Some(Account {
        balance: 500_000.0,
        ..Account::default()
    });
    let mut session = TerminalSession::new(MockTransport::new(vec![]), gateway, &config);

    let user = session.login("trader01").await.expect("login succeeds");

    assert_eq!(user.username, "trader01");
    assert!(user.trading_status && user.market_status);
    assert_eq!(session.connection_state(), ConnectionState::Connected);

    let topics: HashSet<String> = session
        .active_topics()
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    for expected in [
        "/topic/connection",
        "/topic/market/connection",
        "/topic/orders",
        "/topic/trades",
        "/topic/login",
    ] {
        assert!(topics.contains(expected), "missing topic {}", expected);
    }

    let store = session.snapshot();
    {
        let guard = store.read().expect("snapshot lock");
        assert_eq!(guard.orders().len(), 1);
        assert_eq!(guard.account().expect("account hydrated").balance, 500_000.0);
    }

    assert!(config.session_file.exists(), "session record persisted");
    session.logout().await;
    assert!(!config.session_file.exists(), "session record cleared");
}

#[tokio::test]
async fn rejected_login_surfaces_the_error_and_writes_nothing() {
    let config = test_config("login-fail");
    let mut gateway = MockGateway::new();
    gateway.trading_login_ok = false;
    let mut session = TerminalSession::new(MockTransport::new(vec![]), gateway, &config);

    let error = session.login("trader01").await.expect_err("must fail");

    assert_eq!(error.to_string(), "request rejected: 交易系统登录失败");
    assert!(session.user().is_none());
    assert!(!config.session_file.exists());
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn market_frame_produces_the_derived_quote() {
    let config = test_config("quote");
    let transport = MockTransport::new(vec![quote_frame()]);
    let mut session = TerminalSession::new(transport, MockGateway::new(), &config);

    session.login("trader01").await.expect("login");
    session.select_instruments(&["rb2405".to_string()]).await;
    let processed = session.pump(1).await.expect("pump");
    assert_eq!(processed, 1);

    let store = session.snapshot();
    let guard = store.read().expect("snapshot lock");
    let quote = guard.quote("rb2405").expect("quote stored");
    assert_eq!(quote.price, 3700.0);
    assert_eq!(quote.change, 50.0);
    assert_eq!(quote.change_percent, "1.37");
    drop(guard);

    let _ = std::fs::remove_file(&config.session_file);
}

#[tokio::test]
async fn order_frame_upserts_with_the_mapped_status_label() {
    let config = test_config("order");
    let transport = MockTransport::new(vec![order_frame()]);
    let mut session = TerminalSession::new(transport, MockGateway::new(), &config);

    session.login("trader01").await.expect("login");
    session.pump(1).await.expect("pump");

    let store = session.snapshot();
    let guard = store.read().expect("snapshot lock");
    assert_eq!(guard.orders().len(), 1);
    let order = guard.order("1001").expect("order stored");
    assert_eq!(order.status, OrderStatus::PartTraded);
    assert_eq!(order.status.label(), "部分成交");
    assert_eq!(order.filled, 2);
    drop(guard);

    let _ = std::fs::remove_file(&config.session_file);
}

#[tokio::test]
async fn reconnect_replays_every_topic_exactly_once() {
    let config = test_config("reconnect");
    let transport = MockTransport::new(vec![MockStep::PeerClose, quote_frame()]);
    let mut session = TerminalSession::new(transport, MockGateway::new(), &config);

    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&states);
    session.on_state(Arc::new(move |state| {
        sink.lock().expect("state sink").push(state);
    }));

    session.login("trader01").await.expect("login");
    session.select_instruments(&["rb2405".to_string()]).await;

    let before: HashSet<String> = session
        .active_topics()
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    let initial_subscribes = session.channel().transport().sent_subscriptions();
    assert_eq!(initial_subscribes.len(), before.len());
    let max_initial_id = initial_subscribes
        .iter()
        .map(|(id, _)| *id)
        .max()
        .expect("initial subscriptions present");

    // 断线 → 自动重连 → 回放；随后的行情帧照常分发。
    let processed = session.pump(2).await.expect("pump");
    assert_eq!(processed, 2);

    let after: HashSet<String> = session
        .active_topics()
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    assert_eq!(after, before);

    let replayed: Vec<String> = session
        .channel()
        .transport()
        .sent_subscriptions()
        .into_iter()
        .filter(|(id, _)| *id > max_initial_id)
        .map(|(_, topic)| topic)
        .collect();
    assert_eq!(replayed.len(), before.len(), "one replay per topic");
    assert_eq!(
        replayed.iter().cloned().collect::<HashSet<_>>(),
        before,
        "replay covers exactly the active set"
    );

    assert_eq!(
        *states.lock().expect("state sink"),
        vec![
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Reconnecting,
            ConnectionState::Connected,
        ]
    );

    let store = session.snapshot();
    assert!(store.read().expect("snapshot lock").quote("rb2405").is_some());

    let _ = std::fs::remove_file(&config.session_file);
}

#[tokio::test]
async fn unsubscribe_stops_dispatch_for_later_frames() {
    let config = test_config("unsubscribe");
    let transport = MockTransport::new(vec![trade_frame("t-1"), trade_frame("t-2")]);
    let mut session = TerminalSession::new(transport, MockGateway::new(), &config);

    session.login("trader01").await.expect("login");
    session.pump(1).await.expect("pump");
    {
        let store = session.snapshot();
        assert_eq!(store.read().expect("snapshot lock").trades().len(), 1);
    }

    session.unsubscribe(&Topic::trades()).await;
    assert!(
        session
            .channel()
            .transport()
            .sent
            .iter()
            .any(|frame| matches!(frame, WireFrame::Unsubscribe { .. })),
        "unsubscribe frame sent to the broker"
    );

    // 第二条成交帧仍会到达，但不再分发。
    let processed = session.pump(1).await.expect("pump");
    assert_eq!(processed, 1);
    let store = session.snapshot();
    assert_eq!(store.read().expect("snapshot lock").trades().len(), 1);

    let _ = std::fs::remove_file(&config.session_file);
}

#[tokio::test]
async fn subscribe_while_disconnected_returns_none() {
    let config = test_config("offline-subscribe");
    let mut session =
        TerminalSession::new(MockTransport::new(vec![]), MockGateway::new(), &config);

    let handle = session
        .subscribe(Topic::orders(), Arc::new(|_, _| {}))
        .await;

    assert_eq!(handle, None);
    assert!(session.active_topics().is_empty());
}

#[tokio::test]
async fn duplicate_subscribe_is_idempotent_per_topic() {
    let config = test_config("idempotent");
    let mut session =
        TerminalSession::new(MockTransport::new(vec![]), MockGateway::new(), &config);
    session.login("trader01").await.expect("login");

    let first = session
        .subscribe(Topic::market_data_all(), Arc::new(|_, _| {}))
        .await
        .expect("first subscribe");
    let second = session
        .subscribe(Topic::market_data_all(), Arc::new(|_, _| {}))
        .await
        .expect("second subscribe");

    assert_eq!(first, second, "same broker handle");
    let frames_for_topic = session
        .channel()
        .transport()
        .sent_subscriptions()
        .into_iter()
        .filter(|(_, topic)| topic == "/topic/market/data")
        .count();
    assert_eq!(frames_for_topic, 1, "broker subscribed once");

    let _ = std::fs::remove_file(&config.session_file);
}

#[tokio::test]
async fn startup_restores_a_persisted_session_and_hydrates() {
    let config = test_config("startup");
    let record = UserRecord {
        username: "trader01".to_string(),
        trading_status: true,
        market_status: true,
        login_time: "2024-03-01T09:00:00+08:00".to_string(),
    };
    SessionStore::new(config.session_file.clone())
        .save(&record)
        .expect("seed session record");

    let mut gateway = MockGateway::new();
    gateway.orders = vec![seeded_order("9001")];
    let mut session = TerminalSession::new(MockTransport::new(vec![]), gateway, &config);

    let restored = session.startup().await.expect("session restored");
    assert_eq!(restored, record);
    assert_eq!(session.connection_state(), ConnectionState::Connected);
    assert!(
        session
            .active_topics()
            .iter()
            .any(|t| t.as_str() == "/topic/orders")
    );
    let store = session.snapshot();
    assert_eq!(store.read().expect("snapshot lock").orders().len(), 1);

    let _ = std::fs::remove_file(&config.session_file);
}

#[tokio::test]
async fn startup_without_a_record_stays_offline() {
    let config = test_config("startup-empty");
    let mut session =
        TerminalSession::new(MockTransport::new(vec![]), MockGateway::new(), &config);

    assert_eq!(session.startup().await, None);
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
    assert!(session.active_topics().is_empty());
}

#[tokio::test]
async fn select_instruments_survives_a_rejected_market_login() {
    let config = test_config("select");
    let mut session =
        TerminalSession::new(MockTransport::new(vec![]), MockGateway::new(), &config);

    session.login("trader01").await.expect("login");
    // 选约时的行情登录被拒不致命。
    session.gateway_mut().market_login_ok = false;
    session.select_instruments(&["rb2405".to_string()]).await;

    assert!(
        session
            .active_topics()
            .iter()
            .any(|t| t.as_str() == "/topic/market/data/rb2405"),
        "websocket subscription proceeds despite the REST failure"
    );
    assert!(
        session
            .gateway()
            .calls
            .iter()
            .any(|c| c == "subscribe_market:rb2405")
    );

    let _ = std::fs::remove_file(&config.session_file);
}

#[tokio::test]
async fn ui_consumers_observe_events_alongside_the_reconciler() {
    let config = test_config("ui-consumer");
    let transport = MockTransport::new(vec![quote_frame()]);
    let mut session = TerminalSession::new(transport, MockGateway::new(), &config);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.on(
        EventKind::MarketData,
        Arc::new(move |message: &EventMessage| {
            if let EventMessage::MarketData(tick) = message {
                sink.lock().expect("seen lock").push(tick.instrument_id.clone());
            }
        }),
    );

    session.login("trader01").await.expect("login");
    session.select_instruments(&["rb2405".to_string()]).await;
    session.pump(1).await.expect("pump");

    assert_eq!(*seen.lock().expect("seen lock"), vec!["rb2405".to_string()]);
    let store = session.snapshot();
    assert!(store.read().expect("snapshot lock").quote("rb2405").is_some());

    let _ = std::fs::remove_file(&config.session_file);
}

#[tokio::test]
async fn placing_an_order_refreshes_the_order_list() {
    let config = test_config("place-order");
    let mut session =
        TerminalSession::new(MockTransport::new(vec![]), MockGateway::new(), &config);
    session.login("trader01").await.expect("login");

    let order_ref = session
        .place_order(&gateway::PlaceOrderRequest {
            instrument_id: "rb2405".to_string(),
            direction: Direction::Buy,
            offset_flag: gateway::OffsetFlag::Open,
            price: 3700.0,
            volume: 2,
        })
        .await
        .expect("place order");

    let store = session.snapshot();
    let guard = store.read().expect("snapshot lock");
    assert_eq!(guard.orders().len(), 1);
    assert_eq!(guard.orders()[0].id, order_ref);
    drop(guard);

    session
        .cancel_order(&gateway::CancelOrderRequest {
            order_ref: order_ref.clone(),
            instrument_id: "rb2405".to_string(),
        })
        .await
        .expect("cancel order");

    let guard = store.read().expect("snapshot lock");
    assert_eq!(guard.orders()[0].status, OrderStatus::Cancelled);
    drop(guard);

    let _ = std::fs::remove_file(&config.session_file);
}

#[tokio::test]
async fn login_push_triggers_a_one_time_bulk_refresh() {
    let config = test_config("login-push");
    let transport = MockTransport::new(vec![message(
        "/topic/login",
        r#"{"success":true,"message":"已登录"}"#,
    )]);
    let mut session = TerminalSession::new(transport, MockGateway::new(), &config);

    session.login("trader01").await.expect("login");
    {
        let store = session.snapshot();
        assert!(store.read().expect("snapshot lock").positions().is_empty());
    }

    // 登录后柜台侧出现新持仓；登录状态推送应触发第二轮批量查询。
    session.gateway_mut().positions = vec![snapshot::Position {
        instrument_id: "rb2405".to_string(),
        direction: "2".to_string(),
        volume: 4,
        ..snapshot::Position::default()
    }];
    let calls_before = session.gateway().calls.len();
    session.pump(1).await.expect("pump");

    assert!(session.gateway().calls.len() > calls_before);
    let store = session.snapshot();
    assert_eq!(store.read().expect("snapshot lock").positions().len(), 1);

    let _ = std::fs::remove_file(&config.session_file);
}
