use channel::{MockStep, MockTransport, WireFrame};
use gateway::MockGateway;
use snapshot::Account;

use crate::config::TerminalConfig;
use crate::logging::init_logging;
use crate::session::TerminalSession;

fn message(topic: &str, body: &str) -> MockStep {
    MockStep::Frame(WireFrame::Message {
        topic: topic.to_string(),
        body: body.to_string(),
    })
}

/// 脚本化演示：mock 通道 + mock 柜台，跑一轮登录/订阅/推送/落库。
pub fn run_demo() {
    init_logging();
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(error) => {
            eprintln!("failed to build runtime: {}", error);
            return;
        }
    };
    runtime.block_on(run_demo_session());
}

async fn run_demo_session() {
    let mut config = TerminalConfig::default();
    config.session_file = std::env::temp_dir().join("terminal-demo-session.json");
    config.reconnect_interval_ms = 10;

    let transport = MockTransport::new(vec![
        message(
            "/topic/market/data/rb2405",
            r#"{"instrumentId":"rb2405","lastPrice":3700.0,"preClosePrice":3650.0,"openPrice":3660.0,"highestPrice":3712.0,"lowestPrice":3655.0,"volume":120045,"openInterest":230180.0,"bidPrice1":3699.0,"bidVolume1":12,"askPrice1":3701.0,"askVolume1":8,"updateTime":"09:31:05"}"#,
        ),
        message(
            "/topic/orders",
            r#"{"orderRef":"1001","instrumentId":"rb2405","direction":"0","limitPrice":3702.0,"volumeTotalOriginal":5,"volumeTraded":2,"orderStatus":"1","insertTime":"09:31:05"}"#,
        ),
        message(
            "/topic/trades",
            r#"{"tradeId":"t-1","instrumentId":"rb2405","direction":"0","price":3702.0,"volume":2,"tradeTime":"09:31:06"}"#,
        ),
    ]);

    let mut gateway = MockGateway::new();
    gateway.account = Some(Account {
        balance: 1_000_000.0,
        available: 920_000.0,
        ..Account::default()
    });

    let mut session = TerminalSession::new(transport, gateway, &config);

    let user = match session.login("demo").await {
        Ok(user) => user,
        Err(error) => {
            println!("login failed: {}", error);
            return;
        }
    };
    println!("login ok user={}", user.username);

    session.select_instruments(&["rb2405".to_string()]).await;

    let processed = match session.pump(3).await {
        Ok(count) => count,
        Err(error) => {
            println!("pump error: {}", error);
            return;
        }
    };
    println!("pump processed={}", processed);

    let store = session.snapshot();
    {
        let guard = store.read().expect("snapshot lock poisoned");
        for quote in guard.quotes() {
            println!(
                "quote symbol={} price={} change={} percent={}",
                quote.symbol, quote.price, quote.change, quote.change_percent
            );
        }
        for order in guard.orders() {
            println!(
                "order id={} symbol={} filled={}/{} status={}",
                order.id,
                order.symbol,
                order.filled,
                order.quantity,
                order.status.label()
            );
        }
        println!(
            "trades={} positions={} account_balance={:?}",
            guard.trades().len(),
            guard.positions().len(),
            guard.account().map(|a| a.balance)
        );
    }

    session.logout().await;
    println!("terminal session closed");
}
