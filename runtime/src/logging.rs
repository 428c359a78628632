use tracing::Level;

pub fn init_logging() {
    let level = match std::env::var("TERMINAL_LOG").ok().as_deref() {
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        _ => Level::INFO,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .try_init();
}
