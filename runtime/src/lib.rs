pub mod config;
pub mod demo;
pub mod logging;
pub mod session;
pub mod session_store;

pub use config::{ConfigError, TerminalConfig};
pub use demo::run_demo;
pub use logging::init_logging;
pub use session::TerminalSession;
pub use session_store::{SessionStore, UserRecord};
