//! 主题命名空间模块。
//!
//! 静态主题为固定目的地；行情主题可按合约参数化。`Topic` 一经构造不可变。

pub const CONNECTION: &str = "/topic/connection";
pub const LOGIN: &str = "/topic/login";
pub const ORDERS: &str = "/topic/orders";
pub const TRADES: &str = "/topic/trades";
pub const MARKET_CONNECTION: &str = "/topic/market/connection";
pub const MARKET_DATA: &str = "/topic/market/data";
pub const MARKET_DATA_PREFIX: &str = "/topic/market/data/";

/// broker 目的地标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
	pub fn new(raw: impl Into<String>) -> Self {
		Self(raw.into())
	}

	pub fn connection() -> Self {
		Self::new(CONNECTION)
	}

	pub fn login() -> Self {
		Self::new(LOGIN)
	}

	pub fn orders() -> Self {
		Self::new(ORDERS)
	}

	pub fn trades() -> Self {
		Self::new(TRADES)
	}

	pub fn market_connection() -> Self {
		Self::new(MARKET_CONNECTION)
	}

	/// 通用行情主题（不区分合约）。
	pub fn market_data_all() -> Self {
		Self::new(MARKET_DATA)
	}

	/// 指定合约的行情主题。
	pub fn market_data(instrument: &str) -> Self {
		Self::new(format!("{}{}", MARKET_DATA_PREFIX, instrument))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for Topic {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}
