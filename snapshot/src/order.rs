use dispatch::OrderEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// 柜台方向码："0" 为买，其余为卖。
    pub fn from_code(code: &str) -> Self {
        if code == "0" { Self::Buy } else { Self::Sell }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Buy => "0",
            Self::Sell => "1",
        }
    }
}

/// 报单状态，未知柜台码显式归入 `Unknown` 而不是报错。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    AllTraded,
    PartTraded,
    NotTraded,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => Self::AllTraded,
            "1" => Self::PartTraded,
            "3" => Self::NotTraded,
            "5" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AllTraded => "全部成交",
            Self::PartTraded => "部分成交",
            Self::NotTraded => "未成交",
            Self::Cancelled => "已撤销",
            Self::Unknown => "未知状态",
        }
    }
}

/// 报单记录，按 order id 做 upsert。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub time: String,
    pub symbol: String,
    pub direction: Direction,
    pub price: f64,
    pub quantity: u64,
    pub filled: u64,
    pub status: OrderStatus,
}

impl Order {
    pub fn from_event(event: &OrderEvent) -> Self {
        Self {
            id: event.order_ref.clone(),
            time: event.insert_time.clone(),
            symbol: event.instrument_id.clone(),
            direction: Direction::from_code(&event.direction),
            price: event.limit_price,
            quantity: event.volume_total_original,
            filled: event.volume_traded,
            status: OrderStatus::from_code(&event.order_status),
        }
    }
}
