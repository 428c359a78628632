use dispatch::TradeEvent;
use serde::{Deserialize, Serialize};

use crate::order::Direction;

/// 成交记录。写入后不再变更，也不做去重（接受 at-least-once 投递）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub time: String,
    pub symbol: String,
    pub direction: Direction,
    pub price: f64,
    pub quantity: u64,
    pub amount: f64,
}

impl Trade {
    pub fn from_event(event: &TradeEvent) -> Self {
        Self {
            id: event.trade_id.clone(),
            time: event.trade_time.clone(),
            symbol: event.instrument_id.clone(),
            direction: Direction::from_code(&event.direction),
            price: event.price,
            quantity: event.volume,
            amount: event.price * event.volume as f64,
        }
    }
}
