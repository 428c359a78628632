use dispatch::QuoteTick;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DepthLevel {
    pub price: f64,
    pub volume: u64,
}

/// 单合约行情记录，快照中每个合约至多一条。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub amount: f64,
    pub pre_close: f64,
    pub upper_limit: f64,
    pub lower_limit: f64,
    pub open_interest: f64,
    pub update_time: String,
    pub bids: [DepthLevel; 3],
    pub asks: [DepthLevel; 3],
}

impl Quote {
    /// 由一条行情推送整体构建。派生字段（涨跌额/涨跌幅）每次由原始
    /// 字段重算，绝不沿用上一条记录的值。
    pub fn from_tick(tick: &QuoteTick) -> Self {
        let change = tick.last_price - tick.pre_close_price;
        let change_percent = if tick.pre_close_price > 0.0 {
            format!("{:.2}", change / tick.pre_close_price * 100.0)
        } else {
            "0.00".to_string()
        };

        Self {
            symbol: tick.instrument_id.clone(),
            price: tick.last_price,
            change,
            change_percent,
            open: tick.open_price,
            high: tick.highest_price,
            low: tick.lowest_price,
            volume: tick.volume,
            amount: tick.turnover,
            pre_close: tick.pre_close_price,
            upper_limit: tick.upper_limit_price,
            lower_limit: tick.lower_limit_price,
            open_interest: tick.open_interest,
            update_time: tick.update_time.clone(),
            bids: [
                DepthLevel {
                    price: tick.bid_price1,
                    volume: tick.bid_volume1,
                },
                DepthLevel {
                    price: tick.bid_price2,
                    volume: tick.bid_volume2,
                },
                DepthLevel {
                    price: tick.bid_price3,
                    volume: tick.bid_volume3,
                },
            ],
            asks: [
                DepthLevel {
                    price: tick.ask_price1,
                    volume: tick.ask_volume1,
                },
                DepthLevel {
                    price: tick.ask_price2,
                    volume: tick.ask_volume2,
                },
                DepthLevel {
                    price: tick.ask_price3,
                    volume: tick.ask_volume3,
                },
            ],
        }
    }
}
