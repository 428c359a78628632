use serde::{Deserialize, Serialize};

/// 持仓记录。来自批量查询，整表替换，不做增量合并。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub instrument_id: String,
    /// 柜台持仓方向码（不同柜台取值不同，原样保留）。
    pub direction: String,
    pub volume: u64,
    pub today_volume: u64,
    pub avg_price: f64,
    pub margin: f64,
    pub float_profit: f64,
}

/// 资金账户。整体替换。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub balance: f64,
    pub available: f64,
    pub margin: f64,
    pub frozen_margin: f64,
    pub close_profit: f64,
    pub position_profit: f64,
}
