use std::collections::HashMap;

use crate::account::{Account, Position};
use crate::order::Order;
use crate::quote::Quote;
use crate::trade::Trade;

/// 终端可见的统一内存快照。由 `Reconciler` 独占写入，
/// 所有变更都经由这里的类型化操作。
#[derive(Debug, Default)]
pub struct SnapshotStore {
    quotes: HashMap<String, Quote>,
    orders: Vec<Order>,
    trades: Vec<Trade>,
    positions: Vec<Position>,
    account: Option<Account>,
    trading_connected: bool,
    market_connected: bool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整条替换同合约的行情记录（绝不做字段级合并）。
    pub fn upsert_quote(&mut self, quote: Quote) {
        self.quotes.insert(quote.symbol.clone(), quote);
    }

    pub fn quote(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    pub fn quote_count(&self) -> usize {
        self.quotes.len()
    }

    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.values()
    }

    pub fn clear_market_data(&mut self) {
        self.quotes.clear();
    }

    /// 按 order id upsert：已存在则原位替换（保持列表位置），
    /// 新 id 插到列表最前。
    pub fn upsert_order(&mut self, order: Order) {
        if let Some(existing) = self.orders.iter_mut().find(|o| o.id == order.id) {
            *existing = order;
        } else {
            self.orders.insert(0, order);
        }
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// 成交只追加（最新在前），写入后不变更、不去重。
    pub fn push_trade(&mut self, trade: Trade) {
        self.trades.insert(0, trade);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn replace_orders(&mut self, orders: Vec<Order>) {
        self.orders = orders;
    }

    pub fn replace_positions(&mut self, positions: Vec<Position>) {
        self.positions = positions;
    }

    pub fn replace_account(&mut self, account: Option<Account>) {
        self.account = account;
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn set_trading_connected(&mut self, connected: bool) {
        self.trading_connected = connected;
    }

    pub fn set_market_connected(&mut self, connected: bool) {
        self.market_connected = connected;
    }

    pub fn trading_connected(&self) -> bool {
        self.trading_connected
    }

    pub fn market_connected(&self) -> bool {
        self.market_connected
    }
}
