use snapshot::{Account, Direction, Order, OrderStatus, Position, Trade};

use crate::api::{CancelOrderRequest, InstrumentInfo, PlaceOrderRequest, RequestError};
use crate::protocol::TradingGateway;

/// 可脚本化的柜台替身：记录每次调用，按开关决定成败。
pub struct MockGateway {
    pub trading_login_ok: bool,
    pub market_login_ok: bool,
    pub orders: Vec<Order>,
    pub trades: Vec<Trade>,
    pub positions: Vec<Position>,
    pub account: Option<Account>,
    pub instruments: Vec<InstrumentInfo>,
    pub subscribed: Vec<String>,
    pub calls: Vec<String>,
    next_order_ref: u64,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            trading_login_ok: true,
            market_login_ok: true,
            orders: Vec::new(),
            trades: Vec::new(),
            positions: Vec::new(),
            account: None,
            instruments: Vec::new(),
            subscribed: Vec::new(),
            calls: Vec::new(),
            next_order_ref: 0,
        }
    }

    fn record(&mut self, call: impl Into<String>) {
        self.calls.push(call.into());
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl TradingGateway for MockGateway {
    async fn trading_login(&mut self) -> Result<(), RequestError> {
        self.record("trading_login");
        if self.trading_login_ok {
            Ok(())
        } else {
            Err(RequestError::Rejected {
                message: "交易系统登录失败".to_string(),
            })
        }
    }

    async fn trading_logout(&mut self) -> Result<(), RequestError> {
        self.record("trading_logout");
        Ok(())
    }

    async fn market_login(&mut self) -> Result<(), RequestError> {
        self.record("market_login");
        if self.market_login_ok {
            Ok(())
        } else {
            Err(RequestError::Rejected {
                message: "行情系统登录失败".to_string(),
            })
        }
    }

    async fn place_order(&mut self, request: &PlaceOrderRequest) -> Result<String, RequestError> {
        self.record(format!("place_order:{}", request.instrument_id));
        self.next_order_ref += 1;
        let order_ref = format!("mock-{}", self.next_order_ref);
        self.orders.insert(
            0,
            Order {
                id: order_ref.clone(),
                time: String::new(),
                symbol: request.instrument_id.clone(),
                direction: request.direction,
                price: request.price,
                quantity: request.volume,
                filled: 0,
                status: OrderStatus::NotTraded,
            },
        );
        Ok(order_ref)
    }

    async fn cancel_order(&mut self, request: &CancelOrderRequest) -> Result<(), RequestError> {
        self.record(format!("cancel_order:{}", request.order_ref));
        match self.orders.iter_mut().find(|o| o.id == request.order_ref) {
            Some(order) => {
                order.status = OrderStatus::Cancelled;
                Ok(())
            }
            None => Err(RequestError::Rejected {
                message: "报单不存在".to_string(),
            }),
        }
    }

    async fn query_orders(&mut self) -> Result<Vec<Order>, RequestError> {
        self.record("query_orders");
        Ok(self.orders.clone())
    }

    async fn query_trades(&mut self) -> Result<Vec<Trade>, RequestError> {
        self.record("query_trades");
        Ok(self.trades.clone())
    }

    async fn query_positions(&mut self) -> Result<Vec<Position>, RequestError> {
        self.record("query_positions");
        Ok(self.positions.clone())
    }

    async fn query_account(&mut self) -> Result<Option<Account>, RequestError> {
        self.record("query_account");
        Ok(self.account.clone())
    }

    async fn subscribe_market(&mut self, instruments: &[String]) -> Result<(), RequestError> {
        self.record(format!("subscribe_market:{}", instruments.join(",")));
        for instrument in instruments {
            if !self.subscribed.contains(instrument) {
                self.subscribed.push(instrument.clone());
            }
        }
        Ok(())
    }

    async fn unsubscribe_market(&mut self, instruments: &[String]) -> Result<(), RequestError> {
        self.record(format!("unsubscribe_market:{}", instruments.join(",")));
        self.subscribed.retain(|x| !instruments.contains(x));
        Ok(())
    }

    async fn query_instrument(
        &mut self,
        instrument_id: &str,
    ) -> Result<Option<InstrumentInfo>, RequestError> {
        self.record(format!("query_instrument:{}", instrument_id));
        Ok(self
            .instruments
            .iter()
            .find(|x| x.instrument_id == instrument_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use snapshot::{Direction, OrderStatus};

    use super::MockGateway;
    use crate::api::{CancelOrderRequest, OffsetFlag, PlaceOrderRequest, RequestError};
    use crate::protocol::TradingGateway;

    #[tokio::test]
    async fn placed_orders_show_up_in_queries() {
        let mut gateway = MockGateway::new();
        let order_ref = gateway
            .place_order(&PlaceOrderRequest {
                instrument_id: "rb2405".to_string(),
                direction: Direction::Buy,
                offset_flag: OffsetFlag::Open,
                price: 3700.0,
                volume: 2,
            })
            .await
            .expect("place order");

        let orders = gateway.query_orders().await.expect("query orders");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, order_ref);
        assert_eq!(orders[0].status, OrderStatus::NotTraded);
    }

    #[tokio::test]
    async fn cancelling_an_unknown_order_is_rejected() {
        let mut gateway = MockGateway::new();
        let result = gateway
            .cancel_order(&CancelOrderRequest {
                order_ref: "missing".to_string(),
                instrument_id: "rb2405".to_string(),
            })
            .await;
        assert!(matches!(result, Err(RequestError::Rejected { .. })));
    }

    #[tokio::test]
    async fn failed_login_carries_a_readable_message() {
        let mut gateway = MockGateway::new();
        gateway.trading_login_ok = false;
        let error = gateway.trading_login().await.expect_err("must fail");
        assert!(matches!(
            error,
            RequestError::Rejected { message } if message == "交易系统登录失败"
        ));
    }
}
