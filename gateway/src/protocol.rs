use snapshot::{Account, Order, Position, Trade};

use crate::api::{CancelOrderRequest, InstrumentInfo, PlaceOrderRequest, RequestError};

/// 柜台请求/应答接口（REST 协作方的客户端契约）。
///
/// 每个操作要么成功返回数据，要么返回带可读 message 的
/// `RequestError`；HTTP 管道本身不在本层实现。
#[allow(async_fn_in_trait)]
pub trait TradingGateway {
    async fn trading_login(&mut self) -> Result<(), RequestError>;
    async fn trading_logout(&mut self) -> Result<(), RequestError>;
    async fn market_login(&mut self) -> Result<(), RequestError>;
    async fn place_order(&mut self, request: &PlaceOrderRequest) -> Result<String, RequestError>;
    async fn cancel_order(&mut self, request: &CancelOrderRequest) -> Result<(), RequestError>;
    async fn query_orders(&mut self) -> Result<Vec<Order>, RequestError>;
    async fn query_trades(&mut self) -> Result<Vec<Trade>, RequestError>;
    async fn query_positions(&mut self) -> Result<Vec<Position>, RequestError>;
    async fn query_account(&mut self) -> Result<Option<Account>, RequestError>;
    async fn subscribe_market(&mut self, instruments: &[String]) -> Result<(), RequestError>;
    async fn unsubscribe_market(&mut self, instruments: &[String]) -> Result<(), RequestError>;
    async fn query_instrument(
        &mut self,
        instrument_id: &str,
    ) -> Result<Option<InstrumentInfo>, RequestError>;
}
