pub mod api;
pub mod mock;
pub mod protocol;

pub use api::{
    ApiResponse, CancelOrderRequest, InstrumentInfo, OffsetFlag, PlaceOrderRequest, RequestError,
};
pub use mock::MockGateway;
pub use protocol::TradingGateway;
