pub mod error;
pub mod frame;
pub mod lifecycle;
pub mod transport;

pub use error::ChannelError;
pub use frame::WireFrame;
pub use lifecycle::{
    Channel, ChannelConfig, ChannelEvent, ChannelStats, ConnectionState, ReconnectPolicy,
    StateObserver,
};
pub use transport::{FrameTransport, MockStep, MockTransport, WsTransport};
