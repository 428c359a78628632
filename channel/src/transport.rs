pub mod mock;
pub mod ws;

use crate::error::ChannelError;
use crate::frame::WireFrame;

pub use mock::{MockStep, MockTransport};
pub use ws::WsTransport;

/// One physical broker connection. `recv` returning `Ok(None)` means the
/// peer closed the connection in an orderly way.
#[allow(async_fn_in_trait)]
pub trait FrameTransport {
    async fn connect(&mut self, url: &str) -> Result<(), ChannelError>;
    async fn send(&mut self, frame: &WireFrame) -> Result<(), ChannelError>;
    async fn recv(&mut self) -> Result<Option<WireFrame>, ChannelError>;
    async fn close(&mut self);
}
