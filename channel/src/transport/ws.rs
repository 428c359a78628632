use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::warn;

use crate::error::ChannelError;
use crate::frame::WireFrame;
use crate::transport::FrameTransport;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Default)]
pub struct WsTransport {
    stream: Option<WsStream>,
}

impl WsTransport {
    pub fn new() -> Self {
        Self { stream: None }
    }
}

impl FrameTransport for WsTransport {
    async fn connect(&mut self, url: &str) -> Result<(), ChannelError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::ConnectionFailed(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, frame: &WireFrame) -> Result<(), ChannelError> {
        let stream = self.stream.as_mut().ok_or(ChannelError::NotConnected)?;
        let text = frame.encode()?;
        stream
            .send(Message::Text(text))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Result<Option<WireFrame>, ChannelError> {
        let stream = self.stream.as_mut().ok_or(ChannelError::NotConnected)?;
        while let Some(item) = stream.next().await {
            match item {
                Ok(Message::Text(text)) => match WireFrame::decode(&text) {
                    Ok(frame) => return Ok(Some(frame)),
                    // Undecodable frames never reach consumers.
                    Err(error) => warn!(%error, "dropping malformed wire frame"),
                },
                Ok(Message::Close(_)) => return Ok(None),
                Ok(_) => {}
                Err(e) => return Err(ChannelError::Transport(e.to_string())),
            }
        }
        Ok(None)
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
    }
}
