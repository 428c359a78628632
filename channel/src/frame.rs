use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// One discrete unit on the broker connection. Message bodies stay opaque
/// JSON text at this layer; decoding them is the router's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireFrame {
    Subscribe { id: u64, topic: String },
    Unsubscribe { id: u64 },
    Send { destination: String, body: String },
    Message { topic: String, body: String },
    Ping,
    Pong,
}

impl WireFrame {
    pub fn encode(&self) -> Result<String, ChannelError> {
        serde_json::to_string(self).map_err(|e| ChannelError::MalformedFrame(e.to_string()))
    }

    pub fn decode(text: &str) -> Result<Self, ChannelError> {
        serde_json::from_str(text).map_err(|e| ChannelError::MalformedFrame(e.to_string()))
    }
}
