#[derive(Debug, Clone)]
pub enum ChannelError {
    NotConnected,
    ConnectionFailed(String),
    HandshakeTimeout(u64),
    RetriesExhausted(u32),
    MalformedFrame(String),
    Transport(String),
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::NotConnected => write!(f, "channel not connected"),
            ChannelError::ConnectionFailed(msg) => write!(f, "connection failed: {}", msg),
            ChannelError::HandshakeTimeout(ms) => {
                write!(f, "handshake did not complete within {}ms", ms)
            }
            ChannelError::RetriesExhausted(attempts) => {
                write!(f, "gave up reconnecting after {} attempts", attempts)
            }
            ChannelError::MalformedFrame(msg) => write!(f, "malformed wire frame: {}", msg),
            ChannelError::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for ChannelError {}
