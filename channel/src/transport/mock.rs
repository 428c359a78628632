use std::collections::VecDeque;
use std::time::Duration;

use crate::error::ChannelError;
use crate::frame::WireFrame;
use crate::transport::FrameTransport;

/// Scripted transport double. Each `recv` consumes one step; an exhausted
/// script behaves like an orderly peer close.
#[derive(Debug, Clone)]
pub enum MockStep {
    Frame(WireFrame),
    /// Stay silent for the given number of milliseconds, then move on.
    Idle(u64),
    PeerClose,
}

pub struct MockTransport {
    script: VecDeque<MockStep>,
    fail_connects: u32,
    connected: bool,
    pub connect_calls: u32,
    pub sent: Vec<WireFrame>,
}

impl MockTransport {
    pub fn new(script: Vec<MockStep>) -> Self {
        Self::failing_first(0, script)
    }

    /// Fail the first `fail_connects` connect attempts before accepting one.
    pub fn failing_first(fail_connects: u32, script: Vec<MockStep>) -> Self {
        Self {
            script: script.into(),
            fail_connects,
            connected: false,
            connect_calls: 0,
            sent: Vec::new(),
        }
    }

    pub fn push_step(&mut self, step: MockStep) {
        self.script.push_back(step);
    }

    pub fn sent_subscriptions(&self) -> Vec<(u64, String)> {
        self.sent
            .iter()
            .filter_map(|frame| match frame {
                WireFrame::Subscribe { id, topic } => Some((*id, topic.clone())),
                _ => None,
            })
            .collect()
    }
}

impl FrameTransport for MockTransport {
    async fn connect(&mut self, _url: &str) -> Result<(), ChannelError> {
        self.connect_calls += 1;
        if self.fail_connects > 0 {
            self.fail_connects -= 1;
            return Err(ChannelError::ConnectionFailed(
                "scripted connect failure".to_string(),
            ));
        }
        self.connected = true;
        Ok(())
    }

    async fn send(&mut self, frame: &WireFrame) -> Result<(), ChannelError> {
        if !self.connected {
            return Err(ChannelError::NotConnected);
        }
        self.sent.push(frame.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<WireFrame>, ChannelError> {
        loop {
            match self.script.pop_front() {
                Some(MockStep::Frame(frame)) => return Ok(Some(frame)),
                Some(MockStep::Idle(ms)) => {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                }
                Some(MockStep::PeerClose) | None => {
                    self.connected = false;
                    return Ok(None);
                }
            }
        }
    }

    async fn close(&mut self) {
        self.connected = false;
    }
}
