//! Outbound byte transport to the modem.

use crossbeam_channel::Sender;

use crate::error::{Result, RilError};

/// Sends complete frames to the modem.
pub trait Transport {
    /// Send one length-prefixed frame.
    fn send(&mut self, frame: &[u8]) -> Result<()>;
}

/// Forwards frames over a channel, typically to a thread that owns the socket.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: Sender<Vec<u8>>,
}

impl ChannelTransport {
    /// Wrap a frame sender.
    pub fn new(tx: Sender<Vec<u8>>) -> Self {
        ChannelTransport { tx }
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.tx
            .send(frame.to_vec())
            .map_err(|_| RilError::Transport("modem channel disconnected".to_string()))
    }
}

/// Keeps every frame in memory. Can be told to refuse frames.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    /// Frames sent so far, in order.
    pub frames: Vec<Vec<u8>>,
    /// Refuse every send while set.
    pub refuse: bool,
}

impl RecordingTransport {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded frames.
    pub fn take_frames(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.frames)
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        if self.refuse {
            return Err(RilError::Transport("transport refused frame".to_string()));
        }
        self.frames.push(frame.to_vec());
        Ok(())
    }
}
