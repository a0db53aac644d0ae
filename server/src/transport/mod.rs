use thiserror::Error;

mod channel;

pub use channel::PacketChannel;

/// Outgoing half of a connection to one peer.
pub trait PacketSender: Send + Sync {
    fn send(&self, payload: &[u8]) -> Result<(), SendError>;
}

/// Incoming half of a connection. Polled once per tick.
pub trait PacketReceiver: Send {
    /// Returns the next queued payload, if any.
    fn receive(&mut self) -> Result<Option<&[u8]>, RecvError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("packet channel closed while sending")]
pub struct SendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("packet channel closed while receiving")]
pub struct RecvError;
