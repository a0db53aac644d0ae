use fathom_serde::SerdeErr;
use thiserror::Error;

use crate::messages::packet_kind::PacketKind;

/// Errors that abort decoding of a single campaign message. The receiver
/// drops the message and keeps whatever state it had before.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CampaignCodecError {
    /// A list prefix promised more entries than the rest of the buffer can
    /// possibly hold.
    #[error("{list} count {count} exceeds the {remaining} bits left in the message")]
    CountExceedsBuffer {
        list: &'static str,
        count: u32,
        remaining: u32,
    },

    /// The reader ran out of bits or hit an invalid value.
    #[error("malformed campaign message: {0}")]
    Malformed(#[from] SerdeErr),

    /// The packet tag named a different message than the caller expected.
    #[error("expected a {expected:?} packet but received {actual:?}")]
    UnexpectedKind {
        expected: PacketKind,
        actual: PacketKind,
    },
}
