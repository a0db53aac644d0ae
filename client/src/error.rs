use fathom_shared::{CampaignCodecError, PacketKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// A server packet could not be decoded. The mirror kept its old state.
    #[error("malformed packet from server: {0}")]
    Malformed(#[from] CampaignCodecError),

    /// The server sent a kind only clients send.
    #[error("server sent an unexpected {0:?} packet")]
    UnexpectedKind(PacketKind),

    /// No campaign snapshot has arrived yet.
    #[error("no campaign received yet")]
    NoCampaign,

    /// Requests built from save-dependent fields would undo server state
    /// until the matching save is loaded.
    #[error("save {needed} is not loaded locally")]
    SaveNotLoaded { needed: u16 },
}
