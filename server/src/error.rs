use fathom_shared::{CampaignCodecError, ReadOnlyMirror, WorldMapError};
use thiserror::Error;

use crate::{persistence::PersistenceError, transport::SendError, user::UserKey};

/// Errors surfaced by the campaign server
#[derive(Debug, Error)]
pub enum ServerError {
    /// A client packet could not be decoded. The packet was dropped.
    #[error("malformed packet from {user:?}: {source}")]
    MalformedPacket {
        user: UserKey,
        #[source]
        source: CampaignCodecError,
    },

    /// Writing or reading the campaign save failed
    #[error("campaign save failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// The map handed to the server is unusable
    #[error("invalid world map: {0}")]
    WorldMap(#[from] WorldMapError),

    /// The server tried to mutate a campaign it does not own
    #[error(transparent)]
    ReadOnly(#[from] ReadOnlyMirror),

    /// No connected user has this key
    #[error("user {0:?} is not connected")]
    UnknownUser(UserKey),

    /// The outgoing channel to a user is closed
    #[error("could not send to user {user:?}: {source}")]
    Send {
        user: UserKey,
        #[source]
        source: SendError,
    },
}
