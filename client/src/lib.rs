//! # Fathom Client
//! A player's read-only mirror of the server's campaign. Applies versioned
//! snapshots, holds back save-dependent fields until the matching save is
//! loaded, and writes the requests the player is allowed to send.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use fathom_shared::{
        CampaignMessage, CampaignRequest, CampaignSnapshot, CrewRequest, CrewState,
        PrefabLookup, PrefabRegistry, TransitionConfig, TransitionKind, TransitionOutcome,
        TransitionPhase, TransitionState,
    };
}

mod client;
mod client_config;
mod error;
mod events;
mod mirror;

pub use client::CampaignClient;
pub use client_config::ClientConfig;
pub use error::ClientError;
pub use events::{
    CampaignChangedEvent, CampaignReplacedEvent, ClientEvent, ClientEvents, CrewStateEvent,
    ErrorEvent, ReturnedToLobbyEvent, RoundEndEvent, SaveRequestedEvent, TransitionEvent,
};
pub use mirror::{CampaignMirror, MirrorUpdate};
