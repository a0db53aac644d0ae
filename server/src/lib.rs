//! # Fathom Server
//! The authoritative side of a multiplayer campaign: owns campaign state,
//! decides which client requests to apply, and replicates versioned
//! snapshots to every connected client once per tick.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod transport;
pub mod shared {
    pub use fathom_shared::{
        BitReader, BitWrite, BitWriter, CampaignMessage, CampaignRequest, CampaignSnapshot,
        CrewRequest, CrewState, PrefabLookup, PrefabRegistry, Serde, SerdeErr, WorldMap,
    };
}

mod crew;
mod error;
mod events;
mod gateway;
mod persistence;
mod server;
mod server_config;
mod session;
mod store;
mod upgrades;
mod user;

pub use crew::{CrewMember, CrewRoster};
pub use error::ServerError;
pub use events::{
    CampaignChangedEvent, CampaignEvent, CampaignEvents, ConnectEvent, DisconnectEvent,
    ErrorEvent, Rejection, RejectionEvent, RoundEndEvent, SaveEvent, StartRoundEvent,
    TransitionEvent,
};
pub use persistence::{
    characters_path, CampaignSection, CargoSection, CharacterCampaignData,
    CharacterDataDocument, FileSaveStore, LoadedGame, MapSection, MemorySaveStore,
    PersistenceError, RestoredCampaign, SaveDocument, SaveKind, SaveStore,
};
pub use server::{CampaignServer, CampaignSetup};
pub use server_config::ServerConfig;
pub use store::{adjusted_price, RepairCosts, Store};
pub use upgrades::UpgradeLevels;
pub use user::{Authority, Permission, User, UserKey};
