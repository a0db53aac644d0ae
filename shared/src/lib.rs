//! # Fathom Shared
//! Campaign state, versioning and wire messages shared between
//! fathom-server & fathom-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use fathom_serde::{
    BitCounter, BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, UnsignedInteger,
    UnsignedVariableInteger,
};

mod container;
mod messages;
mod prefab;
mod save_tracker;
mod state;
mod transition;
mod types;
mod world_map;
mod wrapping_number;

pub use container::{next_save_id, CampaignSnapshot, ReadOnlyMirror, VersionedCampaign};
pub use messages::{
    campaign_request::CampaignRequest,
    crew::{CrewRequest, CrewState, HireCandidate},
    error::CampaignCodecError,
    packet_kind::PacketKind,
    read_packet_kind,
    snapshot::{NO_LOCATION, NO_MISSION},
    transition_state::TransitionState,
    CampaignMessage, RequestStartRound, MAX_ITEM_QUANTITY,
};
pub use prefab::{ItemPrefab, PrefabLookup, PrefabRegistry, UpgradePrefab};
pub use save_tracker::{SaveTracker, NO_SAVE};
pub use state::{
    AvailableMission, CampaignState, CharacterInfo, PendingUpgrade, PurchasedItem, RepairFlags,
    SoldItem,
};
pub use transition::{
    StepResult, TransitionConfig, TransitionHost, TransitionKind, TransitionOrchestrator,
    TransitionOutcome, TransitionPhase, TransitionTrigger,
};
pub use types::{CampaignId, CharacterId, LocationIndex, MissionIndex, Role, SaveId, UpdateId};
pub use world_map::{Connection, Location, WorldMap, WorldMapError};
pub use wrapping_number::{id_less_recent, id_more_recent, wrapping_diff};
