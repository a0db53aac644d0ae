use fathom_serde::{BitReader, BitWrite, Serde};

use crate::{
    messages::{error::CampaignCodecError, packet_kind::PacketKind, CampaignMessage},
    prefab::PrefabLookup,
    transition::{TransitionKind, TransitionOutcome, TransitionPhase},
};

/// The server's round transition, sent whenever its phase or outcome
/// changes so clients can run the same camera and level-load sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionState {
    pub kind: Option<TransitionKind>,
    pub phase: TransitionPhase,
    /// How the last transition finished. Cleared when a new one begins.
    pub outcome: Option<TransitionOutcome>,
}

impl CampaignMessage for TransitionState {
    const KIND: PacketKind = PacketKind::TransitionState;

    fn write(&self, writer: &mut dyn BitWrite) {
        self.kind.ser(writer);
        self.phase.ser(writer);
        self.outcome.ser(writer);
    }

    fn read(
        reader: &mut BitReader,
        _prefabs: &dyn PrefabLookup,
    ) -> Result<Self, CampaignCodecError> {
        Ok(Self {
            kind: Option::de(reader)?,
            phase: TransitionPhase::de(reader)?,
            outcome: Option::de(reader)?,
        })
    }
}
