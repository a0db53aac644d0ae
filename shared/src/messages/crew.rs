use fathom_serde::{BitReader, BitWrite, Serde};
use serde::{Deserialize, Serialize};

use crate::{
    messages::{
        error::CampaignCodecError, packet_kind::PacketKind, read_count, write_u16_count,
        CampaignMessage, MIN_STRING_BITS,
    },
    prefab::PrefabLookup,
    state::CharacterInfo,
    types::CharacterId,
};

const CHARACTER_ID_BITS: u32 = 32;

/// A character the current location offers for hire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HireCandidate {
    pub info: CharacterInfo,
    pub salary: i32,
}

/// Client to server: changes to the pending hire list, a request to hire
/// everyone on it, or a bot to fire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrewRequest {
    /// `None` leaves the pending list untouched.
    pub pending_hires: Option<Vec<CharacterId>>,
    pub validate_hires: bool,
    pub fired: Option<CharacterId>,
}

/// Server to every client: the hire pool as the server sees it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrewState {
    pub available_hires: Vec<HireCandidate>,
    pub pending_hires: Vec<CharacterId>,
    pub validate_hires: bool,
    pub fired: Option<CharacterId>,
}

fn write_ids(ids: &[CharacterId], writer: &mut dyn BitWrite) {
    let count = write_u16_count(ids.len(), "pending hires", writer);
    for id in ids.iter().take(count) {
        id.ser(writer);
    }
}

fn read_ids(reader: &mut BitReader) -> Result<Vec<CharacterId>, CampaignCodecError> {
    let count = read_count::<u16>(reader, "pending hires", CHARACTER_ID_BITS)?;
    let mut ids = Vec::new();
    for _ in 0..count {
        ids.push(CharacterId::de(reader)?);
    }
    Ok(ids)
}

impl CampaignMessage for CrewRequest {
    const KIND: PacketKind = PacketKind::CrewRequest;

    fn write(&self, writer: &mut dyn BitWrite) {
        self.pending_hires.is_some().ser(writer);
        if let Some(ids) = &self.pending_hires {
            write_ids(ids, writer);
        }
        self.validate_hires.ser(writer);
        self.fired.ser(writer);
    }

    fn read(
        reader: &mut BitReader,
        _prefabs: &dyn PrefabLookup,
    ) -> Result<Self, CampaignCodecError> {
        let pending_hires = if bool::de(reader)? {
            Some(read_ids(reader)?)
        } else {
            None
        };
        Ok(Self {
            pending_hires,
            validate_hires: bool::de(reader)?,
            fired: Option::<CharacterId>::de(reader)?,
        })
    }
}

impl CampaignMessage for CrewState {
    const KIND: PacketKind = PacketKind::CrewState;

    fn write(&self, writer: &mut dyn BitWrite) {
        let count = write_u16_count(self.available_hires.len(), "available hires", writer);
        for candidate in self.available_hires.iter().take(count) {
            candidate.info.ser(writer);
            candidate.salary.ser(writer);
        }
        write_ids(&self.pending_hires, writer);
        self.validate_hires.ser(writer);
        self.fired.ser(writer);
    }

    fn read(
        reader: &mut BitReader,
        _prefabs: &dyn PrefabLookup,
    ) -> Result<Self, CampaignCodecError> {
        // id, two strings, salary
        let min_bits = CHARACTER_ID_BITS + 2 * MIN_STRING_BITS + 32;
        let count = read_count::<u16>(reader, "available hires", min_bits)?;
        let mut available_hires = Vec::new();
        for _ in 0..count {
            available_hires.push(HireCandidate {
                info: CharacterInfo::de(reader)?,
                salary: i32::de(reader)?,
            });
        }
        Ok(Self {
            available_hires,
            pending_hires: read_ids(reader)?,
            validate_hires: bool::de(reader)?,
            fired: Option::<CharacterId>::de(reader)?,
        })
    }
}
