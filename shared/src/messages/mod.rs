use fathom_serde::{BitReader, BitWrite, BitWriter, Serde};
use log::warn;

use crate::prefab::PrefabLookup;

pub mod campaign_request;
pub mod crew;
mod entries;
pub mod error;
pub mod packet_kind;
pub mod snapshot;
pub mod transition_state;

use error::CampaignCodecError;
use packet_kind::PacketKind;

/// Largest quantity a single cargo line can carry on the wire.
pub const MAX_ITEM_QUANTITY: u8 = 100;

/// A campaign payload with a fixed [`PacketKind`] tag.
pub trait CampaignMessage: Sized {
    const KIND: PacketKind;

    /// Writes the body, without the tag.
    fn write(&self, writer: &mut dyn BitWrite);

    /// Reads the body, without the tag. Identifiers are resolved through
    /// `prefabs`; entries that cannot be resolved are dropped.
    fn read(
        reader: &mut BitReader,
        prefabs: &dyn PrefabLookup,
    ) -> Result<Self, CampaignCodecError>;

    /// Tag plus body, ready to hand to a transport.
    fn to_packet(&self) -> Box<[u8]> {
        let mut writer = BitWriter::new();
        Self::KIND.ser(&mut writer);
        self.write(&mut writer);
        writer.to_bytes()
    }

    /// Reads a tagged payload, failing if the tag names another message.
    fn from_packet(
        payload: &[u8],
        prefabs: &dyn PrefabLookup,
    ) -> Result<Self, CampaignCodecError> {
        let mut reader = BitReader::new(payload);
        let kind = read_packet_kind(&mut reader)?;
        if kind != Self::KIND {
            return Err(CampaignCodecError::UnexpectedKind {
                expected: Self::KIND,
                actual: kind,
            });
        }
        Self::read(&mut reader, prefabs)
    }
}

pub fn read_packet_kind(reader: &mut BitReader) -> Result<PacketKind, CampaignCodecError> {
    Ok(PacketKind::de(reader)?)
}

/// Body-less request asking the server to end the round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestStartRound;

impl CampaignMessage for RequestStartRound {
    const KIND: PacketKind = PacketKind::RequestStartRound;

    fn write(&self, _writer: &mut dyn BitWrite) {}

    fn read(
        _reader: &mut BitReader,
        _prefabs: &dyn PrefabLookup,
    ) -> Result<Self, CampaignCodecError> {
        Ok(RequestStartRound)
    }
}

// List framing shared by every message

/// Writes a `u16` count and returns how many entries should follow.
pub(crate) fn write_u16_count(len: usize, list: &'static str, writer: &mut dyn BitWrite) -> usize {
    let count = u16::try_from(len).unwrap_or_else(|_| {
        warn!("{list} has {len} entries, only {} will be sent", u16::MAX);
        u16::MAX
    });
    count.ser(writer);
    usize::from(count)
}

/// Writes a `u8` count and returns how many entries should follow.
pub(crate) fn write_u8_count(len: usize, list: &'static str, writer: &mut dyn BitWrite) -> usize {
    let count = u8::try_from(len).unwrap_or_else(|_| {
        warn!("{list} has {len} entries, only {} will be sent", u8::MAX);
        u8::MAX
    });
    count.ser(writer);
    usize::from(count)
}

/// Reads a list count and checks that `count` entries of at least
/// `min_entry_bits` each could fit in what is left of the buffer.
pub(crate) fn read_count<C: Serde + Into<u32>>(
    reader: &mut BitReader,
    list: &'static str,
    min_entry_bits: u32,
) -> Result<u32, CampaignCodecError> {
    let count: u32 = C::de(reader)?.into();
    let remaining = reader.bits_remaining();
    if u64::from(count) * u64::from(min_entry_bits) > u64::from(remaining) {
        return Err(CampaignCodecError::CountExceedsBuffer {
            list,
            count,
            remaining,
        });
    }
    Ok(count)
}

/// Bits taken by the shortest possible string, an empty one.
pub(crate) const MIN_STRING_BITS: u32 = 8;
