// Tag at the start of every campaign payload

use fathom_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr, UnsignedInteger};

#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub enum PacketKind {
    // Full campaign snapshot, server to client
    CampaignState,
    // Hire pool and pending hires, server to client
    CrewState,
    // Desired selection and store changes, client to server
    CampaignRequest,
    // Hire or fire request, client to server
    CrewRequest,
    // Ask the server to end the round and travel
    RequestStartRound,
    // Round transition phase, server to client
    TransitionState,
}

impl Serde for PacketKind {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let index: u8 = match self {
            PacketKind::CampaignState => 0,
            PacketKind::CrewState => 1,
            PacketKind::CampaignRequest => 2,
            PacketKind::CrewRequest => 3,
            PacketKind::RequestStartRound => 4,
            PacketKind::TransitionState => 5,
        };

        UnsignedInteger::<3>::new(index).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match UnsignedInteger::<3>::de(reader)?.get() {
            0 => Ok(PacketKind::CampaignState),
            1 => Ok(PacketKind::CrewState),
            2 => Ok(PacketKind::CampaignRequest),
            3 => Ok(PacketKind::CrewRequest),
            4 => Ok(PacketKind::RequestStartRound),
            5 => Ok(PacketKind::TransitionState),
            // untrusted input: out-of-range tags are an error, not a panic
            _ => Err(SerdeErr),
        }
    }

    fn bit_length(&self) -> u32 {
        <UnsignedInteger<3> as ConstBitLength>::const_bit_length()
    }
}
