use fathom_serde::{BitReader, BitWrite, Serde};

use crate::{
    messages::{
        entries::{
            read_purchased_items, read_sold_items, read_upgrades, write_purchased_items,
            write_sold_items, write_upgrades,
        },
        error::CampaignCodecError,
        packet_kind::PacketKind,
        snapshot::{read_location, read_mission, write_location, write_mission},
        CampaignMessage,
    },
    prefab::PrefabLookup,
    state::{CampaignState, PendingUpgrade, PurchasedItem, RepairFlags, SoldItem},
    types::{LocationIndex, MissionIndex},
};

/// What a client would like the campaign to look like. The server treats
/// every field as a proposal and re-prices it before applying anything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CampaignRequest {
    pub current_location: Option<LocationIndex>,
    pub selected_location: Option<LocationIndex>,
    pub selected_mission: Option<MissionIndex>,
    pub repairs: RepairFlags,
    pub buy_crate_items: Vec<PurchasedItem>,
    pub purchased_items: Vec<PurchasedItem>,
    pub sold_items: Vec<SoldItem>,
    pub purchased_upgrades: Vec<PendingUpgrade>,
}

impl CampaignRequest {
    /// Request that leaves the campaign exactly as `state` describes it.
    pub fn from_state(state: &CampaignState) -> Self {
        Self {
            current_location: state.current_location,
            selected_location: state.selected_location,
            selected_mission: state.selected_mission,
            repairs: state.repairs,
            buy_crate_items: state.buy_crate_items.clone(),
            purchased_items: state.purchased_items.clone(),
            sold_items: state.sold_items.clone(),
            purchased_upgrades: Vec::new(),
        }
    }
}

impl CampaignMessage for CampaignRequest {
    const KIND: PacketKind = PacketKind::CampaignRequest;

    fn write(&self, writer: &mut dyn BitWrite) {
        write_location(self.current_location, writer);
        write_location(self.selected_location, writer);
        write_mission(self.selected_mission, writer);
        self.repairs.ser(writer);
        write_purchased_items(&self.buy_crate_items, "buy crate", writer);
        write_purchased_items(&self.purchased_items, "purchased items", writer);
        write_sold_items(&self.sold_items, writer);
        write_upgrades(&self.purchased_upgrades, writer);
    }

    fn read(
        reader: &mut BitReader,
        prefabs: &dyn PrefabLookup,
    ) -> Result<Self, CampaignCodecError> {
        Ok(Self {
            current_location: read_location(reader)?,
            selected_location: read_location(reader)?,
            selected_mission: read_mission(reader)?,
            repairs: RepairFlags::de(reader)?,
            buy_crate_items: read_purchased_items(reader, "buy crate", prefabs)?,
            purchased_items: read_purchased_items(reader, "purchased items", prefabs)?,
            sold_items: read_sold_items(reader, prefabs)?,
            purchased_upgrades: read_upgrades(reader, prefabs)?,
        })
    }
}
