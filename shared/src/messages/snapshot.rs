use std::collections::BTreeMap;

use fathom_serde::{BitReader, BitWrite, Serde};
use log::{debug, warn};

use crate::{
    container::CampaignSnapshot,
    messages::{
        entries::{
            read_purchased_items, read_sold_items, read_upgrades, write_purchased_items,
            write_sold_items, write_upgrades,
        },
        error::CampaignCodecError,
        packet_kind::PacketKind,
        read_count, write_u16_count, write_u8_count, CampaignMessage, MIN_STRING_BITS,
    },
    prefab::PrefabLookup,
    state::{AvailableMission, CampaignState, CharacterInfo, RepairFlags},
    types::{LocationIndex, MissionIndex},
};

/// Absent location on the wire.
pub const NO_LOCATION: LocationIndex = LocationIndex::MAX;
/// Absent mission on the wire.
pub const NO_MISSION: MissionIndex = MissionIndex::MAX;

pub(crate) fn write_location(location: Option<LocationIndex>, writer: &mut dyn BitWrite) {
    if let Some(index) = location {
        debug_assert_ne!(index, NO_LOCATION, "location index collides with the sentinel");
    }
    location.unwrap_or(NO_LOCATION).ser(writer);
}

pub(crate) fn read_location(
    reader: &mut BitReader,
) -> Result<Option<LocationIndex>, CampaignCodecError> {
    let index = LocationIndex::de(reader)?;
    Ok((index != NO_LOCATION).then_some(index))
}

pub(crate) fn write_mission(mission: Option<MissionIndex>, writer: &mut dyn BitWrite) {
    if let Some(index) = mission {
        debug_assert_ne!(index, NO_MISSION, "mission index collides with the sentinel");
    }
    mission.unwrap_or(NO_MISSION).ser(writer);
}

pub(crate) fn read_mission(
    reader: &mut BitReader,
) -> Result<Option<MissionIndex>, CampaignCodecError> {
    let index = MissionIndex::de(reader)?;
    Ok((index != NO_MISSION).then_some(index))
}

impl CampaignMessage for CampaignSnapshot {
    const KIND: PacketKind = PacketKind::CampaignState;

    fn write(&self, writer: &mut dyn BitWrite) {
        let state = &self.state;

        state.is_first_round.ser(writer);
        self.campaign_id.ser(writer);
        self.update_id.ser(writer);
        self.save_id.ser(writer);
        state.map_seed.ser(writer);

        write_location(state.current_location, writer);
        write_location(state.selected_location, writer);
        write_mission(state.selected_mission, writer);

        state.location_reputation.ser(writer);

        let count = write_u8_count(state.faction_reputations.len(), "factions", writer);
        for (identifier, reputation) in state.faction_reputations.iter().take(count) {
            identifier.ser(writer);
            reputation.ser(writer);
        }

        state.force_map_ui.ser(writer);
        state.money.ser(writer);
        state.repairs.ser(writer);

        let count = write_u16_count(state.available_missions.len(), "missions", writer);
        for mission in state.available_missions.iter().take(count) {
            mission.identifier.ser(writer);
            mission.connection_index.ser(writer);
        }

        state.store_balance.ser(writer);

        write_purchased_items(&state.buy_crate_items, "buy crate", writer);
        write_purchased_items(&state.purchased_items, "purchased items", writer);
        write_sold_items(&state.sold_items, writer);
        write_upgrades(&state.pending_upgrades, writer);

        self.character_info.ser(writer);
    }

    fn read(
        reader: &mut BitReader,
        prefabs: &dyn PrefabLookup,
    ) -> Result<Self, CampaignCodecError> {
        let is_first_round = bool::de(reader)?;
        let campaign_id = u8::de(reader)?;
        let update_id = u16::de(reader)?;
        let save_id = u16::de(reader)?;
        let map_seed = String::de(reader)?;

        let current_location = read_location(reader)?;
        let selected_location = read_location(reader)?;
        let mut selected_mission = read_mission(reader)?;
        if selected_location.is_none() && selected_mission.is_some() {
            debug!("dropping mission selection without a destination");
            selected_mission = None;
        }

        let location_reputation = Option::<f32>::de(reader)?;

        let count = read_count::<u8>(reader, "factions", MIN_STRING_BITS + 32)?;
        let mut faction_reputations = BTreeMap::new();
        for _ in 0..count {
            let identifier = String::de(reader)?;
            let reputation = f32::de(reader)?;
            if !prefabs.has_faction(&identifier) {
                warn!("factions: unknown faction \"{identifier}\", skipping");
                continue;
            }
            faction_reputations.insert(identifier, reputation);
        }

        let force_map_ui = bool::de(reader)?;
        let money = i32::de(reader)?;
        let repairs = RepairFlags::de(reader)?;

        let count = read_count::<u16>(reader, "missions", MIN_STRING_BITS + 8)?;
        let mut available_missions = Vec::new();
        for _ in 0..count {
            let identifier = String::de(reader)?;
            let connection_index = u8::de(reader)?;
            if !prefabs.has_mission(&identifier) {
                warn!("missions: unknown mission \"{identifier}\", skipping");
                continue;
            }
            available_missions.push(AvailableMission {
                identifier,
                connection_index,
            });
        }

        let store_balance = Option::<u16>::de(reader)?;

        let buy_crate_items = read_purchased_items(reader, "buy crate", prefabs)?;
        let purchased_items = read_purchased_items(reader, "purchased items", prefabs)?;
        let sold_items = read_sold_items(reader, prefabs)?;
        let pending_upgrades = read_upgrades(reader, prefabs)?;

        let character_info = Option::<CharacterInfo>::de(reader)?;

        Ok(CampaignSnapshot {
            campaign_id,
            update_id,
            save_id,
            state: CampaignState {
                is_first_round,
                map_seed,
                current_location,
                selected_location,
                selected_mission,
                location_reputation,
                faction_reputations,
                force_map_ui,
                money,
                repairs,
                available_missions,
                store_balance,
                buy_crate_items,
                purchased_items,
                sold_items,
                pending_upgrades,
            },
            character_info,
        })
    }
}
